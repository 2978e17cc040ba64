//! Staged writes for one unit of work

use crate::types::{
    Account, AccountId, SavingsHistoryRecord, SavingsId, SavingsPlan, TransactionRecord,
};

/// Writes that become visible together on [`Store::commit`](super::Store::commit)
///
/// Nothing staged here touches the store until the batch is committed, so an
/// operation that fails halfway through simply drops its batch.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WriteBatch {
    pub accounts: Vec<Account>,
    pub deleted_accounts: Vec<AccountId>,
    pub transactions: Vec<TransactionRecord>,
    pub plans: Vec<SavingsPlan>,
    pub deleted_plans: Vec<SavingsId>,
    pub history: Vec<SavingsHistoryRecord>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an account
    pub fn save_account(&mut self, account: Account) -> &mut Self {
        self.accounts.push(account);
        self
    }

    pub fn delete_account(&mut self, id: AccountId) -> &mut Self {
        self.deleted_accounts.push(id);
        self
    }

    pub fn append_transaction(&mut self, record: TransactionRecord) -> &mut Self {
        self.transactions.push(record);
        self
    }

    /// Insert or replace a savings plan
    pub fn save_plan(&mut self, plan: SavingsPlan) -> &mut Self {
        self.plans.push(plan);
        self
    }

    pub fn delete_plan(&mut self, id: SavingsId) -> &mut Self {
        self.deleted_plans.push(id);
        self
    }

    pub fn append_history(&mut self, record: SavingsHistoryRecord) -> &mut Self {
        self.history.push(record);
        self
    }

    /// Number of staged writes
    pub fn len(&self) -> usize {
        self.accounts.len()
            + self.deleted_accounts.len()
            + self.transactions.len()
            + self.plans.len()
            + self.deleted_plans.len()
            + self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
