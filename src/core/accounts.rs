//! Account lookups, account removal and read-only listings

use super::batch::WriteBatch;
use super::ledger::Ledger;
use super::traits::Store;
use crate::types::{
    Account, AccountDetails, AccountId, AccountSummary, BeneficiaryPreview, BeneficiaryRequest,
    LedgerError, LedgerResult, PlanType, SavingsHistoryRecord, SavingsId, SavingsPlan,
    TransactionRecord,
};
use tracing::{debug, info};

impl<S: Store> Ledger<S> {
    /// Owner's view of an account, balance included
    pub fn account_details(&self, account: AccountId) -> LedgerResult<AccountDetails> {
        let account = self.require_account(account)?;
        Ok(AccountDetails {
            id: account.id,
            account_number: account.account_number,
            email: account.email,
            username: account.username,
            first_name: account.first_name,
            last_name: account.last_name,
            bank: account.bank,
            balance: account.balance,
        })
    }

    /// Public view of the account with this account number or email
    pub fn find_by_identifier(&self, identifier: &str) -> LedgerResult<AccountSummary> {
        let account = self
            .store
            .account_by_identifier(identifier)?
            .ok_or_else(|| LedgerError::account_not_found(identifier))?;
        Ok(AccountSummary {
            id: account.id,
            account_number: account.account_number,
            email: account.email,
            username: account.username,
            first_name: account.first_name,
            last_name: account.last_name,
        })
    }

    /// Remove an account along with its plans and logs
    ///
    /// Returns `Ok(false)` when there is no such account.
    pub fn delete_account(&self, account: AccountId) -> LedgerResult<bool> {
        let plans: Vec<SavingsId> = self
            .store
            .savings_for_account(account)?
            .iter()
            .map(|plan| plan.id)
            .collect();
        let _locks = self.locks.acquire(&[account], &plans);

        if self.store.account(account)?.is_none() {
            debug!(account, "Delete rejected: account not found");
            return Ok(false);
        }

        let mut batch = WriteBatch::new();
        batch.delete_account(account);
        self.store.commit(batch)?;

        info!(account, "Account deleted");
        Ok(true)
    }

    /// Confirm who a transfer would go to before sending it
    pub fn beneficiary_preview(
        &self,
        request: &BeneficiaryRequest,
    ) -> LedgerResult<BeneficiaryPreview> {
        let account = self
            .store
            .account_by_identifier(&request.identifier)?
            .ok_or_else(|| LedgerError::account_not_found(&request.identifier))?;

        if account.bank != request.bank {
            return Err(LedgerError::bank_mismatch(
                &request.identifier,
                request.bank.as_str(),
            ));
        }

        Ok(BeneficiaryPreview {
            id: account.id,
            account_number: account.account_number,
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            username: account.username,
            bank: account.bank,
        })
    }

    pub fn list_fixed(&self) -> LedgerResult<Vec<SavingsPlan>> {
        Ok(self.store.savings_by_type(PlanType::Fixed)?)
    }

    pub fn list_flexible(&self) -> LedgerResult<Vec<SavingsPlan>> {
        Ok(self.store.savings_by_type(PlanType::Flexible)?)
    }

    /// Every account, ordered by id
    pub fn accounts(&self) -> LedgerResult<Vec<Account>> {
        Ok(self.store.accounts()?)
    }

    /// Plans owned by `account`, ordered by id
    pub fn savings_for(&self, account: AccountId) -> LedgerResult<Vec<SavingsPlan>> {
        Ok(self.store.savings_for_account(account)?)
    }

    /// Transaction log of an account, oldest first
    pub fn transactions_for(&self, account: AccountId) -> LedgerResult<Vec<TransactionRecord>> {
        self.require_account(account)?;
        Ok(self.store.transactions_for_account(account)?)
    }

    /// Top-up and withdrawal log of a plan, oldest first
    pub fn savings_history_for(
        &self,
        savings: SavingsId,
    ) -> LedgerResult<Vec<SavingsHistoryRecord>> {
        Ok(self.store.history_for_plan(savings)?)
    }
}
