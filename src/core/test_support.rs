//! Shared fixtures for core unit tests

use super::batch::WriteBatch;
use super::clock::FixedClock;
use super::ledger::Ledger;
use super::memory_store::MemoryStore;
use super::traits::Store;
use crate::config::LedgerConfig;
use crate::types::{
    Account, AccountId, BankName, HistoryId, PlanType, SavingsHistoryRecord, SavingsId,
    SavingsPlan, StoreError, TransactionId, TransactionRecord,
};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
    date(year, month, day).and_hms_opt(0, 0, 0).unwrap()
}

/// Account `id` with number `000000000{id}` and email `user{id}@example.com`
pub fn customer(id: AccountId, bank: &str, balance: i64) -> Account {
    Account::new(
        id,
        format!("{:010}", id),
        format!("user{}@example.com", id),
        BankName::new(bank),
    )
    .with_name(format!("User{}", id), "Customer")
    .with_balance(Decimal::new(balance, 0))
}

pub fn plan(id: SavingsId, account: AccountId, plan_type: PlanType, amount: i64) -> SavingsPlan {
    SavingsPlan {
        id,
        account,
        plan_type,
        amount: Decimal::new(amount, 0),
        interest_rate: Decimal::new(7, 2),
        interest_earned: Decimal::ZERO,
        start_date: date(2024, 1, 1),
        maturity_date: match plan_type {
            PlanType::Fixed => Some(date(2024, 12, 31)),
            PlanType::Flexible => None,
        },
        description: None,
        active: true,
    }
}

/// In-memory ledger with its clock pinned to 2024-01-15
pub fn ledger_with(accounts: Vec<Account>) -> (Ledger<MemoryStore>, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::at_date(date(2024, 1, 15)));
    let ledger = Ledger::new(
        Arc::new(MemoryStore::with_accounts(accounts)),
        LedgerConfig::default(),
    )
    .with_clock(clock.clone());
    (ledger, clock)
}

/// Store whose commits can be switched to fail
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryStore,
    fail: AtomicBool,
}

impl FailingStore {
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        Self {
            inner: MemoryStore::with_accounts(accounts),
            fail: AtomicBool::new(false),
        }
    }

    pub fn fail_commits(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl Store for FailingStore {
    fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        self.inner.account(id)
    }

    fn account_by_identifier(&self, identifier: &str) -> Result<Option<Account>, StoreError> {
        self.inner.account_by_identifier(identifier)
    }

    fn accounts(&self) -> Result<Vec<Account>, StoreError> {
        self.inner.accounts()
    }

    fn savings_plan(&self, id: SavingsId) -> Result<Option<SavingsPlan>, StoreError> {
        self.inner.savings_plan(id)
    }

    fn savings_plan_for_account(
        &self,
        id: SavingsId,
        account: AccountId,
    ) -> Result<Option<SavingsPlan>, StoreError> {
        self.inner.savings_plan_for_account(id, account)
    }

    fn savings_for_account(&self, account: AccountId) -> Result<Vec<SavingsPlan>, StoreError> {
        self.inner.savings_for_account(account)
    }

    fn savings_by_type(&self, plan_type: PlanType) -> Result<Vec<SavingsPlan>, StoreError> {
        self.inner.savings_by_type(plan_type)
    }

    fn active_savings(&self) -> Result<Vec<SavingsPlan>, StoreError> {
        self.inner.active_savings()
    }

    fn transactions_for_account(
        &self,
        account: AccountId,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        self.inner.transactions_for_account(account)
    }

    fn history_for_plan(
        &self,
        savings: SavingsId,
    ) -> Result<Vec<SavingsHistoryRecord>, StoreError> {
        self.inner.history_for_plan(savings)
    }

    fn next_transaction_id(&self) -> Result<TransactionId, StoreError> {
        self.inner.next_transaction_id()
    }

    fn next_savings_id(&self) -> Result<SavingsId, StoreError> {
        self.inner.next_savings_id()
    }

    fn next_history_id(&self) -> Result<HistoryId, StoreError> {
        self.inner.next_history_id()
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("commit disabled".to_string()));
        }
        self.inner.commit(batch)
    }
}
