//! Ledger orchestration
//!
//! [`Ledger`] ties a [`Store`] to the per-entity lock registry, the clock and
//! the configured rates. Every mutating operation follows the same unit of
//! work:
//!
//! 1. Acquire the entity locks it needs (see [`EntityLocks`])
//! 2. Re-read the locked entities from the store
//! 3. Validate business rules in a fixed order
//! 4. Stage all writes in a [`WriteBatch`](super::WriteBatch)
//! 5. Commit the batch, then release the locks
//!
//! A failure anywhere before step 5 drops the batch, and the store applies a
//! batch entirely or not at all, so no partial mutation is ever visible.
//!
//! The operations themselves live next to the component they belong to:
//! `transfer` (transfers, deposits), `savings` (plan lifecycle), `accounts`
//! (lookups and account removal) and `interest` (accrual batch).
//!
//! # Architecture
//!
//! ```text
//! Ledger
//!     ├── Arc<S: Store>     (durable state, keyed lookups + atomic commit)
//!     ├── EntityLocks       (per-account / per-plan mutexes)
//!     ├── Arc<dyn Clock>    (now / today)
//!     └── LedgerConfig      (plan rates, accrual period)
//! ```

use super::clock::{Clock, SystemClock};
use super::interest::AccrualReport;
use super::locks::EntityLocks;
use super::memory_store::MemoryStore;
use super::traits::{BankOperations, Store, UserOperations};
use crate::config::LedgerConfig;
use crate::types::{
    Account, AccountDetails, AccountId, AccountSummary, BeneficiaryPreview, BeneficiaryRequest,
    Caller, DepositRequest, LedgerError, LedgerResult, SavingsId, SavingsMovement, SavingsPlan,
    SavingsReceipt, SavingsRequest, TransferReceipt, TransferRequest,
};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Account ledger and savings engine
#[derive(Debug)]
pub struct Ledger<S: Store = MemoryStore> {
    pub(crate) store: Arc<S>,
    pub(crate) locks: EntityLocks,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: LedgerConfig,
}

impl<S: Store> Ledger<S> {
    /// Create a ledger over `store` using wall-clock time
    pub fn new(store: Arc<S>, config: LedgerConfig) -> Self {
        Self {
            store,
            locks: EntityLocks::new(),
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub(crate) fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Read an account or fail with `AccountNotFound`
    pub(crate) fn require_account(&self, id: AccountId) -> LedgerResult<Account> {
        self.store
            .account(id)?
            .ok_or_else(|| LedgerError::account_not_found(id))
    }
}

impl<S: Store> BankOperations for Ledger<S> {
    fn beneficiary_preview(
        &self,
        request: &BeneficiaryRequest,
    ) -> LedgerResult<BeneficiaryPreview> {
        Ledger::beneficiary_preview(self, request)
    }

    fn transfer(&self, caller: &Caller, request: &TransferRequest) -> LedgerResult<TransferReceipt> {
        Ledger::transfer(self, caller, request)
    }

    fn create_flexible(
        &self,
        caller: &Caller,
        request: &SavingsRequest,
    ) -> LedgerResult<SavingsReceipt> {
        Ledger::create_flexible(self, caller, request)
    }

    fn create_fixed(
        &self,
        caller: &Caller,
        request: &SavingsRequest,
    ) -> LedgerResult<SavingsReceipt> {
        Ledger::create_fixed(self, caller, request)
    }

    fn top_up(&self, caller: &Caller, movement: &SavingsMovement) -> LedgerResult<SavingsReceipt> {
        Ledger::top_up(self, caller, movement)
    }

    fn withdraw(
        &self,
        caller: &Caller,
        movement: &SavingsMovement,
    ) -> LedgerResult<SavingsReceipt> {
        Ledger::withdraw(self, caller, movement)
    }

    fn close_flexible(&self, caller: &Caller, savings_id: SavingsId) -> LedgerResult<bool> {
        Ledger::close_flexible(self, caller, savings_id)
    }

    fn list_fixed(&self) -> LedgerResult<Vec<SavingsPlan>> {
        Ledger::list_fixed(self)
    }

    fn list_flexible(&self) -> LedgerResult<Vec<SavingsPlan>> {
        Ledger::list_flexible(self)
    }

    fn accrue_interest(&self) -> AccrualReport {
        Ledger::accrue_interest(self)
    }
}

impl<S: Store> UserOperations for Ledger<S> {
    fn deposit(&self, caller: &Caller, request: &DepositRequest) -> LedgerResult<Decimal> {
        Ledger::deposit(self, caller, request)
    }

    fn account_details(&self, account: AccountId) -> LedgerResult<AccountDetails> {
        Ledger::account_details(self, account)
    }

    fn find_by_identifier(&self, identifier: &str) -> LedgerResult<AccountSummary> {
        Ledger::find_by_identifier(self, identifier)
    }

    fn delete_account(&self, account: AccountId) -> LedgerResult<bool> {
        Ledger::delete_account(self, account)
    }
}
