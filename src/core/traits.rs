//! Core traits for persistence and ledger operations
//!
//! [`Store`] is the seam to the durable store: keyed lookups per entity and a
//! single all-or-nothing write entry point. [`BankOperations`] and
//! [`UserOperations`] are the capabilities the request layer calls into.

use super::batch::WriteBatch;
use super::interest::AccrualReport;
use crate::types::{
    Account, AccountDetails, AccountId, AccountSummary, BeneficiaryPreview, BeneficiaryRequest,
    Caller, DepositRequest, HistoryId, LedgerResult, PlanType, SavingsHistoryRecord, SavingsId,
    SavingsMovement, SavingsPlan, SavingsReceipt, SavingsRequest, StoreError, TransactionId,
    TransactionRecord, TransferReceipt, TransferRequest,
};
use rust_decimal::Decimal;

/// Durable store for accounts, plans and their logs
///
/// Reads return snapshots. Writes only happen through [`Store::commit`],
/// which applies every staged write in the batch or none of them.
pub trait Store: Send + Sync {
    fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// Look up an account by account number or email
    fn account_by_identifier(&self, identifier: &str) -> Result<Option<Account>, StoreError>;

    /// All accounts ordered by id
    fn accounts(&self) -> Result<Vec<Account>, StoreError>;

    fn savings_plan(&self, id: SavingsId) -> Result<Option<SavingsPlan>, StoreError>;

    /// Look up a plan only if it belongs to `account`
    fn savings_plan_for_account(
        &self,
        id: SavingsId,
        account: AccountId,
    ) -> Result<Option<SavingsPlan>, StoreError>;

    fn savings_for_account(&self, account: AccountId) -> Result<Vec<SavingsPlan>, StoreError>;

    fn savings_by_type(&self, plan_type: PlanType) -> Result<Vec<SavingsPlan>, StoreError>;

    fn active_savings(&self) -> Result<Vec<SavingsPlan>, StoreError>;

    fn transactions_for_account(
        &self,
        account: AccountId,
    ) -> Result<Vec<TransactionRecord>, StoreError>;

    fn history_for_plan(&self, savings: SavingsId)
        -> Result<Vec<SavingsHistoryRecord>, StoreError>;

    fn next_transaction_id(&self) -> Result<TransactionId, StoreError>;

    fn next_savings_id(&self) -> Result<SavingsId, StoreError>;

    fn next_history_id(&self) -> Result<HistoryId, StoreError>;

    /// Apply a unit of work atomically
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}

/// Transfers, savings lifecycle and read-only savings listings
pub trait BankOperations {
    fn beneficiary_preview(&self, request: &BeneficiaryRequest)
        -> LedgerResult<BeneficiaryPreview>;

    fn transfer(&self, caller: &Caller, request: &TransferRequest)
        -> LedgerResult<TransferReceipt>;

    fn create_flexible(&self, caller: &Caller, request: &SavingsRequest)
        -> LedgerResult<SavingsReceipt>;

    fn create_fixed(&self, caller: &Caller, request: &SavingsRequest)
        -> LedgerResult<SavingsReceipt>;

    fn top_up(&self, caller: &Caller, movement: &SavingsMovement) -> LedgerResult<SavingsReceipt>;

    fn withdraw(&self, caller: &Caller, movement: &SavingsMovement)
        -> LedgerResult<SavingsReceipt>;

    /// Close a flexible plan; `false` when there was nothing to close
    fn close_flexible(&self, caller: &Caller, savings_id: SavingsId) -> LedgerResult<bool>;

    fn list_fixed(&self) -> LedgerResult<Vec<SavingsPlan>>;

    fn list_flexible(&self) -> LedgerResult<Vec<SavingsPlan>>;

    /// One pass of the interest accrual batch
    fn accrue_interest(&self) -> AccrualReport;
}

/// Account-holder operations
pub trait UserOperations {
    /// Credit the caller's account; returns the new balance
    fn deposit(&self, caller: &Caller, request: &DepositRequest) -> LedgerResult<Decimal>;

    fn account_details(&self, account: AccountId) -> LedgerResult<AccountDetails>;

    fn find_by_identifier(&self, identifier: &str) -> LedgerResult<AccountSummary>;

    /// Remove an account; `false` when it did not exist
    fn delete_account(&self, account: AccountId) -> LedgerResult<bool>;
}
