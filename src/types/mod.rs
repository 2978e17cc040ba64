//! Types module
//!
//! Contains core data structures used throughout the ledger:
//! - `account`: Account, bank tag and caller identity
//! - `transaction`: Transaction log records
//! - `savings`: Savings plans and their history records
//! - `request`: Request and result value objects
//! - `error`: Error types

pub mod account;
pub mod error;
pub mod request;
pub mod savings;
pub mod transaction;

pub use account::{Account, AccountId, BankName, Caller};
pub use error::{LedgerError, LedgerResult, StoreError};
pub use request::{
    AccountDetails, AccountSummary, BeneficiaryPreview, BeneficiaryRequest, DepositRequest,
    SavingsMovement, SavingsReceipt, SavingsRequest, TransferReceipt, TransferRequest,
};
pub use savings::{
    HistoryEvent, HistoryId, PlanType, SavingsHistoryRecord, SavingsId, SavingsPlan,
};
pub use transaction::{TransactionDirection, TransactionId, TransactionRecord};
