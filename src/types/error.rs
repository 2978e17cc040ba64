//! Error types for the ledger
//!
//! Business-rule failures are reported to the immediate caller as typed
//! variants of [`LedgerError`]. Store faults are not business rules; they are
//! wrapped in [`LedgerError::Store`] and passed through unchanged.

use super::account::AccountId;
use super::savings::{PlanType, SavingsId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Failure of the durable store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store rejected or could not apply a write batch
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A staged update targets a record that no longer exists
    #[error("Stale write: {entity} {id} no longer exists")]
    Missing { entity: &'static str, id: u64 },
}

/// Main error type for ledger operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// No account for the given id or identifier
    #[error("Account {account} not found")]
    AccountNotFound { account: String },

    /// Transfer receiver could not be resolved
    #[error("Receiver not found: {identifier}")]
    ReceiverNotFound { identifier: String },

    /// Transfer sender could not be resolved
    #[error("Sender not found: account {account}")]
    SenderNotFound { account: AccountId },

    /// No plan with this id belongs to the account
    #[error("Savings {savings} does not exist for account {account}")]
    SavingsNotFound {
        savings: SavingsId,
        account: AccountId,
    },

    /// Receiver is not a customer of the bank named in the request
    #[error("{identifier} is not a customer at {expected}")]
    BankMismatch {
        identifier: String,
        expected: String,
    },

    #[error("You cannot transfer into your own account")]
    SelfTransfer,

    /// Balance (account or plan) does not cover the requested amount
    #[error("Insufficient funds in {source_name}: available {available}, requested {requested}")]
    InsufficientFunds {
        source_name: String,
        available: Decimal,
        requested: Decimal,
    },

    /// Operation is not allowed for this plan type
    #[error("Incorrect saving type for {operation}: expected {expected}, got {actual}")]
    WrongSavingsType {
        operation: &'static str,
        expected: PlanType,
        actual: PlanType,
    },

    /// A required numeric field is absent
    #[error("Invalid input: {field} is required")]
    InvalidInput { field: &'static str },

    /// Amount is zero or negative
    #[error("Invalid amount {amount}: must be positive")]
    InvalidAmount { amount: Decimal },

    /// Crediting would overflow the balance representation
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        operation: &'static str,
        account: AccountId,
    },

    #[error("Maturity date is required for fixed savings")]
    MissingMaturityDate,

    #[error("Maturity date {maturity} must be after {today}")]
    InvalidMaturityDate { maturity: NaiveDate, today: NaiveDate },

    /// Infrastructure fault, outside the business taxonomy
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

// Helper functions for creating common errors

impl LedgerError {
    pub fn account_not_found(account: impl ToString) -> Self {
        LedgerError::AccountNotFound {
            account: account.to_string(),
        }
    }

    pub fn savings_not_found(savings: SavingsId, account: AccountId) -> Self {
        LedgerError::SavingsNotFound { savings, account }
    }

    pub fn bank_mismatch(identifier: &str, expected: &str) -> Self {
        LedgerError::BankMismatch {
            identifier: identifier.to_string(),
            expected: expected.to_string(),
        }
    }

    pub fn insufficient_funds(source_name: &str, available: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            source_name: source_name.to_string(),
            available,
            requested,
        }
    }

    pub fn wrong_savings_type(operation: &'static str, expected: PlanType, actual: PlanType) -> Self {
        LedgerError::WrongSavingsType {
            operation,
            expected,
            actual,
        }
    }

    pub fn arithmetic_overflow(operation: &'static str, account: AccountId) -> Self {
        LedgerError::ArithmeticOverflow { operation, account }
    }

    /// Whether this is a business-rule rejection rather than a store fault
    pub fn is_business_rule(&self) -> bool {
        !matches!(self, LedgerError::Store(_))
    }
}
