//! Transaction log types
//!
//! Transaction records are the append-only history of credits and debits
//! against an account. They are written by transfers and deposits and are
//! never mutated afterwards.

use super::account::{AccountId, BankName};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Transaction identifier
pub type TransactionId = u64;

/// Direction of a balance movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionDirection {
    /// Funds added to the account
    Credit,

    /// Funds taken from the account
    Debit,
}

/// Immutable credit/debit entry against an account
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub id: TransactionId,

    pub direction: TransactionDirection,

    /// Bank of the account this record belongs to
    pub bank: BankName,

    pub amount: Decimal,

    pub timestamp: NaiveDateTime,

    pub description: Option<String>,

    /// Owning account
    pub account: AccountId,
}

impl TransactionRecord {
    pub fn credit(
        id: TransactionId,
        account: AccountId,
        bank: BankName,
        amount: Decimal,
        timestamp: NaiveDateTime,
        description: Option<String>,
    ) -> Self {
        Self {
            id,
            direction: TransactionDirection::Credit,
            bank,
            amount,
            timestamp,
            description,
            account,
        }
    }

    pub fn debit(
        id: TransactionId,
        account: AccountId,
        bank: BankName,
        amount: Decimal,
        timestamp: NaiveDateTime,
        description: Option<String>,
    ) -> Self {
        Self {
            direction: TransactionDirection::Debit,
            ..Self::credit(id, account, bank, amount, timestamp, description)
        }
    }
}
