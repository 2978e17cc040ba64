//! Account-related types for the ledger
//!
//! This module defines the Account structure, the bank affiliation tag and
//! the caller identity handed to the ledger by the authentication layer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account identifier
pub type AccountId = u64;

/// Bank affiliation tag
///
/// Compared by exact value: a transfer names the bank it expects the
/// receiver to belong to and the ledger rejects the transfer on mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BankName(String);

impl BankName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BankName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BankName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Customer account state
///
/// Holds identity fields used for lookups (account number and email resolve
/// through the same identifier lookup) and the single mutable balance.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,

    /// Public account number, usable wherever an email is accepted
    pub account_number: String,

    pub email: String,

    pub first_name: String,

    pub last_name: String,

    pub username: String,

    /// Bank the account is held at
    pub bank: BankName,

    /// Spendable balance
    ///
    /// Never negative once an operation completes.
    pub balance: Decimal,
}

impl Account {
    /// Create an account with a zero balance
    pub fn new(
        id: AccountId,
        account_number: impl Into<String>,
        email: impl Into<String>,
        bank: BankName,
    ) -> Self {
        Account {
            id,
            account_number: account_number.into(),
            email: email.into(),
            first_name: String::new(),
            last_name: String::new(),
            username: String::new(),
            bank,
            balance: Decimal::ZERO,
        }
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = balance;
        self
    }

    /// Full name shown to the other party of a transfer
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Whether `identifier` is this account's number or email
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        self.account_number == identifier || self.email == identifier
    }
}

/// Already-authenticated caller
///
/// Resolved by the request layer before any ledger operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub account_id: AccountId,
}

impl Caller {
    pub fn new(account_id: AccountId) -> Self {
        Self { account_id }
    }
}
