//! Request and result value objects
//!
//! Requests arrive already shape-validated by the request layer; the ledger
//! re-checks business rules only. Results carry what the caller needs to
//! build a response.

use super::account::{AccountId, BankName};
use super::savings::{PlanType, SavingsId};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// Peer-to-peer transfer
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    /// Receiver's account number or email
    pub identifier: String,
    pub amount: Decimal,
    /// Bank the sender believes the receiver belongs to
    pub expected_bank: BankName,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    pub amount: Decimal,
    /// Sender's balance after the debit
    pub sender_balance: Decimal,
    pub receiver_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DepositRequest {
    pub amount: Decimal,
    pub description: Option<String>,
}

/// Savings plan creation
///
/// `amount` is optional because the ledger reports a missing amount as its
/// own failure kind.
#[derive(Debug, Clone, PartialEq)]
pub struct SavingsRequest {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub plan_type: PlanType,
    pub maturity_date: Option<NaiveDate>,
}

impl SavingsRequest {
    pub fn flexible(amount: Decimal) -> Self {
        Self {
            amount: Some(amount),
            description: None,
            plan_type: PlanType::Flexible,
            maturity_date: None,
        }
    }

    pub fn fixed(amount: Decimal, maturity_date: NaiveDate) -> Self {
        Self {
            amount: Some(amount),
            description: None,
            plan_type: PlanType::Fixed,
            maturity_date: Some(maturity_date),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Move funds between an account and one of its plans
///
/// Used for both top-up and withdrawal; `plan_type` is the type the caller
/// believes the plan has.
#[derive(Debug, Clone, PartialEq)]
pub struct SavingsMovement {
    pub savings_id: SavingsId,
    pub amount: Decimal,
    pub description: Option<String>,
    pub plan_type: PlanType,
}

impl SavingsMovement {
    pub fn flexible(savings_id: SavingsId, amount: Decimal) -> Self {
        Self {
            savings_id,
            amount,
            description: None,
            plan_type: PlanType::Flexible,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavingsReceipt {
    pub savings_id: SavingsId,
    pub plan_type: PlanType,
    pub amount: Decimal,
    pub timestamp: NaiveDateTime,
    pub maturity_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub message: &'static str,
}

/// Receiver lookup before a transfer
#[derive(Debug, Clone, PartialEq)]
pub struct BeneficiaryRequest {
    pub identifier: String,
    pub bank: BankName,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BeneficiaryPreview {
    pub id: AccountId,
    pub account_number: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub bank: BankName,
}

/// Public account view, without the balance
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSummary {
    pub id: AccountId,
    pub account_number: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// Owner's account view
#[derive(Debug, Clone, PartialEq)]
pub struct AccountDetails {
    pub id: AccountId,
    pub account_number: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub bank: BankName,
    pub balance: Decimal,
}
