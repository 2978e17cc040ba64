//! Savings plan types
//!
//! A savings plan is either FLEXIBLE (no maturity, top-up and withdrawal at
//! will) or FIXED (locked until its maturity date). Every top-up and
//! withdrawal leaves a [`SavingsHistoryRecord`] behind.

use super::account::AccountId;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Savings plan identifier
pub type SavingsId = u64;

/// Savings history identifier
pub type HistoryId = u64;

/// Kind of savings plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlanType {
    Flexible,
    Fixed,
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanType::Flexible => f.write_str("FLEXIBLE"),
            PlanType::Fixed => f.write_str("FIXED"),
        }
    }
}

impl FromStr for PlanType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "flexible" => Ok(PlanType::Flexible),
            "fixed" => Ok(PlanType::Fixed),
            other => Err(format!("Invalid plan type: '{}'", other)),
        }
    }
}

/// Savings plan record
///
/// `amount` is the principal; `interest_earned` only moves through the
/// accrual engine. FIXED plans always carry a maturity date after the start
/// date, FLEXIBLE plans never do.
#[derive(Debug, Clone, PartialEq)]
pub struct SavingsPlan {
    pub id: SavingsId,

    /// Owning account
    pub account: AccountId,

    pub plan_type: PlanType,

    /// Current principal
    pub amount: Decimal,

    /// Annual rate as a fraction (0.07 = 7%)
    pub interest_rate: Decimal,

    pub interest_earned: Decimal,

    pub start_date: NaiveDate,

    pub maturity_date: Option<NaiveDate>,

    pub description: Option<String>,

    /// Cleared when the plan matures
    pub active: bool,
}

impl SavingsPlan {
    /// Principal plus accrued interest, `None` on overflow
    pub fn value(&self) -> Option<Decimal> {
        self.amount.checked_add(self.interest_earned)
    }

    /// Whether the plan has reached its maturity date as of `today`
    ///
    /// Plans without a maturity date never mature.
    pub fn is_matured(&self, today: NaiveDate) -> bool {
        self.maturity_date.is_some_and(|maturity| maturity <= today)
    }
}

/// Movement recorded against a savings plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HistoryEvent {
    /// Funds moved from the account into the plan
    Deposit,

    /// Funds moved from the plan back to the account
    Withdrawal,
}

/// Immutable top-up/withdrawal entry against a savings plan
#[derive(Debug, Clone, PartialEq)]
pub struct SavingsHistoryRecord {
    pub id: HistoryId,

    /// Owning plan
    pub savings: SavingsId,

    pub event: HistoryEvent,

    pub amount: Decimal,

    pub timestamp: NaiveDateTime,
}
