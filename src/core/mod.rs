//! Core business logic module
//!
//! This module contains the ledger and its building blocks:
//! - `traits` - Store seam and the bank/user capability traits
//! - `batch` - Staged writes committed as one unit of work
//! - `memory_store` - DashMap-backed store
//! - `locks` - Per-account and per-plan mutual exclusion
//! - `clock` - Injectable time source
//! - `ledger` - Unit-of-work orchestration
//! - `transfer` - Transfers and deposits
//! - `savings` - Savings plan lifecycle
//! - `accounts` - Lookups, account removal and listings
//! - `interest` - Periodic interest accrual

pub mod accounts;
pub mod batch;
pub mod clock;
pub mod interest;
pub mod ledger;
pub mod locks;
pub mod memory_store;
pub mod savings;
pub mod traits;
pub mod transfer;

#[cfg(test)]
pub(crate) mod test_support;

pub use batch::WriteBatch;
pub use clock::{Clock, FixedClock, SystemClock};
pub use interest::{daily_interest, spawn_accrual_scheduler, AccrualReport};
pub use ledger::Ledger;
pub use locks::{EntityLocks, LockSet};
pub use memory_store::MemoryStore;
pub use traits::{BankOperations, Store, UserOperations};
