//! RowBank Ledger Library
//! # Overview
//!
//! Account ledger and savings engine: peer-to-peer transfers, deposits, the
//! flexible/fixed savings plan lifecycle and a periodic interest accrual job,
//! each mutation running as one atomic unit of work under per-entity locks.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Domain data types (Account, SavingsPlan, records, requests, errors)
//! - [`config`] - Interest rates and accrual schedule
//! - [`core`] - Business logic components:
//!   - [`core::ledger`] - Unit-of-work orchestration
//!   - [`core::transfer`] - Transfers and deposits
//!   - [`core::savings`] - Savings plan lifecycle
//!   - [`core::interest`] - Interest accrual pass and scheduler
//!   - [`core::memory_store`] - DashMap-backed store
//! - [`io`] - CSV loading and output
//! - [`pipeline`] - CSV batch replay used by the binary
//! - [`cli`] - CLI arguments parsing
//!
//! # Savings Plans
//!
//! - **Flexible**: no maturity; top-up, withdrawal and closure at any time
//! - **Fixed**: locked until the maturity date, then paid out by the accrual job
//!
//! # Invariants
//!
//! - Account balances and plan principals never go negative
//! - A transfer debits and credits in the same commit, with one DEBIT and one
//!   CREDIT record
//! - Operations touching the same account or plan are serialized; unrelated
//!   ones run in parallel

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod pipeline;
pub mod types;

pub use config::LedgerConfig;
pub use core::{BankOperations, Ledger, MemoryStore, Store, UserOperations};
pub use io::write_accounts_csv;
pub use types::{
    Account, AccountId, BankName, Caller, LedgerError, LedgerResult, PlanType, SavingsPlan,
    StoreError, TransactionRecord,
};
