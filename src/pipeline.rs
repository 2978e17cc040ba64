//! CSV batch pipeline
//!
//! Seeds a ledger from an accounts file, replays an operation script against
//! it, runs the interest accrual pass a number of times and writes the final
//! account statements as CSV.
//!
//! # Design
//!
//! The pipeline only orchestrates, delegating:
//! - CSV parsing to [`RecordReader`] (iterator interface)
//! - Business rules to [`Ledger`] through [`BankOperations`] and [`UserOperations`]
//! - CSV output to [`write_accounts_csv`]
//!
//! The ledger runs on a [`FixedClock`] pinned to the `as_of` date. Each
//! accrual run happens on the current day and then moves the clock forward
//! by one day, so `N` runs cover `as_of .. as_of + N - 1`.
//!
//! # Error Handling
//!
//! Fatal errors (file not found, unreadable header, output failure) are
//! returned. Malformed rows and rejected operations are logged and skipped.

use crate::config::LedgerConfig;
use crate::core::{BankOperations, FixedClock, Ledger, MemoryStore, Store, UserOperations};
use crate::io::{write_accounts_csv, AccountStatement, Operation, RecordReader};
use crate::types::{LedgerError, LedgerResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Inputs of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub accounts: PathBuf,
    pub operations: PathBuf,
    /// Number of accrual passes after the script
    pub accrual_runs: u32,
    /// Date the script is replayed on
    pub as_of: NaiveDate,
    pub config: LedgerConfig,
}

/// Counts of what happened to each scripted row
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PipelineReport {
    pub applied: usize,
    pub rejected: usize,
    pub malformed: usize,
}

/// Run the whole pipeline, writing account statements to `output`
pub fn run_pipeline(
    options: &PipelineOptions,
    output: &mut dyn Write,
) -> Result<PipelineReport, String> {
    let store = seed_store(&options.accounts)?;
    let clock = Arc::new(FixedClock::at_date(options.as_of));
    let ledger = Ledger::new(Arc::new(store), options.config.clone()).with_clock(clock.clone());

    let mut report = PipelineReport::default();
    for result in RecordReader::operations(&options.operations)? {
        match result {
            Ok(operation) => {
                let name = operation.name();
                let account = operation.caller().account_id;
                match apply(&ledger, operation) {
                    Ok(()) => report.applied += 1,
                    Err(e) if e.is_business_rule() => {
                        report.rejected += 1;
                        warn!(operation = name, account, "Operation rejected: {}", e);
                    }
                    Err(e) => {
                        report.rejected += 1;
                        error!(operation = name, account, "Operation failed: {}", e);
                    }
                }
            }
            Err(e) => {
                report.malformed += 1;
                warn!("CSV parsing error: {}", e);
            }
        }
    }

    for _ in 0..options.accrual_runs {
        ledger.accrue_interest();
        clock.advance_days(1);
    }

    let statements = statements(&ledger).map_err(|e| format!("Failed to read accounts: {}", e))?;
    write_accounts_csv(&statements, output)?;

    info!(
        applied = report.applied,
        rejected = report.rejected,
        malformed = report.malformed,
        accounts = statements.len(),
        "Pipeline finished"
    );
    Ok(report)
}

fn seed_store(path: &Path) -> Result<MemoryStore, String> {
    let store = MemoryStore::new();

    for result in RecordReader::accounts(path)? {
        match result {
            Ok(account) => {
                let taken = store
                    .account(account.id)
                    .map_err(|e| e.to_string())?
                    .is_some()
                    || store
                        .account_by_identifier(&account.account_number)
                        .map_err(|e| e.to_string())?
                        .is_some()
                    || store
                        .account_by_identifier(&account.email)
                        .map_err(|e| e.to_string())?
                        .is_some();
                if taken {
                    warn!(account = account.id, "Duplicate seed account skipped");
                    continue;
                }
                store.insert_account(account);
            }
            Err(e) => warn!("Seed account skipped: {}", e),
        }
    }

    Ok(store)
}

/// Apply one scripted operation through the ledger capability traits
fn apply<L>(ledger: &L, operation: Operation) -> LedgerResult<()>
where
    L: BankOperations + UserOperations,
{
    match operation {
        Operation::Deposit(caller, request) => {
            let balance = ledger.deposit(&caller, &request)?;
            debug!(account = caller.account_id, %balance, "Deposit applied");
        }
        Operation::Transfer(caller, request) => {
            let receipt = ledger.transfer(&caller, &request)?;
            debug!(
                account = caller.account_id,
                receiver = %receipt.receiver_name,
                balance = %receipt.sender_balance,
                "Transfer applied"
            );
        }
        Operation::CreateFlexible(caller, request) => {
            let receipt = ledger.create_flexible(&caller, &request)?;
            debug!(savings = receipt.savings_id, "{}", receipt.message);
        }
        Operation::CreateFixed(caller, request) => {
            let receipt = ledger.create_fixed(&caller, &request)?;
            debug!(savings = receipt.savings_id, "{}", receipt.message);
        }
        Operation::TopUp(caller, movement) => {
            let receipt = ledger.top_up(&caller, &movement)?;
            debug!(savings = receipt.savings_id, "{}", receipt.message);
        }
        Operation::Withdraw(caller, movement) => {
            let receipt = ledger.withdraw(&caller, &movement)?;
            debug!(savings = receipt.savings_id, "{}", receipt.message);
        }
        Operation::Close(caller, savings) => {
            if !ledger.close_flexible(&caller, savings)? {
                return Err(LedgerError::savings_not_found(savings, caller.account_id));
            }
        }
    }
    Ok(())
}

fn statements<S: Store>(ledger: &Ledger<S>) -> LedgerResult<Vec<AccountStatement>> {
    ledger
        .accounts()?
        .into_iter()
        .map(|account| -> LedgerResult<AccountStatement> {
            let savings = ledger
                .savings_for(account.id)?
                .iter()
                .filter(|plan| plan.active)
                .try_fold(Decimal::ZERO, |total, plan| {
                    plan.value().and_then(|value| total.checked_add(value))
                })
                .ok_or_else(|| LedgerError::arithmetic_overflow("statement", account.id))?;
            Ok(AccountStatement {
                id: account.id,
                account_number: account.account_number,
                bank: account.bank,
                balance: account.balance,
                savings,
            })
        })
        .collect()
}
