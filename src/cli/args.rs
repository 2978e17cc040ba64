use crate::config::{LedgerConfig, DEFAULT_ACCRUAL_INTERVAL};
use crate::pipeline::PipelineOptions;
use chrono::{Local, NaiveDate};
use clap::Parser;
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Replay account operations against a ledger and report final balances
#[derive(Parser, Debug)]
#[command(name = "rowbank-ledger")]
#[command(about = "Replay transfers and savings operations against seeded accounts", long_about = None)]
pub struct CliArgs {
    /// Operation script CSV
    #[arg(value_name = "OPERATIONS", help = "Path to the operations CSV file")]
    pub operations_file: PathBuf,

    /// Seed accounts CSV
    #[arg(
        long = "accounts",
        value_name = "FILE",
        help = "Path to the CSV file with the accounts to seed"
    )]
    pub accounts_file: PathBuf,

    /// Interest accrual passes to run after the script
    #[arg(
        long = "accrual-runs",
        value_name = "COUNT",
        default_value_t = 0,
        help = "Number of daily interest accrual passes to run after the operations"
    )]
    pub accrual_runs: u32,

    /// Date the script is replayed on
    #[arg(
        long = "as-of",
        value_name = "YYYY-MM-DD",
        help = "Date to replay the operations on (default: today)"
    )]
    pub as_of: Option<NaiveDate>,

    #[arg(
        long = "flexible-rate",
        value_name = "RATE",
        help = "Annual interest rate for flexible plans, as a fraction (default: 0.07)"
    )]
    pub flexible_rate: Option<Decimal>,

    #[arg(
        long = "fixed-rate",
        value_name = "RATE",
        help = "Annual interest rate for fixed plans, as a fraction (default: 0.12)"
    )]
    pub fixed_rate: Option<Decimal>,
}

impl CliArgs {
    /// Create a LedgerConfig from CLI arguments
    ///
    /// Missing values use the defaults; invalid ones fall back to the default
    /// with a warning.
    pub fn to_ledger_config(&self) -> LedgerConfig {
        if self.flexible_rate.is_none() && self.fixed_rate.is_none() {
            return LedgerConfig::default();
        }

        let default = LedgerConfig::default();
        LedgerConfig::new(
            self.flexible_rate.unwrap_or(default.flexible_rate),
            self.fixed_rate.unwrap_or(default.fixed_rate),
            DEFAULT_ACCRUAL_INTERVAL,
        )
    }

    /// Pipeline inputs, with `as_of` defaulting to the local date
    pub fn to_pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            accounts: self.accounts_file.clone(),
            operations: self.operations_file.clone(),
            accrual_runs: self.accrual_runs,
            as_of: self.as_of.unwrap_or_else(|| Local::now().date_naive()),
            config: self.to_ledger_config(),
        }
    }
}
