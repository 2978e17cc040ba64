//! RowBank ledger CLI
//!
//! Replays an operation script against seeded accounts and prints the final
//! account statements.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --accounts accounts.csv operations.csv > statements.csv
//! cargo run -- --accounts accounts.csv --as-of 2024-01-15 --accrual-runs 30 operations.csv
//! RUST_LOG=debug cargo run -- --accounts accounts.csv operations.csv
//! ```
//!
//! Statements go to stdout as CSV; logs go to stderr.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, unreadable header, etc.)

use rowbank_ledger::cli;
use rowbank_ledger::pipeline::run_pipeline;
use std::process;
use tracing::error;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();

    let args = cli::parse_args();
    let options = args.to_pipeline_options();

    let mut output = std::io::stdout();
    if let Err(e) = run_pipeline(&options, &mut output) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
