//! I/O module
//!
//! Handles CSV parsing and output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (row conversion, output serialization)
//! - `reader` - Synchronous CSV reader with iterator interface

pub mod csv_format;
pub mod reader;

pub use csv_format::{
    convert_account_row, convert_operation_row, write_accounts_csv, AccountRow,
    AccountStatement, Operation, OperationRow,
};
pub use reader::RecordReader;
