//! Synchronous CSV reader with iterator interface
//!
//! Streams rows from a CSV file, deserializes each into a row type and hands
//! it to a conversion function from the `csv_format` module.
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, unreadable header) are returned from `open()`
//! - Individual row errors are yielded as `Err` items and iteration continues
//! - Line numbers are included in error messages for debugging
//!
//! ```no_run
//! use rowbank_ledger::io::reader::RecordReader;
//! use std::path::Path;
//!
//! let reader = RecordReader::operations(Path::new("operations.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(operation) => println!("Applying {}", operation.name()),
//!         Err(e) => eprintln!("Skipping: {}", e),
//!     }
//! }
//! ```

use crate::io::csv_format::{
    convert_account_row, convert_operation_row, AccountRow, Operation, OperationRow,
};
use crate::types::Account;
use csv::{ReaderBuilder, Trim};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::marker::PhantomData;
use std::path::Path;

/// Streaming CSV reader yielding converted records
///
/// `R` is the raw row type, `T` the domain value produced by `convert`.
#[derive(Debug)]
pub struct RecordReader<R, T> {
    reader: csv::Reader<File>,
    line_num: usize,
    convert: fn(R) -> Result<T, String>,
    _row: PhantomData<R>,
}

impl RecordReader<OperationRow, Operation> {
    /// Reader over an operation script
    pub fn operations(path: &Path) -> Result<Self, String> {
        Self::open(path, convert_operation_row)
    }
}

impl RecordReader<AccountRow, Account> {
    /// Reader over a seed account file
    pub fn accounts(path: &Path) -> Result<Self, String> {
        Self::open(path, convert_account_row)
    }
}

impl<R: DeserializeOwned, T> RecordReader<R, T> {
    /// Open `path` and read its header row
    ///
    /// The CSV reader trims whitespace from all fields and accepts rows with
    /// trailing columns left off.
    pub fn open(path: &Path, convert: fn(R) -> Result<T, String>) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        reader
            .headers()
            .map_err(|e| format!("Failed to read header of '{}': {}", path.display(), e))?;

        Ok(Self {
            reader,
            line_num: 1,
            convert,
            _row: PhantomData,
        })
    }
}

impl<R: DeserializeOwned, T> Iterator for RecordReader<R, T> {
    type Item = Result<T, String>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.reader.deserialize::<R>().next()?;
        self.line_num += 1;

        Some(match row {
            Ok(row) => (self.convert)(row).map_err(|e| format!("Line {}: {}", self.line_num, e)),
            Err(e) => Err(format!("Line {}: CSV parse error: {}", self.line_num, e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BankName, PlanType};
    use rust_decimal::Decimal;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const OPS_HEADER: &str = "op,account,target,bank,amount,savings,plan_type,maturity,description\n";

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_open_fails_on_missing_file() {
        let result = RecordReader::operations(Path::new("nonexistent.csv"));
        assert!(matches!(result, Err(e) if e.contains("Failed to open file")));
    }

    #[test]
    fn test_reader_debug_names_position() {
        let file = create_temp_csv("op,account,target,bank,amount\ndeposit,1,,,10\n");
        let reader = RecordReader::operations(file.path()).unwrap();
        assert!(format!("{:?}", reader).contains("line_num"));
    }

    #[test]
    fn test_reads_seed_accounts() {
        let file = create_temp_csv(
            "id,account_number,email,first_name,last_name,bank,balance\n\
             1,0000000001,ada@example.com,Ada,Lovelace,RowBank,3000\n\
             2,0000000002,alan@example.com,Alan,Turing,OtherBank,7900.50\n",
        );

        let accounts: Vec<_> = RecordReader::accounts(file.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[1].bank, BankName::new("OtherBank"));
        assert_eq!(accounts[1].balance, Decimal::new(790050, 2));
    }

    #[test]
    fn test_short_rows_leave_trailing_columns_empty() {
        let file = create_temp_csv(&format!("{OPS_HEADER}deposit,1,,,100\nclose,1,,,,4\n"));

        let records: Vec<_> = RecordReader::operations(file.path()).unwrap().collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].as_ref().unwrap().name(), "deposit");
        assert_eq!(
            records[1].as_ref().unwrap(),
            &Operation::Close(crate::types::Caller::new(1), 4)
        );
    }

    #[test]
    fn test_handles_whitespace() {
        let file = create_temp_csv(&format!(
            "{OPS_HEADER}  create_fixed , 1 ,,, 250 ,, fixed , 2025-01-01 , holiday \n"
        ));

        let records: Vec<_> = RecordReader::operations(file.path()).unwrap().collect();

        let Ok(Operation::CreateFixed(_, request)) = &records[0] else {
            panic!("expected create_fixed, got {:?}", records[0]);
        };
        assert_eq!(request.amount, Some(Decimal::new(250, 0)));
        assert_eq!(request.plan_type, PlanType::Fixed);
        assert_eq!(request.description.as_deref(), Some("holiday"));
    }

    #[test]
    fn test_includes_line_numbers_and_continues_after_error() {
        let file = create_temp_csv(&format!(
            "{OPS_HEADER}deposit,1,,,100\ndeposit,x,,,5\nrefund,1,,,5\ndeposit,2,,,50\n"
        ));

        let records: Vec<_> = RecordReader::operations(file.path()).unwrap().collect();

        assert_eq!(records.len(), 4);
        assert!(records[0].is_ok());
        let parse_error = records[1].as_ref().unwrap_err();
        assert!(parse_error.contains("Line 3"), "{parse_error}");
        assert!(parse_error.contains("CSV parse error"));
        let convert_error = records[2].as_ref().unwrap_err();
        assert!(convert_error.contains("Line 4"), "{convert_error}");
        assert!(records[3].is_ok());
    }

    #[test]
    fn test_empty_file_after_header() {
        let file = create_temp_csv(OPS_HEADER);

        assert_eq!(RecordReader::operations(file.path()).unwrap().count(), 0);
    }
}
