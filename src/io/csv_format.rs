//! CSV format handling for seed accounts, operation scripts and account output
//!
//! This module centralizes all CSV format concerns, providing:
//! - Row structures for deserialization (`AccountRow`, `OperationRow`)
//! - Conversion from rows to domain types
//! - Account statement serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::types::{
    Account, AccountId, BankName, Caller, DepositRequest, PlanType, SavingsId, SavingsMovement,
    SavingsRequest, TransferRequest,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// Seed account row
///
/// Columns: id, account_number, email, first_name, last_name, bank, balance
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AccountRow {
    pub id: AccountId,
    pub account_number: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bank: String,
    pub balance: Option<String>,
}

/// Scripted operation row
///
/// Columns: op, account, target, bank, amount, savings, plan_type, maturity,
/// description. Only `op` and `account` are always required; which of the
/// rest are needed depends on the operation.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OperationRow {
    pub op: String,
    pub account: AccountId,
    pub target: Option<String>,
    pub bank: Option<String>,
    pub amount: Option<String>,
    pub savings: Option<SavingsId>,
    pub plan_type: Option<String>,
    pub maturity: Option<String>,
    pub description: Option<String>,
}

/// Ledger operation decoded from an [`OperationRow`]
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Deposit(Caller, DepositRequest),
    Transfer(Caller, TransferRequest),
    CreateFlexible(Caller, SavingsRequest),
    CreateFixed(Caller, SavingsRequest),
    TopUp(Caller, SavingsMovement),
    Withdraw(Caller, SavingsMovement),
    Close(Caller, SavingsId),
}

impl Operation {
    pub fn caller(&self) -> Caller {
        match self {
            Operation::Deposit(caller, _)
            | Operation::Transfer(caller, _)
            | Operation::CreateFlexible(caller, _)
            | Operation::CreateFixed(caller, _)
            | Operation::TopUp(caller, _)
            | Operation::Withdraw(caller, _)
            | Operation::Close(caller, _) => *caller,
        }
    }

    /// Short name used in log lines
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Deposit(..) => "deposit",
            Operation::Transfer(..) => "transfer",
            Operation::CreateFlexible(..) => "create_flexible",
            Operation::CreateFixed(..) => "create_fixed",
            Operation::TopUp(..) => "top_up",
            Operation::Withdraw(..) => "withdraw",
            Operation::Close(..) => "close",
        }
    }
}

/// Final state of one account, as written to the output CSV
#[derive(Debug, Clone, PartialEq)]
pub struct AccountStatement {
    pub id: AccountId,
    pub account_number: String,
    pub bank: BankName,
    pub balance: Decimal,
    /// Principal plus interest across the account's active plans
    pub savings: Decimal,
}

fn parse_amount(raw: Option<&str>, context: &str) -> Result<Option<Decimal>, String> {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => Decimal::from_str(value)
            .map(Some)
            .map_err(|_| format!("Invalid amount '{}' for {}", value, context)),
        _ => Ok(None),
    }
}

fn require<T>(value: Option<T>, field: &str, op: &str) -> Result<T, String> {
    value.ok_or_else(|| format!("{} operation requires {}", op, field))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Convert a seed row into an [`Account`]
///
/// A missing balance seeds the account empty.
pub fn convert_account_row(row: AccountRow) -> Result<Account, String> {
    let context = format!("account {}", row.id);
    let balance = parse_amount(row.balance.as_deref(), &context)?.unwrap_or(Decimal::ZERO);
    if balance.is_sign_negative() {
        return Err(format!("Negative opening balance for {}", context));
    }
    if row.bank.trim().is_empty() {
        return Err(format!("Missing bank for {}", context));
    }

    Ok(
        Account::new(row.id, row.account_number, row.email, BankName::new(row.bank))
            .with_name(
                row.first_name.unwrap_or_default(),
                row.last_name.unwrap_or_default(),
            )
            .with_balance(balance),
    )
}

/// Convert an operation row into an [`Operation`]
///
/// Shape errors (unknown op, unparsable values, missing required columns) are
/// reported here. Business rules such as a missing savings amount are left to
/// the ledger.
pub fn convert_operation_row(row: OperationRow) -> Result<Operation, String> {
    let op = row.op.trim().to_lowercase();
    let caller = Caller::new(row.account);
    let context = format!("{} by account {}", op, row.account);
    let amount = parse_amount(row.amount.as_deref(), &context)?;
    let description = non_empty(row.description);

    let plan_type = match non_empty(row.plan_type) {
        Some(raw) => Some(PlanType::from_str(&raw)?),
        None => None,
    };

    let maturity_date = match non_empty(row.maturity) {
        Some(raw) => Some(
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|_| format!("Invalid maturity date '{}' for {}", raw, context))?,
        ),
        None => None,
    };

    let operation = match op.as_str() {
        "deposit" => Operation::Deposit(
            caller,
            DepositRequest {
                amount: require(amount, "amount", &op)?,
                description,
            },
        ),
        "transfer" => Operation::Transfer(
            caller,
            TransferRequest {
                identifier: require(non_empty(row.target), "target", &op)?,
                amount: require(amount, "amount", &op)?,
                expected_bank: BankName::new(require(non_empty(row.bank), "bank", &op)?),
                description,
            },
        ),
        "create_flexible" => Operation::CreateFlexible(
            caller,
            SavingsRequest {
                amount,
                description,
                plan_type: plan_type.unwrap_or(PlanType::Flexible),
                maturity_date,
            },
        ),
        "create_fixed" => Operation::CreateFixed(
            caller,
            SavingsRequest {
                amount,
                description,
                plan_type: plan_type.unwrap_or(PlanType::Fixed),
                maturity_date,
            },
        ),
        "top_up" | "withdraw" => {
            let movement = SavingsMovement {
                savings_id: require(row.savings, "savings", &op)?,
                amount: require(amount, "amount", &op)?,
                description,
                plan_type: plan_type.unwrap_or(PlanType::Flexible),
            };
            if op == "top_up" {
                Operation::TopUp(caller, movement)
            } else {
                Operation::Withdraw(caller, movement)
            }
        }
        "close" => Operation::Close(caller, require(row.savings, "savings", &op)?),
        _ => return Err(format!("Invalid operation '{}'", row.op)),
    };

    Ok(operation)
}

/// Write account statements to CSV format
///
/// Columns: id, account_number, bank, balance, savings. Statements are sorted
/// by account id and amounts rendered with four decimal places.
pub fn write_accounts_csv(
    statements: &[AccountStatement],
    output: &mut dyn Write,
) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["id", "account_number", "bank", "balance", "savings"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted = statements.to_vec();
    sorted.sort_by_key(|statement| statement.id);

    for statement in sorted {
        writer
            .write_record(&[
                statement.id.to_string(),
                statement.account_number,
                statement.bank.to_string(),
                format!("{:.4}", statement.balance),
                format!("{:.4}", statement.savings),
            ])
            .map_err(|e| format!("Failed to write account record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn op_row(op: &str) -> OperationRow {
        OperationRow {
            op: op.to_string(),
            account: 1,
            target: None,
            bank: None,
            amount: None,
            savings: None,
            plan_type: None,
            maturity: None,
            description: None,
        }
    }

    fn some(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    #[test]
    fn test_convert_account_row() {
        let row = AccountRow {
            id: 4,
            account_number: "0000000004".to_string(),
            email: "ada@example.com".to_string(),
            first_name: some("Ada"),
            last_name: some("Lovelace"),
            bank: "RowBank".to_string(),
            balance: some(" 120.50 "),
        };

        let account = convert_account_row(row).unwrap();

        assert_eq!(account.id, 4);
        assert_eq!(account.display_name(), "Ada Lovelace");
        assert_eq!(account.bank, BankName::new("RowBank"));
        assert_eq!(account.balance, Decimal::new(12050, 2));
    }

    #[rstest]
    #[case::negative_balance(some("-1"), "RowBank", "Negative opening balance")]
    #[case::bad_balance(some("lots"), "RowBank", "Invalid amount")]
    #[case::no_bank(some("1"), " ", "Missing bank")]
    fn test_convert_account_row_errors(
        #[case] balance: Option<String>,
        #[case] bank: &str,
        #[case] expected: &str,
    ) {
        let row = AccountRow {
            id: 1,
            account_number: "1".to_string(),
            email: "a@example.com".to_string(),
            first_name: None,
            last_name: None,
            bank: bank.to_string(),
            balance,
        };

        let error = convert_account_row(row).unwrap_err();
        assert!(error.contains(expected), "{error}");
    }

    #[test]
    fn test_convert_transfer() {
        let row = OperationRow {
            target: some("user2@example.com"),
            bank: some("OtherBank"),
            amount: some("100"),
            description: some("rent"),
            ..op_row("Transfer")
        };

        let operation = convert_operation_row(row).unwrap();

        assert_eq!(
            operation,
            Operation::Transfer(
                Caller::new(1),
                TransferRequest {
                    identifier: "user2@example.com".to_string(),
                    amount: Decimal::new(100, 0),
                    expected_bank: BankName::new("OtherBank"),
                    description: some("rent"),
                }
            )
        );
        assert_eq!(operation.name(), "transfer");
    }

    #[test]
    fn test_convert_create_fixed_with_maturity() {
        let row = OperationRow {
            amount: some("500"),
            maturity: some("2024-06-30"),
            ..op_row("create_fixed")
        };

        let Operation::CreateFixed(_, request) = convert_operation_row(row).unwrap() else {
            panic!("expected create_fixed");
        };

        assert_eq!(request.plan_type, PlanType::Fixed);
        assert_eq!(request.amount, Some(Decimal::new(500, 0)));
        assert_eq!(
            request.maturity_date,
            NaiveDate::from_ymd_opt(2024, 6, 30)
        );
    }

    #[test]
    fn test_create_without_amount_is_left_to_the_ledger() {
        let Operation::CreateFlexible(_, request) =
            convert_operation_row(op_row("create_flexible")).unwrap()
        else {
            panic!("expected create_flexible");
        };

        assert_eq!(request.amount, None);
        assert_eq!(request.plan_type, PlanType::Flexible);
    }

    #[test]
    fn test_explicit_plan_type_is_kept() {
        let row = OperationRow {
            savings: Some(3),
            amount: some("5"),
            plan_type: some("fixed"),
            ..op_row("withdraw")
        };

        let Operation::Withdraw(_, movement) = convert_operation_row(row).unwrap() else {
            panic!("expected withdraw");
        };

        assert_eq!(movement.plan_type, PlanType::Fixed);
        assert_eq!(movement.savings_id, 3);
    }

    #[rstest]
    #[case::unknown_op(op_row("refund"), "Invalid operation")]
    #[case::deposit_without_amount(op_row("deposit"), "requires amount")]
    #[case::transfer_without_target(
        OperationRow { amount: some("1"), bank: some("RowBank"), ..op_row("transfer") },
        "requires target"
    )]
    #[case::top_up_without_savings(
        OperationRow { amount: some("1"), ..op_row("top_up") },
        "requires savings"
    )]
    #[case::close_without_savings(op_row("close"), "requires savings")]
    #[case::bad_amount(OperationRow { amount: some("ten"), ..op_row("deposit") }, "Invalid amount")]
    #[case::bad_plan_type(OperationRow { plan_type: some("weekly"), ..op_row("create_fixed") }, "Invalid plan type")]
    #[case::bad_maturity(OperationRow { maturity: some("30/06/2024"), ..op_row("create_fixed") }, "Invalid maturity date")]
    fn test_convert_operation_row_errors(#[case] row: OperationRow, #[case] expected: &str) {
        let error = convert_operation_row(row).unwrap_err();
        assert!(error.contains(expected), "{error}");
    }

    #[rstest]
    #[case::empty(vec![], "id,account_number,bank,balance,savings\n")]
    #[case::sorted_by_id(
        vec![
            AccountStatement {
                id: 2,
                account_number: "0000000002".to_string(),
                bank: BankName::new("OtherBank"),
                balance: Decimal::new(8000, 0),
                savings: Decimal::ZERO,
            },
            AccountStatement {
                id: 1,
                account_number: "0000000001".to_string(),
                bank: BankName::new("RowBank"),
                balance: Decimal::new(29001234, 4),
                savings: Decimal::new(5001918, 4),
            },
        ],
        "id,account_number,bank,balance,savings\n\
         1,0000000001,RowBank,2900.1234,500.1918\n\
         2,0000000002,OtherBank,8000.0000,0.0000\n"
    )]
    fn test_write_accounts_csv(
        #[case] statements: Vec<AccountStatement>,
        #[case] expected_output: &str,
    ) {
        let mut output = Vec::new();
        write_accounts_csv(&statements, &mut output).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), expected_output);
    }
}
