//! Transfer protocol and deposits
//!
//! A transfer moves funds from the caller's account to an account resolved by
//! account number or email. Preconditions are checked in a fixed order so the
//! reported failure is deterministic:
//!
//! 1. receiver exists
//! 2. sender exists
//! 3. receiver's bank matches the bank named in the request
//! 4. sender and receiver differ
//! 5. amount is positive and covered by the sender's balance
//!
//! On success one DEBIT record (sender) and one CREDIT record (receiver) are
//! appended and both balances are saved in a single unit of work.

use super::batch::WriteBatch;
use super::ledger::Ledger;
use super::traits::Store;
use crate::types::{
    Caller, DepositRequest, LedgerError, LedgerResult, TransactionRecord, TransferReceipt,
    TransferRequest,
};
use rust_decimal::Decimal;
use tracing::{debug, info};

impl<S: Store> Ledger<S> {
    /// Move `request.amount` from the caller to the receiver
    ///
    /// # Returns
    ///
    /// * `Ok(TransferReceipt)` - amount moved, sender's new balance, receiver's name
    /// * `Err(LedgerError::ReceiverNotFound)` - identifier matches no account
    /// * `Err(LedgerError::SenderNotFound)` - caller's account is gone
    /// * `Err(LedgerError::BankMismatch)` - receiver is not at `expected_bank`
    /// * `Err(LedgerError::SelfTransfer)` - receiver is the caller
    /// * `Err(LedgerError::InvalidAmount)` - amount is not positive
    /// * `Err(LedgerError::InsufficientFunds)` - balance would go negative
    pub fn transfer(
        &self,
        caller: &Caller,
        request: &TransferRequest,
    ) -> LedgerResult<TransferReceipt> {
        let receiver_not_found = || LedgerError::ReceiverNotFound {
            identifier: request.identifier.clone(),
        };

        // The receiver id is only known after the lookup; it is re-read under lock.
        let receiver_id = self
            .store
            .account_by_identifier(&request.identifier)?
            .ok_or_else(receiver_not_found)?
            .id;

        let _locks = self.locks.acquire(&[caller.account_id, receiver_id], &[]);

        let mut receiver = self
            .store
            .account(receiver_id)?
            .ok_or_else(receiver_not_found)?;
        let mut sender = self
            .store
            .account(caller.account_id)?
            .ok_or(LedgerError::SenderNotFound {
                account: caller.account_id,
            })?;

        if receiver.bank != request.expected_bank {
            debug!(
                receiver = receiver.id,
                expected = %request.expected_bank,
                "Transfer rejected: bank mismatch"
            );
            return Err(LedgerError::bank_mismatch(
                &request.identifier,
                request.expected_bank.as_str(),
            ));
        }

        if sender.id == receiver.id {
            return Err(LedgerError::SelfTransfer);
        }

        let amount = request.amount;
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount { amount });
        }

        if sender.balance - amount < Decimal::ZERO {
            return Err(LedgerError::insufficient_funds(
                &format!("account {}", sender.id),
                sender.balance,
                amount,
            ));
        }

        let credited = receiver
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("transfer", receiver.id))?;

        let mut batch = WriteBatch::new();
        batch
            .append_transaction(TransactionRecord::debit(
                self.store.next_transaction_id()?,
                sender.id,
                sender.bank.clone(),
                amount,
                self.now(),
                request.description.clone(),
            ))
            .append_transaction(TransactionRecord::credit(
                self.store.next_transaction_id()?,
                receiver.id,
                receiver.bank.clone(),
                amount,
                self.now(),
                request.description.clone(),
            ));

        sender.balance -= amount;
        receiver.balance = credited;

        let receipt = TransferReceipt {
            amount,
            sender_balance: sender.balance,
            receiver_name: receiver.display_name(),
        };

        batch.save_account(sender).save_account(receiver);
        self.store.commit(batch)?;

        info!(
            sender = caller.account_id,
            receiver = receiver_id,
            %amount,
            "Transfer completed"
        );
        Ok(receipt)
    }

    /// Credit the caller's account and log one CREDIT record
    ///
    /// Returns the new balance.
    pub fn deposit(&self, caller: &Caller, request: &DepositRequest) -> LedgerResult<Decimal> {
        let _locks = self.locks.acquire(&[caller.account_id], &[]);

        let mut account = self.require_account(caller.account_id)?;

        let amount = request.amount;
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount { amount });
        }

        account.balance = account
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("deposit", account.id))?;
        let balance = account.balance;

        let mut batch = WriteBatch::new();
        batch.append_transaction(TransactionRecord::credit(
            self.store.next_transaction_id()?,
            account.id,
            account.bank.clone(),
            amount,
            self.now(),
            request.description.clone(),
        ));
        batch.save_account(account);
        self.store.commit(batch)?;

        info!(account = caller.account_id, %amount, "Deposit completed");
        Ok(balance)
    }
}
