//! Savings plan lifecycle
//!
//! ```text
//! Created(active) ──top-up / withdraw*──► Matured(inactive)   (FIXED, via accrual)
//!        │
//!        └──close──► Deleted                                   (FLEXIBLE only)
//! ```
//!
//! Every mutating operation validates in the same order: existence (account,
//! then plan), amount, sufficiency, plan type. Funds move between the account
//! balance and the plan principal inside one unit of work, together with the
//! history record for top-ups and withdrawals.

use super::batch::WriteBatch;
use super::ledger::Ledger;
use super::traits::Store;
use crate::types::{
    Account, Caller, HistoryEvent, LedgerError, LedgerResult, PlanType, SavingsHistoryRecord,
    SavingsId, SavingsMovement, SavingsPlan, SavingsReceipt, SavingsRequest,
};
use rust_decimal::Decimal;
use tracing::{debug, info};

const CREATED: &str = "Saving successfully created!";
const TOPPED_UP: &str = "Top up completed!";
const WITHDRAWN: &str = "Withdrawal successful!";

impl<S: Store> Ledger<S> {
    /// Open a FLEXIBLE plan funded from the caller's balance
    pub fn create_flexible(
        &self,
        caller: &Caller,
        request: &SavingsRequest,
    ) -> LedgerResult<SavingsReceipt> {
        self.create_plan(caller, request, PlanType::Flexible)
    }

    /// Open a FIXED plan locked until `request.maturity_date`
    ///
    /// The maturity date must be strictly after today.
    pub fn create_fixed(
        &self,
        caller: &Caller,
        request: &SavingsRequest,
    ) -> LedgerResult<SavingsReceipt> {
        self.create_plan(caller, request, PlanType::Fixed)
    }

    fn create_plan(
        &self,
        caller: &Caller,
        request: &SavingsRequest,
        plan_type: PlanType,
    ) -> LedgerResult<SavingsReceipt> {
        let _locks = self.locks.acquire(&[caller.account_id], &[]);

        let mut account = self.require_account(caller.account_id)?;

        let amount = request
            .amount
            .ok_or(LedgerError::InvalidInput { field: "amount" })?;
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount { amount });
        }

        if account.balance < amount {
            return Err(LedgerError::insufficient_funds(
                &format!("account {}", account.id),
                account.balance,
                amount,
            ));
        }

        if request.plan_type != plan_type {
            return Err(LedgerError::wrong_savings_type(
                "create",
                plan_type,
                request.plan_type,
            ));
        }

        let today = self.today();
        let maturity_date = match plan_type {
            PlanType::Flexible => None,
            PlanType::Fixed => {
                let maturity = request
                    .maturity_date
                    .ok_or(LedgerError::MissingMaturityDate)?;
                if maturity <= today {
                    return Err(LedgerError::InvalidMaturityDate { maturity, today });
                }
                Some(maturity)
            }
        };

        let plan = SavingsPlan {
            id: self.store.next_savings_id()?,
            account: account.id,
            plan_type,
            amount,
            interest_rate: self.config.rate_for(plan_type),
            interest_earned: Decimal::ZERO,
            start_date: today,
            maturity_date,
            description: request.description.clone(),
            active: true,
        };
        account.balance -= amount;

        let receipt = SavingsReceipt {
            savings_id: plan.id,
            plan_type,
            amount,
            timestamp: self.now(),
            maturity_date,
            description: request.description.clone(),
            message: CREATED,
        };

        let mut batch = WriteBatch::new();
        batch.save_plan(plan).save_account(account);
        self.store.commit(batch)?;

        info!(
            account = caller.account_id,
            savings = receipt.savings_id,
            plan_type = %plan_type,
            %amount,
            "Savings plan created"
        );
        Ok(receipt)
    }

    /// Move funds from the caller's balance into one of their FLEXIBLE plans
    pub fn top_up(
        &self,
        caller: &Caller,
        movement: &SavingsMovement,
    ) -> LedgerResult<SavingsReceipt> {
        let _locks = self
            .locks
            .acquire(&[caller.account_id], &[movement.savings_id]);

        let mut account = self.require_account(caller.account_id)?;
        let mut plan = self.require_plan(caller, movement.savings_id)?;

        let amount = positive(movement.amount)?;

        if account.balance < amount {
            return Err(LedgerError::insufficient_funds(
                &format!("account {}", account.id),
                account.balance,
                amount,
            ));
        }

        require_flexible("top-up", movement.plan_type, &plan)?;

        plan.amount = plan
            .amount
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("top-up", account.id))?;
        account.balance -= amount;

        self.commit_movement(account, plan, HistoryEvent::Deposit, movement, TOPPED_UP)
    }

    /// Move funds from one of the caller's FLEXIBLE plans back to their balance
    ///
    /// Sufficiency is checked against the plan principal, not the account.
    pub fn withdraw(
        &self,
        caller: &Caller,
        movement: &SavingsMovement,
    ) -> LedgerResult<SavingsReceipt> {
        let _locks = self
            .locks
            .acquire(&[caller.account_id], &[movement.savings_id]);

        let mut account = self.require_account(caller.account_id)?;
        let mut plan = self.require_plan(caller, movement.savings_id)?;

        let amount = positive(movement.amount)?;

        if plan.amount < amount {
            return Err(LedgerError::insufficient_funds(
                &format!("savings {}", plan.id),
                plan.amount,
                amount,
            ));
        }

        require_flexible("withdrawal", movement.plan_type, &plan)?;

        account.balance = account
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("withdrawal", account.id))?;
        plan.amount -= amount;

        self.commit_movement(account, plan, HistoryEvent::Withdrawal, movement, WITHDRAWN)
    }

    /// Close a FLEXIBLE plan, paying principal and interest back to the caller
    ///
    /// Returns `Ok(false)` instead of an error when the account or plan does
    /// not exist, or the plan is not FLEXIBLE.
    pub fn close_flexible(&self, caller: &Caller, savings_id: SavingsId) -> LedgerResult<bool> {
        let _locks = self.locks.acquire(&[caller.account_id], &[savings_id]);

        let Some(mut account) = self.store.account(caller.account_id)? else {
            debug!(account = caller.account_id, "Close rejected: account not found");
            return Ok(false);
        };
        let Some(plan) = self
            .store
            .savings_plan_for_account(savings_id, caller.account_id)?
        else {
            debug!(
                account = caller.account_id,
                savings = savings_id,
                "Close rejected: savings not found"
            );
            return Ok(false);
        };
        if plan.plan_type != PlanType::Flexible {
            debug!(savings = savings_id, "Close rejected: not a flexible plan");
            return Ok(false);
        }

        let payout = plan
            .value()
            .ok_or_else(|| LedgerError::arithmetic_overflow("close", account.id))?;
        account.balance = account
            .balance
            .checked_add(payout)
            .ok_or_else(|| LedgerError::arithmetic_overflow("close", account.id))?;

        let mut batch = WriteBatch::new();
        batch.save_account(account).delete_plan(plan.id);
        self.store.commit(batch)?;

        info!(
            account = caller.account_id,
            savings = savings_id,
            %payout,
            "Flexible savings closed"
        );
        Ok(true)
    }

    fn require_plan(&self, caller: &Caller, savings_id: SavingsId) -> LedgerResult<SavingsPlan> {
        self.store
            .savings_plan_for_account(savings_id, caller.account_id)?
            .ok_or_else(|| LedgerError::savings_not_found(savings_id, caller.account_id))
    }

    fn commit_movement(
        &self,
        account: Account,
        plan: SavingsPlan,
        event: HistoryEvent,
        movement: &SavingsMovement,
        message: &'static str,
    ) -> LedgerResult<SavingsReceipt> {
        let timestamp = self.now();
        let record = SavingsHistoryRecord {
            id: self.store.next_history_id()?,
            savings: plan.id,
            event,
            amount: movement.amount,
            timestamp,
        };
        let receipt = SavingsReceipt {
            savings_id: plan.id,
            plan_type: plan.plan_type,
            amount: movement.amount,
            timestamp,
            maturity_date: plan.maturity_date,
            description: movement.description.clone(),
            message,
        };
        let account_id = account.id;

        let mut batch = WriteBatch::new();
        batch
            .save_account(account)
            .save_plan(plan)
            .append_history(record);
        self.store.commit(batch)?;

        info!(
            account = account_id,
            savings = receipt.savings_id,
            event = ?event,
            amount = %receipt.amount,
            "Savings movement recorded"
        );
        Ok(receipt)
    }
}

fn positive(amount: Decimal) -> LedgerResult<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount { amount });
    }
    Ok(amount)
}

/// Top-up and withdrawal are FLEXIBLE-only, both as requested and as stored
fn require_flexible(
    operation: &'static str,
    requested: PlanType,
    plan: &SavingsPlan,
) -> LedgerResult<()> {
    for actual in [requested, plan.plan_type] {
        if actual != PlanType::Flexible {
            return Err(LedgerError::wrong_savings_type(
                operation,
                PlanType::Flexible,
                actual,
            ));
        }
    }
    Ok(())
}
