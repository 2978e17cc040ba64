//! Interest accrual engine
//!
//! Once per accrual period every active plan either matures or earns one
//! day of simple interest:
//!
//! - matured (maturity date on or before today): the plan is marked inactive
//!   and its principal plus interest is credited to the owning account, both
//!   in one unit of work
//! - otherwise: `amount * rate / 365`, rounded half away from zero to four
//!   decimal places, is added to `interest_earned`
//!
//! Each plan goes through the same lock, re-read, commit path as live
//! requests. A plan that fails is logged and counted; the pass carries on
//! with the rest.

use super::batch::WriteBatch;
use super::ledger::Ledger;
use super::traits::Store;
use crate::types::{AccountId, LedgerError, LedgerResult, SavingsId};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info, warn};

const DAYS_PER_YEAR: i64 = 365;

/// Decimal places kept on accrued interest
const INTEREST_SCALE: u32 = 4;

/// Outcome counts of one accrual pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AccrualReport {
    /// Plans that earned a day of interest
    pub accrued: usize,
    /// Plans closed and paid out at maturity
    pub matured: usize,
    /// Plans that could not be processed
    pub failed: usize,
}

enum PlanOutcome {
    Accrued,
    Matured,
    Skipped,
}

/// One day of simple interest on `amount` at annual `rate`
///
/// Returns `None` on overflow.
pub fn daily_interest(amount: Decimal, rate: Decimal) -> Option<Decimal> {
    amount
        .checked_mul(rate)?
        .checked_div(Decimal::from(DAYS_PER_YEAR))
        .map(|daily| {
            daily.round_dp_with_strategy(INTEREST_SCALE, RoundingStrategy::MidpointAwayFromZero)
        })
}

impl<S: Store> Ledger<S> {
    /// Run one accrual pass over every active plan
    pub fn accrue_interest(&self) -> AccrualReport {
        let mut report = AccrualReport::default();

        let plans = match self.store.active_savings() {
            Ok(plans) => plans,
            Err(error) => {
                warn!(%error, "Interest accrual skipped: active savings unavailable");
                return report;
            }
        };

        let today = self.today();
        for plan in plans {
            match self.accrue_plan(plan.id, plan.account, today) {
                Ok(PlanOutcome::Accrued) => report.accrued += 1,
                Ok(PlanOutcome::Matured) => report.matured += 1,
                Ok(PlanOutcome::Skipped) => {}
                Err(error) => {
                    report.failed += 1;
                    warn!(savings = plan.id, account = plan.account, %error, "Interest accrual failed");
                }
            }
        }

        info!(
            %today,
            accrued = report.accrued,
            matured = report.matured,
            failed = report.failed,
            "Interest accrual pass finished"
        );
        report
    }

    fn accrue_plan(
        &self,
        savings: SavingsId,
        account: AccountId,
        today: NaiveDate,
    ) -> LedgerResult<PlanOutcome> {
        let _locks = self.locks.acquire(&[account], &[savings]);

        // Closed or matured since the pass listed it
        let Some(mut plan) = self.store.savings_plan_for_account(savings, account)? else {
            debug!(savings, "Accrual skipped: plan no longer exists");
            return Ok(PlanOutcome::Skipped);
        };
        if !plan.active {
            return Ok(PlanOutcome::Skipped);
        }

        let mut batch = WriteBatch::new();
        let outcome = if plan.is_matured(today) {
            let mut owner = self.require_account(account)?;
            let overflow = || LedgerError::arithmetic_overflow("maturity payout", account);
            let payout = plan.value().ok_or_else(overflow)?;
            owner.balance = owner.balance.checked_add(payout).ok_or_else(overflow)?;
            plan.active = false;
            batch.save_plan(plan).save_account(owner);
            info!(savings, account, %payout, "Savings plan matured");
            PlanOutcome::Matured
        } else {
            let interest = daily_interest(plan.amount, plan.interest_rate)
                .and_then(|daily| plan.interest_earned.checked_add(daily))
                .ok_or_else(|| LedgerError::arithmetic_overflow("interest accrual", account))?;
            plan.interest_earned = interest;
            batch.save_plan(plan);
            PlanOutcome::Accrued
        };

        self.store.commit(batch)?;
        Ok(outcome)
    }
}

/// Run [`Ledger::accrue_interest`] once per configured accrual interval on
/// the tokio runtime
///
/// The first pass runs immediately. Each pass executes on the blocking pool
/// since it takes entity locks.
pub fn spawn_accrual_scheduler<S>(ledger: Arc<Ledger<S>>) -> JoinHandle<()>
where
    S: Store + 'static,
{
    let period = ledger.config().accrual_interval;
    tokio::spawn(async move {
        info!(?period, "Interest accrual scheduler started");
        let mut ticker = interval(period);

        loop {
            ticker.tick().await;

            let ledger = Arc::clone(&ledger);
            match tokio::task::spawn_blocking(move || ledger.accrue_interest()).await {
                Ok(report) => debug!(?report, "Scheduled accrual completed"),
                Err(error) => warn!(%error, "Scheduled accrual task failed"),
            }
        }
    })
}
