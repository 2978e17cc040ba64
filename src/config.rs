//! Ledger configuration
//!
//! Interest rates for each plan type and the accrual schedule. Values come
//! from CLI flags; anything missing or invalid falls back to the default.

use crate::types::PlanType;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::warn;

/// Default accrual period: once a day
pub const DEFAULT_ACCRUAL_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    /// Annual rate for FLEXIBLE plans, as a fraction
    pub flexible_rate: Decimal,

    /// Annual rate for FIXED plans, as a fraction
    pub fixed_rate: Decimal,

    /// Period of the interest accrual batch
    pub accrual_interval: Duration,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            flexible_rate: Decimal::new(7, 2),
            fixed_rate: Decimal::new(12, 2),
            accrual_interval: DEFAULT_ACCRUAL_INTERVAL,
        }
    }
}

impl LedgerConfig {
    /// Create a config, replacing invalid values with defaults
    ///
    /// Negative rates and a zero interval are rejected with a warning.
    pub fn new(flexible_rate: Decimal, fixed_rate: Decimal, accrual_interval: Duration) -> Self {
        let default = Self::default();

        let flexible_rate = if flexible_rate.is_sign_negative() {
            warn!(
                "Invalid flexible_rate ({}), using default ({})",
                flexible_rate, default.flexible_rate
            );
            default.flexible_rate
        } else {
            flexible_rate
        };

        let fixed_rate = if fixed_rate.is_sign_negative() {
            warn!(
                "Invalid fixed_rate ({}), using default ({})",
                fixed_rate, default.fixed_rate
            );
            default.fixed_rate
        } else {
            fixed_rate
        };

        let accrual_interval = if accrual_interval.is_zero() {
            warn!(
                "Invalid accrual_interval ({:?}), using default ({:?})",
                accrual_interval, default.accrual_interval
            );
            default.accrual_interval
        } else {
            accrual_interval
        };

        Self {
            flexible_rate,
            fixed_rate,
            accrual_interval,
        }
    }

    /// Rate applied to new plans of `plan_type`
    pub fn rate_for(&self, plan_type: PlanType) -> Decimal {
        match plan_type {
            PlanType::Flexible => self.flexible_rate,
            PlanType::Fixed => self.fixed_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_rates() {
        let config = LedgerConfig::default();
        assert_eq!(config.rate_for(PlanType::Flexible), Decimal::new(7, 2));
        assert_eq!(config.rate_for(PlanType::Fixed), Decimal::new(12, 2));
        assert_eq!(config.accrual_interval, Duration::from_secs(86_400));
    }

    #[rstest]
    #[case::valid(Decimal::new(5, 2), Decimal::new(9, 2), 60, Decimal::new(5, 2), Decimal::new(9, 2), 60)]
    #[case::zero_rate_allowed(Decimal::ZERO, Decimal::ZERO, 60, Decimal::ZERO, Decimal::ZERO, 60)]
    #[case::negative_flexible(Decimal::new(-1, 2), Decimal::new(9, 2), 60, Decimal::new(7, 2), Decimal::new(9, 2), 60)]
    #[case::negative_fixed(Decimal::new(5, 2), Decimal::new(-9, 2), 60, Decimal::new(5, 2), Decimal::new(12, 2), 60)]
    #[case::zero_interval(Decimal::new(5, 2), Decimal::new(9, 2), 0, Decimal::new(5, 2), Decimal::new(9, 2), 86_400)]
    fn test_new_falls_back_on_invalid_values(
        #[case] flexible: Decimal,
        #[case] fixed: Decimal,
        #[case] interval_secs: u64,
        #[case] expected_flexible: Decimal,
        #[case] expected_fixed: Decimal,
        #[case] expected_interval_secs: u64,
    ) {
        let config = LedgerConfig::new(flexible, fixed, Duration::from_secs(interval_secs));
        assert_eq!(config.flexible_rate, expected_flexible);
        assert_eq!(config.fixed_rate, expected_fixed);
        assert_eq!(
            config.accrual_interval,
            Duration::from_secs(expected_interval_secs)
        );
    }
}
