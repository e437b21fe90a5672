//! Runtime cost calculation
//!
//! Turns classified hourly rates and a runtime into money:
//!
//! - fine granular rates are billed for the exact fraction of an hour used
//! - hourly interval rates are billed for `floor(runtime / 3600) + 1` hours and
//!   divided by the number of test cases sharing the deployment
//!
//! The interval component always adds one hour to the floor, so a runtime of
//! exactly 3600 seconds is billed as two hours. Existing cost reports were
//! produced with this rule and stay comparable only if it is kept.

use crate::classifier::ClassifiedSums;
use crate::error::{Result, TestcostError};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

pub const SECONDS_PER_HOUR: u64 = 3600;

/// Decimal places of every reported cost
pub const COST_DECIMAL_PLACES: u32 = 5;

/// Breakdown of a single calculation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostComputation {
    pub runtime_seconds: u64,
    pub split_by: i64,
    pub fine_granular_rate_per_hour: Decimal,
    pub hourly_interval_rate_per_hour: Decimal,
    pub billed_hours: u64,
    pub fine_granular_cost: Decimal,
    pub hourly_interval_cost: Decimal,
    /// Sum of both components rounded to five places
    pub cost: Decimal,
}

/// Compute the cost of `runtime_seconds` with interval costs split `split_by` ways
pub fn compute_cost(sums: &ClassifiedSums, runtime_seconds: u64, split_by: i64) -> Result<Decimal> {
    Ok(compute_cost_detailed(sums, runtime_seconds, split_by)?.cost)
}

pub fn compute_cost_detailed(
    sums: &ClassifiedSums,
    runtime_seconds: u64,
    split_by: i64,
) -> Result<CostComputation> {
    if split_by < 1 {
        return Err(TestcostError::InvalidSplit { value: split_by });
    }

    let overflow = || TestcostError::InvalidRuntime {
        context: "cost calculation".to_string(),
        value: runtime_seconds.to_string(),
        reason: "is too large to be costed".to_string(),
    };

    let seconds = Decimal::from(runtime_seconds);
    let hour = Decimal::from(SECONDS_PER_HOUR);
    let billed_hours = runtime_seconds / SECONDS_PER_HOUR + 1;

    let fine_granular_cost = sums
        .fine_granular_rate_per_hour
        .checked_mul(seconds)
        .and_then(|v| v.checked_div(hour))
        .ok_or_else(overflow)?;

    let hourly_interval_cost = sums
        .hourly_interval_rate_per_hour
        .checked_mul(Decimal::from(billed_hours))
        .and_then(|v| v.checked_div(Decimal::from(split_by)))
        .ok_or_else(overflow)?;

    let total = fine_granular_cost
        .checked_add(hourly_interval_cost)
        .ok_or_else(overflow)?;

    Ok(CostComputation {
        runtime_seconds,
        split_by,
        fine_granular_rate_per_hour: sums.fine_granular_rate_per_hour,
        hourly_interval_rate_per_hour: sums.hourly_interval_rate_per_hour,
        billed_hours,
        fine_granular_cost,
        hourly_interval_cost,
        cost: round_cost(total)?,
    })
}

/// Round half-even to five places, keeping trailing zeros (`1` becomes `1.00000`)
///
/// Values with too many integer digits to carry five decimal places are rejected.
pub fn round_cost(value: Decimal) -> Result<Decimal> {
    let mut rounded =
        value.round_dp_with_strategy(COST_DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(COST_DECIMAL_PLACES);
    if rounded.scale() != COST_DECIMAL_PLACES {
        return Err(TestcostError::InvalidRuntime {
            context: "cost rounding".to_string(),
            value: value.to_string(),
            reason: format!(
                "is too large to be reported with {} decimal places",
                COST_DECIMAL_PLACES
            ),
        });
    }
    Ok(rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sums(fine: &str, interval: &str) -> ClassifiedSums {
        ClassifiedSums::new(dec(fine), dec(interval))
    }

    #[test]
    fn test_fine_granular_is_proportional() {
        assert_eq!(compute_cost(&sums("1.0", "0"), 3600, 1).unwrap(), dec("1"));
        assert_eq!(compute_cost(&sums("1.0", "0"), 1800, 1).unwrap(), dec("0.5"));
        assert_eq!(compute_cost(&sums("1.0", "0"), 0, 1).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_fine_granular_not_divided_by_split() {
        assert_eq!(compute_cost(&sums("1.0", "0"), 3600, 4).unwrap(), dec("1"));
    }

    #[test]
    fn test_interval_bills_started_hours_plus_floor() {
        assert_eq!(compute_cost(&sums("0", "2.0"), 0, 1).unwrap(), dec("2"));
        assert_eq!(compute_cost(&sums("0", "2.0"), 1, 1).unwrap(), dec("2"));
        assert_eq!(compute_cost(&sums("0", "2.0"), 3599, 1).unwrap(), dec("2"));
        assert_eq!(compute_cost(&sums("0", "2.0"), 3600, 1).unwrap(), dec("4"));
        assert_eq!(compute_cost(&sums("0", "2.0"), 7201, 1).unwrap(), dec("6"));
    }

    #[test]
    fn test_interval_divided_by_split() {
        assert_eq!(compute_cost(&sums("0", "3.0"), 10, 2).unwrap(), dec("1.5"));
        assert_eq!(compute_cost(&sums("0", "1.0"), 10, 3).unwrap(), dec("0.33333"));
    }

    #[test]
    fn test_rounding_is_half_even_with_five_places() {
        assert_eq!(round_cost(dec("0.000005")).unwrap().to_string(), "0.00000");
        assert_eq!(round_cost(dec("0.000015")).unwrap().to_string(), "0.00002");
        assert_eq!(round_cost(dec("1")).unwrap().to_string(), "1.00000");
        assert_eq!(round_cost(dec("0.123456")).unwrap().to_string(), "0.12346");
    }

    #[test]
    fn test_detailed_components() {
        let detail = compute_cost_detailed(&sums("0.1", "0.02"), 5400, 2).unwrap();
        assert_eq!(detail.billed_hours, 2);
        assert_eq!(detail.fine_granular_cost, dec("0.15"));
        assert_eq!(detail.hourly_interval_cost, dec("0.02"));
        assert_eq!(detail.cost.to_string(), "0.17000");
    }

    #[test]
    fn test_invalid_split() {
        for split in [0, -1, i64::MIN] {
            assert!(matches!(
                compute_cost(&sums("1", "1"), 10, split),
                Err(TestcostError::InvalidSplit { .. })
            ));
        }
    }

    #[test]
    fn test_cost_too_large_for_five_places() {
        let interval = dec("50000000000000000000000000000");
        let result = compute_cost(&ClassifiedSums::new(Decimal::ZERO, interval), 0, 1);
        assert!(matches!(result, Err(TestcostError::InvalidRuntime { .. })));
        assert!(round_cost(interval).is_err());
    }

    #[test]
    fn test_overflow_is_reported() {
        let huge = ClassifiedSums::new(Decimal::MAX, Decimal::ZERO);
        assert!(matches!(
            compute_cost(&huge, u64::MAX, 1),
            Err(TestcostError::InvalidRuntime { .. })
        ));
    }
}
