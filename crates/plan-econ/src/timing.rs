//! Cycle-time conversion.

use crate::SECONDS_PER_MONTH;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Length of one production cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleDuration {
    pub seconds_per_cycle: Decimal,
    pub minutes_per_cycle: Decimal,
    pub hours_per_cycle: Decimal,
}

/// Duration of one cycle for a process running `cycles_per_month` cycles in a
/// 30-day month. Returns all zeros when `cycles_per_month <= 0`, or when it
/// is so small that the duration does not fit in a `Decimal`.
///
/// Example:
/// let t = cycle_duration(Decimal::new(100, 0));
/// assert_eq!(t.seconds_per_cycle, Decimal::new(25920, 0));
pub fn cycle_duration(cycles_per_month: Decimal) -> CycleDuration {
    if cycles_per_month <= Decimal::ZERO {
        return CycleDuration::default();
    }
    let Some(seconds) = Decimal::from(SECONDS_PER_MONTH).checked_div(cycles_per_month) else {
        debug!(cycles_per_month = %cycles_per_month, "cycle duration out of range");
        return CycleDuration::default();
    };
    CycleDuration {
        seconds_per_cycle: seconds,
        minutes_per_cycle: seconds / Decimal::from(60),
        hours_per_cycle: seconds / Decimal::from(3600),
    }
}
