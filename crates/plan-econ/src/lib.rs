#![deny(warnings)]

//! Calculation engine for production planning.
//!
//! Every operation is a pure function of its arguments and the
//! [`Repository`](plan_core::Repository) snapshot it is handed:
//! - [`resolve_chain`]: downstream goods reachable from a starting quantity
//! - [`aggregate_revenue`]: gross/net result of running a set of processes
//! - [`project_capacity`]: input requirements at full throughput
//! - [`cycle_duration`]: wall-clock length of one cycle

mod capacity;
mod chain;
mod revenue;
mod timing;

pub use capacity::{project_capacity, CapacityReport, InputRequirement};
pub use chain::{resolve_chain, ChainStep};
pub use revenue::{
    aggregate_revenue, ProcessRevenue, RevenueBreakdown, RevenueReport, RevenueRequest,
};
pub use timing::{cycle_duration, CycleDuration};

use rust_decimal::Decimal;
use thiserror::Error;

/// Runtime applied to revenue aggregation when a request names none.
pub const DEFAULT_RUNTIME_MONTHS: Decimal = Decimal::ONE;

/// Months in a planning year.
pub const MONTHS_PER_YEAR: u32 = 12;

/// Seconds in a planning month (30 days).
pub const SECONDS_PER_MONTH: u32 = 30 * 24 * 3600;

/// Errors produced by the calculation engine.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// The requested process does not exist in the repository.
    #[error("process not found: {0}")]
    ProcessNotFound(String),
}
