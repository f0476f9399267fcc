#![deny(warnings)]

//! Core domain models and invariants for the production planner.
//!
//! This crate defines the serializable reference data the calculation engine
//! works on (goods, processes, facilities), validation helpers for their basic
//! invariants, and the [`Repository`] capability the engine reads them through.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Unique identifier for a good, e.g. "wheat".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GoodId(pub String);

/// Unique identifier for a production process.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProcessId(pub String);

/// Unique identifier for a facility.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FacilityId(pub String);

macro_rules! string_id {
    ($($ty:ident),*) => {$(
        impl $ty {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    )*};
}

string_id!(GoodId, ProcessId, FacilityId);

fn default_unit() -> String {
    "Liter".to_string()
}

/// A tradeable resource.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Good {
    pub id: GoodId,
    /// Display name, e.g. "Wheat".
    pub name: String,
    /// Unit of measure (default: "Liter").
    #[serde(default = "default_unit")]
    pub unit: String,
    /// Optional density in kg per unit (> 0 when present).
    #[serde(default)]
    pub density: Option<Decimal>,
    /// Sale price per 1000 units.
    #[serde(default)]
    pub price_per_1000: Decimal,
}

impl Good {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price_per_1000: Decimal) -> Self {
        Self {
            id: GoodId::new(id),
            name: name.into(),
            unit: default_unit(),
            density: None,
            price_per_1000,
        }
    }

    /// Price of a single unit.
    pub fn unit_price(&self) -> Decimal {
        self.price_per_1000 / Decimal::ONE_THOUSAND
    }
}

/// One input or output of a process: a good and the amount moved per cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub good_id: GoodId,
    /// Units consumed or produced per cycle (> 0 expected).
    pub quantity_per_cycle: Decimal,
}

impl Edge {
    pub fn new(good_id: impl Into<String>, quantity_per_cycle: Decimal) -> Self {
        Self {
            good_id: GoodId::new(good_id),
            quantity_per_cycle,
        }
    }
}

/// A recipe consuming inputs to yield outputs at a fixed monthly throughput.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Process {
    pub id: ProcessId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Throughput capacity in cycles per month (>= 0).
    pub cycles_per_month: Decimal,
    /// Costs incurred every month regardless of output.
    #[serde(default)]
    pub fixed_costs_per_month: Decimal,
    /// Costs incurred per executed cycle.
    #[serde(default)]
    pub variable_costs_per_cycle: Decimal,
    /// Input edges in insertion order.
    #[serde(default)]
    pub inputs: Vec<Edge>,
    /// Output edges in insertion order.
    #[serde(default)]
    pub outputs: Vec<Edge>,
}

impl Process {
    pub fn new(id: impl Into<String>, name: impl Into<String>, cycles_per_month: Decimal) -> Self {
        Self {
            id: ProcessId::new(id),
            name: name.into(),
            description: String::new(),
            cycles_per_month,
            fixed_costs_per_month: Decimal::ZERO,
            variable_costs_per_cycle: Decimal::ZERO,
            inputs: vec![],
            outputs: vec![],
        }
    }

    pub fn with_costs(mut self, fixed_per_month: Decimal, variable_per_cycle: Decimal) -> Self {
        self.fixed_costs_per_month = fixed_per_month;
        self.variable_costs_per_cycle = variable_per_cycle;
        self
    }

    pub fn with_input(mut self, good_id: impl Into<String>, quantity_per_cycle: Decimal) -> Self {
        self.inputs.push(Edge::new(good_id, quantity_per_cycle));
        self
    }

    pub fn with_output(mut self, good_id: impl Into<String>, quantity_per_cycle: Decimal) -> Self {
        self.outputs.push(Edge::new(good_id, quantity_per_cycle));
        self
    }

    /// First input edge referencing `good`, in insertion order.
    pub fn input_for(&self, good: &GoodId) -> Option<&Edge> {
        self.inputs.iter().find(|e| &e.good_id == good)
    }

    pub fn consumes(&self, good: &GoodId) -> bool {
        self.input_for(good).is_some()
    }
}

/// A cost-bearing location hosting one or more processes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub name: String,
    #[serde(default)]
    pub building_costs_per_month: Decimal,
    /// Hosted processes.
    #[serde(default)]
    pub process_ids: Vec<ProcessId>,
}

impl Facility {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        building_costs_per_month: Decimal,
    ) -> Self {
        Self {
            id: FacilityId::new(id),
            name: name.into(),
            building_costs_per_month,
            process_ids: vec![],
        }
    }

    pub fn hosting(mut self, process_id: impl Into<String>) -> Self {
        self.process_ids.push(ProcessId::new(process_id));
        self
    }

    pub fn hosts(&self, process: &ProcessId) -> bool {
        self.process_ids.contains(process)
    }
}

/// Read access to reference data, valid for the duration of one calculation.
///
/// Borrowing from `&self` pins a coherent snapshot: nothing can change the
/// underlying data while a calculation holds the returned references.
pub trait Repository {
    fn good(&self, id: &GoodId) -> Option<&Good>;

    fn process(&self, id: &ProcessId) -> Option<&Process>;

    /// Every process with an input edge referencing `good`.
    ///
    /// The order is implementation-defined but must be stable between calls.
    fn processes_consuming(&self, good: &GoodId) -> Vec<&Process>;

    /// Every facility associated with `process`.
    fn facilities_hosting(&self, process: &ProcessId) -> Vec<&Facility>;
}

/// Planner configuration shared by front ends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Runtime used for revenue aggregation when a request names none.
    pub default_runtime_months: Decimal,
    /// Catalog file to load; sample data is used when absent. Relative paths
    /// are resolved against the config file's directory.
    pub catalog_path: Option<PathBuf>,
    /// Tracing filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            default_runtime_months: Decimal::ONE,
            catalog_path: None,
            log_filter: "info".to_string(),
        }
    }
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Names are shown to users and must not be empty.
    #[error("name must not be blank")]
    BlankName,
    /// Price or cost must be non-negative.
    #[error("negative monetary value is invalid")]
    NegativeMoney,
    /// Throughput must be non-negative.
    #[error("cycles per month must be >= 0")]
    NegativeThroughput,
    /// Edge quantity must be strictly positive.
    #[error("quantity per cycle for {0} must be > 0")]
    NonPositiveQuantity(String),
    /// Density must be strictly positive when present.
    #[error("density must be > 0")]
    NonPositiveDensity,
    /// Runtime must be non-negative.
    #[error("runtime months must be >= 0")]
    NegativeRuntime,
    /// Edge references a good that does not exist.
    #[error("good not found: {0}")]
    GoodNotFound(String),
    /// Facility references a process that does not exist.
    #[error("process not found: {0}")]
    ProcessNotFound(String),
}

/// Validate a good.
pub fn validate_good(g: &Good) -> Result<(), ValidationError> {
    if g.name.trim().is_empty() {
        return Err(ValidationError::BlankName);
    }
    if g.price_per_1000 < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney);
    }
    if let Some(d) = g.density {
        if d <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveDensity);
        }
    }
    Ok(())
}

/// Validate a process in isolation.
pub fn validate_process(p: &Process) -> Result<(), ValidationError> {
    if p.name.trim().is_empty() {
        return Err(ValidationError::BlankName);
    }
    if p.cycles_per_month < Decimal::ZERO {
        return Err(ValidationError::NegativeThroughput);
    }
    if p.fixed_costs_per_month < Decimal::ZERO || p.variable_costs_per_cycle < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney);
    }
    for e in p.inputs.iter().chain(&p.outputs) {
        if e.quantity_per_cycle <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveQuantity(e.good_id.0.clone()));
        }
    }
    Ok(())
}

/// Validate a facility in isolation.
pub fn validate_facility(f: &Facility) -> Result<(), ValidationError> {
    if f.name.trim().is_empty() {
        return Err(ValidationError::BlankName);
    }
    if f.building_costs_per_month < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney);
    }
    Ok(())
}

/// Check that every edge of `p` references a good known to `repo`.
pub fn validate_process_refs<R: Repository + ?Sized>(
    p: &Process,
    repo: &R,
) -> Result<(), ValidationError> {
    for e in p.inputs.iter().chain(&p.outputs) {
        if repo.good(&e.good_id).is_none() {
            return Err(ValidationError::GoodNotFound(e.good_id.0.clone()));
        }
    }
    Ok(())
}

/// Check that every process hosted by `f` is known to `repo`.
pub fn validate_facility_refs<R: Repository + ?Sized>(
    f: &Facility,
    repo: &R,
) -> Result<(), ValidationError> {
    for id in &f.process_ids {
        if repo.process(id).is_none() {
            return Err(ValidationError::ProcessNotFound(id.0.clone()));
        }
    }
    Ok(())
}

/// Validate planner configuration values.
pub fn validate_config(c: &PlannerConfig) -> Result<(), ValidationError> {
    if c.default_runtime_months < Decimal::ZERO {
        return Err(ValidationError::NegativeRuntime);
    }
    Ok(())
}
