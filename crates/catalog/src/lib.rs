#![deny(warnings)]

//! In-memory catalog of goods, processes and facilities.
//!
//! [`Catalog`] is the [`Repository`] the calculation engine reads from. It
//! also owns the data-management side the engine never touches: CRUD,
//! referential-integrity checks, snapshot import/export and seed data.

mod sample;
mod snapshot;

pub use sample::sample_catalog;
pub use snapshot::{
    load_snapshot, save_snapshot, CatalogSnapshot, Format, ImportMode, ImportSummary,
};

use plan_core::{
    validate_facility, validate_facility_refs, validate_good, validate_process,
    validate_process_refs, Facility, FacilityId, Good, GoodId, Process, ProcessId, Repository,
    ValidationError,
};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Errors produced by catalog management and catalog files.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// File extension is not one of json, yaml, yml.
    #[error("unsupported catalog format: {0}")]
    UnsupportedFormat(String),
    #[error("{entity} {id}: {source}")]
    Invalid {
        entity: &'static str,
        id: String,
        #[source]
        source: ValidationError,
    },
}

/// Goods, processes and facilities keyed by id.
///
/// Iteration, and therefore [`Repository::processes_consuming`], follows
/// ascending id order.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    goods: BTreeMap<GoodId, Good>,
    processes: BTreeMap<ProcessId, Process>,
    facilities: BTreeMap<FacilityId, Facility>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a good, returning the previous record.
    pub fn upsert_good(&mut self, good: Good) -> Option<Good> {
        self.goods.insert(good.id.clone(), good)
    }

    /// Remove a good. Edges referencing it are left in place.
    pub fn remove_good(&mut self, id: &GoodId) -> Option<Good> {
        self.goods.remove(id)
    }

    pub fn upsert_process(&mut self, process: Process) -> Option<Process> {
        self.processes.insert(process.id.clone(), process)
    }

    /// Remove a process and unlink it from every facility hosting it.
    pub fn remove_process(&mut self, id: &ProcessId) -> Option<Process> {
        let removed = self.processes.remove(id)?;
        for f in self.facilities.values_mut() {
            f.process_ids.retain(|p| p != id);
        }
        debug!(process = %id, "process removed");
        Some(removed)
    }

    pub fn upsert_facility(&mut self, facility: Facility) -> Option<Facility> {
        self.facilities.insert(facility.id.clone(), facility)
    }

    pub fn remove_facility(&mut self, id: &FacilityId) -> Option<Facility> {
        self.facilities.remove(id)
    }

    pub fn facility(&self, id: &FacilityId) -> Option<&Facility> {
        self.facilities.get(id)
    }

    pub fn goods(&self) -> impl Iterator<Item = &Good> {
        self.goods.values()
    }

    pub fn processes(&self) -> impl Iterator<Item = &Process> {
        self.processes.values()
    }

    pub fn facilities(&self) -> impl Iterator<Item = &Facility> {
        self.facilities.values()
    }

    pub fn is_empty(&self) -> bool {
        self.goods.is_empty() && self.processes.is_empty() && self.facilities.is_empty()
    }

    pub fn clear(&mut self) {
        self.goods.clear();
        self.processes.clear();
        self.facilities.clear();
    }

    /// Check field invariants of every entity and that every edge and
    /// facility link points at an existing record.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for g in self.goods.values() {
            validate_good(g).map_err(|e| invalid("good", &g.id.0, e))?;
        }
        for p in self.processes.values() {
            validate_process(p)
                .and_then(|_| validate_process_refs(p, self))
                .map_err(|e| invalid("process", &p.id.0, e))?;
        }
        for f in self.facilities.values() {
            validate_facility(f)
                .and_then(|_| validate_facility_refs(f, self))
                .map_err(|e| invalid("facility", &f.id.0, e))?;
        }
        Ok(())
    }
}

fn invalid(entity: &'static str, id: &str, source: ValidationError) -> CatalogError {
    CatalogError::Invalid {
        entity,
        id: id.to_string(),
        source,
    }
}

impl Repository for Catalog {
    fn good(&self, id: &GoodId) -> Option<&Good> {
        self.goods.get(id)
    }

    fn process(&self, id: &ProcessId) -> Option<&Process> {
        self.processes.get(id)
    }

    fn processes_consuming(&self, good: &GoodId) -> Vec<&Process> {
        self.processes.values().filter(|p| p.consumes(good)).collect()
    }

    fn facilities_hosting(&self, process: &ProcessId) -> Vec<&Facility> {
        self.facilities.values().filter(|f| f.hosts(process)).collect()
    }
}
