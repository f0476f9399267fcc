//! Catalog snapshots: export, import and JSON/YAML files.

use crate::{Catalog, CatalogError};
use plan_core::{Facility, Good, Process, Repository};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Full catalog contents in a serializable form.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub goods: Vec<Good>,
    #[serde(default)]
    pub processes: Vec<Process>,
    #[serde(default)]
    pub facilities: Vec<Facility>,
}

/// How an import treats existing records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Keep existing records; skip incoming ones whose name or id is taken.
    /// Names are only compared in this mode.
    #[default]
    Merge,
    /// Clear the catalog first.
    Replace,
}

/// Counts of what an import changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub goods_added: usize,
    pub processes_added: usize,
    pub facilities_added: usize,
    /// Records skipped because they already exist.
    pub skipped: usize,
    /// Edges and facility links dropped because their target is unknown.
    pub dropped_links: usize,
}

impl Catalog {
    pub fn export(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            goods: self.goods().cloned().collect(),
            processes: self.processes().cloned().collect(),
            facilities: self.facilities().cloned().collect(),
        }
    }

    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        let mut c = Catalog::new();
        c.import(snapshot, ImportMode::Replace);
        c
    }

    /// Import goods, then processes, then facilities.
    ///
    /// Process edges naming a good that is unknown after the goods pass, and
    /// facility links naming an unknown process, are dropped. A repeated id
    /// keeps its first record in either mode.
    pub fn import(&mut self, snapshot: CatalogSnapshot, mode: ImportMode) -> ImportSummary {
        if mode == ImportMode::Replace {
            self.clear();
        }
        let merge = mode == ImportMode::Merge;
        let mut summary = ImportSummary::default();

        let mut names: BTreeSet<String> = self.goods().map(|g| g.name.clone()).collect();
        for good in snapshot.goods {
            let exists = self.good(&good.id).is_some()
                || (merge && !names.insert(good.name.clone()));
            if exists {
                debug!(good = %good.id, "already present, skipped");
                summary.skipped += 1;
                continue;
            }
            self.upsert_good(good);
            summary.goods_added += 1;
        }

        let mut names: BTreeSet<String> = self.processes().map(|p| p.name.clone()).collect();
        for mut process in snapshot.processes {
            let exists = self.process(&process.id).is_some()
                || (merge && !names.insert(process.name.clone()));
            if exists {
                debug!(process = %process.id, "already present, skipped");
                summary.skipped += 1;
                continue;
            }
            let before = process.inputs.len() + process.outputs.len();
            process.inputs.retain(|e| self.good(&e.good_id).is_some());
            process.outputs.retain(|e| self.good(&e.good_id).is_some());
            summary.dropped_links += before - process.inputs.len() - process.outputs.len();
            self.upsert_process(process);
            summary.processes_added += 1;
        }

        let mut names: BTreeSet<String> = self.facilities().map(|f| f.name.clone()).collect();
        for mut facility in snapshot.facilities {
            let exists = self.facility(&facility.id).is_some()
                || (merge && !names.insert(facility.name.clone()));
            if exists {
                debug!(facility = %facility.id, "already present, skipped");
                summary.skipped += 1;
                continue;
            }
            let before = facility.process_ids.len();
            facility.process_ids.retain(|p| self.process(p).is_some());
            summary.dropped_links += before - facility.process_ids.len();
            self.upsert_facility(facility);
            summary.facilities_added += 1;
        }

        info!(?mode, ?summary, "catalog imported");
        summary
    }
}

/// Catalog file encodings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            _ => Err(CatalogError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn parse(self, text: &str) -> Result<CatalogSnapshot, CatalogError> {
        Ok(match self {
            Format::Json => serde_json::from_str(text)?,
            Format::Yaml => serde_yaml::from_str(text)?,
        })
    }

    pub fn render(self, snapshot: &CatalogSnapshot) -> Result<String, CatalogError> {
        Ok(match self {
            Format::Json => serde_json::to_string_pretty(snapshot)?,
            Format::Yaml => serde_yaml::to_string(snapshot)?,
        })
    }
}

/// Read a snapshot from a `.json`, `.yaml` or `.yml` file.
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<CatalogSnapshot, CatalogError> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    let text = fs::read_to_string(path)?;
    let snapshot = format.parse(&text)?;
    info!(
        path = %path.display(),
        goods = snapshot.goods.len(),
        processes = snapshot.processes.len(),
        facilities = snapshot.facilities.len(),
        "catalog file loaded"
    );
    Ok(snapshot)
}

/// Write a snapshot, creating parent directories as needed.
pub fn save_snapshot<P: AsRef<Path>>(
    snapshot: &CatalogSnapshot,
    path: P,
) -> Result<(), CatalogError> {
    let path = path.as_ref();
    let text = Format::from_path(path)?.render(snapshot)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, text)?;
    Ok(())
}
