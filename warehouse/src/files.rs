//! File-backed collaborators
//!
//! `CsvSupplySource` reads program capacities from a CSV export of the
//! warehouse; `JsonScenarioStore` keeps one JSON document per scenario
//! identity under a directory. Both exist so the binaries can run against
//! real files with the same traits the tests wire to memory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::{ProgramRecord, ScenarioStore, StoreError, SupplyError, SupplySource};

/// Program capacities from a CSV file with `province,discipline,quota`
/// columns. Empty `province` or `quota` fields deserialize as absent.
#[derive(Debug, Clone)]
pub struct CsvSupplySource {
    path: PathBuf,
}

impl CsvSupplySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvSupplySource { path: path.into() }
    }
}

impl SupplySource for CsvSupplySource {
    fn program_capacities(&self) -> Result<Vec<ProgramRecord>, SupplyError> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for record in reader.deserialize() {
            records.push(record?);
        }
        Ok(records)
    }
}

/// Scenario rows stored as one `<scenario_id>.json` document per scenario.
///
/// `replace_scenario` writes the full row set to a sibling temp file and
/// renames it into place, so readers see either the previous document or the
/// complete new one.
#[derive(Debug, Clone)]
pub struct JsonScenarioStore {
    dir: PathBuf,
}

impl JsonScenarioStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(JsonScenarioStore { dir })
    }

    fn scenario_path(&self, scenario_id: Uuid) -> PathBuf {
        self.dir.join(format!("{scenario_id}.json"))
    }

    fn is_scenario_file(path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "json")
    }
}

impl<R> ScenarioStore<R> for JsonScenarioStore
where
    R: Serialize + DeserializeOwned,
{
    fn replace_scenario(&mut self, scenario_id: Uuid, rows: Vec<R>) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(&rows)?;
        let path = self.scenario_path(scenario_id);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn fetch_scenario(&self, scenario_id: Uuid) -> Result<Vec<R>, StoreError> {
        let path = self.scenario_path(scenario_id);
        let body = match fs::read(&path) {
            Ok(body) => body,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_slice(&body)?)
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if Self::is_scenario_file(&path) {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}
