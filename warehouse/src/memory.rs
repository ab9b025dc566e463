//! In-memory collaborators for tests and demos

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::{ProgramRecord, ScenarioStore, StoreError, SupplyError, SupplySource};

/// A fixed list of program capacity records.
#[derive(Debug, Clone, Default)]
pub struct InMemorySupplySource {
    records: Vec<ProgramRecord>,
}

impl InMemorySupplySource {
    pub fn new(records: Vec<ProgramRecord>) -> Self {
        InMemorySupplySource { records }
    }
}

impl SupplySource for InMemorySupplySource {
    fn program_capacities(&self) -> Result<Vec<ProgramRecord>, SupplyError> {
        Ok(self.records.clone())
    }
}

/// Scenario rows held in a map keyed by scenario identity.
#[derive(Debug, Clone)]
pub struct InMemoryScenarioStore<R> {
    scenarios: BTreeMap<Uuid, Vec<R>>,
}

impl<R> InMemoryScenarioStore<R> {
    pub fn new() -> Self {
        InMemoryScenarioStore {
            scenarios: BTreeMap::new(),
        }
    }

    /// Number of stored scenarios (not rows).
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Total row count across every stored scenario.
    pub fn total_rows(&self) -> usize {
        self.scenarios.values().map(Vec::len).sum()
    }
}

impl<R> Default for InMemoryScenarioStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Clone> ScenarioStore<R> for InMemoryScenarioStore<R> {
    fn replace_scenario(&mut self, scenario_id: Uuid, rows: Vec<R>) -> Result<(), StoreError> {
        self.scenarios.insert(scenario_id, rows);
        Ok(())
    }

    fn fetch_scenario(&self, scenario_id: Uuid) -> Result<Vec<R>, StoreError> {
        Ok(self.scenarios.get(&scenario_id).cloned().unwrap_or_default())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.scenarios.clear();
        Ok(())
    }
}
