//! Warehouse collaborator contracts for match-scenario simulations
//!
//! The simulation engine needs exactly two things from the outside world:
//! a supply of per-program training capacities and a place to put finished
//! scenario rows. Both are expressed here as traits so a run can be wired
//! to in-memory fixtures in tests and to file-backed sources in binaries.
//!
//! Key pieces:
//! - `CategoryKey`: the (province, discipline) pair every mapping is keyed by
//! - `SupplySource` + `load_supply`: capacity records in, quota table out
//! - `ScenarioStore`: replace/fetch all rows for one scenario identity

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod files;
pub mod memory;

pub use files::{CsvSupplySource, JsonScenarioStore};
pub use memory::{InMemoryScenarioStore, InMemorySupplySource};

/// Province code substituted when a program record carries none.
pub const UNKNOWN_PROVINCE: &str = "UNKNOWN";

/// A (province, discipline) pair - the unit of aggregation for supply,
/// demand, and scenario output.
///
/// Keys are totally ordered so that `BTreeMap`s keyed by them iterate in a
/// stable order; seeded simulation runs rely on that ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategoryKey {
    pub province: String,
    pub discipline: String,
}

impl CategoryKey {
    pub fn new(province: impl Into<String>, discipline: impl Into<String>) -> Self {
        CategoryKey {
            province: province.into(),
            discipline: discipline.into(),
        }
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.province, self.discipline)
    }
}

/// One program's capacity record as the warehouse reports it.
///
/// Both `province` and `quota` may be absent upstream: an unknown province
/// buckets under [`UNKNOWN_PROVINCE`], an unknown quota counts as a single
/// placeholder seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramRecord {
    pub province: Option<String>,
    pub discipline: String,
    pub quota: Option<u32>,
}

impl ProgramRecord {
    pub fn new(
        province: Option<impl Into<String>>,
        discipline: impl Into<String>,
        quota: Option<u32>,
    ) -> Self {
        ProgramRecord {
            province: province.map(Into::into),
            discipline: discipline.into(),
            quota,
        }
    }
}

/// Failure reading program capacities from a supply source.
#[derive(Debug, thiserror::Error)]
pub enum SupplyError {
    #[error("failed to read supply source: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed supply record: {0}")]
    Csv(#[from] csv::Error),

    #[error("supply source failure: {message}")]
    Backend { message: String },
}

/// Failure writing or reading scenario rows in a store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access scenario store: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode scenario rows: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("scenario store failure: {message}")]
    Backend { message: String },
}

/// Read access to the per-program capacity table.
///
/// Implementations list every capacity record currently valid; the engine
/// never writes back through this trait.
pub trait SupplySource {
    fn program_capacities(&self) -> Result<Vec<ProgramRecord>, SupplyError>;
}

/// Row storage keyed by scenario identity.
///
/// Generic over the row type so the engine's row struct stays out of this
/// crate: the store never inspects rows, it only groups them under one
/// scenario identity.
///
/// `replace_scenario` is the all-or-nothing write for one run: after it
/// returns, exactly the given rows are visible for that identity. An unknown
/// identity fetches as an empty set, not an error.
pub trait ScenarioStore<R> {
    fn replace_scenario(&mut self, scenario_id: Uuid, rows: Vec<R>) -> Result<(), StoreError>;

    fn fetch_scenario(&self, scenario_id: Uuid) -> Result<Vec<R>, StoreError>;

    /// Drop every stored scenario. Used by the rebuild-defaults operation.
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// Build the quota table: sum per-program capacity within each category,
/// substituting 1 for a missing quota and [`UNKNOWN_PROVINCE`] for a missing
/// province.
///
/// An empty source yields an empty mapping; only a failing source is an
/// error.
pub fn load_supply<S>(source: &S) -> Result<BTreeMap<CategoryKey, u32>, SupplyError>
where
    S: SupplySource + ?Sized,
{
    let mut supply: BTreeMap<CategoryKey, u32> = BTreeMap::new();
    for record in source.program_capacities()? {
        let province = record
            .province
            .unwrap_or_else(|| UNKNOWN_PROVINCE.to_string());
        let key = CategoryKey::new(province, record.discipline);
        *supply.entry(key).or_insert(0) += record.quota.unwrap_or(1);
    }
    Ok(supply)
}
