//! Residency-Match Scenario Simulation
//!
//! Models how fill rates across (province, discipline) categories respond to
//! supply or demand perturbations under uncertainty. One scenario run:
//!
//! 1. Load the quota table from the warehouse
//! 2. Derive baseline preference weights from the quotas
//! 3. Apply the scenario's perturbation (quota shock or preference shift)
//! 4. Draw N independent Dirichlet→Multinomial demand iterations
//! 5. Reduce the draws to per-category mean and tail statistics
//! 6. Emit one summary row per category under a fresh scenario identity
//!
//! Runs are reproducible: an explicit seed fixes the full draw sequence.
//!
//! Key modules:
//! - `params`: scenario parameter value object + boundary validation
//! - `perturb`: pure quota-shock / preference-shift transforms
//! - `sampler`: the compound Dirichlet→Multinomial engine
//! - `aggregate`: mean and percentile reduction
//! - `scenario`: the orchestrator wiring loader → perturb → sample → emit

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod aggregate;
pub mod batch;
pub mod output;
pub mod params;
pub mod perturb;
pub mod sampler;
pub mod scenario;

pub use params::{ScenarioParams, ScenarioType};
pub use scenario::{run_scenario, simulate, ScenarioError, ScenarioOutcome};

/// One persisted summary record: the outcome for a single category under a
/// single scenario run. The composite identity is
/// (`scenario_id`, `province`, `discipline`); the set of rows sharing a
/// `scenario_id` is the full scenario result.
///
/// `supply_quota` is the true post-perturbation quota - a quota shock to
/// zero reports zero here even though fill rates divide by a floor of 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRow {
    pub scenario_id: Uuid,
    pub scenario_type: ScenarioType,
    pub scenario_label: Option<String>,
    pub province: String,
    pub discipline: String,
    pub supply_quota: u32,
    pub demand_mean: f64,
    pub fill_rate_mean: f64,
    pub fill_rate_p05: f64,
    pub fill_rate_p95: f64,
    pub iterations: u32,
    pub seed: Option<u64>,
    /// Full parameter set, kept for provenance.
    pub params: ScenarioParams,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}
