//! Scenario orchestration
//!
//! One run walks load supply → derive weights → perturb → sample → aggregate
//! → emit, minting a fresh scenario identity at emission and optionally
//! handing the rows to a store. Collaborators are injected so concurrent
//! runs against different warehouses and stores are possible and testable
//! in isolation.
//!
//! Precondition: parameters were validated at the boundary
//! (`ScenarioParams::validate`); the orchestrator does not re-check them.

use std::collections::BTreeMap;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;
use warehouse::{
    load_supply, CategoryKey, ScenarioStore, StoreError, SupplyError, SupplySource,
};

use crate::aggregate;
use crate::params::{ScenarioParams, ScenarioType};
use crate::perturb;
use crate::sampler::{self, SamplerConfig};
use crate::ScenarioRow;

/// A run fails only when a collaborator fails; the failure propagates
/// unchanged, with no retry.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("supply load failed")]
    Supply(#[from] SupplyError),

    #[error("scenario persistence failed")]
    Store(#[from] StoreError),
}

/// What one run returns to its caller: the minted identity and one row per
/// category, ordered by category key.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub scenario_id: Uuid,
    pub rows: Vec<ScenarioRow>,
}

impl ScenarioOutcome {
    /// Total pool the run distributed, recovered from the rows.
    pub fn total_demand_mean(&self) -> f64 {
        self.rows.iter().map(|r| r.demand_mean).sum()
    }
}

/// Run one simulation without persisting anything.
///
/// An empty supply table yields an empty row list; the scenario identity is
/// still minted.
pub fn simulate<S>(source: &S, params: &ScenarioParams) -> Result<ScenarioOutcome, ScenarioError>
where
    S: SupplySource + ?Sized,
{
    let base_supply = load_supply(source)?;

    let mut supply = base_supply.clone();
    let mut weights: BTreeMap<CategoryKey, f64> = base_supply
        .iter()
        .map(|(k, &v)| (k.clone(), f64::from(v)))
        .collect();

    match params.scenario_type {
        ScenarioType::Baseline => {}
        ScenarioType::QuotaShock => {
            supply = perturb::apply_quota_shock(
                &base_supply,
                params.quota_multiplier,
                params.target_provinces.as_deref(),
                params.target_disciplines.as_deref(),
            );
        }
        ScenarioType::PreferenceShift => {
            weights = perturb::apply_preference_shift(
                &weights,
                params.shift_pct,
                params.target_provinces.as_deref(),
                params.target_disciplines.as_deref(),
            );
        }
    }

    let mut rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let config = SamplerConfig::for_run(&supply, params.demand_multiplier, params.iterations);
    let samples = sampler::run_iterations(&supply, &weights, &config, &mut rng);
    let summary = aggregate::summarize(&samples);

    let scenario_id = Uuid::new_v4();
    let created_at = Utc::now().to_rfc3339();

    let rows = summary
        .into_iter()
        .map(|(key, stats)| ScenarioRow {
            scenario_id,
            scenario_type: params.scenario_type,
            scenario_label: params.scenario_label.clone(),
            supply_quota: supply[&key],
            province: key.province,
            discipline: key.discipline,
            demand_mean: stats.demand_mean,
            fill_rate_mean: stats.fill_rate_mean,
            fill_rate_p05: stats.fill_rate_p05,
            fill_rate_p95: stats.fill_rate_p95,
            iterations: params.iterations,
            seed: params.seed,
            params: params.clone(),
            created_at: created_at.clone(),
        })
        .collect();

    Ok(ScenarioOutcome { scenario_id, rows })
}

/// Run one simulation and, when `params.persist` is set, replace the store's
/// rows for the fresh scenario identity with the run's rows (all or
/// nothing).
pub fn run_scenario<S, T>(
    source: &S,
    store: &mut T,
    params: &ScenarioParams,
) -> Result<ScenarioOutcome, ScenarioError>
where
    S: SupplySource + ?Sized,
    T: ScenarioStore<ScenarioRow> + ?Sized,
{
    let outcome = simulate(source, params)?;
    if params.persist {
        store.replace_scenario(outcome.scenario_id, outcome.rows.clone())?;
    }
    Ok(outcome)
}

/// Wipe the store and re-run the canonical scenario battery, returning the
/// total number of rows written.
pub fn rebuild_default_scenarios<S, T>(source: &S, store: &mut T) -> Result<usize, ScenarioError>
where
    S: SupplySource + ?Sized,
    T: ScenarioStore<ScenarioRow> + ?Sized,
{
    store.clear()?;
    let mut total_rows = 0;
    for params in ScenarioParams::default_scenarios() {
        let outcome = run_scenario(source, store, &params)?;
        total_rows += outcome.rows.len();
    }
    Ok(total_rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use warehouse::{InMemoryScenarioStore, InMemorySupplySource, ProgramRecord};

    fn seeded_source() -> InMemorySupplySource {
        InMemorySupplySource::new(vec![
            ProgramRecord::new(Some("ON"), "Family Medicine", Some(5)),
            ProgramRecord::new(Some("QC"), "Internal Medicine", Some(5)),
        ])
    }

    #[test]
    fn test_rows_are_ordered_by_category_key() {
        let source = InMemorySupplySource::new(vec![
            ProgramRecord::new(Some("QC"), "Internal Medicine", Some(3)),
            ProgramRecord::new(Some("ON"), "Psychiatry", Some(2)),
            ProgramRecord::new(Some("ON"), "Family Medicine", Some(4)),
        ]);
        let params = ScenarioParams {
            seed: Some(1),
            iterations: 50,
            ..Default::default()
        };

        let outcome = simulate(&source, &params).unwrap();

        let keys: Vec<(String, String)> = outcome
            .rows
            .iter()
            .map(|r| (r.province.clone(), r.discipline.clone()))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_identity_is_fresh_per_run() {
        let source = seeded_source();
        let params = ScenarioParams {
            seed: Some(42),
            iterations: 50,
            ..Default::default()
        };

        let a = simulate(&source, &params).unwrap();
        let b = simulate(&source, &params).unwrap();

        assert_ne!(a.scenario_id, b.scenario_id);
        for row in &a.rows {
            assert_eq!(row.scenario_id, a.scenario_id);
        }
    }

    #[test]
    fn test_rows_carry_provenance() {
        let source = seeded_source();
        let params = ScenarioParams {
            scenario_label: Some("provenance check".to_string()),
            seed: Some(42),
            iterations: 50,
            ..Default::default()
        };

        let outcome = simulate(&source, &params).unwrap();

        for row in &outcome.rows {
            assert_eq!(row.iterations, 50);
            assert_eq!(row.seed, Some(42));
            assert_eq!(row.scenario_label.as_deref(), Some("provenance check"));
            assert_eq!(row.params, params);
            assert!(!row.created_at.is_empty());
        }
    }

    #[test]
    fn test_persist_flag_gates_store_writes() {
        let source = seeded_source();
        let mut store = InMemoryScenarioStore::new();

        let no_persist = ScenarioParams {
            seed: Some(1),
            iterations: 50,
            persist: false,
            ..Default::default()
        };
        run_scenario(&source, &mut store, &no_persist).unwrap();
        assert!(store.is_empty());

        let persist = ScenarioParams {
            seed: Some(1),
            iterations: 50,
            ..Default::default()
        };
        let outcome = run_scenario(&source, &mut store, &persist).unwrap();
        assert_eq!(
            store.fetch_scenario(outcome.scenario_id).unwrap(),
            outcome.rows
        );
    }

    #[test]
    fn test_quota_shock_reports_true_zero_quota() {
        let source = seeded_source();
        let params = ScenarioParams {
            scenario_type: ScenarioType::QuotaShock,
            quota_multiplier: 0.0,
            seed: Some(1),
            iterations: 50,
            ..Default::default()
        };

        let outcome = simulate(&source, &params).unwrap();

        for row in &outcome.rows {
            assert_eq!(row.supply_quota, 0);
        }
    }

    #[test]
    fn test_rebuild_replaces_store_contents() {
        let source = seeded_source();
        let mut store = InMemoryScenarioStore::new();

        // pre-existing rows from an earlier run get wiped
        let stale = ScenarioParams {
            seed: Some(9),
            iterations: 50,
            ..Default::default()
        };
        run_scenario(&source, &mut store, &stale).unwrap();

        let total = rebuild_default_scenarios(&source, &mut store).unwrap();

        // 3 default scenarios x 2 categories
        assert_eq!(total, 6);
        assert_eq!(store.len(), 3);
        assert_eq!(store.total_rows(), 6);
    }
}
