use std::collections::BTreeMap;

use match_scenarios::scenario::{run_scenario, simulate};
use match_scenarios::{ScenarioParams, ScenarioType};
use warehouse::{InMemoryScenarioStore, InMemorySupplySource, ProgramRecord, ScenarioStore};

fn seed_supply() -> InMemorySupplySource {
    InMemorySupplySource::new(vec![
        ProgramRecord::new(Some("ON"), "Family Medicine", Some(5)),
        ProgramRecord::new(Some("QC"), "Internal Medicine", Some(5)),
    ])
}

fn wide_supply() -> InMemorySupplySource {
    InMemorySupplySource::new(vec![
        ProgramRecord::new(Some("ON"), "Family Medicine", Some(12)),
        ProgramRecord::new(Some("ON"), "Internal Medicine", Some(9)),
        ProgramRecord::new(Some("QC"), "Family Medicine", Some(10)),
        ProgramRecord::new(Some("QC"), "Psychiatry", Some(3)),
        ProgramRecord::new(Some("BC"), "Family Medicine", Some(6)),
        ProgramRecord::new(Some("AB"), "Anesthesiology", Some(2)),
    ])
}

fn round4(x: f64) -> f64 {
    (x * 1e4).round() / 1e4
}

/// Rounded (mean, p05, p95) fill-rate triples keyed by category.
fn fill_stats(
    rows: &[match_scenarios::ScenarioRow],
) -> BTreeMap<(String, String), (f64, f64, f64)> {
    rows.iter()
        .map(|r| {
            (
                (r.province.clone(), r.discipline.clone()),
                (
                    round4(r.fill_rate_mean),
                    round4(r.fill_rate_p05),
                    round4(r.fill_rate_p95),
                ),
            )
        })
        .collect()
}

#[test]
fn test_simulation_deterministic_with_explicit_seed() {
    let source = seed_supply();
    let params = ScenarioParams {
        iterations: 200,
        seed: Some(42),
        ..Default::default()
    };

    let a = simulate(&source, &params).unwrap();
    let b = simulate(&source, &params).unwrap();

    assert_eq!(fill_stats(&a.rows), fill_stats(&b.rows));
}

#[test]
fn test_p05_mean_p95_ordering_holds_for_every_row() {
    let source = wide_supply();
    for seed in [1u64, 7, 42] {
        let params = ScenarioParams {
            iterations: 50,
            seed: Some(seed),
            demand_multiplier: 0.9,
            ..Default::default()
        };

        let outcome = simulate(&source, &params).unwrap();
        assert!(!outcome.rows.is_empty());

        for row in &outcome.rows {
            assert!(
                row.fill_rate_p05 <= row.fill_rate_mean + 1e-9
                    && row.fill_rate_mean <= row.fill_rate_p95 + 1e-9,
                "ordering violated for {}/{}: p05={} mean={} p95={}",
                row.province,
                row.discipline,
                row.fill_rate_p05,
                row.fill_rate_mean,
                row.fill_rate_p95
            );
        }
    }
}

#[test]
fn test_quota_shock_zero_yields_zero_fill() {
    let source = seed_supply();
    let params = ScenarioParams {
        scenario_type: ScenarioType::QuotaShock,
        quota_multiplier: 0.0,
        iterations: 50,
        seed: Some(1),
        ..Default::default()
    };

    let outcome = simulate(&source, &params).unwrap();

    assert!(!outcome.rows.is_empty());
    for row in &outcome.rows {
        assert_eq!(row.fill_rate_mean, 0.0);
        assert_eq!(row.supply_quota, 0);
    }
}

#[test]
fn test_preference_shift_moves_demand_toward_targets() {
    let source = seed_supply();

    let base_params = ScenarioParams {
        iterations: 200,
        seed: Some(10),
        persist: false,
        ..Default::default()
    };
    let base = simulate(&source, &base_params).unwrap();

    let shift_params = ScenarioParams {
        scenario_type: ScenarioType::PreferenceShift,
        target_provinces: Some(vec!["ON".to_string()]),
        shift_pct: 0.5,
        iterations: 200,
        seed: Some(10),
        persist: false,
        ..Default::default()
    };
    let shifted = simulate(&source, &shift_params).unwrap();

    let base_on = base.rows.iter().find(|r| r.province == "ON").unwrap();
    let shifted_on = shifted.rows.iter().find(|r| r.province == "ON").unwrap();

    assert!(
        shifted_on.demand_mean > base_on.demand_mean,
        "shifted ON demand {} should exceed baseline {}",
        shifted_on.demand_mean,
        base_on.demand_mean
    );
}

#[test]
fn test_summed_mean_demand_conserves_the_pool() {
    let source = wide_supply();
    let params = ScenarioParams {
        iterations: 200,
        demand_multiplier: 1.2,
        seed: Some(5),
        ..Default::default()
    };

    let outcome = simulate(&source, &params).unwrap();

    // supply totals 42, so the pool is round(42 * 1.2) = 50
    let total: f64 = outcome.rows.iter().map(|r| r.demand_mean).sum();
    assert!(
        (total - 50.0).abs() / 50.0 < 0.01,
        "summed mean demand {total} should approximate the pool of 50"
    );
}

#[test]
fn test_empty_supply_yields_empty_rows_but_mints_identity() {
    let source = InMemorySupplySource::new(vec![]);
    let mut store = InMemoryScenarioStore::new();
    let params = ScenarioParams {
        iterations: 50,
        seed: Some(1),
        ..Default::default()
    };

    let outcome = run_scenario(&source, &mut store, &params).unwrap();

    assert!(outcome.rows.is_empty());
    assert!(!outcome.scenario_id.is_nil());
    // persistence was requested, so the scenario exists with zero rows
    assert_eq!(store.len(), 1);
    assert!(store.fetch_scenario(outcome.scenario_id).unwrap().is_empty());
}

#[test]
fn test_end_to_end_example() {
    let source = seed_supply();
    let params = ScenarioParams {
        iterations: 200,
        seed: Some(42),
        ..Default::default()
    };

    let first = simulate(&source, &params).unwrap();

    assert_eq!(first.rows.len(), 2);
    for row in &first.rows {
        assert_eq!(row.supply_quota, 5);
        assert!((0.0..=1.0).contains(&row.fill_rate_mean));
    }

    let second = simulate(&source, &params).unwrap();
    assert_eq!(fill_stats(&first.rows), fill_stats(&second.rows));
}

#[test]
fn test_unseeded_run_completes() {
    let source = seed_supply();
    let params = ScenarioParams {
        iterations: 50,
        seed: None,
        ..Default::default()
    };

    let outcome = simulate(&source, &params).unwrap();

    assert_eq!(outcome.rows.len(), 2);
    for row in &outcome.rows {
        assert_eq!(row.seed, None);
    }
}

#[test]
fn test_targeted_quota_shock_leaves_other_categories_alone() {
    let source = seed_supply();
    let params = ScenarioParams {
        scenario_type: ScenarioType::QuotaShock,
        quota_multiplier: 2.0,
        target_provinces: Some(vec!["ON".to_string()]),
        iterations: 50,
        seed: Some(3),
        ..Default::default()
    };

    let outcome = simulate(&source, &params).unwrap();

    let on = outcome.rows.iter().find(|r| r.province == "ON").unwrap();
    let qc = outcome.rows.iter().find(|r| r.province == "QC").unwrap();
    assert_eq!(on.supply_quota, 10);
    assert_eq!(qc.supply_quota, 5);
}
