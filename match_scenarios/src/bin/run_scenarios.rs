//! Batch Scenario Runner
//!
//! Executes a set of simulation scenarios described by a TOML configuration
//! file: one supply source, one output directory, any number of scenario
//! tables. Runs simulate in parallel; persistence and file export happen
//! afterwards, in input order.
//!
//! Usage:
//!   cargo run --release --bin run_scenarios -- experiments/default_battery.toml

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Deserialize;

use match_scenarios::batch::run_batch;
use match_scenarios::output::ScenarioOutput;
use match_scenarios::scenario::ScenarioOutcome;
use match_scenarios::{ScenarioParams, ScenarioRow};
use warehouse::{CsvSupplySource, JsonScenarioStore, ScenarioStore};

/// Top-level experiment configuration
#[derive(Debug, Clone, Deserialize)]
struct ExperimentConfig {
    experiment: ExperimentMetadata,
    supply: SupplySettings,
    output: OutputSettings,
    scenarios: Vec<ScenarioParams>,
}

#[derive(Debug, Clone, Deserialize)]
struct ExperimentMetadata {
    name: String,
    description: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SupplySettings {
    csv_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
struct OutputSettings {
    dir: PathBuf,
    #[serde(default = "default_true")]
    write_rows_csv: bool,
    #[serde(default = "default_true")]
    write_summary_json: bool,
    /// Directory for the JSON scenario store; scenarios with `persist = true`
    /// land here. Absent means nothing is persisted.
    #[serde(default)]
    store_dir: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <experiment_config.toml>", args[0]);
        eprintln!("Example: {} experiments/default_battery.toml", args[0]);
        std::process::exit(1);
    }

    let config_path = &args[1];
    println!("=== Match Scenario Batch Runner ===\n");
    println!("Loading experiment config: {config_path}\n");

    let config_str = fs::read_to_string(config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {e}");
        std::process::exit(1);
    });

    let config: ExperimentConfig = toml::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing TOML config: {e}");
        std::process::exit(1);
    });

    println!("Experiment: {}", config.experiment.name);
    println!("Description: {}", config.experiment.description);
    println!("Scenarios: {}\n", config.scenarios.len());

    // boundary validation happens here, before any engine work
    for (idx, params) in config.scenarios.iter().enumerate() {
        if let Err(err) = params.validate() {
            eprintln!("Scenario {} is invalid: {err}", idx + 1);
            std::process::exit(1);
        }
    }

    let output_base = config.output.dir.join(&config.experiment.name);
    fs::create_dir_all(&output_base).unwrap_or_else(|e| {
        eprintln!("Error creating output directory: {e}");
        std::process::exit(1);
    });

    let source = CsvSupplySource::new(&config.supply.csv_path);

    let start = Instant::now();
    println!("Running {} scenarios...\n", config.scenarios.len());
    let results = run_batch(&source, &config.scenarios);

    let mut store = config.output.store_dir.as_ref().map(|dir| {
        JsonScenarioStore::open(dir).unwrap_or_else(|e| {
            eprintln!("Error opening scenario store: {e}");
            std::process::exit(1);
        })
    });

    let mut failures = 0;
    let mut total_rows = 0;
    for (params, result) in config.scenarios.iter().zip(results) {
        let label = params
            .scenario_label
            .clone()
            .unwrap_or_else(|| params.scenario_type.to_string());

        match result {
            Ok(outcome) => {
                total_rows += outcome.rows.len();
                println!(
                    "  {} ✓ {} rows, mean demand {:.1}",
                    label,
                    outcome.rows.len(),
                    outcome.total_demand_mean()
                );

                if params.persist {
                    if let Some(store) = store.as_mut() {
                        persist_outcome(store, &outcome);
                    }
                }

                write_outputs(&outcome, params, &output_base, &config.output, &label);
            }
            Err(err) => {
                failures += 1;
                eprintln!("  {label} ✗ {err}");
            }
        }
    }

    let elapsed = start.elapsed();
    println!(
        "\n✓ {} scenarios complete in {:.1}s ({} rows, {} failures)",
        config.scenarios.len(),
        elapsed.as_secs_f64(),
        total_rows,
        failures
    );
    println!("Results saved to: {}", output_base.display());

    if failures > 0 {
        std::process::exit(1);
    }
}

fn persist_outcome(store: &mut JsonScenarioStore, outcome: &ScenarioOutcome) {
    let rows: Vec<ScenarioRow> = outcome.rows.clone();
    store
        .replace_scenario(outcome.scenario_id, rows)
        .unwrap_or_else(|e| {
            eprintln!("Error persisting scenario {}: {e}", outcome.scenario_id);
            std::process::exit(1);
        });
}

fn write_outputs(
    outcome: &ScenarioOutcome,
    params: &ScenarioParams,
    output_base: &Path,
    settings: &OutputSettings,
    label: &str,
) {
    if !settings.write_rows_csv && !settings.write_summary_json {
        return;
    }

    let slug: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    let dir = output_base.join(slug);
    fs::create_dir_all(&dir).unwrap_or_else(|e| {
        eprintln!("Error creating scenario output directory: {e}");
        std::process::exit(1);
    });

    let output = ScenarioOutput::from_outcome(outcome, params);

    if settings.write_rows_csv {
        output
            .write_rows_csv(dir.join("scenario_rows.csv"))
            .unwrap_or_else(|e| {
                eprintln!("Error writing rows CSV: {e}");
                std::process::exit(1);
            });
    }

    if settings.write_summary_json {
        output
            .write_summary_json(dir.join("summary.json"))
            .unwrap_or_else(|e| {
                eprintln!("Error writing summary JSON: {e}");
                std::process::exit(1);
            });
    }
}
