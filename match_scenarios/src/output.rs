//! Result export for analysis
//!
//! Structured export of one scenario's rows to CSV and JSON for downstream
//! analysis in Python (pandas, matplotlib).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::params::{ScenarioParams, ScenarioType};
use crate::scenario::ScenarioOutcome;
use crate::ScenarioRow;
use uuid::Uuid;

/// Top-level container for one scenario's exported results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutput {
    pub metadata: ScenarioMetadata,
    pub rows: Vec<ScenarioRow>,
}

/// Metadata for reproducibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioMetadata {
    pub scenario_id: Uuid,
    pub scenario_type: ScenarioType,
    pub scenario_label: Option<String>,
    pub iterations: u32,
    pub seed: Option<u64>,
    pub params: ScenarioParams,
    pub generated_at: String,
}

impl ScenarioOutput {
    pub fn from_outcome(outcome: &ScenarioOutcome, params: &ScenarioParams) -> Self {
        ScenarioOutput {
            metadata: ScenarioMetadata {
                scenario_id: outcome.scenario_id,
                scenario_type: params.scenario_type,
                scenario_label: params.scenario_label.clone(),
                iterations: params.iterations,
                seed: params.seed,
                params: params.clone(),
                generated_at: chrono::Utc::now().to_rfc3339(),
            },
            rows: outcome.rows.clone(),
        }
    }

    /// Write per-category rows to CSV
    pub fn write_rows_csv<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut wtr = csv::Writer::from_path(path)?;

        wtr.write_record([
            "scenario_id",
            "scenario_type",
            "province",
            "discipline",
            "supply_quota",
            "demand_mean",
            "fill_rate_mean",
            "fill_rate_p05",
            "fill_rate_p95",
            "iterations",
            "seed",
        ])?;

        for row in &self.rows {
            wtr.write_record(&[
                row.scenario_id.to_string(),
                row.scenario_type.to_string(),
                row.province.clone(),
                row.discipline.clone(),
                row.supply_quota.to_string(),
                row.demand_mean.to_string(),
                row.fill_rate_mean.to_string(),
                row.fill_rate_p05.to_string(),
                row.fill_rate_p95.to_string(),
                row.iterations.to_string(),
                row.seed.map(|s| s.to_string()).unwrap_or_default(),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// Write full output (metadata + rows) as pretty JSON
    pub fn write_summary_json<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Write all outputs to a directory
    ///
    /// Creates:
    /// - scenario_rows.csv
    /// - summary.json
    pub fn write_all<P: AsRef<Path>>(&self, dir: P) -> Result<(), Box<dyn std::error::Error>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        self.write_rows_csv(dir.join("scenario_rows.csv"))?;
        self.write_summary_json(dir.join("summary.json"))?;

        Ok(())
    }
}
