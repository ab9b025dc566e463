//! Scenario parameter value object
//!
//! Parameters are immutable inputs to one simulation run. Validation lives
//! here but is a *boundary* concern: callers (API layer, experiment runner)
//! validate before invoking the engine, and the engine assumes it was done.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Inclusive iteration bounds accepted at the boundary.
pub const MIN_ITERATIONS: u32 = 50;
pub const MAX_ITERATIONS: u32 = 2000;

/// Largest magnitude accepted for a preference shift.
pub const MAX_SHIFT_PCT: f64 = 0.9;

/// Which perturbation a scenario applies; `Baseline` applies none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioType {
    Baseline,
    QuotaShock,
    PreferenceShift,
}

impl ScenarioType {
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioType::Baseline => "baseline",
            ScenarioType::QuotaShock => "quota_shock",
            ScenarioType::PreferenceShift => "preference_shift",
        }
    }
}

impl fmt::Display for ScenarioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything one simulation run needs to know, deserializable from a TOML
/// scenario table or a JSON request body with per-field defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParams {
    pub scenario_type: ScenarioType,
    #[serde(default)]
    pub scenario_label: Option<String>,
    /// Scales the total applicant pool; 1.0 keeps demand equal to supply.
    #[serde(default = "default_multiplier")]
    pub demand_multiplier: f64,
    /// Scales quotas of targeted categories; only read under `QuotaShock`.
    #[serde(default = "default_multiplier")]
    pub quota_multiplier: f64,
    /// Provinces a shock/shift applies to; absent or empty means all.
    #[serde(default)]
    pub target_provinces: Option<Vec<String>>,
    /// Disciplines a shock/shift applies to; absent or empty means all.
    #[serde(default)]
    pub target_disciplines: Option<Vec<String>>,
    /// Relative weight change for targeted categories; only read under
    /// `PreferenceShift`.
    #[serde(default = "default_shift_pct")]
    pub shift_pct: f64,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Fixes the draw sequence; absent means seeded from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_persist")]
    pub persist: bool,
}

fn default_multiplier() -> f64 {
    1.0
}

fn default_shift_pct() -> f64 {
    0.15
}

fn default_iterations() -> u32 {
    300
}

fn default_persist() -> bool {
    true
}

impl Default for ScenarioParams {
    fn default() -> Self {
        ScenarioParams {
            scenario_type: ScenarioType::Baseline,
            scenario_label: None,
            demand_multiplier: default_multiplier(),
            quota_multiplier: default_multiplier(),
            target_provinces: None,
            target_disciplines: None,
            shift_pct: default_shift_pct(),
            iterations: default_iterations(),
            seed: None,
            persist: default_persist(),
        }
    }
}

impl ScenarioParams {
    /// Unperturbed demand against current supply.
    pub fn baseline() -> Self {
        ScenarioParams {
            scenario_label: Some("Baseline demand/supply".to_string()),
            ..Self::default()
        }
    }

    /// Scale quotas of every category by `multiplier`.
    pub fn quota_shock(multiplier: f64) -> Self {
        ScenarioParams {
            scenario_type: ScenarioType::QuotaShock,
            scenario_label: Some(format!("Quota shock {multiplier}x")),
            quota_multiplier: multiplier,
            ..Self::default()
        }
    }

    /// Shift preference weight of the given provinces by `shift_pct`.
    pub fn preference_shift(shift_pct: f64, target_provinces: Vec<String>) -> Self {
        ScenarioParams {
            scenario_type: ScenarioType::PreferenceShift,
            scenario_label: Some(format!(
                "Preference shift {:+.0}% to {}",
                shift_pct * 100.0,
                target_provinces.join("/")
            )),
            target_provinces: Some(target_provinces),
            shift_pct,
            ..Self::default()
        }
    }

    /// The canonical scenario battery the rebuild operation runs.
    pub fn default_scenarios() -> Vec<Self> {
        vec![
            Self::baseline(),
            Self::quota_shock(0.8),
            Self::preference_shift(0.15, vec!["ON".to_string(), "QC".to_string()]),
        ]
    }

    /// Boundary validation. The engine itself does not re-check these
    /// bounds; feeding it unvalidated parameters is a caller bug.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.iterations < MIN_ITERATIONS || self.iterations > MAX_ITERATIONS {
            return Err(ParamsError::IterationsOutOfRange(self.iterations));
        }
        if self.demand_multiplier < 0.0 {
            return Err(ParamsError::NegativeDemandMultiplier(
                self.demand_multiplier,
            ));
        }
        if self.quota_multiplier < 0.0 {
            return Err(ParamsError::NegativeQuotaMultiplier(self.quota_multiplier));
        }
        if self.scenario_type == ScenarioType::PreferenceShift
            && !(-MAX_SHIFT_PCT..=MAX_SHIFT_PCT).contains(&self.shift_pct)
        {
            return Err(ParamsError::ShiftOutOfRange(self.shift_pct));
        }
        Ok(())
    }
}

/// Rejection reasons for out-of-range parameters.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ParamsError {
    #[error("iterations must be between {MIN_ITERATIONS} and {MAX_ITERATIONS}, got {0}")]
    IterationsOutOfRange(u32),

    #[error("demand_multiplier must be non-negative, got {0}")]
    NegativeDemandMultiplier(f64),

    #[error("quota_multiplier must be non-negative, got {0}")]
    NegativeQuotaMultiplier(f64),

    #[error("shift_pct must be between -{MAX_SHIFT_PCT} and {MAX_SHIFT_PCT}, got {0}")]
    ShiftOutOfRange(f64),
}
