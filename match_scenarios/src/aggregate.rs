//! Reduction of per-iteration draws to per-category summary statistics

use std::collections::BTreeMap;

use warehouse::CategoryKey;

use crate::sampler::SampleSet;

/// Mean and tail statistics for one category across all iterations.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    pub demand_mean: f64,
    pub fill_rate_mean: f64,
    pub fill_rate_p05: f64,
    pub fill_rate_p95: f64,
}

/// Reduce a sample set to per-category summaries. A run with no iterations
/// (empty supply) reduces to an empty map.
pub fn summarize(samples: &SampleSet) -> BTreeMap<CategoryKey, CategorySummary> {
    let mut summary = BTreeMap::new();
    if samples.iterations.is_empty() {
        return summary;
    }

    for (idx, key) in samples.keys.iter().enumerate() {
        let demands: Vec<f64> = samples
            .iterations
            .iter()
            .map(|it| it.demand[idx] as f64)
            .collect();
        let fill_rates: Vec<f64> = samples
            .iterations
            .iter()
            .map(|it| it.fill_rate[idx])
            .collect();

        summary.insert(
            key.clone(),
            CategorySummary {
                demand_mean: mean(&demands),
                fill_rate_mean: mean(&fill_rates),
                fill_rate_p05: percentile(&fill_rates, 5.0),
                fill_rate_p95: percentile(&fill_rates, 95.0),
            },
        );
    }

    summary
}

/// Calculate mean of a slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Linear-interpolation percentile: rank = pct/100 * (n - 1), interpolating
/// between the two surrounding order statistics. One consistent scheme is
/// used for both tails so p05/p95 bracket the bulk of any sample.
pub fn percentile(values: &[f64], pct: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = (pct / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let frac = rank - lower as f64;
    sorted[lower] + frac * (sorted[upper] - sorted[lower])
}
