//! Scenario perturbations
//!
//! Pure transforms from base supply/weights to their perturbed versions.
//! Both leave the input untouched and return a fresh mapping; both apply a
//! conjunctive target filter where an absent or empty target list matches
//! every category.

use std::collections::BTreeMap;

use warehouse::CategoryKey;

fn in_targets(value: &str, targets: Option<&[String]>) -> bool {
    match targets {
        None => true,
        Some(list) => list.is_empty() || list.iter().any(|t| t == value),
    }
}

fn matches_target(
    key: &CategoryKey,
    target_provinces: Option<&[String]>,
    target_disciplines: Option<&[String]>,
) -> bool {
    in_targets(&key.province, target_provinces) && in_targets(&key.discipline, target_disciplines)
}

/// Scale quotas of targeted categories by `multiplier`, rounding half away
/// from zero (`f64::round`). A multiplier of 0.0 is valid and zeroes the
/// targeted quotas. Untargeted categories pass through unchanged.
pub fn apply_quota_shock(
    supply: &BTreeMap<CategoryKey, u32>,
    multiplier: f64,
    target_provinces: Option<&[String]>,
    target_disciplines: Option<&[String]>,
) -> BTreeMap<CategoryKey, u32> {
    supply
        .iter()
        .map(|(key, &quota)| {
            let shocked = if matches_target(key, target_provinces, target_disciplines) {
                (f64::from(quota) * multiplier).round() as u32
            } else {
                quota
            };
            (key.clone(), shocked)
        })
        .collect()
}

/// Scale weights of targeted categories by `(1 + shift_pct)`, floored at
/// zero, then renormalize the whole vector to sum to 1. If the post-shift
/// total is exactly zero the perturbation is discarded and the input weights
/// are returned verbatim.
pub fn apply_preference_shift(
    weights: &BTreeMap<CategoryKey, f64>,
    shift_pct: f64,
    target_provinces: Option<&[String]>,
    target_disciplines: Option<&[String]>,
) -> BTreeMap<CategoryKey, f64> {
    let shifted: BTreeMap<CategoryKey, f64> = weights
        .iter()
        .map(|(key, &weight)| {
            let value = if matches_target(key, target_provinces, target_disciplines) {
                (weight * (1.0 + shift_pct)).max(0.0)
            } else {
                weight
            };
            (key.clone(), value)
        })
        .collect();

    let total: f64 = shifted.values().sum();
    if total == 0.0 {
        return weights.clone();
    }
    shifted.into_iter().map(|(k, v)| (k, v / total)).collect()
}
