//! Compound Dirichlet→Multinomial demand sampler
//!
//! Models market-level randomness in how a fixed pool of applicants spreads
//! across categories. Each iteration draws a probability vector from a
//! Dirichlet distribution centred on the (perturbed) baseline weights, then
//! draws integer demand counts from a Multinomial over those probabilities.
//!
//! The Dirichlet concentration controls how tightly per-iteration shares
//! cluster around the baseline: higher values mean lower across-iteration
//! variance. The total applicant pool is fixed once per run, so market size
//! is constant while its split varies.
//!
//! Determinism: every draw consumes the caller's generator, and categories
//! are always visited in key order, so an explicit seed reproduces the draw
//! sequence bit-for-bit.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand_distr::{Binomial, Dirichlet, Distribution};
use warehouse::CategoryKey;

/// Default Dirichlet concentration: iteration-level shares cluster fairly
/// tightly around the baseline weights, modeling epistemic rather than
/// adversarial uncertainty in applicant behavior.
pub const DIRICHLET_CONCENTRATION: f64 = 50.0;

/// Smallest concentration entry handed to the Dirichlet. Keeps the
/// distribution constructible when a perturbation drives a weight to zero.
const ALPHA_FLOOR: f64 = 1e-9;

/// Run-level sampling invariants, passed in explicitly so tests can override
/// them without touching module state.
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    pub concentration: f64,
    /// Fixed applicant pool size for every iteration of the run.
    pub total_applicants: u64,
    pub iterations: u32,
}

impl SamplerConfig {
    /// Derive the run config: pool size is the perturbed supply total scaled
    /// by the demand multiplier, rounded half away from zero.
    pub fn for_run(
        supply: &BTreeMap<CategoryKey, u32>,
        demand_multiplier: f64,
        iterations: u32,
    ) -> Self {
        let supply_total: f64 = supply.values().map(|&q| f64::from(q)).sum();
        SamplerConfig {
            concentration: DIRICHLET_CONCENTRATION,
            total_applicants: (supply_total * demand_multiplier).round() as u64,
            iterations,
        }
    }
}

/// Demand counts and fill rates for one iteration, indexed in key order.
#[derive(Debug, Clone)]
pub struct IterationOutcome {
    pub demand: Vec<u64>,
    pub fill_rate: Vec<f64>,
}

/// All iteration outcomes of one run plus the category order they share.
#[derive(Debug, Clone)]
pub struct SampleSet {
    pub keys: Vec<CategoryKey>,
    pub iterations: Vec<IterationOutcome>,
}

/// Draw `config.iterations` independent demand vectors against the perturbed
/// supply. `weights` is read per supply key; a key missing from it counts as
/// zero weight.
///
/// Fill rates divide by `max(1, quota)` so a zeroed quota cannot divide by
/// zero; the true quota still determines what callers report.
pub fn run_iterations(
    supply: &BTreeMap<CategoryKey, u32>,
    weights: &BTreeMap<CategoryKey, f64>,
    config: &SamplerConfig,
    rng: &mut StdRng,
) -> SampleSet {
    let keys: Vec<CategoryKey> = supply.keys().cloned().collect();
    if keys.is_empty() {
        return SampleSet {
            keys,
            iterations: Vec::new(),
        };
    }

    let base_weights: Vec<f64> = keys
        .iter()
        .map(|k| weights.get(k).copied().unwrap_or(0.0))
        .collect();
    let alpha = concentration_vector(&base_weights, config.concentration);

    let quota_for_division: Vec<u64> = keys
        .iter()
        .map(|k| u64::from(supply[k].max(1)))
        .collect();

    let mut iterations = Vec::with_capacity(config.iterations as usize);
    for _ in 0..config.iterations {
        let probs = draw_probabilities(&alpha, rng);
        let demand = draw_demand(config.total_applicants, &probs, rng);

        let fill_rate = demand
            .iter()
            .zip(quota_for_division.iter())
            .map(|(&d, &q)| d.min(q) as f64 / q as f64)
            .collect();

        iterations.push(IterationOutcome { demand, fill_rate });
    }

    SampleSet { keys, iterations }
}

/// Concentration vector: normalized weights scaled by the concentration,
/// floored so every entry is strictly positive. All-zero weights fall back
/// to a uniform vector rather than an undefined one.
fn concentration_vector(weights: &[f64], concentration: f64) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    if total > 0.0 {
        weights
            .iter()
            .map(|&w| (w / total * concentration).max(ALPHA_FLOOR))
            .collect()
    } else {
        let uniform = (concentration / weights.len() as f64).max(ALPHA_FLOOR);
        vec![uniform; weights.len()]
    }
}

/// One Dirichlet draw. A single category has the whole probability mass by
/// definition (the distribution itself needs at least two dimensions).
fn draw_probabilities(alpha: &[f64], rng: &mut StdRng) -> Vec<f64> {
    if alpha.len() == 1 {
        return vec![1.0];
    }
    Dirichlet::new(alpha).unwrap().sample(rng)
}

/// One Multinomial draw as a chain of conditional Binomials: category i
/// receives Binomial(remaining, p_i / remaining_mass) of the still-unplaced
/// applicants, and the final category takes the remainder. This conserves
/// the total exactly.
fn draw_demand(total: u64, probs: &[f64], rng: &mut StdRng) -> Vec<u64> {
    let mut counts = Vec::with_capacity(probs.len());
    let mut remaining = total;
    let mut remaining_mass = 1.0;

    for (i, &p) in probs.iter().enumerate() {
        if i == probs.len() - 1 {
            counts.push(remaining);
            break;
        }
        if remaining == 0 {
            counts.push(0);
            continue;
        }
        let conditional = if remaining_mass > 0.0 {
            (p / remaining_mass).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let draw = Binomial::new(remaining, conditional).unwrap().sample(rng);
        counts.push(draw);
        remaining -= draw;
        remaining_mass -= p;
    }

    counts
}
