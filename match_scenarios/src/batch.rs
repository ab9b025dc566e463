//! Parallel execution of independent scenario runs
//!
//! Runs are self-contained: each owns its generator and loads its own
//! warehouse snapshot, so a batch fans out across worker threads without
//! shared mutable state. Results come back in input order. Determinism per
//! run is unaffected by thread count because seeding happens inside the run,
//! never across runs.
//!
//! Persistence stays with the caller: a batch only simulates, and the caller
//! decides which outcomes to hand to a store afterwards. Iterations inside
//! one run stay sequential on the run's own generator.

use rayon::prelude::*;
use warehouse::SupplySource;

use crate::params::ScenarioParams;
use crate::scenario::{self, ScenarioError, ScenarioOutcome};

/// Simulate every parameter set concurrently against one supply source.
pub fn run_batch<S>(
    source: &S,
    runs: &[ScenarioParams],
) -> Vec<Result<ScenarioOutcome, ScenarioError>>
where
    S: SupplySource + Sync + ?Sized,
{
    runs.par_iter()
        .map(|params| scenario::simulate(source, params))
        .collect()
}
