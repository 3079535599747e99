//! Runs the Monte Carlo simulation and assembles its results.
mod collector;
pub mod engine;

use std::collections::HashMap;

use rand::Rng;

use crate::expr::evaluate_formula;
use crate::graph::NodeId;
use crate::sampler::{sample_assumption_with, Assumption};
use crate::stats::{self, Percentiles};

pub use engine::{SimulationError, Simulator};

/// The samples and derived statistics of one simulated quantity.
///
/// `samples` holds one value per iteration that produced a finite number,
/// in iteration order. Constructed fresh by each run and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub samples: Vec<f64>,
    pub mean: f64,
    pub std_dev: f64,
    pub percentiles: Percentiles,
}

impl SimulationResult {
    /// Summarizes an already-filtered (finite-only) sample set. An empty
    /// set yields the all-zero summary; callers treat that as "no usable
    /// result".
    pub fn from_samples(samples: Vec<f64>) -> Self {
        let summary = stats::summarize(&samples);
        Self {
            samples,
            mean: summary.mean,
            std_dev: summary.std_dev,
            percentiles: summary.percentiles,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// The full outcome of a graph simulation: the result node's distribution
/// plus the per-node distributions harvested along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSimulationOutcome {
    pub final_result: SimulationResult,
    pub node_results: HashMap<NodeId, SimulationResult>,
}

/// Legacy flat path: simulates a single formula over named assumptions.
///
/// Each iteration draws every assumption once, binds the draws by name,
/// and evaluates `formula`; iterations whose result is not finite are
/// dropped. Uses thread-local randomness.
pub fn run_simulation(
    assumptions: &[Assumption],
    formula: &str,
    iterations: usize,
) -> SimulationResult {
    run_simulation_with_rng(assumptions, formula, iterations, &mut rand::thread_rng())
}

/// [`run_simulation`] with an explicit generator, for reproducible runs.
pub fn run_simulation_with_rng<R: Rng + ?Sized>(
    assumptions: &[Assumption],
    formula: &str,
    iterations: usize,
    rng: &mut R,
) -> SimulationResult {
    let mut samples = Vec::with_capacity(iterations);
    let mut bindings = HashMap::with_capacity(assumptions.len());

    for _ in 0..iterations {
        bindings.clear();
        for assumption in assumptions {
            bindings.insert(assumption.name.clone(), sample_assumption_with(assumption, rng));
        }
        let value = evaluate_formula(formula, &bindings);
        if value.is_finite() {
            samples.push(value);
        }
    }

    SimulationResult::from_samples(samples)
}
