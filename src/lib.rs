//! Core engine for Fermi-estimate models: a directed graph of uncertain
//! quantities evaluated by Monte Carlo simulation.
//!
//! The editor and assistant build a [`Graph`] of typed nodes (assumptions,
//! constants, operations, functions, conditionals, clamps, and one result
//! sink) connected by optionally port-tagged edges. [`Simulator`] draws one
//! sample per node per iteration by recursive dependency resolution with
//! per-iteration memoization and summarizes every node's sample set into
//! mean, standard deviation, and nearest-rank percentiles.
//!
//! All evaluation failure is representable as data: domain errors surface
//! as NaN and are filtered at collection time, unwired inputs default to 0,
//! and empty sample sets summarize to zero. The only hard error is a
//! cyclic graph, which is rejected before any iteration runs.

pub mod expr;
pub mod functions;
pub mod graph;
pub mod sampler;
pub mod simulation;
pub mod stats;

// Re-export key types for convenient access
pub use expr::{evaluate_formula, Expr, ExprError};
pub use graph::{
    Comparison, Distribution, Edge, FunctionKind, Graph, GraphError, Node, NodeId, NodeMetadata,
    NodePatch, Operator, Parameter, ReduceOp,
};
pub use sampler::{sample_assumption, sample_assumption_with, Assumption};
pub use simulation::{
    run_simulation, run_simulation_with_rng, GraphSimulationOutcome, SimulationError,
    SimulationResult, Simulator,
};
pub use stats::{summarize, Percentiles, Summary};
