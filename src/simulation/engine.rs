//! engine.rs
//! The per-iteration graph evaluator.

use std::collections::HashMap;

use rand::Rng;
use smallvec::SmallVec;
use thiserror::Error;

use crate::functions;
use crate::graph::{topology, Graph, Node, NodeId, Operator, ReduceOp};
use crate::sampler;
use crate::simulation::collector::SampleCollector;
use crate::simulation::{GraphSimulationOutcome, SimulationResult};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    /// The graph contains a dependency cycle and cannot be evaluated.
    /// Detected before any iteration runs; the recursive evaluator relies
    /// on the graph being a DAG.
    #[error("Cycle detected involving node '{node_name}'")]
    CycleDetected { node_id: NodeId, node_name: String },
}

/// An incoming edge resolved at setup: the supplying node plus the port
/// tag it targets. Borrowed from the graph's edge list, in insertion order.
#[derive(Debug, Clone, Copy)]
struct InEdge<'a> {
    source: NodeId,
    port: Option<&'a str>,
}

type InEdges<'a> = SmallVec<[InEdge<'a>; 4]>;

/// Evaluates an estimate graph by Monte Carlo simulation.
///
/// Borrows the graph for the simulator's lifetime; the graph is never
/// mutated by a run. Each iteration owns a fresh memo cache, so every node
/// is computed exactly once per iteration regardless of fan-out -- one
/// sample draw per assumption per iteration, not one per edge.
pub struct Simulator<'a> {
    graph: &'a Graph,
    incoming: Vec<InEdges<'a>>,
}

impl<'a> Simulator<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        // Dense per-slot incoming lists, built once from the ordered edge
        // list. Insertion order is preserved; it breaks ties for untagged
        // ports.
        let mut incoming: Vec<InEdges<'a>> = vec![SmallVec::new(); graph.slot_count()];
        for edge in graph.edges() {
            if let Some(slot) = incoming.get_mut(edge.target.index()) {
                slot.push(InEdge {
                    source: edge.source,
                    port: edge.port.as_deref(),
                });
            }
        }
        Self { graph, incoming }
    }

    /// Runs the full simulation with thread-local randomness.
    pub fn run(&self, iterations: usize) -> Result<GraphSimulationOutcome, SimulationError> {
        self.run_with_rng(iterations, &mut rand::thread_rng())
    }

    /// Runs the full simulation with the given generator. Seed it for
    /// reproducible results.
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        iterations: usize,
        rng: &mut R,
    ) -> Result<GraphSimulationOutcome, SimulationError> {
        topology::check_acyclic(self.graph).map_err(|node_id| {
            let node_name = self
                .graph
                .node(node_id)
                .map(|n| n.meta().name.clone())
                .unwrap_or_default();
            SimulationError::CycleDetected { node_id, node_name }
        })?;

        // A graph without a result sink produces the degenerate empty
        // outcome; callers treat empty samples as "no usable result".
        let Some(output) = self.graph.output_node() else {
            return Ok(GraphSimulationOutcome {
                final_result: SimulationResult::from_samples(Vec::new()),
                node_results: HashMap::new(),
            });
        };

        let mut collector = SampleCollector::new();
        for _ in 0..iterations {
            let mut cache = HashMap::new();
            self.evaluate(output, &mut cache, rng);
            collector.record_iteration(&cache);
        }

        let node_results: HashMap<NodeId, SimulationResult> = collector
            .into_samples()
            .into_iter()
            .map(|(id, samples)| (id, SimulationResult::from_samples(samples)))
            .collect();
        let final_result = node_results
            .get(&output)
            .cloned()
            .unwrap_or_else(|| SimulationResult::from_samples(Vec::new()));

        Ok(GraphSimulationOutcome { final_result, node_results })
    }

    /// Computes one node's value for the current iteration, memoized in
    /// `cache`. Recursion terminates because the graph was checked acyclic.
    fn evaluate<R: Rng + ?Sized>(
        &self,
        node_id: NodeId,
        cache: &mut HashMap<NodeId, f64>,
        rng: &mut R,
    ) -> f64 {
        if let Some(&value) = cache.get(&node_id) {
            return value;
        }

        // An edge may reference a slot whose node was never created by this
        // graph's API; treat it like an unwired input.
        let Some(node) = self.graph.node(node_id) else {
            return 0.0;
        };
        let inputs = &self.incoming[node_id.index()];

        let value = match node {
            Node::Assumption { min, max, distribution, .. } => {
                sampler::sample(*distribution, *min, *max, rng)
            }
            Node::Constant { value, .. } => *value,
            Node::Operation { op, .. } => {
                let (a_edge, b_edge) = binary_operands(inputs);
                let a = self.evaluate_input(a_edge, cache, rng);
                let b = self.evaluate_input(b_edge, cache, rng);
                match op {
                    Operator::Multiply => a * b,
                    // Division by zero yields 0, not infinity; the policy
                    // shared with the expression evaluator.
                    Operator::Divide => {
                        if b == 0.0 {
                            0.0
                        } else {
                            a / b
                        }
                    }
                    Operator::Add => a + b,
                    Operator::Subtract => a - b,
                }
            }
            Node::Reduce { op, .. } => {
                let values = inputs
                    .iter()
                    .map(|edge| self.evaluate(edge.source, cache, rng));
                match op {
                    ReduceOp::Sum => values.fold(0.0, |acc, v| acc + v),
                    ReduceOp::Product => values.fold(1.0, |acc, v| acc * v),
                }
            }
            Node::Function { function, parameter, .. } => {
                let (primary_edge, secondary_edge) = function_operands(inputs);
                let primary = self.evaluate_input(primary_edge, cache, rng);
                let secondary =
                    secondary_edge.map(|edge| self.evaluate(edge.source, cache, rng));
                functions::apply(*function, primary, secondary, parameter.as_ref())
            }
            Node::Conditional { comparison, .. } => {
                let a = self.evaluate_port(inputs, "a", cache, rng);
                let b = self.evaluate_port(inputs, "b", cache, rng);
                let then_value = self.evaluate_port(inputs, "then", cache, rng);
                let else_value = self.evaluate_port(inputs, "else", cache, rng);
                if functions::compare(*comparison, a, b) {
                    then_value
                } else {
                    else_value
                }
            }
            Node::Clamp { min, max, .. } => {
                let mut value = self.evaluate_input(inputs.first().copied(), cache, rng);
                if let Some(lo) = min {
                    value = value.max(*lo);
                }
                if let Some(hi) = max {
                    value = value.min(*hi);
                }
                value
            }
            Node::Output { .. } => self.evaluate_input(inputs.first().copied(), cache, rng),
        };

        cache.insert(node_id, value);
        value
    }

    /// Evaluates an optional input edge; unwired inputs default to 0.
    fn evaluate_input<R: Rng + ?Sized>(
        &self,
        edge: Option<InEdge<'a>>,
        cache: &mut HashMap<NodeId, f64>,
        rng: &mut R,
    ) -> f64 {
        match edge {
            Some(edge) => self.evaluate(edge.source, cache, rng),
            None => 0.0,
        }
    }

    /// Evaluates the edge wired to a named port; unwired ports default to 0.
    fn evaluate_port<R: Rng + ?Sized>(
        &self,
        inputs: &InEdges<'a>,
        tag: &str,
        cache: &mut HashMap<NodeId, f64>,
        rng: &mut R,
    ) -> f64 {
        let edge = inputs.iter().find(|e| e.port == Some(tag)).copied();
        self.evaluate_input(edge, cache, rng)
    }
}

/// Resolves a binary node's operands: the edge tagged `"a"` (or the first
/// edge, by insertion order) is the left operand, the first remaining edge
/// the right. Edges beyond the second meaningful one are ignored.
fn binary_operands<'a>(inputs: &InEdges<'a>) -> (Option<InEdge<'a>>, Option<InEdge<'a>>) {
    let a_idx = inputs
        .iter()
        .position(|e| e.port == Some("a"))
        .or(if inputs.is_empty() { None } else { Some(0) });
    let b_idx = a_idx.and_then(|a| (0..inputs.len()).find(|&i| i != a));
    (
        a_idx.map(|i| inputs[i]),
        b_idx.map(|i| inputs[i]),
    )
}

/// Resolves a function node's inputs: port `"a"`, then `"input"`, then the
/// first edge supplies the primary; any remaining edge is the secondary
/// (only meaningful for min/max).
fn function_operands<'a>(inputs: &InEdges<'a>) -> (Option<InEdge<'a>>, Option<InEdge<'a>>) {
    let primary_idx = inputs
        .iter()
        .position(|e| e.port == Some("a"))
        .or_else(|| inputs.iter().position(|e| e.port == Some("input")))
        .or(if inputs.is_empty() { None } else { Some(0) });
    let secondary_idx = primary_idx.and_then(|p| (0..inputs.len()).find(|&i| i != p));
    (
        primary_idx.map(|i| inputs[i]),
        secondary_idx.map(|i| inputs[i]),
    )
}
