//! registry.rs
//! Node and edge storage with stable ids and ordered edges.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::edge::Edge;
use super::node::{
    Comparison, Distribution, FunctionKind, Node, NodeId, NodeMetadata, NodePatch, Operator,
    Parameter, ReduceOp,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Unknown node id {0:?}")]
    UnknownNode(NodeId),
}

/// The estimate graph: a set of typed nodes and directed, optionally
/// port-tagged edges.
///
/// Nodes live in tombstoned slots so that ids stay stable across removals
/// and are never reused. Edges are kept in insertion order; that order is
/// the tie-breaker for untagged port resolution during evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    nodes: Vec<Option<Node>>,
    edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Node Mutation ---

    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(node));
        id
    }

    pub fn add_assumption(
        &mut self,
        name: &str,
        min: f64,
        max: f64,
        distribution: Distribution,
    ) -> NodeId {
        self.add_node(Node::Assumption {
            min,
            max,
            distribution,
            meta: NodeMetadata::named(name),
        })
    }

    pub fn add_constant(&mut self, name: &str, value: f64) -> NodeId {
        self.add_node(Node::Constant { value, meta: NodeMetadata::named(name) })
    }

    pub fn add_operation(&mut self, name: &str, op: Operator) -> NodeId {
        self.add_node(Node::Operation { op, meta: NodeMetadata::named(name) })
    }

    pub fn add_reduce(&mut self, name: &str, op: ReduceOp) -> NodeId {
        self.add_node(Node::Reduce { op, meta: NodeMetadata::named(name) })
    }

    pub fn add_function(
        &mut self,
        name: &str,
        function: FunctionKind,
        parameter: Option<Parameter>,
    ) -> NodeId {
        self.add_node(Node::Function {
            function,
            parameter,
            meta: NodeMetadata::named(name),
        })
    }

    pub fn add_conditional(&mut self, name: &str, comparison: Comparison) -> NodeId {
        self.add_node(Node::Conditional { comparison, meta: NodeMetadata::named(name) })
    }

    pub fn add_clamp(&mut self, name: &str, min: Option<f64>, max: Option<f64>) -> NodeId {
        self.add_node(Node::Clamp { min, max, meta: NodeMetadata::named(name) })
    }

    pub fn add_output(&mut self, name: &str) -> NodeId {
        self.add_node(Node::Output { meta: NodeMetadata::named(name) })
    }

    /// Applies a partial attribute update to an existing node.
    pub fn update_node(&mut self, id: NodeId, patch: &NodePatch) -> Result<(), GraphError> {
        match self.nodes.get_mut(id.index()).and_then(Option::as_mut) {
            Some(node) => {
                patch.apply_to(node);
                Ok(())
            }
            None => Err(GraphError::UnknownNode(id)),
        }
    }

    /// Removes a node and every edge incident to it. Removing an unknown or
    /// already-removed id is a no-op.
    pub fn remove_node(&mut self, id: NodeId) {
        if let Some(slot) = self.nodes.get_mut(id.index()) {
            *slot = None;
        }
        self.edges.retain(|e| e.source != id && e.target != id);
    }

    // --- Edge Mutation ---

    /// Connects `source`'s output to `target`'s input `port`. Appends to the
    /// edge list, preserving insertion order.
    pub fn connect(&mut self, source: NodeId, target: NodeId, port: Option<&str>) {
        self.edges.push(Edge::new(source, target, port));
    }

    /// Removes every edge from `source` into `target`'s `port`.
    pub fn disconnect(&mut self, source: NodeId, target: NodeId, port: Option<&str>) {
        self.edges
            .retain(|e| !(e.source == source && e.target == target && e.port.as_deref() == port));
    }

    // --- Accessors ---

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    /// Iterates live nodes with their ids.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|n| (NodeId::new(i), n)))
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|s| s.is_some()).count()
    }

    /// Number of slots ever allocated, live or not. Dense per-slot tables
    /// used during simulation are sized by this.
    pub(crate) fn slot_count(&self) -> usize {
        self.nodes.len()
    }

    /// The first `Output` node, if any. Exactly one per graph is meaningful;
    /// a graph without one simulates to an empty result.
    pub fn output_node(&self) -> Option<NodeId> {
        self.nodes().find_map(|(id, node)| match node {
            Node::Output { .. } => Some(id),
            _ => None,
        })
    }
}
