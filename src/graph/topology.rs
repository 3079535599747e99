//! topology.rs
//! Structural checks run before simulation.

use super::node::NodeId;
use super::registry::Graph;

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    None,
    Visiting, // Used for cycle detection
    Visited,
}

/// Verifies the graph is a DAG.
///
/// A cyclic graph would send the per-iteration evaluator into unbounded
/// recursion, so simulation rejects it up front. Returns the id of a node
/// on the first cycle found.
///
/// Uses a DFS with a tri-state visit mark: a back-edge into a node still on
/// the recursion stack is a cycle.
pub fn check_acyclic(graph: &Graph) -> Result<(), NodeId> {
    let count = graph.slot_count();

    // Dense parent lists indexed by slot, built once from the edge list.
    let mut parents: Vec<Vec<NodeId>> = vec![Vec::new(); count];
    for edge in graph.edges() {
        if let Some(slot) = parents.get_mut(edge.target.index()) {
            slot.push(edge.source);
        }
    }

    let mut state = vec![VisitState::None; count];
    for (id, _) in graph.nodes() {
        if state[id.index()] == VisitState::None {
            visit(id, &parents, &mut state)?;
        }
    }
    Ok(())
}

fn visit(node: NodeId, parents: &[Vec<NodeId>], state: &mut [VisitState]) -> Result<(), NodeId> {
    let idx = node.index();
    if idx >= state.len() {
        // Edge referencing a slot this graph never allocated; nothing to
        // recurse into.
        return Ok(());
    }
    match state[idx] {
        VisitState::Visited => return Ok(()),
        VisitState::Visiting => return Err(node),
        VisitState::None => state[idx] = VisitState::Visiting,
    }

    for &parent in &parents[idx] {
        visit(parent, parents, state)?;
    }

    state[idx] = VisitState::Visited;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::Operator;

    #[test]
    fn test_diamond_is_acyclic() {
        // A feeds B and C, both feed D.
        let mut g = Graph::new();
        let a = g.add_constant("A", 1.0);
        let b = g.add_operation("B", Operator::Add);
        let c = g.add_operation("C", Operator::Add);
        let d = g.add_operation("D", Operator::Add);
        g.connect(a, b, None);
        g.connect(a, c, None);
        g.connect(b, d, Some("a"));
        g.connect(c, d, Some("b"));

        assert!(check_acyclic(&g).is_ok());
    }

    #[test]
    fn test_two_node_cycle_is_rejected() {
        let mut g = Graph::new();
        let a = g.add_operation("A", Operator::Add);
        let b = g.add_operation("B", Operator::Add);
        g.connect(a, b, None);
        g.connect(b, a, None);

        assert!(check_acyclic(&g).is_err());
    }

    #[test]
    fn test_self_loop_is_rejected() {
        let mut g = Graph::new();
        let a = g.add_operation("A", Operator::Add);
        g.connect(a, a, None);

        assert!(check_acyclic(&g).is_err());
    }
}
