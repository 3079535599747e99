//! collector.rs
//! Per-node sample accumulation across iterations.

use std::collections::HashMap;

use crate::graph::NodeId;

/// Append-only per-node sample storage.
///
/// This is the only state threaded across iterations. Each iteration's
/// memo cache is drained into it wholesale, which is how intermediate
/// per-node distributions are harvested without a second evaluation pass.
#[derive(Debug, Clone, Default)]
pub(crate) struct SampleCollector {
    samples: HashMap<NodeId, Vec<f64>>,
}

impl SampleCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends one iteration's cache. Non-finite values are dropped per
    /// node, independently: one node's bad sample does not discard other
    /// nodes' samples for the iteration.
    pub(crate) fn record_iteration(&mut self, cache: &HashMap<NodeId, f64>) {
        for (&node_id, &value) in cache {
            if value.is_finite() {
                self.samples.entry(node_id).or_default().push(value);
            }
        }
    }

    pub(crate) fn into_samples(self) -> HashMap<NodeId, Vec<f64>> {
        self.samples
    }
}
