//! Defines the `Edge` type, representing a dependency between two nodes.

use serde::{Deserialize, Serialize};

use super::node::NodeId;

/// A directed dependency from `source`'s output into one of `target`'s
/// input ports.
///
/// The port is an optional string tag (e.g. `"a"`, `"b"`, `"then"`,
/// `"else"`, `"input"`). An untagged edge means "first available / default
/// input". Edge insertion order is significant: when two untagged edges
/// feed a binary node, the first-inserted edge supplies operand `a`, which
/// is load-bearing for subtraction and division.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub port: Option<String>,
}

impl Edge {
    pub fn new(source: NodeId, target: NodeId, port: Option<&str>) -> Self {
        Self {
            source,
            target,
            port: port.map(str::to_string),
        }
    }
}
