//! Defines the core data structures for the estimate graph.
pub mod edge;
pub mod node;
pub mod registry;
pub mod topology;

// Re-export key types for convenient access
pub use edge::Edge;
pub use node::{
    Comparison, Distribution, FunctionKind, Node, NodeId, NodeMetadata, NodePatch, Operator,
    Parameter, ReduceOp,
};
pub use registry::{Graph, GraphError};
