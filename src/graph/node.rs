//! Defines the node types of the estimate graph: sources (assumptions and
//! constants), transforms, and the result sink.

use serde::{Deserialize, Serialize};

/// A unique, stable identifier for a node within a graph.
///
/// Ids are slot indices into the owning [`Graph`](crate::graph::Graph) and
/// are never reused after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline(always)]
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    pub fn new(idx: usize) -> Self {
        Self(idx as u32)
    }
}

/// Contains metadata for a node, used for auditing and display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMetadata {
    /// A human-readable name for the quantity (e.g., "Piano tuners in Chicago").
    pub name: String,
}

impl NodeMetadata {
    pub fn named(name: &str) -> Self {
        Self { name: name.to_string() }
    }
}

/// The probability distribution an assumption draws from.
///
/// `(min, max)` are interpreted per kind: as exact bounds for `Uniform`, and
/// as a truncation window for `Normal` and `LogNormal`. The default is
/// `Uniform`, which is what an assumption with no declared distribution uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    #[default]
    Uniform,
    Normal,
    LogNormal,
}

/// The calculation performed by a binary [`Node::Operation`].
///
/// The operand order is significant for `Subtract` and `Divide`: the edge
/// tagged `"a"` (or the first incoming edge) supplies the left operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Multiply,
    Divide,
    Add,
    Subtract,
}

/// The fold performed by an n-ary [`Node::Reduce`] over all incoming edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReduceOp {
    /// Fold with `+`, seeded at 0.
    Sum,
    /// Fold with `*`, seeded at 1.
    Product,
}

/// The named scalar transforms available to a [`Node::Function`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    Sqrt,
    Square,
    /// `x^n`; the exponent comes from [`Parameter::Number`], default 2.
    Pow,
    Exp,
    Ln,
    Log10,
    Log2,
    Abs,
    Ceil,
    Floor,
    Round,
    Sin,
    Cos,
    Tan,
    /// Binary; a missing second input degenerates to the identity.
    Min,
    /// Binary; a missing second input degenerates to the identity.
    Max,
    /// Evaluates a user-supplied expression from [`Parameter::Text`] with
    /// the free variable `x` bound to the node's input.
    Custom,
}

/// The extra attribute a function node may carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Parameter {
    /// A numeric parameter (the exponent for `pow`).
    Number(f64),
    /// An expression string (the body for `custom`).
    Text(String),
}

impl Parameter {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Parameter::Number(n) => Some(*n),
            Parameter::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Parameter::Text(s) => Some(s.as_str()),
            Parameter::Number(_) => None,
        }
    }
}

/// The predicate of a [`Node::Conditional`], applied to ports `a` and `b`.
///
/// Comparisons are exact floating-point comparisons with no tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Neq,
}

/// The primary enum representing a node in the estimate graph.
///
/// A node is the skeleton of the model: it defines logic and relationships
/// but holds no sampled values (those live in the simulation collector).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// An uncertain source quantity, sampled fresh each iteration.
    Assumption {
        min: f64,
        max: f64,
        distribution: Distribution,
        meta: NodeMetadata,
    },
    /// A fixed source value.
    Constant { value: f64, meta: NodeMetadata },
    /// A binary arithmetic operation over ports `a` and `b`.
    Operation { op: Operator, meta: NodeMetadata },
    /// An n-ary fold over every incoming edge.
    Reduce { op: ReduceOp, meta: NodeMetadata },
    /// A unary (or binary, for min/max) scalar transform.
    Function {
        function: FunctionKind,
        parameter: Option<Parameter>,
        meta: NodeMetadata,
    },
    /// Selects between ports `then` and `else` by comparing ports `a` and `b`.
    Conditional { comparison: Comparison, meta: NodeMetadata },
    /// Clips its single input into `[min, max]`, each bound optional.
    Clamp {
        min: Option<f64>,
        max: Option<f64>,
        meta: NodeMetadata,
    },
    /// The result sink; passes through its single input.
    Output { meta: NodeMetadata },
}

impl Node {
    pub fn meta(&self) -> &NodeMetadata {
        match self {
            Node::Assumption { meta, .. }
            | Node::Constant { meta, .. }
            | Node::Operation { meta, .. }
            | Node::Reduce { meta, .. }
            | Node::Function { meta, .. }
            | Node::Conditional { meta, .. }
            | Node::Clamp { meta, .. }
            | Node::Output { meta } => meta,
        }
    }

    fn meta_mut(&mut self) -> &mut NodeMetadata {
        match self {
            Node::Assumption { meta, .. }
            | Node::Constant { meta, .. }
            | Node::Operation { meta, .. }
            | Node::Reduce { meta, .. }
            | Node::Function { meta, .. }
            | Node::Conditional { meta, .. }
            | Node::Clamp { meta, .. }
            | Node::Output { meta } => meta,
        }
    }
}

/// A partial attribute update for an existing node.
///
/// Every field is optional; only fields meaningful for the target node's
/// kind are applied. This is the shape the editor's dialogs and the
/// assistant's update intents are translated into.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePatch {
    pub name: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub distribution: Option<Distribution>,
    pub value: Option<f64>,
    pub op: Option<Operator>,
    pub reduce_op: Option<ReduceOp>,
    pub function: Option<FunctionKind>,
    pub parameter: Option<Parameter>,
    pub comparison: Option<Comparison>,
    /// Clamp bounds; `Some(None)` clears a bound.
    pub clamp_min: Option<Option<f64>>,
    pub clamp_max: Option<Option<f64>>,
}

impl NodePatch {
    /// Applies the patch in place, ignoring fields the node's kind has no
    /// counterpart for.
    pub(crate) fn apply_to(&self, node: &mut Node) {
        if let Some(name) = &self.name {
            node.meta_mut().name = name.clone();
        }
        match node {
            Node::Assumption { min, max, distribution, .. } => {
                if let Some(m) = self.min {
                    *min = m;
                }
                if let Some(m) = self.max {
                    *max = m;
                }
                if let Some(d) = self.distribution {
                    *distribution = d;
                }
            }
            Node::Constant { value, .. } => {
                if let Some(v) = self.value {
                    *value = v;
                }
            }
            Node::Operation { op, .. } => {
                if let Some(o) = self.op {
                    *op = o;
                }
            }
            Node::Reduce { op, .. } => {
                if let Some(o) = self.reduce_op {
                    *op = o;
                }
            }
            Node::Function { function, parameter, .. } => {
                if let Some(f) = self.function {
                    *function = f;
                }
                if let Some(p) = &self.parameter {
                    *parameter = Some(p.clone());
                }
            }
            Node::Conditional { comparison, .. } => {
                if let Some(c) = self.comparison {
                    *comparison = c;
                }
            }
            Node::Clamp { min, max, .. } => {
                if let Some(m) = self.clamp_min {
                    *min = m;
                }
                if let Some(m) = self.clamp_max {
                    *max = m;
                }
            }
            Node::Output { .. } => {}
        }
    }
}
