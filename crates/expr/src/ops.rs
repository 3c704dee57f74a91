//! # Operator Tags
//!
//! Closed enumerations naming the elementwise operations an expression can
//! apply. Each tag dispatches to exactly one entry point on the runtime
//! [`Graph`]; dispatch is total and has no behavior of its own beyond the
//! delegation.
//!
//! [`BinaryOp`] additionally exposes a stable display name, used only in
//! shape-mismatch diagnostics.

use std::fmt;

use nnexpr_engine::{Graph, NodeId};

/// Elementwise unary operations. Rank- and shape-preserving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Sigmoid,
    Tanh,
    Relu,
    Softmax,
}

impl UnaryOp {
    /// Apply this operation to a compiled node, producing a new node.
    pub fn apply(self, graph: &mut Graph, x: NodeId) -> NodeId {
        match self {
            UnaryOp::Sigmoid => graph.sigmoid(x),
            UnaryOp::Tanh => graph.tanh(x),
            UnaryOp::Relu => graph.relu(x),
            UnaryOp::Softmax => graph.softmax(x),
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Sigmoid => write!(f, "sigmoid"),
            UnaryOp::Tanh => write!(f, "tanh"),
            UnaryOp::Relu => write!(f, "relu"),
            UnaryOp::Softmax => write!(f, "softmax"),
        }
    }
}

/// Elementwise binary operations. Both operands and the result share one
/// shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Plus,
    Minus,
    Times,
}

impl BinaryOp {
    /// The name recorded in shape-mismatch diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Plus => "plus",
            BinaryOp::Minus => "minus",
            BinaryOp::Times => "times",
        }
    }

    /// Apply this operation to two compiled nodes, producing a new node.
    pub fn apply(self, graph: &mut Graph, a: NodeId, b: NodeId) -> NodeId {
        match self {
            BinaryOp::Plus => graph.add(a, b),
            BinaryOp::Minus => graph.sub(a, b),
            BinaryOp::Times => graph.mul(a, b),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
