//! # Runtime Graph
//!
//! The runtime graph is a directed petgraph of [`RtNode`]s. Each node records
//! its operation, element type, and output dimensions; each edge carries the
//! operand slot it feeds on the target node.
//!
//! The constructors on [`Graph`] are the engine's entire public surface for
//! graph building:
//!
//! - `placeholder` — an external input, fed at run time
//! - `fill` — a constant, one value broadcast over the node's dims
//! - `sigmoid` / `tanh` / `relu` / `softmax` — elementwise unary ops
//! - `add` / `sub` / `mul` — elementwise binary ops
//!
//! Node handles are opaque [`NodeId`]s; callers thread them through without
//! inspecting graph internals.

use petgraph::graph::DiGraph;
use std::fmt;

/// Opaque handle to a node in a [`Graph`].
pub type NodeId = petgraph::graph::NodeIndex;

/// Element type of a node's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    F32,
    F64,
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::F32 => write!(f, "f32"),
            DType::F64 => write!(f, "f64"),
        }
    }
}

/// The operation a runtime node performs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpKind {
    /// External input, supplied through a session feed.
    Placeholder,
    /// Constant: one value broadcast over the node's dims.
    Fill(f32),
    Sigmoid,
    Tanh,
    Relu,
    Softmax,
    Add,
    Sub,
    Mul,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpKind::Placeholder => write!(f, "Placeholder"),
            OpKind::Fill(v) => write!(f, "Fill({})", v),
            OpKind::Sigmoid => write!(f, "Sigmoid"),
            OpKind::Tanh => write!(f, "Tanh"),
            OpKind::Relu => write!(f, "Relu"),
            OpKind::Softmax => write!(f, "Softmax"),
            OpKind::Add => write!(f, "Add"),
            OpKind::Sub => write!(f, "Sub"),
            OpKind::Mul => write!(f, "Mul"),
        }
    }
}

/// A node in the runtime graph.
#[derive(Debug, Clone)]
pub struct RtNode {
    pub kind: OpKind,
    pub dtype: DType,
    /// Output dimension sizes, outermost first.
    pub dims: Vec<usize>,
}

/// A runtime computation graph.
///
/// Edge weights are operand slots: for a binary node, the left operand
/// arrives on slot 0 and the right on slot 1.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    graph: DiGraph<RtNode, usize>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
        }
    }

    /// Add a placeholder node to be fed at run time.
    pub fn placeholder(&mut self, dtype: DType, dims: Vec<usize>) -> NodeId {
        self.graph.add_node(RtNode {
            kind: OpKind::Placeholder,
            dtype,
            dims,
        })
    }

    /// Add a constant node: `value` broadcast over `dims`.
    pub fn fill(&mut self, value: f32, dtype: DType, dims: Vec<usize>) -> NodeId {
        self.graph.add_node(RtNode {
            kind: OpKind::Fill(value),
            dtype,
            dims,
        })
    }

    fn unary(&mut self, kind: OpKind, x: NodeId) -> NodeId {
        let src = &self.graph[x];
        let node = RtNode {
            kind,
            dtype: src.dtype,
            dims: src.dims.clone(),
        };
        let idx = self.graph.add_node(node);
        self.graph.add_edge(x, idx, 0);
        idx
    }

    fn binary(&mut self, kind: OpKind, a: NodeId, b: NodeId) -> NodeId {
        let (lhs, rhs) = (&self.graph[a], &self.graph[b]);
        assert_eq!(
            lhs.dims, rhs.dims,
            "{} operand dims disagree: {:?} vs {:?}",
            kind, lhs.dims, rhs.dims
        );
        assert_eq!(
            lhs.dtype, rhs.dtype,
            "{} operand dtypes disagree: {} vs {}",
            kind, lhs.dtype, rhs.dtype
        );
        let node = RtNode {
            kind,
            dtype: lhs.dtype,
            dims: lhs.dims.clone(),
        };
        let idx = self.graph.add_node(node);
        self.graph.add_edge(a, idx, 0);
        self.graph.add_edge(b, idx, 1);
        idx
    }

    /// Elementwise logistic sigmoid of `x`.
    pub fn sigmoid(&mut self, x: NodeId) -> NodeId {
        self.unary(OpKind::Sigmoid, x)
    }

    /// Elementwise hyperbolic tangent of `x`.
    pub fn tanh(&mut self, x: NodeId) -> NodeId {
        self.unary(OpKind::Tanh, x)
    }

    /// Elementwise ReLU of `x`.
    pub fn relu(&mut self, x: NodeId) -> NodeId {
        self.unary(OpKind::Relu, x)
    }

    /// Softmax of `x` over its last axis.
    pub fn softmax(&mut self, x: NodeId) -> NodeId {
        self.unary(OpKind::Softmax, x)
    }

    /// Elementwise `a + b`. Operand dims and dtypes must agree.
    pub fn add(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.binary(OpKind::Add, a, b)
    }

    /// Elementwise `a - b`. Operand dims and dtypes must agree.
    pub fn sub(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.binary(OpKind::Sub, a, b)
    }

    /// Elementwise `a * b`. Operand dims and dtypes must agree.
    pub fn mul(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.binary(OpKind::Mul, a, b)
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&RtNode> {
        self.graph.node_weight(id)
    }

    /// Iterate over all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &RtNode> {
        self.graph.node_weights()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Count nodes whose op kind satisfies a predicate.
    pub fn count(&self, pred: impl Fn(&OpKind) -> bool) -> usize {
        self.nodes().filter(|n| pred(&n.kind)).count()
    }

    pub(crate) fn inner(&self) -> &DiGraph<RtNode, usize> {
        &self.graph
    }
}
