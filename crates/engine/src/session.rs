//! # Sessions - Forward Evaluation
//!
//! A [`Session`] owns a finished [`Graph`] and evaluates fetched nodes.
//! Evaluation is restricted to the ancestors of the fetch, ordered with
//! Kahn's algorithm so every operand is computed before its consumer, with
//! one cached [`Tensor`] per visited node.
//!
//! A session is synchronous and not assumed safe for concurrent runs.

use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;
use tracing::{debug, trace};

use crate::graph::{Graph, NodeId, OpKind};
use crate::tensor::Tensor;

/// Failures surfaced while evaluating a graph.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    /// A placeholder reachable from the fetch received no feed.
    #[error("no feed supplied for placeholder {node:?}")]
    MissingFeed { node: NodeId },

    /// A feed's dims disagree with the placeholder it targets.
    #[error("feed dims {got:?} do not match placeholder dims {expected:?}")]
    FeedMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// The fetched or fed node id does not exist in this graph.
    #[error("node {node:?} is not part of this graph")]
    UnknownNode { node: NodeId },
}

/// An execution session over one runtime graph.
#[derive(Debug)]
pub struct Session {
    graph: Graph,
}

impl Session {
    /// Create a session owning `graph`.
    pub fn new(graph: Graph) -> Self {
        Self { graph }
    }

    /// The graph this session executes.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Evaluate `fetch`, supplying `feeds` for placeholder nodes.
    ///
    /// Only the ancestors of `fetch` are evaluated; placeholders outside
    /// that cone may go unfed.
    pub fn run(&self, fetch: NodeId, feeds: &[(NodeId, Tensor)]) -> Result<Tensor, EvalError> {
        let graph = self.graph.inner();
        if graph.node_weight(fetch).is_none() {
            return Err(EvalError::UnknownNode { node: fetch });
        }

        let mut fed: HashMap<NodeId, Tensor> = HashMap::new();
        for (node, tensor) in feeds {
            let weight = graph
                .node_weight(*node)
                .ok_or(EvalError::UnknownNode { node: *node })?;
            if weight.dims != tensor.dims() {
                return Err(EvalError::FeedMismatch {
                    expected: weight.dims.clone(),
                    got: tensor.dims().to_vec(),
                });
            }
            fed.insert(*node, tensor.clone());
        }

        let needed = self.ancestors(fetch);
        debug!(nodes = needed.len(), "evaluating fetch cone");

        let mut values: HashMap<NodeId, Tensor> = HashMap::new();
        for node in self.topo_order(&needed) {
            let value = self.eval_node(node, &fed, &values)?;
            trace!(?node, kind = %graph[node].kind, "evaluated node");
            values.insert(node, value);
        }

        Ok(values
            .remove(&fetch)
            .unwrap_or_else(|| unreachable!("fetch is in its own ancestor cone")))
    }

    /// The fetch node plus everything it transitively depends on.
    fn ancestors(&self, fetch: NodeId) -> HashSet<NodeId> {
        let graph = self.graph.inner();
        let mut seen = HashSet::new();
        let mut stack = vec![fetch];
        while let Some(node) = stack.pop() {
            if seen.insert(node) {
                stack.extend(graph.neighbors_directed(node, Direction::Incoming));
            }
        }
        seen
    }

    /// Kahn's algorithm restricted to `needed`.
    fn topo_order(&self, needed: &HashSet<NodeId>) -> Vec<NodeId> {
        let graph = self.graph.inner();
        let mut in_degree: HashMap<NodeId, usize> = HashMap::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        let mut order = Vec::with_capacity(needed.len());

        for &node in needed {
            let degree = graph
                .neighbors_directed(node, Direction::Incoming)
                .filter(|n| needed.contains(n))
                .count();
            in_degree.insert(node, degree);
            if degree == 0 {
                queue.push_back(node);
            }
        }

        while let Some(node) = queue.pop_front() {
            order.push(node);
            for succ in graph.neighbors_directed(node, Direction::Outgoing) {
                if let Some(deg) = in_degree.get_mut(&succ) {
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(succ);
                    }
                }
            }
        }

        order
    }

    fn eval_node(
        &self,
        node: NodeId,
        fed: &HashMap<NodeId, Tensor>,
        values: &HashMap<NodeId, Tensor>,
    ) -> Result<Tensor, EvalError> {
        let graph = self.graph.inner();
        let weight = &graph[node];

        match weight.kind {
            OpKind::Placeholder => fed
                .get(&node)
                .cloned()
                .ok_or(EvalError::MissingFeed { node }),
            OpKind::Fill(value) => Ok(Tensor::full(weight.dims.clone(), value)),
            OpKind::Sigmoid => Ok(self.operand(node, 0, values).sigmoid()),
            OpKind::Tanh => Ok(self.operand(node, 0, values).tanh()),
            OpKind::Relu => Ok(self.operand(node, 0, values).relu()),
            OpKind::Softmax => Ok(self.operand(node, 0, values).softmax()),
            OpKind::Add => {
                Ok(self.operand(node, 0, values).add(self.operand(node, 1, values)))
            }
            OpKind::Sub => {
                Ok(self.operand(node, 0, values).sub(self.operand(node, 1, values)))
            }
            OpKind::Mul => {
                Ok(self.operand(node, 0, values).mul(self.operand(node, 1, values)))
            }
        }
    }

    /// The already computed value feeding `node` on operand slot `slot`.
    fn operand<'a>(
        &self,
        node: NodeId,
        slot: usize,
        values: &'a HashMap<NodeId, Tensor>,
    ) -> &'a Tensor {
        let graph = self.graph.inner();
        let edge = graph
            .edges_directed(node, Direction::Incoming)
            .find(|e| *e.weight() == slot)
            .unwrap_or_else(|| panic!("node {:?} has no operand on slot {}", node, slot));
        &values[&edge.source()]
    }
}
