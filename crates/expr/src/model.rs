//! # Models
//!
//! A [`Model`] is the terminal artifact: one compiled runtime node bundled
//! with the session that can execute it and the shape it was built from.
//! Creation is all-or-nothing — any build failure propagates unchanged and
//! no partial graph survives.

use std::collections::HashMap;

use tracing::debug;

use nnexpr_engine::{DType, Graph, NodeId, Session, Tensor};

use crate::build::build_node;
use crate::error::{BuildError, RunError};
use crate::expr::{AnyExpr, InputId};

/// A compiled expression, ready to run.
#[derive(Debug)]
pub struct Model {
    session: Session,
    node: NodeId,
    dims: Vec<usize>,
    inputs: HashMap<InputId, NodeId>,
}

impl Model {
    /// Compile `expr` into a fresh graph and wrap it with a new session.
    ///
    /// Accepts a typed [`crate::Expr`] of any rank or an already erased
    /// [`AnyExpr`].
    pub fn create(expr: impl Into<AnyExpr>, dtype: DType) -> Result<Model, BuildError> {
        let expr = expr.into();
        let dims = expr.dims().to_vec();

        let mut graph = Graph::new();
        let mut inputs = HashMap::new();
        let node = build_node(&expr, dtype, &mut graph, &mut inputs)?;
        debug!(
            nodes = graph.node_count(),
            inputs = inputs.len(),
            %dtype,
            "compiled expression"
        );

        Ok(Model {
            session: Session::new(graph),
            node,
            dims,
            inputs,
        })
    }

    /// Evaluate the model, feeding input values by their [`InputId`].
    pub fn run(&self, feeds: &[(InputId, Tensor)]) -> Result<Tensor, RunError> {
        let mut bound = Vec::with_capacity(feeds.len());
        for (id, tensor) in feeds {
            let node = self
                .inputs
                .get(id)
                .copied()
                .ok_or(RunError::UnknownInput(*id))?;
            bound.push((node, tensor.clone()));
        }
        Ok(self.session.run(self.node, &bound)?)
    }

    /// Dimension list of the expression the model was built from.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// The compiled root node.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The session owning the compiled graph.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The placeholder compiled for an input id, if the expression used it.
    pub fn input_node(&self, id: InputId) -> Option<NodeId> {
        self.inputs.get(&id).copied()
    }
}
