//! # Graph Builder
//!
//! [`build_node`] compiles one expression tree into runtime graph nodes. The
//! walk is a plain recursion over the tree; all shape validation already
//! happened when the tree was constructed, so the builder's only failure
//! mode is a dense layer it cannot materialize.
//!
//! ## Sharing
//!
//! Expressions clone cheaply, so one node value can appear as a child in
//! several places. The builder honors that sharing in exactly one case:
//! `Input` leaves are deduplicated through the per-build lookup table, so
//! every reference to one [`InputId`] compiles to the same placeholder. All
//! other repeated subtrees — constants included — are re-walked and re-emit
//! runtime work on each encounter. Callers who need a shared intermediate
//! result evaluated once must restructure around inputs.
//!
//! The lookup table is caller-owned and scoped to one build: concurrent
//! builds of independent expressions each get their own table and graph.

use std::collections::HashMap;

use tracing::trace;

use nnexpr_engine::{DType, Graph, NodeId};

use crate::error::BuildError;
use crate::expr::{AnyExpr, Expr, InputId, Op};

/// Compile a rank-erased expression into one runtime node in `graph`.
///
/// `inputs` maps input ids to the placeholders created for them; pass a
/// fresh map per build.
pub fn build_node(
    expr: &AnyExpr,
    dtype: DType,
    graph: &mut Graph,
    inputs: &mut HashMap<InputId, NodeId>,
) -> Result<NodeId, BuildError> {
    match expr {
        AnyExpr::D1(e) => walk(e, dtype, graph, inputs),
        AnyExpr::D2(e) => walk(e, dtype, graph, inputs),
        AnyExpr::D3(e) => walk(e, dtype, graph, inputs),
    }
}

/// Recursive walk over one rank's tree. Rank never conditions the logic;
/// only the dimension list and the op tags do.
fn walk<const R: usize>(
    expr: &Expr<R>,
    dtype: DType,
    graph: &mut Graph,
    inputs: &mut HashMap<InputId, NodeId>,
) -> Result<NodeId, BuildError> {
    match expr.op() {
        Op::Input(id) => {
            let node = *inputs
                .entry(*id)
                .or_insert_with(|| graph.placeholder(dtype, expr.dims().to_vec()));
            trace!(id = id.raw(), ?node, "input resolved");
            Ok(node)
        }
        Op::Const(value) => Ok(graph.fill(*value, dtype, expr.dims().to_vec())),
        Op::Unary(op, x) => {
            let x = walk(x, dtype, graph, inputs)?;
            Ok(op.apply(graph, x))
        }
        Op::Binary(op, a, b) => {
            let a = walk(a, dtype, graph, inputs)?;
            let b = walk(b, dtype, graph, inputs)?;
            Ok(op.apply(graph, a, b))
        }
        Op::Dense(..) => Err(BuildError::DenseUnsupported),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Dense, InputRegistry};
    use crate::shape::Shape;
    use nnexpr_engine::OpKind;

    #[test]
    fn test_shared_input_builds_one_placeholder() {
        let mut registry = InputRegistry::new();
        let (x, id) = registry.input(Shape::d1(4));
        let tree = AnyExpr::from(x.add(&x).unwrap());

        let mut graph = Graph::new();
        let mut inputs = HashMap::new();
        build_node(&tree, DType::F32, &mut graph, &mut inputs).unwrap();

        assert_eq!(inputs.len(), 1);
        assert!(inputs.contains_key(&id));
        assert_eq!(graph.count(|k| matches!(k, OpKind::Placeholder)), 1);
    }

    #[test]
    fn test_distinct_inputs_build_distinct_placeholders() {
        let mut registry = InputRegistry::new();
        let (a, _) = registry.input(Shape::d1(4));
        let (b, _) = registry.input(Shape::d1(4));
        let tree = AnyExpr::from(a.add(&b).unwrap());

        let mut graph = Graph::new();
        let mut inputs = HashMap::new();
        build_node(&tree, DType::F32, &mut graph, &mut inputs).unwrap();

        assert_eq!(inputs.len(), 2);
        assert_eq!(graph.count(|k| matches!(k, OpKind::Placeholder)), 2);
    }

    #[test]
    fn test_equal_constants_are_not_shared() {
        // Two structurally equal Const(5.0) leaves at different positions
        // each emit their own Fill node.
        let a = Expr::constant(5.0, Shape::d1(3));
        let b = Expr::constant(5.0, Shape::d1(3));
        let tree = AnyExpr::from(a.add(&b).unwrap());

        let mut graph = Graph::new();
        let mut inputs = HashMap::new();
        build_node(&tree, DType::F32, &mut graph, &mut inputs).unwrap();

        assert_eq!(graph.count(|k| matches!(k, OpKind::Fill(_))), 2);
    }

    #[test]
    fn test_shared_constant_is_re_emitted() {
        // Reusing the *same* constant value is not deduplicated either.
        let c = Expr::constant(1.0, Shape::d1(3));
        let tree = AnyExpr::from(c.mul(&c).unwrap());

        let mut graph = Graph::new();
        let mut inputs = HashMap::new();
        build_node(&tree, DType::F32, &mut graph, &mut inputs).unwrap();

        assert_eq!(graph.count(|k| matches!(k, OpKind::Fill(_))), 2);
    }

    #[test]
    fn test_dense_fails_at_root() {
        let x = Expr::constant(1.0, Shape::d1(4));
        let tree = AnyExpr::from(Dense::new(2).apply(&x));

        let mut graph = Graph::new();
        let mut inputs = HashMap::new();
        let err = build_node(&tree, DType::F32, &mut graph, &mut inputs).unwrap_err();
        assert_eq!(err, BuildError::DenseUnsupported);
    }

    #[test]
    fn test_dense_fails_anywhere_in_tree() {
        let mut registry = InputRegistry::new();
        let (x, _) = registry.input(Shape::d1(2));
        let hidden = Dense::new(2).apply(&x);
        let tree = AnyExpr::from(hidden.add(&x).unwrap().sigmoid());

        let mut graph = Graph::new();
        let mut inputs = HashMap::new();
        let err = build_node(&tree, DType::F32, &mut graph, &mut inputs).unwrap_err();
        assert_eq!(err, BuildError::DenseUnsupported);
    }

    #[test]
    fn test_dtype_recorded_on_nodes() {
        let x = Expr::constant(1.0, Shape::d2(2, 2));
        let tree = AnyExpr::from(x.tanh());

        let mut graph = Graph::new();
        let mut inputs = HashMap::new();
        build_node(&tree, DType::F64, &mut graph, &mut inputs).unwrap();

        assert!(graph.nodes().all(|n| n.dtype == DType::F64));
    }
}
