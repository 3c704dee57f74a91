//! End-to-end tests for the expression builder:
//! - construction-time shape validation
//! - compilation into runtime graphs with input deduplication
//! - execution through a model's session

use nnexpr_engine::OpKind;
use nnexpr_expr::{AnyExpr, DType, Dense, Expr, InputRegistry, Model, Shape, Tensor};

// ============================================================================
// Construction
// ============================================================================

#[test]
fn binary_requires_equal_dims() {
    let a = Expr::constant(1.0, Shape::d1(3));
    let b = Expr::constant(2.0, Shape::d1(4));

    let err = a.add(&b).unwrap_err();
    assert_eq!(err.to_string(), "Shape mismatch plus: 3 <> 4");
}

#[test]
fn erased_rank_mismatch_reports_both_dim_lists() {
    let mut registry = InputRegistry::new();
    let (v, _) = registry.input(Shape::d1(3));
    let (m, _) = registry.input(Shape::d2(3, 3));

    let err = AnyExpr::from(v).add(&AnyExpr::from(m)).unwrap_err();
    assert_eq!(err.op, "plus");
    assert_eq!(err.lhs, vec![3]);
    assert_eq!(err.rhs, vec![3, 3]);
    assert_eq!(err.to_string(), "Shape mismatch plus: 3 <> 3, 3");
}

// ============================================================================
// Compilation
// ============================================================================

#[test]
fn sigmoid_of_sum_compiles_to_four_nodes() {
    // y = sigmoid(x + 1.0) over a length-4 vector
    let mut registry = InputRegistry::new();
    let (x, _) = registry.input(Shape::d1(4));
    let y = x.add(&Expr::constant(1.0, Shape::d1(4))).unwrap().sigmoid();

    let model = Model::create(y, DType::F32).unwrap();
    let graph = model.session().graph();

    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.count(|k| matches!(k, OpKind::Placeholder)), 1);
    assert_eq!(graph.count(|k| matches!(k, OpKind::Fill(_))), 1);
    assert_eq!(graph.count(|k| matches!(k, OpKind::Add)), 1);
    assert_eq!(graph.count(|k| matches!(k, OpKind::Sigmoid)), 1);
}

#[test]
fn reused_input_compiles_to_one_placeholder() {
    let mut registry = InputRegistry::new();
    let (x, id) = registry.input(Shape::d1(2));
    let y = x.add(&x).unwrap();

    let model = Model::create(y, DType::F32).unwrap();
    assert!(model.input_node(id).is_some());
    assert_eq!(
        model
            .session()
            .graph()
            .count(|k| matches!(k, OpKind::Placeholder)),
        1
    );
}

#[test]
fn dense_anywhere_fails_the_build() {
    let mut registry = InputRegistry::new();
    let (x, _) = registry.input(Shape::d1(4));
    let hidden = Dense::new(4).apply(&x);
    let y = hidden.relu();

    assert!(Model::create(y, DType::F32).is_err());
}

// ============================================================================
// Execution
// ============================================================================

#[test]
fn model_runs_end_to_end() {
    // y = relu((x - 1.0) * 2.0)
    let mut registry = InputRegistry::new();
    let (x, id) = registry.input(Shape::d1(3));
    let shifted = x.sub(&Expr::constant(1.0, Shape::d1(3))).unwrap();
    let y = shifted
        .mul(&Expr::constant(2.0, Shape::d1(3)))
        .unwrap()
        .relu();

    let model = Model::create(y, DType::F32).unwrap();
    let out = model
        .run(&[(id, Tensor::vector(vec![0.0, 1.0, 3.0]))])
        .unwrap();

    // (0-1)*2 = -2 -> 0, (1-1)*2 = 0, (3-1)*2 = 4
    assert_eq!(out.data(), &[0.0, 0.0, 4.0]);
}

#[test]
fn shared_input_is_fed_once() {
    // y = x * x: one feed serves both operands.
    let mut registry = InputRegistry::new();
    let (x, id) = registry.input(Shape::d1(2));
    let y = x.mul(&x).unwrap();

    let model = Model::create(y, DType::F32).unwrap();
    let out = model
        .run(&[(id, Tensor::vector(vec![3.0, -4.0]))])
        .unwrap();
    assert_eq!(out.data(), &[9.0, 16.0]);
}

#[test]
fn softmax_output_normalizes() {
    let mut registry = InputRegistry::new();
    let (x, id) = registry.input(Shape::d1(3));
    let model = Model::create(x.softmax(), DType::F32).unwrap();

    let out = model
        .run(&[(id, Tensor::vector(vec![1.0, 2.0, 3.0]))])
        .unwrap();
    let sum: f32 = out.data().iter().sum();
    assert!((sum - 1.0).abs() < 1e-6);
    assert!(out.data()[2] > out.data()[1] && out.data()[1] > out.data()[0]);
}

#[test]
fn higher_rank_expressions_run() {
    let mut registry = InputRegistry::new();
    let (m, id) = registry.input(Shape::d2(2, 2));
    let y = m.add(&Expr::constant(0.5, Shape::d2(2, 2))).unwrap();

    let model = Model::create(y, DType::F32).unwrap();
    let out = model
        .run(&[(id, Tensor::from_data(vec![2, 2], vec![0.0, 1.0, 2.0, 3.0]))])
        .unwrap();
    assert_eq!(out.dims(), &[2, 2]);
    assert_eq!(out.data(), &[0.5, 1.5, 2.5, 3.5]);
}

#[test]
fn mixed_rank_expressions_share_one_registry_and_model_each() {
    // Mixed-rank trees can be stored together erased, then compiled apart.
    let mut registry = InputRegistry::new();
    let (v, v_id) = registry.input(Shape::d1(2));
    let (m, m_id) = registry.input(Shape::d3(1, 1, 2));

    let trees: Vec<AnyExpr> = vec![v.relu().into(), m.tanh().into()];

    let vec_model = Model::create(trees[0].clone(), DType::F32).unwrap();
    let cube_model = Model::create(trees[1].clone(), DType::F32).unwrap();

    let out = vec_model
        .run(&[(v_id, Tensor::vector(vec![-1.0, 1.0]))])
        .unwrap();
    assert_eq!(out.data(), &[0.0, 1.0]);

    let out = cube_model
        .run(&[(m_id, Tensor::from_data(vec![1, 1, 2], vec![0.0, 0.0]))])
        .unwrap();
    assert_eq!(out.data(), &[0.0, 0.0]);
}
