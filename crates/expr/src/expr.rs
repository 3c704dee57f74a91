//! # Expression Nodes
//!
//! An [`Expr`] is one node of an immutable expression tree: its rank-indexed
//! [`Shape`] plus an operator payload. The combinators on `Expr` enforce the
//! single structural invariant of the whole system — operands of a binary op
//! must share one shape — and they enforce it at construction time, so an
//! invalid tree can never exist.
//!
//! Rank agreement between binary operands is stronger still: it is checked
//! by the compiler, because `Expr<1>` and `Expr<2>` are different types. The
//! [`AnyExpr`] wrapper erases that rank for callers who need to store or
//! combine expressions of mixed rank; its combinators fall back to a runtime
//! rank check with the same error payload.
//!
//! ## Example
//!
//! ```rust
//! use nnexpr_expr::{InputRegistry, Expr, Shape};
//!
//! let mut registry = InputRegistry::new();
//! let (x, _id) = registry.input(Shape::d1(4));
//! let one = Expr::constant(1.0, Shape::d1(4));
//! let y = x.add(&one).unwrap().sigmoid();
//! assert_eq!(y.dims(), &[4]);
//! ```
//!
//! Expressions clone cheaply (the payload is shared), so a caller may reuse
//! one node as a child in several places. Only `Input` leaves are
//! deduplicated when the tree is compiled; see [`crate::build`].

use std::fmt;
use std::sync::Arc;

use crate::error::ShapeMismatch;
use crate::ops::{BinaryOp, UnaryOp};
use crate::shape::Shape;

/// Opaque identifier of an input, unique per [`InputRegistry`].
///
/// Ids are lookup keys: two expression nodes referring to the same id always
/// compile to the same placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputId(u64);

impl InputId {
    /// The raw counter value, for diagnostics.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Generator of unique input ids, owned by the caller.
///
/// Ids start at 1 and increase strictly with each call; there is no reset.
/// Holding the counter in a value (rather than process-wide state) keeps
/// construction referentially transparent and lets independent registries
/// coexist, one per thread if need be.
#[derive(Debug, Default)]
pub struct InputRegistry {
    next: u64,
}

impl InputRegistry {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Allocate a fresh, never-repeated id.
    pub fn create_input_id(&mut self) -> InputId {
        self.next += 1;
        InputId(self.next)
    }

    /// Create an input expression of the given shape.
    ///
    /// Returns the node for further composition and the raw id for binding
    /// real data to the input later.
    pub fn input<const R: usize>(&mut self, shape: Shape<R>) -> (Expr<R>, InputId) {
        let id = self.create_input_id();
        (Expr::from_parts(shape, Op::Input(id)), id)
    }
}

/// The operator payload of an expression node.
#[derive(Debug)]
pub enum Op<const R: usize> {
    /// A leaf referencing an external placeholder.
    Input(InputId),
    /// A leaf constant, broadcast over the node's shape.
    Const(f32),
    /// Elementwise transform of one child.
    Unary(UnaryOp, Expr<R>),
    /// Elementwise combination of two same-shape children.
    Binary(BinaryOp, Expr<R>, Expr<R>),
    /// A staged dense layer applied to a rank-1 input.
    Dense(Dense, Expr<1>),
}

struct Inner<const R: usize> {
    shape: Shape<R>,
    op: Op<R>,
}

/// One node of an immutable expression tree.
///
/// Cloning is cheap (shared payload); children are owned by construction and
/// never mutated.
#[derive(Clone)]
pub struct Expr<const R: usize> {
    inner: Arc<Inner<R>>,
}

impl<const R: usize> Expr<R> {
    fn from_parts(shape: Shape<R>, op: Op<R>) -> Self {
        Self {
            inner: Arc::new(Inner { shape, op }),
        }
    }

    /// A constant expression: `value` broadcast over `shape`.
    pub fn constant(value: f32, shape: Shape<R>) -> Self {
        Self::from_parts(shape, Op::Const(value))
    }

    /// This node's shape.
    pub fn shape(&self) -> Shape<R> {
        self.inner.shape
    }

    /// This node's dimension list.
    pub fn dims(&self) -> &[usize] {
        self.inner.shape.dims()
    }

    /// This node's operator payload.
    pub fn op(&self) -> &Op<R> {
        &self.inner.op
    }

    /// Apply an elementwise unary operation. The result keeps this node's
    /// shape.
    pub fn unary(&self, op: UnaryOp) -> Self {
        Self::from_parts(self.shape(), Op::Unary(op, self.clone()))
    }

    pub fn sigmoid(&self) -> Self {
        self.unary(UnaryOp::Sigmoid)
    }

    pub fn tanh(&self) -> Self {
        self.unary(UnaryOp::Tanh)
    }

    pub fn relu(&self) -> Self {
        self.unary(UnaryOp::Relu)
    }

    pub fn softmax(&self) -> Self {
        self.unary(UnaryOp::Softmax)
    }

    /// Combine two same-shape expressions elementwise.
    ///
    /// The operands' dimension lists must be equal (content equality); the
    /// result takes the left operand's shape. Rank agreement is already
    /// guaranteed by the types.
    pub fn binary(&self, op: BinaryOp, other: &Self) -> Result<Self, ShapeMismatch> {
        if self.dims() != other.dims() {
            return Err(ShapeMismatch {
                op: op.name(),
                lhs: self.dims().to_vec(),
                rhs: other.dims().to_vec(),
            });
        }
        Ok(Self::from_parts(
            self.shape(),
            Op::Binary(op, self.clone(), other.clone()),
        ))
    }

    /// Elementwise `self + other`.
    pub fn add(&self, other: &Self) -> Result<Self, ShapeMismatch> {
        self.binary(BinaryOp::Plus, other)
    }

    /// Elementwise `self - other`.
    pub fn sub(&self, other: &Self) -> Result<Self, ShapeMismatch> {
        self.binary(BinaryOp::Minus, other)
    }

    /// Elementwise `self * other`.
    pub fn mul(&self, other: &Self) -> Result<Self, ShapeMismatch> {
        self.binary(BinaryOp::Times, other)
    }
}

impl<const R: usize> fmt::Debug for Expr<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr<{}>({}, {:?})", R, self.inner.shape, self.inner.op)
    }
}

// ============================================================================
// Dense Layers (staged)
// ============================================================================

/// How a dense layer's weights or biases are initialized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Init {
    /// Every element set to the given value.
    Const(f32),
    /// Sampled from a normal distribution with the given stddev.
    Normal { stddev: f32 },
    /// Sampled from a truncated normal distribution with the given stddev.
    TruncatedNormal { stddev: f32 },
}

/// A staged fully-connected layer: rank-1 input to rank-1 output of
/// [`Dense::output_dim`] width.
///
/// Staging fixes the hyperparameters once; the resulting value can be
/// applied to any number of rank-1 inputs. Initializers default to
/// constant zero.
///
/// The graph builder does not yet materialize dense layers into runtime
/// ops; compiling a tree containing one fails with
/// [`crate::BuildError::DenseUnsupported`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dense {
    output_dim: usize,
    weight_init: Init,
    bias_init: Init,
}

impl Dense {
    /// Stage a layer producing `output_dim` outputs, with zero-constant
    /// weight and bias initializers.
    pub fn new(output_dim: usize) -> Self {
        Self {
            output_dim,
            weight_init: Init::Const(0.0),
            bias_init: Init::Const(0.0),
        }
    }

    /// Replace the weight initializer.
    pub fn weight_init(mut self, init: Init) -> Self {
        self.weight_init = init;
        self
    }

    /// Replace the bias initializer.
    pub fn bias_init(mut self, init: Init) -> Self {
        self.bias_init = init;
        self
    }

    pub fn output_dim(&self) -> usize {
        self.output_dim
    }

    /// Apply the staged layer to a rank-1 input, yielding a rank-1
    /// expression of width [`Dense::output_dim`].
    pub fn apply(&self, input: &Expr<1>) -> Expr<1> {
        Expr::from_parts(Shape::d1(self.output_dim), Op::Dense(*self, input.clone()))
    }
}

// ============================================================================
// Rank-Erased Expressions
// ============================================================================

/// A rank-erased expression handle.
///
/// `AnyExpr` lets expressions of different ranks live in one collection or
/// flow through one function. The closed set of ranks (1..=3) makes the
/// erasure a plain enum; [`From`] impls recover it from any typed [`Expr`].
#[derive(Debug, Clone)]
pub enum AnyExpr {
    D1(Expr<1>),
    D2(Expr<2>),
    D3(Expr<3>),
}

impl AnyExpr {
    /// The wrapped node's dimension list.
    pub fn dims(&self) -> &[usize] {
        match self {
            AnyExpr::D1(e) => e.dims(),
            AnyExpr::D2(e) => e.dims(),
            AnyExpr::D3(e) => e.dims(),
        }
    }

    /// The wrapped node's rank.
    pub fn rank(&self) -> usize {
        self.dims().len()
    }

    /// Combine two erased expressions elementwise.
    ///
    /// Unlike [`Expr::binary`], rank agreement is checked at runtime here;
    /// a rank disagreement surfaces as the same [`ShapeMismatch`] a
    /// dimension disagreement would.
    pub fn binary(&self, op: BinaryOp, other: &AnyExpr) -> Result<AnyExpr, ShapeMismatch> {
        match (self, other) {
            (AnyExpr::D1(a), AnyExpr::D1(b)) => Ok(AnyExpr::D1(a.binary(op, b)?)),
            (AnyExpr::D2(a), AnyExpr::D2(b)) => Ok(AnyExpr::D2(a.binary(op, b)?)),
            (AnyExpr::D3(a), AnyExpr::D3(b)) => Ok(AnyExpr::D3(a.binary(op, b)?)),
            _ => Err(ShapeMismatch {
                op: op.name(),
                lhs: self.dims().to_vec(),
                rhs: other.dims().to_vec(),
            }),
        }
    }

    /// Elementwise `self + other`, runtime rank-checked.
    pub fn add(&self, other: &AnyExpr) -> Result<AnyExpr, ShapeMismatch> {
        self.binary(BinaryOp::Plus, other)
    }

    /// Elementwise `self - other`, runtime rank-checked.
    pub fn sub(&self, other: &AnyExpr) -> Result<AnyExpr, ShapeMismatch> {
        self.binary(BinaryOp::Minus, other)
    }

    /// Elementwise `self * other`, runtime rank-checked.
    pub fn mul(&self, other: &AnyExpr) -> Result<AnyExpr, ShapeMismatch> {
        self.binary(BinaryOp::Times, other)
    }
}

impl From<Expr<1>> for AnyExpr {
    fn from(e: Expr<1>) -> Self {
        AnyExpr::D1(e)
    }
}

impl From<Expr<2>> for AnyExpr {
    fn from(e: Expr<2>) -> Self {
        AnyExpr::D2(e)
    }
}

impl From<Expr<3>> for AnyExpr {
    fn from(e: Expr<3>) -> Self {
        AnyExpr::D3(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_ids_distinct_and_increasing() {
        let mut registry = InputRegistry::new();
        let (_, a) = registry.input(Shape::d1(4));
        let (_, b) = registry.input(Shape::d2(4, 4));
        let (_, c) = registry.input(Shape::d1(2));

        assert_ne!(a, b);
        assert_eq!(a.raw(), 1);
        assert!(a.raw() < b.raw());
        assert!(b.raw() < c.raw());
    }

    #[test]
    fn test_binary_same_shape_succeeds() {
        let a = Expr::constant(1.0, Shape::d2(3, 4));
        let b = Expr::constant(2.0, Shape::d2(3, 4));

        for op in [BinaryOp::Plus, BinaryOp::Minus, BinaryOp::Times] {
            let c = a.binary(op, &b).unwrap();
            assert_eq!(c.shape(), a.shape());
        }
    }

    #[test]
    fn test_binary_dim_mismatch_payload() {
        let a = Expr::constant(1.0, Shape::d2(3, 4));
        let b = Expr::constant(2.0, Shape::d2(4, 3));

        let err = a.sub(&b).unwrap_err();
        assert_eq!(err.op, "minus");
        assert_eq!(err.lhs, vec![3, 4]);
        assert_eq!(err.rhs, vec![4, 3]);
        assert_eq!(err.to_string(), "Shape mismatch minus: 3, 4 <> 4, 3");
    }

    #[test]
    fn test_unary_preserves_shape() {
        let x = Expr::constant(0.5, Shape::d3(2, 3, 4));
        for op in [
            UnaryOp::Sigmoid,
            UnaryOp::Tanh,
            UnaryOp::Relu,
            UnaryOp::Softmax,
        ] {
            assert_eq!(x.unary(op).shape(), x.shape());
        }
    }

    #[test]
    fn test_dense_staging_is_reusable() {
        let layer = Dense::new(8).weight_init(Init::Normal { stddev: 0.1 });

        let a = Expr::constant(1.0, Shape::d1(4));
        let b = Expr::constant(2.0, Shape::d1(16));

        // One configuration, two inputs of different widths.
        assert_eq!(layer.apply(&a).dims(), &[8]);
        assert_eq!(layer.apply(&b).dims(), &[8]);
    }

    #[test]
    fn test_dense_defaults_zero() {
        let layer = Dense::new(3);
        assert_eq!(layer.weight_init, Init::Const(0.0));
        assert_eq!(layer.bias_init, Init::Const(0.0));
    }

    #[test]
    fn test_erased_rank_mismatch() {
        let mut registry = InputRegistry::new();
        let (a, _) = registry.input(Shape::d1(3));
        let (b, _) = registry.input(Shape::d2(3, 3));

        let erased_a = AnyExpr::from(a);
        let erased_b = AnyExpr::from(b);

        let err = erased_a.add(&erased_b).unwrap_err();
        assert_eq!(err.op, "plus");
        assert_eq!(err.lhs, vec![3]);
        assert_eq!(err.rhs, vec![3, 3]);
    }

    #[test]
    fn test_erased_same_rank_delegates() {
        let a = AnyExpr::from(Expr::constant(1.0, Shape::d1(5)));
        let b = AnyExpr::from(Expr::constant(2.0, Shape::d1(5)));

        let c = a.mul(&b).unwrap();
        assert_eq!(c.dims(), &[5]);
        assert_eq!(c.rank(), 1);
    }

    #[test]
    fn test_value_sharing_via_clone() {
        let mut registry = InputRegistry::new();
        let (x, _) = registry.input(Shape::d1(2));

        // The same node value used as both operands.
        let doubled = x.add(&x).unwrap();
        assert_eq!(doubled.dims(), &[2]);
    }
}
