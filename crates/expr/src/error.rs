//! Error types for expression construction, compilation, and model runs.
//!
//! Every fallible operation in this crate returns one of these; nothing is
//! signaled by panicking.

use thiserror::Error;

use crate::expr::InputId;
use crate::shape::join_dims;
use nnexpr_engine::EvalError;

/// Two operand shapes disagree at a binary combinator.
///
/// Carries both dimension lists and the name of the operation that detected
/// the mismatch, so the caller can locate the offending combination.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Shape mismatch {op}: {} <> {}", join_dims(.lhs), join_dims(.rhs))]
pub struct ShapeMismatch {
    /// Display name of the combinator ("plus", "minus", "times").
    pub op: &'static str,
    /// Dimension list of the left operand.
    pub lhs: Vec<usize>,
    /// Dimension list of the right operand.
    pub rhs: Vec<usize>,
}

/// Failures while compiling an expression tree into a runtime graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The tree contains a dense layer, which the builder does not yet
    /// materialize into runtime ops.
    #[error("dense layers are not yet supported by the graph builder")]
    DenseUnsupported,
}

/// Failures while running a compiled [`crate::Model`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RunError {
    /// The fed input id was not part of the compiled expression.
    #[error("input {0:?} is not bound in this model")]
    UnknownInput(InputId),

    /// The underlying session failed.
    #[error(transparent)]
    Eval(#[from] EvalError),
}
