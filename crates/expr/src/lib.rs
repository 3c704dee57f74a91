//! # Expr - Rank-Checked Expression Builder
//!
//! This crate assembles trees of tensor operations whose rank is verified at
//! construction time, then compiles them into runtime graphs executed by
//! `nnexpr-engine`.
//!
//! ## Key Concepts
//!
//! - **Rank-indexed shapes** — [`Shape<R>`] carries its rank in the type, so
//!   combining a vector with a matrix is a compile error
//! - **Construction-time validation** — the one runtime check, equal operand
//!   dims at a binary op, happens when the tree is built; an invalid tree
//!   cannot exist
//! - **Rank erasure** — [`AnyExpr`] stores expressions of mixed rank in one
//!   type, for heterogeneous collections and for the graph builder's walk
//! - **Compilation** — [`build_node`] turns a tree into runtime nodes,
//!   deduplicating input placeholders by id and nothing else
//!
//! ## Modules
//!
//! - [`shape`] — Rank-indexed shapes
//! - [`ops`] — Unary/binary operator tags and their engine dispatch
//! - [`expr`] — Expression nodes, combinators, dense staging, rank erasure
//! - [`build`] — Compilation of trees into runtime graphs
//! - [`model`] — The compiled artifact: graph + session + shape
//! - [`error`] — Typed failures for construction, build, and run
//!
//! ## Example
//!
//! ```rust
//! use nnexpr_expr::{DType, Expr, InputRegistry, Model, Shape, Tensor};
//!
//! let mut registry = InputRegistry::new();
//! let (x, x_id) = registry.input(Shape::d1(4));
//! let y = x.add(&Expr::constant(1.0, Shape::d1(4))).unwrap().sigmoid();
//!
//! let model = Model::create(y, DType::F32).unwrap();
//! let out = model
//!     .run(&[(x_id, Tensor::vector(vec![0.0, 0.0, 0.0, 0.0]))])
//!     .unwrap();
//! assert!(out.data().iter().all(|&v| (v - 0.7310586).abs() < 1e-5));
//! ```

pub mod build;
pub mod error;
pub mod expr;
pub mod model;
pub mod ops;
pub mod shape;

pub use build::build_node;
pub use error::{BuildError, RunError, ShapeMismatch};
pub use expr::{AnyExpr, Dense, Expr, Init, InputId, InputRegistry, Op};
pub use model::Model;
pub use ops::{BinaryOp, UnaryOp};
pub use shape::Shape;

// Engine types a caller needs to build and run models.
pub use nnexpr_engine::{DType, NodeId, Session, Tensor};
