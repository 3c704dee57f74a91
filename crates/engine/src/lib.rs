//! # Engine - Runtime Tensor Graph
//!
//! This crate is the execution side of nnexpr: a runtime computation graph
//! plus a session that evaluates it. The companion `nnexpr-expr` crate builds
//! these graphs from rank-checked expression trees; this crate neither knows
//! nor cares how its nodes were produced.
//!
//! ## Modules
//!
//! - [`tensor`] — Dynamically shaped runtime tensors and elementwise math
//! - [`graph`] — The node/edge graph and its op constructors
//! - [`session`] — Topological forward evaluation with placeholder feeds
//!
//! ## Example
//!
//! ```rust
//! use nnexpr_engine::{DType, Graph, Session, Tensor};
//!
//! // y = relu(x + 1.0) over a length-3 vector
//! let mut graph = Graph::new();
//! let x = graph.placeholder(DType::F32, vec![3]);
//! let one = graph.fill(1.0, DType::F32, vec![3]);
//! let sum = graph.add(x, one);
//! let y = graph.relu(sum);
//!
//! let session = Session::new(graph);
//! let out = session
//!     .run(y, &[(x, Tensor::vector(vec![-2.0, 0.0, 1.0]))])
//!     .unwrap();
//! assert_eq!(out.data(), &[0.0, 1.0, 2.0]);
//! ```

pub mod graph;
pub mod session;
pub mod tensor;

pub use graph::{DType, Graph, NodeId, OpKind, RtNode};
pub use session::{EvalError, Session};
pub use tensor::Tensor;
