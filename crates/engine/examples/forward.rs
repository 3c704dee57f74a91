//! Drive the engine directly, without the expression layer:
//! build `y = tanh(a - b)` by hand and evaluate it.
//!
//! Run with: `cargo run -p nnexpr-engine --example forward`

use nnexpr_engine::{DType, Graph, Session, Tensor};

fn main() {
    let mut graph = Graph::new();
    let a = graph.placeholder(DType::F32, vec![3]);
    let b = graph.placeholder(DType::F32, vec![3]);
    let diff = graph.sub(a, b);
    let y = graph.tanh(diff);

    let session = Session::new(graph);
    let out = session
        .run(
            y,
            &[
                (a, Tensor::vector(vec![1.0, 2.0, 3.0])),
                (b, Tensor::vector(vec![1.0, 1.0, 1.0])),
            ],
        )
        .expect("both placeholders fed");

    println!("tanh(a - b) = {:?}", out.data());
}
