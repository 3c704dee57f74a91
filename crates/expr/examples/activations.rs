//! Build and run a small activation pipeline:
//!
//! ```text
//! y = softmax(w * x + b)
//! ```
//!
//! where `x`, `w`, and `b` are all runtime-fed inputs of width 4.
//!
//! Run with: `cargo run -p nnexpr-expr --example activations`

use nnexpr_expr::{DType, InputRegistry, Model, Shape, Tensor};

fn main() {
    let dim = Shape::d1(4);

    let mut registry = InputRegistry::new();
    let (x, x_id) = registry.input(dim);
    let (w, w_id) = registry.input(dim);
    let (b, b_id) = registry.input(dim);

    let logits = w.mul(&x).expect("same shape").add(&b).expect("same shape");
    let y = logits.softmax();

    let model = Model::create(y, DType::F32).expect("no dense layers here");
    println!(
        "compiled {} runtime nodes for shape {:?}",
        model.session().graph().node_count(),
        model.dims()
    );

    let out = model
        .run(&[
            (x_id, Tensor::vector(vec![1.0, 2.0, 3.0, 4.0])),
            (w_id, Tensor::vector(vec![0.5, 0.5, 0.5, 0.5])),
            (b_id, Tensor::vector(vec![0.0, 0.0, 0.0, -1.0])),
        ])
        .expect("all inputs fed");

    println!("softmax(w * x + b) = {:?}", out.data());
    let total: f32 = out.data().iter().sum();
    println!("probabilities sum to {total}");
}
