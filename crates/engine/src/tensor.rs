//! # Runtime Tensors
//!
//! A [`Tensor`] has dynamic dimensions and flat row-major `f32` storage. It
//! is the value type that flows through a [`crate::Session`] during
//! evaluation: placeholder feeds come in as tensors, every node produces one,
//! and the fetched result comes back out as one.
//!
//! Shape agreement between operands is a precondition here (asserted, not
//! returned): the expression layer has already rejected mismatched trees
//! before a graph ever reaches the engine.

use std::fmt;

/// A dynamically shaped tensor with row-major `f32` data.
#[derive(Clone, PartialEq)]
pub struct Tensor {
    dims: Vec<usize>,
    data: Vec<f32>,
}

impl Tensor {
    /// Create a tensor filled with zeros.
    pub fn zeros(dims: Vec<usize>) -> Self {
        Self::full(dims, 0.0)
    }

    /// Create a tensor filled with a single value.
    pub fn full(dims: Vec<usize>, value: f32) -> Self {
        let len: usize = dims.iter().product();
        Self {
            dims,
            data: vec![value; len],
        }
    }

    /// Create a tensor from raw data with the given dimensions.
    ///
    /// Panics if `data.len()` disagrees with the product of `dims`.
    pub fn from_data(dims: Vec<usize>, data: Vec<f32>) -> Self {
        let expected: usize = dims.iter().product();
        assert_eq!(
            data.len(),
            expected,
            "data length {} does not match dims {:?}",
            data.len(),
            dims
        );
        Self { dims, data }
    }

    /// Create a rank-0 (scalar) tensor.
    pub fn scalar(value: f32) -> Self {
        Self {
            dims: vec![],
            data: vec![value],
        }
    }

    /// Create a rank-1 tensor from a vector of values.
    pub fn vector(data: Vec<f32>) -> Self {
        let len = data.len();
        Self {
            dims: vec![len],
            data,
        }
    }

    /// Dimension sizes, outermost first.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Flat row-major data.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the tensor holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True for rank-0 tensors.
    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// The single value of a one-element tensor.
    ///
    /// Panics if the tensor holds more than one element.
    pub fn as_scalar(&self) -> f32 {
        assert_eq!(self.data.len(), 1, "as_scalar on a {:?} tensor", self.dims);
        self.data[0]
    }

    /// Apply a function to every element.
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Tensor {
        Tensor {
            dims: self.dims.clone(),
            data: self.data.iter().map(|&x| f(x)).collect(),
        }
    }

    fn zip(&self, other: &Tensor, f: impl Fn(f32, f32) -> f32) -> Tensor {
        assert_eq!(
            self.dims, other.dims,
            "operand dims disagree: {:?} vs {:?}",
            self.dims, other.dims
        );
        Tensor {
            dims: self.dims.clone(),
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }

    /// Elementwise addition. Dims must agree.
    pub fn add(&self, other: &Tensor) -> Tensor {
        self.zip(other, |a, b| a + b)
    }

    /// Elementwise subtraction. Dims must agree.
    pub fn sub(&self, other: &Tensor) -> Tensor {
        self.zip(other, |a, b| a - b)
    }

    /// Elementwise multiplication. Dims must agree.
    pub fn mul(&self, other: &Tensor) -> Tensor {
        self.zip(other, |a, b| a * b)
    }

    /// Elementwise logistic sigmoid: 1 / (1 + e^-x).
    pub fn sigmoid(&self) -> Tensor {
        self.map(|x| 1.0 / (1.0 + (-x).exp()))
    }

    /// Elementwise hyperbolic tangent.
    pub fn tanh(&self) -> Tensor {
        self.map(f32::tanh)
    }

    /// Elementwise ReLU: max(0, x).
    pub fn relu(&self) -> Tensor {
        self.map(|x| x.max(0.0))
    }

    /// Softmax over the last axis, max-stabilized.
    ///
    /// For a rank-1 tensor this normalizes the whole vector; for higher ranks
    /// each innermost row is normalized independently.
    pub fn softmax(&self) -> Tensor {
        let row = self.dims.last().copied().unwrap_or(1).max(1);
        let mut data = Vec::with_capacity(self.data.len());
        for chunk in self.data.chunks(row) {
            let max = chunk.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let exps: Vec<f32> = chunk.iter().map(|&x| (x - max).exp()).collect();
            let sum: f32 = exps.iter().sum();
            data.extend(exps.iter().map(|&e| e / sum));
        }
        Tensor {
            dims: self.dims.clone(),
            data,
        }
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_scalar() {
            write!(f, "Tensor(scalar={})", self.data[0])
        } else {
            write!(f, "Tensor(dims={:?}, data={:?})", self.dims, self.data)
        }
    }
}
