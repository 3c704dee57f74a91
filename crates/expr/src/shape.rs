//! # Rank-Indexed Shapes
//!
//! A [`Shape`] carries its rank as a const generic, so the number of stored
//! dimensions and the rank tag can never disagree: `Shape<2>` holds exactly
//! two dimension sizes, by construction. Combining expressions of different
//! ranks is then a type error, caught before the program runs.
//!
//! Only ranks 1 through 3 are constructible ([`Shape::d1`], [`Shape::d2`],
//! [`Shape::d3`]); the set is closed.
//!
//! ## Example
//!
//! ```rust
//! use nnexpr_expr::Shape;
//!
//! let v = Shape::d1(128);
//! let m = Shape::d2(64, 128);
//! assert_eq!(v.dims(), &[128]);
//! assert_eq!(m.rank(), 2);
//!
//! // Different ranks are different types:
//! // let _: Shape<1> = Shape::d2(3, 3);  // does not compile
//! ```

use std::fmt;

/// A tensor shape of statically known rank `R`.
///
/// Equality, hashing, and display all operate on the dimension list.
/// Dimension sizes are accepted without range validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape<const R: usize> {
    dims: [usize; R],
}

impl Shape<1> {
    /// A rank-1 shape with one dimension.
    pub fn d1(a: usize) -> Self {
        Self { dims: [a] }
    }
}

impl Shape<2> {
    /// A rank-2 shape with two dimensions.
    pub fn d2(a: usize, b: usize) -> Self {
        Self { dims: [a, b] }
    }
}

impl Shape<3> {
    /// A rank-3 shape with three dimensions.
    pub fn d3(a: usize, b: usize, c: usize) -> Self {
        Self { dims: [a, b, c] }
    }
}

impl<const R: usize> Shape<R> {
    /// Dimension sizes in construction order.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// The number of dimensions.
    pub fn rank(&self) -> usize {
        R
    }

    /// Total number of elements.
    pub fn numel(&self) -> usize {
        self.dims.iter().product()
    }
}

/// Render a dimension list the way diagnostics expect: comma-joined.
pub(crate) fn join_dims(dims: &[usize]) -> String {
    dims.iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl<const R: usize> fmt::Display for Shape<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", join_dims(&self.dims))
    }
}
