// ─────────────────────────────────────────────────────────────────────
// RBField — Point and Complex Primitives
// ─────────────────────────────────────────────────────────────────────
//! Variable-dimension coordinate tuples and the complex helpers the
//! field layer relies on. Complex arithmetic itself is `num_complex`.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use rbfield_types::{FieldError, FieldResult};

/// An owned N-tuple of reals. Dimension is fixed at construction.
///
/// `Clone` yields a distinct allocation with equal contents. The
/// `Default` point is empty and therefore invalid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    coords: Vec<f64>,
}

impl Point {
    /// Copy `coords` into a new point. Empty input is rejected.
    pub fn new(coords: &[f64]) -> FieldResult<Self> {
        Self::from_vec(coords.to_vec())
    }

    pub fn from_vec(coords: Vec<f64>) -> FieldResult<Self> {
        if coords.is_empty() {
            return Err(FieldError::InvalidArgument(
                "point dimension must be > 0".to_string(),
            ));
        }
        Ok(Self { coords })
    }

    /// Origin of the given dimension.
    pub fn zeros(dim: usize) -> FieldResult<Self> {
        Self::from_vec(vec![0.0; dim])
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.coords.len()
    }

    #[inline]
    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    /// True iff the point has at least one coordinate.
    pub fn is_valid(&self) -> bool {
        !self.coords.is_empty()
    }

    /// Squared Euclidean distance; `None` on dimension mismatch.
    pub fn distance_sq(&self, other: &Point) -> Option<f64> {
        if self.dimension() != other.dimension() {
            return None;
        }
        Some(sq_dist(&self.coords, &other.coords))
    }

    /// Coordinate-wise midpoint; `None` on dimension mismatch.
    pub fn midpoint(&self, other: &Point) -> Option<Point> {
        if self.dimension() != other.dimension() {
            return None;
        }
        let coords = self
            .coords
            .iter()
            .zip(&other.coords)
            .map(|(a, b)| 0.5 * (a + b))
            .collect();
        Some(Self { coords })
    }
}

impl<const N: usize> From<[f64; N]> for Point {
    fn from(coords: [f64; N]) -> Self {
        Self {
            coords: coords.to_vec(),
        }
    }
}

/// Squared Euclidean distance over the common prefix of `a` and `b`.
#[inline]
pub(crate) fn sq_dist(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// `exp(iθ)`.
#[inline]
pub fn expi(theta: f64) -> Complex64 {
    Complex64::cis(theta)
}

/// Replace a complex value with 0 if either part is NaN/Inf.
#[inline]
pub fn finite_complex(c: Complex64) -> Complex64 {
    if c.re.is_finite() && c.im.is_finite() {
        c
    } else {
        Complex64::new(0.0, 0.0)
    }
}
