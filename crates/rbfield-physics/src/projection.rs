// ─────────────────────────────────────────────────────────────────────
// RBField — 2D Slice Projection
// ─────────────────────────────────────────────────────────────────────
//! Axis-aligned 2D slice through the 6D embedding. `project` keeps two
//! chosen axes; `lift` fills the remaining four from the slice anchor.

use serde::{Deserialize, Serialize};

use rbfield_types::{FieldError, FieldResult};

use crate::params::{MANIFOLD_DIM, SLICE_DIM};
use crate::primitives::Point;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceProjection {
    axis1: usize,
    axis2: usize,
    /// Anchor used for the non-slice coordinates on lift.
    anchor: [f64; MANIFOLD_DIM],
}

impl Default for SliceProjection {
    /// The (x, y) plane through the cube center.
    fn default() -> Self {
        Self {
            axis1: 0,
            axis2: 1,
            anchor: [0.5; MANIFOLD_DIM],
        }
    }
}

impl SliceProjection {
    pub fn new(axis1: usize, axis2: usize, anchor: [f64; MANIFOLD_DIM]) -> FieldResult<Self> {
        if axis1 >= MANIFOLD_DIM || axis2 >= MANIFOLD_DIM || axis1 == axis2 {
            return Err(FieldError::InvalidArgument(format!(
                "slice axes must be distinct and < {MANIFOLD_DIM}, got ({axis1}, {axis2})"
            )));
        }
        if anchor.iter().any(|v| !v.is_finite()) {
            return Err(FieldError::InvalidArgument(
                "slice anchor must be finite".to_string(),
            ));
        }
        Ok(Self {
            axis1,
            axis2,
            anchor,
        })
    }

    pub fn axes(&self) -> (usize, usize) {
        (self.axis1, self.axis2)
    }

    pub fn anchor(&self) -> &[f64; MANIFOLD_DIM] {
        &self.anchor
    }

    /// 6D → 2D.
    pub fn project(&self, p: &Point) -> FieldResult<Point> {
        if p.dimension() != MANIFOLD_DIM {
            return Err(FieldError::InvalidArgument(format!(
                "project expects a {MANIFOLD_DIM}D point, got {}D",
                p.dimension()
            )));
        }
        Ok(Point::from(self.project_coords(p.coords())))
    }

    #[inline]
    pub(crate) fn project_coords(&self, c: &[f64]) -> [f64; SLICE_DIM] {
        [c[self.axis1], c[self.axis2]]
    }

    /// 2D → 6D on the slice.
    pub fn lift(&self, q: &Point) -> FieldResult<Point> {
        if q.dimension() != SLICE_DIM {
            return Err(FieldError::InvalidArgument(format!(
                "lift expects a {SLICE_DIM}D point, got {}D",
                q.dimension()
            )));
        }
        let mut coords = self.anchor;
        coords[self.axis1] = q.coords()[0];
        coords[self.axis2] = q.coords()[1];
        Ok(Point::from(coords))
    }
}
