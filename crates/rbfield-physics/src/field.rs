// ─────────────────────────────────────────────────────────────────────
// RBField — 6D Radial Basis Field
// ─────────────────────────────────────────────────────────────────────
//! Bounded, insertion-ordered collection of Gaussian centers.
//!
//!   Φ(x) = Σ_k c_k · exp(−‖x − p_k‖² / ε_k²)
//!
//! Removal shifts later centers down by one; index order is the
//! eviction policy's identifier space, so swap-remove is never used.
//! Evaluation is a brute-force O(K) sum with no spatial index.

use std::borrow::Cow;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use rbfield_types::{FieldConfig, FieldError, FieldResult};

use crate::metric::Metric;
use crate::neighbors::NeighborGraph;
use crate::params::{CenterSpec, MANIFOLD_DIM, SLICE_DIM};
use crate::primitives::{finite_complex, sq_dist, Point};
use crate::projection::SliceProjection;

/// Radial profile family. The field itself always uses `Gaussian`;
/// the others are available through [`RbfField::evaluate_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RbfKernel {
    /// exp(−r²/ε²)
    Gaussian,
    /// sqrt(1 + r²/ε²)
    Multiquadric,
    /// 1 / sqrt(1 + r²/ε²)
    InverseMultiquadric,
    /// (r/ε)² ln(r/ε), 0 at r = 0
    ThinPlateSpline,
}

impl RbfKernel {
    /// Kernel value at squared distance `r_sq` for width `eps`.
    #[inline]
    pub fn evaluate(self, r_sq: f64, eps: f64) -> f64 {
        let s = r_sq / (eps * eps);
        match self {
            RbfKernel::Gaussian => (-s).exp(),
            RbfKernel::Multiquadric => (1.0 + s).sqrt(),
            RbfKernel::InverseMultiquadric => 1.0 / (1.0 + s).sqrt(),
            RbfKernel::ThinPlateSpline => {
                if s <= 0.0 {
                    0.0
                } else {
                    // s·ln(√s) = ½·s·ln(s)
                    0.5 * s * s.ln()
                }
            }
        }
    }
}

/// One RBF summand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Center {
    position: Point,
    coefficient: Complex64,
    width: f64,
}

impl Center {
    pub fn position(&self) -> &Point {
        &self.position
    }

    pub fn coefficient(&self) -> Complex64 {
        self.coefficient
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub(crate) fn set_coefficient(&mut self, value: Complex64) {
        self.coefficient = value;
    }

    /// Gaussian kernel value of this center at `x` (same dimension assumed).
    #[inline]
    pub(crate) fn kernel_at(&self, x: &[f64]) -> f64 {
        let d2 = sq_dist(x, self.position.coords());
        (-d2 / (self.width * self.width)).exp()
    }
}

/// The 6D field: centers, metrics, slice projection and internal time.
#[derive(Debug, Clone)]
pub struct RbfField {
    centers: Vec<Center>,
    capacity: usize,
    fractal_dim: f64,
    metric: Metric,
    slice_metric: Metric,
    projection: SliceProjection,
    time: f64,
    // Diffusion adjacency; None after a removal until the next sweep.
    neighbors: Option<NeighborGraph>,
}

impl RbfField {
    /// Empty field able to hold `capacity` centers.
    pub fn new(capacity: usize, fractal_dim: f64) -> FieldResult<Self> {
        if capacity == 0 {
            return Err(FieldError::InvalidArgument(
                "field capacity must be > 0".to_string(),
            ));
        }
        if !fractal_dim.is_finite() {
            return Err(FieldError::InvalidArgument(format!(
                "fractal dimension must be finite, got {fractal_dim}"
            )));
        }
        let mut centers = Vec::new();
        centers.try_reserve_exact(capacity).map_err(|e| {
            log::error!("RbfField: cannot reserve {capacity} centers: {e}");
            FieldError::AllocationFailure(format!("{capacity} centers: {e}"))
        })?;
        Ok(Self {
            centers,
            capacity,
            fractal_dim,
            metric: Metric::identity(MANIFOLD_DIM)?,
            slice_metric: Metric::identity(SLICE_DIM)?,
            projection: SliceProjection::default(),
            time: 0.0,
            neighbors: None,
        })
    }

    pub fn from_config(config: &FieldConfig) -> FieldResult<Self> {
        config.validate()?;
        Self::new(config.capacity, config.fractal_dim)
    }

    // ------------------------------------------------------------------
    // Maintenance
    // ------------------------------------------------------------------

    /// Append a center. On error the field is unchanged.
    pub fn add_center(&mut self, point: &Point, coeff: Complex64, width: f64) -> FieldResult<()> {
        if point.dimension() != MANIFOLD_DIM {
            return Err(FieldError::InvalidArgument(format!(
                "center must be {MANIFOLD_DIM}D, got {}D",
                point.dimension()
            )));
        }
        if !(width.is_finite() && width > 0.0) {
            return Err(FieldError::InvalidArgument(format!(
                "center width must be finite and > 0, got {width}"
            )));
        }
        if self.centers.len() == self.capacity {
            return Err(FieldError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.centers.push(Center {
            position: point.clone(),
            coefficient: coeff,
            width,
        });
        if let Some(graph) = self.neighbors.as_mut() {
            graph.push(&self.centers);
        }
        Ok(())
    }

    pub fn add_spec(&mut self, center: &CenterSpec) -> FieldResult<()> {
        self.add_center(&center.position, center.coefficient, center.width)
    }

    /// Remove center `index`, shifting later centers down by one.
    pub fn remove_center(&mut self, index: usize) -> FieldResult<Center> {
        if index >= self.centers.len() {
            return Err(FieldError::InvalidArgument(format!(
                "center index {index} out of range (len {})",
                self.centers.len()
            )));
        }
        self.neighbors = None;
        Ok(self.centers.remove(index))
    }

    /// Drop every center and reset time. Capacity and metrics are kept.
    pub fn clear(&mut self) {
        self.centers.clear();
        self.neighbors = None;
        self.time = 0.0;
    }

    // ------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------

    /// Φ(x). A point of the wrong dimension evaluates to 0.
    pub fn evaluate(&self, x: &Point) -> Complex64 {
        if x.dimension() != MANIFOLD_DIM {
            log::debug!("evaluate: {}D point on a {MANIFOLD_DIM}D field", x.dimension());
            return Complex64::new(0.0, 0.0);
        }
        self.evaluate_coords(x.coords())
    }

    #[inline]
    pub(crate) fn evaluate_coords(&self, x: &[f64]) -> Complex64 {
        let sum = self
            .centers
            .iter()
            .fold(Complex64::new(0.0, 0.0), |acc, c| acc + c.coefficient * c.kernel_at(x));
        finite_complex(sum)
    }

    /// Φ(x) with an alternative radial profile.
    pub fn evaluate_with(&self, kernel: RbfKernel, x: &Point) -> Complex64 {
        if x.dimension() != MANIFOLD_DIM {
            return Complex64::new(0.0, 0.0);
        }
        let sum = self.centers.iter().fold(Complex64::new(0.0, 0.0), |acc, c| {
            let d2 = sq_dist(x.coords(), c.position.coords());
            acc + c.coefficient * kernel.evaluate(d2, c.width)
        });
        finite_complex(sum)
    }

    /// Field restricted to the configured 2D slice: every center is
    /// projected onto the slice axes and summed with its own width.
    pub fn evaluate_slice(&self, y: &Point) -> Complex64 {
        if y.dimension() != SLICE_DIM {
            return Complex64::new(0.0, 0.0);
        }
        let sum = self.centers.iter().fold(Complex64::new(0.0, 0.0), |acc, c| {
            let q = self.projection.project_coords(c.position.coords());
            let d2 = sq_dist(y.coords(), &q);
            acc + c.coefficient * (-d2 / (c.width * c.width)).exp()
        });
        finite_complex(sum)
    }

    pub fn configure_projection(
        &mut self,
        axis1: usize,
        axis2: usize,
        anchor: [f64; MANIFOLD_DIM],
    ) -> FieldResult<()> {
        self.projection = SliceProjection::new(axis1, axis2, anchor)?;
        Ok(())
    }

    pub fn projection(&self) -> &SliceProjection {
        &self.projection
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[inline]
    pub fn len(&self) -> usize {
        self.centers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.centers.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn fractal_dimension(&self) -> f64 {
        self.fractal_dim
    }

    pub fn centers(&self) -> &[Center] {
        &self.centers
    }

    pub fn center(&self, index: usize) -> Option<&Center> {
        self.centers.get(index)
    }

    /// Copy of all coefficients in index order.
    pub fn coefficients(&self) -> Vec<Complex64> {
        self.centers.iter().map(|c| c.coefficient).collect()
    }

    /// Overwrite all coefficients; `values` must match `len()`.
    pub fn set_coefficients(&mut self, values: &[Complex64]) -> FieldResult<()> {
        if values.len() != self.centers.len() {
            return Err(FieldError::InvalidArgument(format!(
                "expected {} coefficients, got {}",
                self.centers.len(),
                values.len()
            )));
        }
        for (c, &v) in self.centers.iter_mut().zip(values) {
            c.coefficient = v;
        }
        Ok(())
    }

    pub fn metric(&self) -> &Metric {
        &self.metric
    }

    pub fn slice_metric(&self) -> &Metric {
        &self.slice_metric
    }

    /// Internal evolution time.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub(crate) fn advance_time(&mut self, dt: f64) {
        self.time += dt;
    }

    // ------------------------------------------------------------------
    // Neighbor graph
    // ------------------------------------------------------------------

    /// Adjacency at `cutoff_sq`: borrowed from the cache when it matches,
    /// otherwise built on the spot.
    pub fn neighbor_graph(&self, cutoff_sq: f64) -> Cow<'_, NeighborGraph> {
        match &self.neighbors {
            Some(g) if g.cutoff_sq() == cutoff_sq && g.len() == self.centers.len() => {
                Cow::Borrowed(g)
            }
            _ => Cow::Owned(NeighborGraph::build(&self.centers, cutoff_sq)),
        }
    }

    /// Adjacency at `cutoff_sq`, (re)building and caching it if needed.
    pub fn cached_neighbor_graph(&mut self, cutoff_sq: f64) -> &NeighborGraph {
        let graph = Self::fresh_graph(self.neighbors.take(), &self.centers, cutoff_sq);
        self.neighbors.insert(graph)
    }

    /// Cached graph plus mutable centers, for in-place sweeps.
    pub(crate) fn sweep_parts(&mut self, cutoff_sq: f64) -> (&NeighborGraph, &mut [Center]) {
        let graph = Self::fresh_graph(self.neighbors.take(), &self.centers, cutoff_sq);
        let graph = self.neighbors.insert(graph);
        (graph, &mut self.centers)
    }

    fn fresh_graph(
        cached: Option<NeighborGraph>,
        centers: &[Center],
        cutoff_sq: f64,
    ) -> NeighborGraph {
        match cached {
            Some(g) if g.cutoff_sq() == cutoff_sq && g.len() == centers.len() => g,
            _ => NeighborGraph::build(centers, cutoff_sq),
        }
    }
}
