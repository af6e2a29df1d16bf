// ─────────────────────────────────────────────────────────────────────
// RBField — Metric Tensor
// ─────────────────────────────────────────────────────────────────────
//! Symmetric D×D metric with cached determinant and inverse.
//!
//! Includes a pure-Rust Gauss-Jordan inverse with partial pivoting.
//! D is 2 or 6 in practice, so dense row-major storage is fine.

use serde::{Deserialize, Serialize};

use rbfield_types::{FieldError, FieldResult};

/// Determinants at or below this mark the metric invalid.
pub const DET_EPSILON: f64 = 1e-12;

const SYMMETRY_TOL: f64 = 1e-10;

/// Metric tensor g over a D-dimensional manifold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    dim: usize,
    /// g, row-major.
    g: Vec<f64>,
    /// g⁻¹, row-major. Meaningful only while `valid`.
    g_inv: Vec<f64>,
    det: f64,
    valid: bool,
}

impl Metric {
    /// Identity metric: g = g⁻¹ = I, det = 1.
    pub fn identity(dim: usize) -> FieldResult<Self> {
        if dim == 0 {
            return Err(FieldError::InvalidArgument(
                "metric dimension must be > 0".to_string(),
            ));
        }
        let mut g = vec![0.0; dim * dim];
        for i in 0..dim {
            g[i * dim + i] = 1.0;
        }
        Ok(Self {
            dim,
            g_inv: g.clone(),
            g,
            det: 1.0,
            valid: true,
        })
    }

    /// Build from a row-major matrix and run [`Metric::update`].
    pub fn from_rows(dim: usize, g: &[f64]) -> FieldResult<Self> {
        if g.len() != dim * dim {
            return Err(FieldError::InvalidArgument(format!(
                "metric needs {} entries for dimension {dim}, got {}",
                dim * dim,
                g.len()
            )));
        }
        let mut m = Self::identity(dim)?;
        m.g.copy_from_slice(g);
        m.update();
        Ok(m)
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dim
    }

    /// g[i][j], or `None` when either index is out of range.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.index(i, j).map(|idx| self.g[idx])
    }

    /// g⁻¹[i][j], or `None` when either index is out of range.
    #[inline]
    pub fn inverse_get(&self, i: usize, j: usize) -> Option<f64> {
        self.index(i, j).map(|idx| self.g_inv[idx])
    }

    #[inline]
    fn index(&self, i: usize, j: usize) -> Option<usize> {
        (i < self.dim && j < self.dim).then_some(i * self.dim + j)
    }

    pub fn determinant(&self) -> f64 {
        self.det
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Write g[i][j] and g[j][i]. Call [`Metric::update`] afterwards.
    pub fn set(&mut self, i: usize, j: usize, value: f64) -> FieldResult<()> {
        if i >= self.dim || j >= self.dim {
            return Err(FieldError::InvalidArgument(format!(
                "metric index ({i}, {j}) out of range for dimension {}",
                self.dim
            )));
        }
        self.g[i * self.dim + j] = value;
        self.g[j * self.dim + i] = value;
        Ok(())
    }

    /// Recompute det(g) and g⁻¹ from g.
    ///
    /// Marks the metric invalid if det ≤ [`DET_EPSILON`], the matrix is
    /// singular, or any entry is non-finite. Returns the new validity.
    pub fn update(&mut self) -> bool {
        match gauss_jordan_inverse(&self.g, self.dim) {
            Some((det, inv)) if det.is_finite() && det > DET_EPSILON => {
                self.det = det;
                self.g_inv = inv;
                self.valid = true;
            }
            Some((det, _)) => {
                self.det = if det.is_finite() { det } else { 0.0 };
                self.valid = false;
            }
            None => {
                self.det = 0.0;
                self.valid = false;
            }
        }
        self.valid
    }

    /// Full structural check: valid flag, symmetry, positive diagonal,
    /// finite entries and det > [`DET_EPSILON`].
    pub fn validate(&self) -> bool {
        if !self.valid || !(self.det > DET_EPSILON) {
            return false;
        }
        if self.g.iter().any(|v| !v.is_finite()) {
            return false;
        }
        let n = self.dim;
        for i in 0..n {
            if self.g[i * n + i] <= 0.0 {
                return false;
            }
            for j in (i + 1)..n {
                if (self.g[i * n + j] - self.g[j * n + i]).abs() > SYMMETRY_TOL {
                    return false;
                }
            }
        }
        true
    }

    /// Conformal deformation g = (1 + α·density)·I, then update.
    pub fn adapt(&mut self, density: f64, alpha: f64) -> bool {
        let scale = 1.0 + alpha * density;
        let n = self.dim;
        for i in 0..n {
            for j in 0..n {
                self.g[i * n + j] = if i == j { scale } else { 0.0 };
            }
        }
        self.update()
    }

    /// Quadratic form gᵢⱼ uⁱ vʲ; 0 on length mismatch.
    pub fn inner(&self, u: &[f64], v: &[f64]) -> f64 {
        let n = self.dim;
        if u.len() != n || v.len() != n {
            return 0.0;
        }
        let mut acc = 0.0;
        for i in 0..n {
            for j in 0..n {
                acc += u[i] * self.g[i * n + j] * v[j];
            }
        }
        acc
    }
}

/// Gauss-Jordan elimination with partial pivoting on an n×n row-major
/// matrix. Returns (det, inverse), or `None` if a pivot vanishes.
fn gauss_jordan_inverse(a: &[f64], n: usize) -> Option<(f64, Vec<f64>)> {
    let mut m = a.to_vec();
    let mut inv = vec![0.0; n * n];
    for i in 0..n {
        inv[i * n + i] = 1.0;
    }
    let mut det = 1.0;

    for col in 0..n {
        // Pivot: largest magnitude in this column at or below the diagonal
        let mut pivot_row = col;
        let mut pivot_abs = m[col * n + col].abs();
        for r in (col + 1)..n {
            let v = m[r * n + col].abs();
            if v > pivot_abs {
                pivot_abs = v;
                pivot_row = r;
            }
        }
        if !(pivot_abs > f64::MIN_POSITIVE) {
            return None;
        }
        if pivot_row != col {
            for c in 0..n {
                m.swap(col * n + c, pivot_row * n + c);
                inv.swap(col * n + c, pivot_row * n + c);
            }
            det = -det;
        }

        let pivot = m[col * n + col];
        det *= pivot;
        let inv_pivot = 1.0 / pivot;
        for c in 0..n {
            m[col * n + c] *= inv_pivot;
            inv[col * n + c] *= inv_pivot;
        }

        for r in 0..n {
            if r == col {
                continue;
            }
            let factor = m[r * n + col];
            if factor == 0.0 {
                continue;
            }
            for c in 0..n {
                m[r * n + c] -= factor * m[col * n + c];
                inv[r * n + c] -= factor * inv[col * n + c];
            }
        }
    }

    Some((det, inv))
}
