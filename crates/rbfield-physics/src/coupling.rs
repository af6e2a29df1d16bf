// ─────────────────────────────────────────────────────────────────────
// RBField — Global Coupling Kernels
// ─────────────────────────────────────────────────────────────────────
//! Long-range coupling between centers:
//!
//!   C_k = s · Σ_{j≠k, r_kj<r_c} K(r_kj) (c_j − c_k)
//!
//! plus a sparse snapshot of the weights and two order parameters:
//! coherence |⟨c⟩|²/⟨|c|²⟩ and phase synchronisation |⟨e^{i arg c}⟩|.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use rbfield_types::{clamp_score, FieldError, FieldResult};

use crate::field::RbfField;
use crate::primitives::{expi, finite_complex, sq_dist, Point};
use crate::quantities::coherence;

/// Weights below this magnitude are left out of a coupling matrix.
pub const WEIGHT_FLOOR: f64 = 1e-12;
/// Softening of the Yukawa singularity at r = 0.
pub const YUKAWA_SOFTENING: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CouplingKernel {
    /// exp(−r/ξ)
    Exponential { xi: f64 },
    /// exp(−r²/2ξ²)
    Gaussian { xi: f64 },
    /// 1/(1+r)^α
    PowerLaw { alpha: f64 },
    /// exp(−r/ξ)/(r + 10⁻⁶)
    Yukawa { xi: f64 },
    /// cos(r/ξ)·exp(−r/2ξ); may be negative
    Quantum { xi: f64 },
}

impl Default for CouplingKernel {
    fn default() -> Self {
        Self::Exponential { xi: 1.0 }
    }
}

impl CouplingKernel {
    fn parameter(&self) -> f64 {
        match *self {
            Self::Exponential { xi }
            | Self::Gaussian { xi }
            | Self::Yukawa { xi }
            | Self::Quantum { xi } => xi,
            Self::PowerLaw { alpha } => alpha,
        }
    }

    pub fn validate(&self) -> FieldResult<()> {
        let p = self.parameter();
        if !(p.is_finite() && p > 0.0) {
            return Err(FieldError::InvalidArgument(format!(
                "coupling kernel parameter must be finite and > 0, got {p}"
            )));
        }
        Ok(())
    }

    /// Weight at distance r ≥ 0.
    #[inline]
    pub fn weight(&self, r: f64) -> f64 {
        match *self {
            Self::Exponential { xi } => (-r / xi).exp(),
            Self::Gaussian { xi } => (-r * r / (2.0 * xi * xi)).exp(),
            Self::PowerLaw { alpha } => (1.0 + r).powf(-alpha),
            Self::Yukawa { xi } => (-r / xi).exp() / (r + YUKAWA_SOFTENING),
            Self::Quantum { xi } => (r / xi).cos() * (-r / (2.0 * xi)).exp(),
        }
    }

    /// Weight between two points; 0 on dimension mismatch.
    pub fn evaluate(&self, p1: &Point, p2: &Point) -> f64 {
        p1.distance_sq(p2)
            .map(|d2| self.weight(d2.sqrt()))
            .filter(|w| w.is_finite())
            .unwrap_or(0.0)
    }
}

/// One non-negligible pair (i < j).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CouplingEntry {
    pub i: usize,
    pub j: usize,
    pub weight: f64,
    pub distance: f64,
}

/// Sparse upper-triangular coupling weights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CouplingMatrix {
    pub num_centers: usize,
    pub entries: Vec<CouplingEntry>,
}

impl CouplingMatrix {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn weights(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|e| e.weight)
    }

    /// Weight between i and j in either order, 0 when absent.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        let (a, b) = if i < j { (i, j) } else { (j, i) };
        self.entries
            .iter()
            .find(|e| e.i == a && e.j == b)
            .map_or(0.0, |e| e.weight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalCoupling {
    pub kernel: CouplingKernel,
    pub strength: f64,
    /// Pairs at distance ≥ cutoff do not couple.
    pub cutoff: f64,
}

impl Default for GlobalCoupling {
    fn default() -> Self {
        Self {
            kernel: CouplingKernel::default(),
            strength: 1.0,
            cutoff: 2.0,
        }
    }
}

impl GlobalCoupling {
    pub fn new(kernel: CouplingKernel, strength: f64, cutoff: f64) -> FieldResult<Self> {
        kernel.validate()?;
        if !strength.is_finite() {
            return Err(FieldError::InvalidArgument(format!(
                "coupling strength must be finite, got {strength}"
            )));
        }
        if !(cutoff.is_finite() && cutoff > 0.0) {
            return Err(FieldError::InvalidArgument(format!(
                "coupling cutoff must be finite and > 0, got {cutoff}"
            )));
        }
        Ok(Self {
            kernel,
            strength,
            cutoff,
        })
    }

    /// Coupling term acting on center `k`; 0 when `k` is out of range.
    pub fn coupling_term(&self, field: &RbfField, k: usize) -> Complex64 {
        let centers = field.centers();
        let Some(target) = centers.get(k) else {
            return Complex64::new(0.0, 0.0);
        };
        let pk = target.position().coords();
        let ck = target.coefficient();
        let cutoff_sq = self.cutoff * self.cutoff;
        let sum: Complex64 = centers
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != k)
            .filter_map(|(_, c)| {
                let d2 = sq_dist(pk, c.position().coords());
                (d2 < cutoff_sq).then(|| self.kernel.weight(d2.sqrt()) * (c.coefficient() - ck))
            })
            .sum();
        finite_complex(self.strength * sum)
    }

    /// All pairs i < j with r < cutoff and |K(r)| > 10⁻¹².
    pub fn build_matrix(&self, field: &RbfField) -> CouplingMatrix {
        let centers = field.centers();
        let cutoff_sq = self.cutoff * self.cutoff;
        let mut entries = Vec::new();
        for (i, a) in centers.iter().enumerate() {
            for (j, b) in centers.iter().enumerate().skip(i + 1) {
                let d2 = sq_dist(a.position().coords(), b.position().coords());
                if d2 >= cutoff_sq {
                    continue;
                }
                let distance = d2.sqrt();
                let weight = self.kernel.weight(distance);
                if weight.is_finite() && weight.abs() > WEIGHT_FLOOR {
                    entries.push(CouplingEntry {
                        i,
                        j,
                        weight,
                        distance,
                    });
                }
            }
        }
        log::debug!(
            "coupling matrix: {} centers, {} entries",
            centers.len(),
            entries.len()
        );
        CouplingMatrix {
            num_centers: centers.len(),
            entries,
        }
    }
}

/// Same order parameter as [`coherence`].
pub fn global_coherence(field: &RbfField) -> f64 {
    coherence(field)
}

/// Kuramoto-style R = |⟨e^{i arg c}⟩| over centers with c ≠ 0.
pub fn phase_synchronization(field: &RbfField) -> f64 {
    let (sum, n) = field
        .centers()
        .iter()
        .map(|c| c.coefficient())
        .filter(|c| c.norm_sqr() > 0.0)
        .fold((Complex64::new(0.0, 0.0), 0usize), |(s, n), c| {
            (s + expi(c.arg()), n + 1)
        });
    if n == 0 {
        return 0.0;
    }
    clamp_score((sum / n as f64).norm(), 0.0, 1.0)
}
