// ─────────────────────────────────────────────────────────────────────
// RBField — Canonical Parameters and Seed Layouts
// ─────────────────────────────────────────────────────────────────────
//! Named constants shared across the field quantities, plus the two
//! deterministic parametric layouts used to populate fields:
//!
//!   - `spiral_seed(i, n)`     — initial benchmark population
//!   - `adaptive_center(n, T)` — autopoietic growth positions

use std::f64::consts::TAU;

use num_complex::Complex64;

use crate::primitives::{expi, Point};

/// Embedding dimension of every field center.
pub const MANIFOLD_DIM: usize = 6;
/// Dimension of the slice metric and projection.
pub const SLICE_DIM: usize = 2;

/// Curvature proxy scale: R = −α|Φ|².
pub const CURVATURE_ALPHA: f64 = 0.1;
/// Curvature proxy clip C: R ∈ [−C, C].
pub const CURVATURE_CLIP: f64 = 1e3;

/// Diffusion neighbor cutoff τ on squared distance.
pub const NEIGHBOR_CUTOFF_SQ: f64 = 0.1;
/// Laplacian regularizer δ in 1/(d² + δ).
pub const DIFFUSION_REGULARIZER: f64 = 1e-3;

pub const REFLEXIVITY_SIGMA: f64 = 0.2;
pub const REFLEXIVITY_STEPS: usize = 50;
pub const REFLEXIVITY_DT: f64 = 0.01;
pub const REFLEXIVITY_COUPLING: f64 = 0.1;
pub const REFLEXIVITY_MIN_CENTERS: usize = 10;
/// Center of the Gaussian packet.
pub const REFLEXIVITY_PATTERN_CENTER: [f64; MANIFOLD_DIM] = [0.5, 0.5, 0.5, 1.5, 0.0, 0.4];

/// Shift along the τ₁ axis that the anticipation axis τ₂ tries to predict.
pub const PREDICTION_HORIZON: f64 = 0.05;
pub const PREDICTION_MIN_CENTERS: usize = 10;

pub const INTUITION_MIN_CENTERS: usize = 20;
/// Fraction of centers (by |c|) considered for intuitive links.
pub const INTUITION_TOP_FRACTION: f64 = 0.2;
pub const INTUITION_MAX_DISTANCE: f64 = 1.0;
/// |mean coefficient| near a midpoint above which a link counts.
pub const INTUITION_THRESHOLD: f64 = 0.5;

/// HIS weights: reflexivity, autonomy, coherence, emergence, prediction.
pub const HIS_WEIGHTS: [f64; 5] = [0.25, 0.20, 0.20, 0.20, 0.15];

/// A fully-specified center ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct CenterSpec {
    pub position: Point,
    pub coefficient: Complex64,
    pub width: f64,
}

/// Width of every spiral-seeded center.
pub const SEED_WIDTH: f64 = 0.1;

/// Center `i` of an `n`-center seed population.
///
/// coords(i) = (0.5+0.3cos 0.1i, 0.5+0.3sin 0.1i, 0.5+0.2cos 0.2i, i/n, 0, 0.5)
/// coeff(i)  = (1 + 0.1 sin 0.3i)·exp(i·2πi/n)
pub fn spiral_seed(i: usize, n: usize) -> CenterSpec {
    let fi = i as f64;
    let fn_ = n.max(1) as f64;
    let position = Point::from([
        0.5 + 0.3 * (0.1 * fi).cos(),
        0.5 + 0.3 * (0.1 * fi).sin(),
        0.5 + 0.2 * (0.2 * fi).cos(),
        fi / fn_,
        0.0,
        0.5,
    ]);
    let coefficient = (1.0 + 0.1 * (0.3 * fi).sin()) * expi(TAU * fi / fn_);
    CenterSpec {
        position,
        coefficient,
        width: SEED_WIDTH,
    }
}

/// Growth position for the `n`-th center of a field targeting `target`.
///
/// coords(n) = (0.5+0.4cos 0.15n, 0.5+0.4sin 0.15n, 0.5+0.3cos 0.25n,
///              n/T, 0.1 sin 0.1n, 0.5+0.2cos 0.05n)
/// coeff(n)  = (0.8+0.2cos 0.2n)·exp(i·0.1n)
/// ε(n)      = 0.08+0.02 sin 0.1n
pub fn adaptive_center(n: usize, target: usize) -> CenterSpec {
    let f = n as f64;
    let t = target.max(1) as f64;
    let position = Point::from([
        0.5 + 0.4 * (0.15 * f).cos(),
        0.5 + 0.4 * (0.15 * f).sin(),
        0.5 + 0.3 * (0.25 * f).cos(),
        f / t,
        0.1 * (0.1 * f).sin(),
        0.5 + 0.2 * (0.05 * f).cos(),
    ]);
    let coefficient = (0.8 + 0.2 * (0.2 * f).cos()) * expi(0.1 * f);
    CenterSpec {
        position,
        coefficient,
        width: 0.08 + 0.02 * (0.1 * f).sin(),
    }
}
