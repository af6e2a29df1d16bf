// ─────────────────────────────────────────────────────────────────────
// RBField — Derived Field Quantities
// ─────────────────────────────────────────────────────────────────────
//! Scalar summaries of a field. Every function is pure: the field is
//! borrowed immutably and no state survives between calls. Non-finite
//! intermediate results are reported as 0.
//!
//! - E         = Σ_k |c_k|²
//! - H         = ½ Σ_k |c_k|² (1 + w_k),  w_k = Σ_{j∈N(k)} exp(−d²_kj/ε_k²)
//! - R(x)      = clip(−0.1·|Φ(x)|², ±10³)
//! - emergence = Var|c| / max attainable Var|c|
//! - coherence = |⟨c⟩|² / ⟨|c|²⟩
//! - reflexivity: cosine similarity of a Gaussian packet before
//!   and after 50 explicit diffusion substeps over the field's neighbor
//!   graph, without gain limiting

use std::cmp::Ordering;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use rbfield_types::{clamp_score, finite_or_zero, FieldError, FieldResult};

use crate::evolution::diffuse;
use crate::field::RbfField;
use crate::params::{
    CURVATURE_ALPHA, CURVATURE_CLIP, DIFFUSION_REGULARIZER, HIS_WEIGHTS, INTUITION_MAX_DISTANCE,
    INTUITION_MIN_CENTERS, INTUITION_THRESHOLD, INTUITION_TOP_FRACTION, MANIFOLD_DIM,
    NEIGHBOR_CUTOFF_SQ, PREDICTION_HORIZON, PREDICTION_MIN_CENTERS, REFLEXIVITY_COUPLING,
    REFLEXIVITY_DT, REFLEXIVITY_MIN_CENTERS, REFLEXIVITY_PATTERN_CENTER, REFLEXIVITY_SIGMA,
    REFLEXIVITY_STEPS,
};
use crate::primitives::{sq_dist, Point};

fn require_centers(field: &RbfField, quantity: &'static str, required: usize) -> FieldResult<()> {
    if field.len() < required {
        return Err(FieldError::Underconstrained {
            quantity,
            required,
            actual: field.len(),
        });
    }
    Ok(())
}

// ── Energy ──────────────────────────────────────────────────────────

/// Σ|c_k|². Zero for an empty field.
pub fn energy(field: &RbfField) -> f64 {
    finite_or_zero(field.centers().iter().map(|c| c.coefficient().norm_sqr()).sum())
}

/// ½ Σ|c_k|²(1 + w_k) with w_k summed over the diffusion neighbors.
pub fn hamiltonian_energy(field: &RbfField) -> f64 {
    let graph = field.neighbor_graph(NEIGHBOR_CUTOFF_SQ);
    let centers = field.centers();
    let h: f64 = centers
        .iter()
        .enumerate()
        .map(|(k, c)| {
            let eps_sq = c.width() * c.width();
            let w: f64 = graph
                .neighbors(k)
                .iter()
                .map(|nb| (-nb.dist_sq / eps_sq).exp())
                .sum();
            c.coefficient().norm_sqr() * (1.0 + w)
        })
        .sum();
    finite_or_zero(0.5 * h)
}

// ── Local geometry ──────────────────────────────────────────────────

/// Analytic gradient ∂Φ/∂x_d of the Gaussian sum. Zero on dimension mismatch.
pub fn gradient(field: &RbfField, x: &Point) -> [Complex64; MANIFOLD_DIM] {
    let mut grad = [Complex64::new(0.0, 0.0); MANIFOLD_DIM];
    if x.dimension() != MANIFOLD_DIM {
        return grad;
    }
    let xs = x.coords();
    for c in field.centers() {
        let p = c.position().coords();
        let eps_sq = c.width() * c.width();
        let k = (-sq_dist(xs, p) / eps_sq).exp();
        if k == 0.0 {
            continue;
        }
        let scale = c.coefficient() * (-2.0 * k / eps_sq);
        for (g, (xd, pd)) in grad.iter_mut().zip(xs.iter().zip(p)) {
            *g += scale * (xd - pd);
        }
    }
    for g in grad.iter_mut() {
        if !(g.re.is_finite() && g.im.is_finite()) {
            *g = Complex64::new(0.0, 0.0);
        }
    }
    grad
}

/// ‖∇Φ(x)‖.
pub fn gradient_norm(field: &RbfField, x: &Point) -> f64 {
    finite_or_zero(gradient(field, x).iter().map(|g| g.norm_sqr()).sum::<f64>().sqrt())
}

/// Curvature proxy for a field value: clip(−α|Φ|², ±C).
#[inline]
pub fn curvature_from_value(phi: Complex64) -> f64 {
    clamp_score(-CURVATURE_ALPHA * phi.norm_sqr(), -CURVATURE_CLIP, CURVATURE_CLIP)
}

/// Scalar-curvature proxy R(x) = clip(−0.1·|Φ(x)|², ±10³).
///
/// Not Ricci curvature: the field's metric does not enter.
pub fn scalar_curvature(field: &RbfField, x: &Point) -> f64 {
    curvature_from_value(field.evaluate(x))
}

// ── Distribution statistics ─────────────────────────────────────────

/// Variance of |c_k| normalised by the largest variance attainable by
/// K magnitudes in [0, max|c|]. In [0, 1]; 0 for K < 2.
pub fn emergence(field: &RbfField) -> f64 {
    let k = field.len();
    if k < 2 {
        return 0.0;
    }
    let mags: Vec<f64> = field.centers().iter().map(|c| c.coefficient().norm()).collect();
    let max = mags.iter().copied().fold(0.0, f64::max);
    if !(max > 0.0) || !max.is_finite() {
        return 0.0;
    }
    let n = k as f64;
    let mean = mags.iter().sum::<f64>() / n;
    let var = mags.iter().map(|m| (m - mean) * (m - mean)).sum::<f64>() / n;
    // Extremal split: half the values at 0, half at max
    let max_var = if k % 2 == 0 {
        max * max / 4.0
    } else {
        max * max * (n * n - 1.0) / (4.0 * n * n)
    };
    clamp_score(var / max_var, 0.0, 1.0)
}

/// |⟨c⟩|² / ⟨|c|²⟩ in [0, 1]; 0 when empty or all-zero.
pub fn coherence(field: &RbfField) -> f64 {
    let k = field.len();
    if k == 0 {
        return 0.0;
    }
    let n = k as f64;
    let (sum, sum_sq) = field
        .centers()
        .iter()
        .fold((Complex64::new(0.0, 0.0), 0.0), |(s, q), c| {
            let v = c.coefficient();
            (s + v, q + v.norm_sqr())
        });
    let mean_sq = sum_sq / n;
    if !(mean_sq > 0.0) {
        return 0.0;
    }
    clamp_score((sum / n).norm_sqr() / mean_sq, 0.0, 1.0)
}

/// Normalised Shannon entropy of the energy distribution |c_k|²/E.
pub fn autonomy(field: &RbfField) -> f64 {
    let k = field.len();
    let e = energy(field);
    if k < 2 || !(e > 0.0) {
        return 0.0;
    }
    let h: f64 = field
        .centers()
        .iter()
        .map(|c| c.coefficient().norm_sqr() / e)
        .filter(|&p| p > 0.0)
        .map(|p| -p * p.ln())
        .sum();
    clamp_score(h / (k as f64).ln(), 0.0, 1.0)
}

// ── Packet-based quantities ─────────────────────────────────────────

/// Reflexivity, or `Underconstrained` below 10 centers.
///
/// The packet evolves on a working copy; the field is only read.
pub fn try_reflexivity(field: &RbfField) -> FieldResult<f64> {
    require_centers(field, "reflexivity", REFLEXIVITY_MIN_CENTERS)?;

    let two_sigma_sq = 2.0 * REFLEXIVITY_SIGMA * REFLEXIVITY_SIGMA;
    let packet: Vec<Complex64> = field
        .centers()
        .iter()
        .map(|c| {
            let d2 = sq_dist(c.position().coords(), &REFLEXIVITY_PATTERN_CENTER);
            Complex64::new((-d2 / two_sigma_sq).exp(), 0.0)
        })
        .collect();

    let graph = field.neighbor_graph(NEIGHBOR_CUTOFF_SQ);
    let mut evolved = packet.clone();
    let mut scratch = Vec::with_capacity(packet.len());
    diffuse(
        &graph,
        &mut evolved,
        &mut scratch,
        REFLEXIVITY_COUPLING,
        REFLEXIVITY_DT,
        REFLEXIVITY_STEPS,
        DIFFUSION_REGULARIZER,
        false,
    );

    Ok(cosine_similarity(&packet, &evolved))
}

/// Reflexivity in [0, 1]; 0 below 10 centers.
pub fn reflexivity(field: &RbfField) -> f64 {
    try_reflexivity(field).unwrap_or(0.0)
}

/// Re⟨a, b⟩ / (‖a‖‖b‖), clamped to [0, 1].
fn cosine_similarity(a: &[Complex64], b: &[Complex64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| (x.conj() * y).re).sum();
    let na: f64 = a.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt();
    let nb: f64 = b.iter().map(|y| y.norm_sqr()).sum::<f64>().sqrt();
    let denom = na * nb;
    if !(denom > f64::MIN_POSITIVE) {
        return 0.0;
    }
    clamp_score(dot / denom, 0.0, 1.0)
}

/// Prediction accuracy, or `Underconstrained` below 10 centers.
///
/// Each center's anticipation coordinate τ₂ (axis 4) predicts the phase
/// pattern sin 2π(τ₁ + τ₂); the reference is sin 2π(τ₁ + 0.05).
/// Accuracy = 1 − relative L2 error, clamped to [0, 1].
pub fn try_prediction_accuracy(field: &RbfField) -> FieldResult<f64> {
    require_centers(field, "prediction accuracy", PREDICTION_MIN_CENTERS)?;
    let tau = std::f64::consts::TAU;
    let (err, norm) = field.centers().iter().fold((0.0, 0.0), |(e, n), c| {
        let p = c.position().coords();
        let predicted = (tau * (p[3] + p[4])).sin();
        let actual = (tau * (p[3] + PREDICTION_HORIZON)).sin();
        (e + (predicted - actual).powi(2), n + actual * actual)
    });
    if !(norm > 1e-12) {
        return Ok(0.0);
    }
    Ok(clamp_score(1.0 - (err / norm).sqrt(), 0.0, 1.0))
}

pub fn prediction_accuracy(field: &RbfField) -> f64 {
    try_prediction_accuracy(field).unwrap_or(0.0)
}

/// Intuitive-connection count, or `Underconstrained` below 20 centers.
///
/// Among the top 20% centers by |c| (ties by index), a pair within
/// distance 1.0 counts when the mean coefficient of all centers within
/// d² < 0.1 of its midpoint has magnitude above 0.5.
///
/// Cost is O((0.2K)²·K); intended for summaries, not per-step use.
pub fn try_intuitive_connections(field: &RbfField) -> FieldResult<usize> {
    require_centers(field, "intuitive connections", INTUITION_MIN_CENTERS)?;
    let centers = field.centers();

    let mut order: Vec<usize> = (0..centers.len()).collect();
    order.sort_by(|&a, &b| {
        let ma = centers[a].coefficient().norm();
        let mb = centers[b].coefficient().norm();
        mb.partial_cmp(&ma).unwrap_or(Ordering::Equal)
    });
    let top = ((centers.len() as f64 * INTUITION_TOP_FRACTION) as usize).max(1);
    let order = &order[..top];

    let max_d2 = INTUITION_MAX_DISTANCE * INTUITION_MAX_DISTANCE;
    let mut midpoint = [0.0; MANIFOLD_DIM];
    let mut count = 0;
    for (i, &a) in order.iter().enumerate() {
        for &b in &order[i + 1..] {
            let pa = centers[a].position().coords();
            let pb = centers[b].position().coords();
            if sq_dist(pa, pb) > max_d2 {
                continue;
            }
            for (m, (x, y)) in midpoint.iter_mut().zip(pa.iter().zip(pb)) {
                *m = 0.5 * (x + y);
            }
            let (sum, n) = centers
                .iter()
                .filter(|c| sq_dist(c.position().coords(), &midpoint) < NEIGHBOR_CUTOFF_SQ)
                .fold((Complex64::new(0.0, 0.0), 0usize), |(s, n), c| {
                    (s + c.coefficient(), n + 1)
                });
            if n > 0 && (sum / n as f64).norm() > INTUITION_THRESHOLD {
                count += 1;
            }
        }
    }
    Ok(count)
}

pub fn intuitive_connections(field: &RbfField) -> usize {
    try_intuitive_connections(field).unwrap_or(0)
}

// ── Composite ───────────────────────────────────────────────────────

/// Holistic identity score: weighted sum of reflexivity, autonomy,
/// coherence, emergence and prediction accuracy, clamped to [0, 1].
pub fn holistic_identity(
    reflexivity: f64,
    autonomy: f64,
    coherence: f64,
    emergence: f64,
    prediction: f64,
) -> f64 {
    let parts = [reflexivity, autonomy, coherence, emergence, prediction];
    let s: f64 = parts
        .iter()
        .zip(HIS_WEIGHTS.iter())
        .map(|(v, w)| w * finite_or_zero(*v))
        .sum();
    clamp_score(s, 0.0, 1.0)
}

/// Every derived quantity of a field at one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSummary {
    pub num_centers: usize,
    pub time: f64,
    pub energy: f64,
    pub hamiltonian_energy: f64,
    pub emergence: f64,
    pub coherence: f64,
    pub autonomy: f64,
    pub reflexivity: f64,
    pub prediction_accuracy: f64,
    pub intuitive_connections: usize,
    /// Holistic identity score.
    pub his: f64,
}

impl FieldSummary {
    pub fn measure(field: &RbfField) -> Self {
        let emergence = emergence(field);
        let coherence = coherence(field);
        let autonomy = autonomy(field);
        let reflexivity = reflexivity(field);
        let prediction_accuracy = prediction_accuracy(field);
        Self {
            num_centers: field.len(),
            time: field.time(),
            energy: energy(field),
            hamiltonian_energy: hamiltonian_energy(field),
            emergence,
            coherence,
            autonomy,
            reflexivity,
            prediction_accuracy,
            intuitive_connections: intuitive_connections(field),
            his: holistic_identity(reflexivity, autonomy, coherence, emergence, prediction_accuracy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::spiral_seed;

    fn seeded(n: usize) -> RbfField {
        let mut f = RbfField::new(n.max(1), 2.5).unwrap();
        for i in 0..n {
            f.add_spec(&spiral_seed(i, n)).unwrap();
        }
        f
    }

    fn uniform(n: usize, coeff: Complex64) -> RbfField {
        let mut f = RbfField::new(n, 2.5).unwrap();
        for i in 0..n {
            let p = Point::from([i as f64, 0.0, 0.0, 0.0, 0.0, 0.0]);
            f.add_center(&p, coeff, 0.1).unwrap();
        }
        f
    }

    #[test]
    fn test_energy_empty_is_zero() {
        let f = RbfField::new(4, 2.5).unwrap();
        assert_eq!(energy(&f), 0.0);
        assert_eq!(hamiltonian_energy(&f), 0.0);
        assert_eq!(coherence(&f), 0.0);
        assert_eq!(emergence(&f), 0.0);
    }

    #[test]
    fn test_energy_sum_of_squares() {
        let f = uniform(4, Complex64::new(0.6, 0.8));
        assert!((energy(&f) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_hamiltonian_isolated_is_half_energy() {
        // Spacing 1.0 → no neighbors under τ = 0.1
        let f = uniform(5, Complex64::new(1.0, 0.0));
        assert!((hamiltonian_energy(&f) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_hamiltonian_counts_neighbors() {
        let mut f = RbfField::new(2, 2.5).unwrap();
        let p = Point::zeros(6).unwrap();
        f.add_center(&p, Complex64::new(1.0, 0.0), 0.1).unwrap();
        f.add_center(&p, Complex64::new(1.0, 0.0), 0.1).unwrap();
        // w_k = exp(0) = 1 → ½·(2 + 2)
        assert!((hamiltonian_energy(&f) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_gradient_matches_finite_difference() {
        let f = seeded(30);
        let x = [0.62, 0.55, 0.48, 0.3, 0.02, 0.51];
        let g = gradient(&f, &Point::from(x));
        let h = 1e-6;
        for d in 0..MANIFOLD_DIM {
            let mut xp = x;
            let mut xm = x;
            xp[d] += h;
            xm[d] -= h;
            let fd = (f.evaluate(&Point::from(xp)) - f.evaluate(&Point::from(xm))) / (2.0 * h);
            assert!((fd - g[d]).norm() < 1e-4, "axis {d}: fd={fd} analytic={}", g[d]);
        }
        assert!(gradient_norm(&f, &Point::from(x)) > 0.0);
    }

    #[test]
    fn test_gradient_vanishes_at_isolated_center() {
        let f = uniform(1, Complex64::new(1.0, 0.0));
        assert_eq!(gradient_norm(&f, f.centers()[0].position()), 0.0);
    }

    #[test]
    fn test_curvature_proxy() {
        let f = uniform(1, Complex64::new(3.0, 4.0));
        let at = f.centers()[0].position().clone();
        assert!((scalar_curvature(&f, &at) + 2.5).abs() < 1e-12);

        let big = uniform(1, Complex64::new(1e3, 0.0));
        let at = big.centers()[0].position().clone();
        assert_eq!(scalar_curvature(&big, &at), -CURVATURE_CLIP);

        let empty = RbfField::new(1, 2.5).unwrap();
        assert_eq!(scalar_curvature(&empty, &at), 0.0);
    }

    #[test]
    fn test_emergence_bounds() {
        assert_eq!(emergence(&uniform(6, Complex64::new(1.0, 0.0))), 0.0);

        // Half at 0, half at 1 → maximal variance
        let mut f = RbfField::new(4, 2.5).unwrap();
        for (i, m) in [0.0, 1.0, 0.0, 1.0].iter().enumerate() {
            let p = Point::from([i as f64, 0.0, 0.0, 0.0, 0.0, 0.0]);
            f.add_center(&p, Complex64::new(*m, 0.0), 0.1).unwrap();
        }
        assert!((emergence(&f) - 1.0).abs() < 1e-12);

        // Odd count: 1 zero and 2 ones is the extremal split
        let mut f = RbfField::new(3, 2.5).unwrap();
        for (i, m) in [0.0, 1.0, 1.0].iter().enumerate() {
            let p = Point::from([i as f64, 0.0, 0.0, 0.0, 0.0, 0.0]);
            f.add_center(&p, Complex64::new(*m, 0.0), 0.1).unwrap();
        }
        assert!((emergence(&f) - 1.0).abs() < 1e-12);

        let s = emergence(&seeded(50));
        assert!((0.0..=1.0).contains(&s));
    }

    #[test]
    fn test_coherence_extremes() {
        assert!((coherence(&uniform(5, Complex64::new(0.3, -0.2))) - 1.0).abs() < 1e-12);
        // Phases spread evenly around the circle cancel
        assert!(coherence(&seeded(100)) < 1e-3);
        assert_eq!(coherence(&uniform(3, Complex64::new(0.0, 0.0))), 0.0);
    }

    #[test]
    fn test_autonomy() {
        assert!((autonomy(&uniform(8, Complex64::new(1.0, 0.0))) - 1.0).abs() < 1e-12);
        let mut f = uniform(8, Complex64::new(0.0, 0.0));
        let mut c = f.coefficients();
        c[3] = Complex64::new(1.0, 0.0);
        f.set_coefficients(&c).unwrap();
        assert_eq!(autonomy(&f), 0.0);
    }

    #[test]
    fn test_reflexivity_threshold() {
        let f = seeded(9);
        assert_eq!(reflexivity(&f), 0.0);
        assert!(matches!(
            try_reflexivity(&f),
            Err(FieldError::Underconstrained { required: 10, actual: 9, .. })
        ));
    }

    #[test]
    fn test_reflexivity_restores_coefficients_exactly() {
        let f = seeded(20);
        let snapshot: Vec<(u64, u64)> = f
            .coefficients()
            .iter()
            .map(|c| (c.re.to_bits(), c.im.to_bits()))
            .collect();
        let r = reflexivity(&f);
        assert!((0.0..=1.0).contains(&r));
        let after: Vec<(u64, u64)> = f
            .coefficients()
            .iter()
            .map(|c| (c.re.to_bits(), c.im.to_bits()))
            .collect();
        assert_eq!(snapshot, after);
    }

    #[test]
    fn test_reflexivity_dense_seed_is_unlimited_diffusion() {
        // 87 of the 100 seed centers have dt·coupling·Σw > 1; the literal
        // substeps overshoot and decorrelate the packet
        let f = seeded(100);
        let r = reflexivity(&f);
        assert!((r - 3.3494e-4).abs() < 1e-6, "reflexivity = {r}");

        // Sparse seed: no center reaches unit gain
        let sparse = reflexivity(&seeded(20));
        assert!((sparse - 0.502172).abs() < 1e-5, "reflexivity = {sparse}");
    }

    #[test]
    fn test_reflexivity_isolated_centers_is_one() {
        // No neighbors → diffusion leaves the packet untouched
        let f = uniform(12, Complex64::new(1.0, 0.0));
        assert!((reflexivity(&f) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_prediction_accuracy() {
        assert_eq!(prediction_accuracy(&seeded(5)), 0.0);
        // Benchmark seeds have τ₂ = 0, so error is the 0.05 phase lag
        let a = prediction_accuracy(&seeded(40));
        assert!(a > 0.5 && a < 1.0, "accuracy {a}");

        let mut f = RbfField::new(10, 2.5).unwrap();
        for i in 0..10 {
            let p = Point::from([0.0, 0.0, 0.0, i as f64 / 10.0, PREDICTION_HORIZON, 0.0]);
            f.add_center(&p, Complex64::new(1.0, 0.0), 0.1).unwrap();
        }
        assert!((prediction_accuracy(&f) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_intuitive_connections() {
        assert_eq!(intuitive_connections(&seeded(19)), 0);
        assert!(try_intuitive_connections(&seeded(19)).is_err());

        // A tight cluster of identical coefficients: every top pair links
        let mut f = RbfField::new(20, 2.5).unwrap();
        for i in 0..20 {
            let p = Point::from([0.01 * i as f64, 0.0, 0.0, 0.0, 0.0, 0.0]);
            f.add_center(&p, Complex64::new(1.0, 0.0), 0.1).unwrap();
        }
        // top = 4 centers → 6 pairs
        assert_eq!(intuitive_connections(&f), 6);
    }

    #[test]
    fn test_holistic_identity_weights() {
        assert!((holistic_identity(1.0, 1.0, 1.0, 1.0, 1.0) - 1.0).abs() < 1e-12);
        assert!((holistic_identity(1.0, 0.0, 0.0, 0.0, 0.0) - 0.25).abs() < 1e-12);
        assert_eq!(holistic_identity(f64::NAN, 0.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_summary_is_finite_and_bounded() {
        let s = FieldSummary::measure(&seeded(60));
        assert_eq!(s.num_centers, 60);
        for v in [s.emergence, s.coherence, s.autonomy, s.reflexivity, s.prediction_accuracy, s.his] {
            assert!((0.0..=1.0).contains(&v));
        }
        assert!(s.energy > 0.0 && s.hamiltonian_energy > 0.0);
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"his\""));
    }
}
