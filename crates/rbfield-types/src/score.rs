// ─────────────────────────────────────────────────────────────────────
// RBField — Descriptor and Score Types
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

/// Clamp a value to [lo, hi], mapping NaN to lo and Inf to nearest bound.
#[inline]
pub fn clamp_score(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        log::warn!("clamp_score: NaN detected, clamping to {lo:.4}");
        return lo;
    }
    if value.is_infinite() {
        let boundary = if value > 0.0 { hi } else { lo };
        log::warn!("clamp_score: Inf detected, clamping to {boundary:.4}");
        return boundary;
    }
    value.clamp(lo, hi)
}

/// Replace NaN/Inf with 0.0. Numeric queries never surface non-finite values.
#[inline]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Per-sample summary produced by the streaming embedder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalDescriptors {
    /// Field energy Σ|c|² after the sample was admitted.
    pub energy: f64,
    /// Curvature proxy at the sample's embedding point, in [-1e3, 1e3].
    pub curvature: f64,
    /// Strict local maxima in the sample buffer.
    pub num_components: usize,
    /// Always 0; loop detection is not performed on the stream.
    pub num_loops: usize,
    /// Buffer mean.
    pub mean: f64,
    /// Buffer population variance.
    pub variance: f64,
    /// Stream time of the sample (seconds).
    pub timestamp: f64,
}

impl SignalDescriptors {
    pub fn is_finite(&self) -> bool {
        [
            self.energy,
            self.curvature,
            self.mean,
            self.variance,
            self.timestamp,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Weight of the expansion term in [`MemoryScore::overall_score`].
pub const W_EXPANSION: f64 = 0.30;
/// Weight of the energy-efficiency term.
pub const W_EFFICIENCY: f64 = 0.40;
/// Weight of the geometric-quality term.
pub const W_QUALITY: f64 = 0.20;
/// Weight of the adaptation-intelligence term.
pub const W_ADAPTATION: f64 = 0.10;

/// Outcome of a geometric-memory benchmark run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryScore {
    /// Weighted composite in [0, 1].
    pub overall_score: f64,
    /// min(1, expansion rate (percent) / 1000).
    pub expansion_achievement: f64,
    /// min(1, efficiency / efficiency target).
    pub energy_efficiency_achievement: f64,
    /// (emergence + capacity fill) / 2.
    pub geometric_quality: f64,
    /// Adaptation events per cycle.
    pub adaptation_intelligence: f64,
    /// Center target met.
    pub target_reached: bool,
    /// Efficiency defined and at or above the efficiency target.
    pub efficiency_valid: bool,
    /// At least one cycle ran on a non-empty field.
    pub is_authentic: bool,
    /// Fraction of authenticity checks passed.
    pub authenticity_score: f64,
}

impl MemoryScore {
    /// Build a score from its four components; each is clamped to [0, 1].
    pub fn from_components(
        expansion: f64,
        efficiency: f64,
        quality: f64,
        adaptation: f64,
    ) -> Self {
        let expansion_achievement = clamp_score(expansion, 0.0, 1.0);
        let energy_efficiency_achievement = clamp_score(efficiency, 0.0, 1.0);
        let geometric_quality = clamp_score(quality, 0.0, 1.0);
        let adaptation_intelligence = clamp_score(adaptation, 0.0, 1.0);
        let overall = W_EXPANSION * expansion_achievement
            + W_EFFICIENCY * energy_efficiency_achievement
            + W_QUALITY * geometric_quality
            + W_ADAPTATION * adaptation_intelligence;
        Self {
            overall_score: clamp_score(overall, 0.0, 1.0),
            expansion_achievement,
            energy_efficiency_achievement,
            geometric_quality,
            adaptation_intelligence,
            ..Default::default()
        }
    }
}
