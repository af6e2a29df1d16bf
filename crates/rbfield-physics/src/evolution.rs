// ─────────────────────────────────────────────────────────────────────
// RBField — Explicit Coefficient Evolution
// ─────────────────────────────────────────────────────────────────────
//! First-order explicit update of every center's coefficient:
//!
//!   Φ_k ← Φ_k + Δt·( D·L_k − α|Φ_k|²Φ_k + β·T_k(t) )
//!
//!   L_k = Σ_{j∈N(k)} (Φ_j − Φ_k) / (d²_kj + δ)       N(k): d² < τ
//!   T_k = sin t·Im Φ_k + i·cos t·Re Φ_k
//!
//! All reads use the pre-sweep snapshot. Local truncation error is
//! O(Δt²) per step.
//!
//! With `limit_diffusion` set, a center whose gain Δt·D·Σ_j w_kj exceeds
//! 1 has its diffusion increment divided by that gain, so the diffusion
//! part is a convex combination of the center and its neighbors. Off by
//! default; the benchmark driver turns it on.
//!
//! Pre-allocated scratch arrays for zero-alloc steady-state stepping.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use rbfield_types::{BenchmarkConfig, EvolutionParams, FieldError, FieldResult};

use crate::field::RbfField;
use crate::neighbors::NeighborGraph;
use crate::params::adaptive_center;
use crate::primitives::finite_complex;

/// Summary of one evolution step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    /// Field time after the step.
    pub time: f64,
    /// Σ|c|² before the sweep.
    pub energy_before: f64,
    /// Σ|c|² after the sweep.
    pub energy_after: f64,
    /// Largest |ΔΦ_k| in the sweep.
    pub max_change: f64,
    /// Centers whose diffusion gain was capped.
    pub limited_centers: usize,
    /// Centers whose update was non-finite and reset to 0.
    pub reset_centers: usize,
}

/// Diffusion increment per unit time, written into `out`.
///
/// `out[k] = coupling · L_k`, divided by the gain `dt·coupling·Σw` when
/// `limit` is set and that gain exceeds 1. Returns the number of capped
/// centers.
pub fn diffusion_rates(
    graph: &NeighborGraph,
    coeffs: &[Complex64],
    out: &mut [Complex64],
    coupling: f64,
    dt: f64,
    regularizer: f64,
    limit: bool,
) -> usize {
    let mut limited = 0;
    for (k, rate) in out.iter_mut().enumerate().take(coeffs.len()) {
        let ck = coeffs[k];
        let mut lap = Complex64::new(0.0, 0.0);
        let mut weight_sum = 0.0;
        for nb in graph.neighbors(k) {
            let w = 1.0 / (nb.dist_sq + regularizer);
            lap += (coeffs[nb.index] - ck) * w;
            weight_sum += w;
        }
        let mut r = lap * coupling;
        let gain = dt * coupling * weight_sum;
        if limit && gain > 1.0 {
            r /= gain;
            limited += 1;
        }
        *rate = r;
    }
    limited
}

/// Run `steps` diffusion-only substeps on `coeffs` in place.
///
/// `scratch` is resized as needed. Non-finite values are reset to 0.
#[allow(clippy::too_many_arguments)]
pub fn diffuse(
    graph: &NeighborGraph,
    coeffs: &mut [Complex64],
    scratch: &mut Vec<Complex64>,
    coupling: f64,
    dt: f64,
    steps: usize,
    regularizer: f64,
    limit: bool,
) {
    scratch.resize(coeffs.len(), Complex64::new(0.0, 0.0));
    for _ in 0..steps {
        diffusion_rates(graph, coeffs, scratch, coupling, dt, regularizer, limit);
        for (c, r) in coeffs.iter_mut().zip(scratch.iter()) {
            *c = finite_complex(*c + *r * dt);
        }
    }
}

/// Explicit integrator for the coefficient dynamics.
pub struct EvolutionStepper {
    pub params: EvolutionParams,
    // Pre-allocated scratch
    snapshot: Vec<Complex64>,
    rates: Vec<Complex64>,
}

impl EvolutionStepper {
    pub fn new(params: EvolutionParams) -> FieldResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            snapshot: Vec::new(),
            rates: Vec::new(),
        })
    }

    /// D = 0.1, α = 0.05, β = 0.02, τ = 0.1, δ = 1e-3, no limiter.
    pub fn default_params() -> Self {
        Self {
            params: EvolutionParams::default(),
            snapshot: Vec::new(),
            rates: Vec::new(),
        }
    }

    /// Advance every coefficient by one step of size `dt`, then advance
    /// the field time by `dt`. Positions and widths are untouched.
    pub fn step(&mut self, field: &mut RbfField, dt: f64) -> FieldResult<StepReport> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(FieldError::InvalidArgument(format!(
                "time step must be finite and > 0, got {dt}"
            )));
        }
        let p = &self.params;
        let t = field.time();
        let (sin_t, cos_t) = t.sin_cos();

        self.snapshot.clear();
        self.snapshot
            .extend(field.centers().iter().map(|c| c.coefficient()));
        let energy_before: f64 = self.snapshot.iter().map(|c| c.norm_sqr()).sum();
        self.rates
            .resize(self.snapshot.len(), Complex64::new(0.0, 0.0));

        let mut report = StepReport {
            energy_before,
            ..Default::default()
        };

        let (graph, centers) = field.sweep_parts(p.neighbor_cutoff_sq);
        report.limited_centers = diffusion_rates(
            graph,
            &self.snapshot,
            &mut self.rates,
            p.diffusion,
            dt,
            p.regularizer,
            p.limit_diffusion,
        );

        let mut energy_after = 0.0;
        for (k, center) in centers.iter_mut().enumerate() {
            let c = self.snapshot[k];
            let nonlinear = c * (-p.nonlinearity * c.norm_sqr());
            let torsion = Complex64::new(sin_t * c.im, cos_t * c.re) * p.torsion;
            let updated = c + (self.rates[k] + nonlinear + torsion) * dt;
            let safe = finite_complex(updated);
            if safe != updated {
                report.reset_centers += 1;
            }
            report.max_change = report.max_change.max((safe - c).norm());
            energy_after += safe.norm_sqr();
            center.set_coefficient(safe);
        }

        if report.reset_centers > 0 {
            log::warn!(
                "evolution step at t={t:.4}: {} non-finite coefficients reset to 0",
                report.reset_centers
            );
        }

        field.advance_time(dt);
        report.time = field.time();
        report.energy_after = energy_after;
        Ok(report)
    }

    /// Run `n_steps` steps; returns the last report.
    pub fn run(&mut self, field: &mut RbfField, dt: f64, n_steps: usize) -> FieldResult<StepReport> {
        let mut last = StepReport {
            time: field.time(),
            ..Default::default()
        };
        for _ in 0..n_steps {
            last = self.step(field, dt)?;
        }
        Ok(last)
    }
}

/// One step of the plain update with default parameters.
pub fn evolve(field: &mut RbfField, dt: f64) -> FieldResult<StepReport> {
    EvolutionStepper::default_params().step(field, dt)
}

/// Driver-level autopoietic growth policy.
///
/// Never invoked by [`EvolutionStepper::step`]; a driver calls
/// [`GrowthPolicy::spawn`] after stepping with whatever metric it tracks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthPolicy {
    /// Metric value that must be exceeded.
    pub threshold: f64,
    /// No growth at or above this many centers.
    pub target: usize,
    pub small_batch: usize,
    pub large_batch: usize,
    /// Center count where the batch size switches from small to large.
    pub batch_switch: usize,
}

impl GrowthPolicy {
    pub fn from_config(config: &BenchmarkConfig) -> Self {
        Self {
            threshold: config.expansion_threshold,
            target: config.target_centers,
            small_batch: config.small_field_batch,
            large_batch: config.large_field_batch,
            batch_switch: config.batch_switch,
        }
    }

    pub fn batch_size(&self, len: usize) -> usize {
        if len < self.batch_switch {
            self.small_batch
        } else {
            self.large_batch
        }
    }

    pub fn should_grow(&self, field: &RbfField, metric: f64) -> bool {
        metric > self.threshold && !field.is_full() && field.len() < self.target
    }

    /// Add up to one batch of centers via [`adaptive_center`].
    /// Returns how many were added.
    pub fn spawn(&self, field: &mut RbfField, metric: f64) -> FieldResult<usize> {
        if !self.should_grow(field, metric) {
            return Ok(0);
        }
        let batch = self.batch_size(field.len());
        let mut added = 0;
        while added < batch && field.len() < self.target && !field.is_full() {
            field.add_spec(&adaptive_center(field.len(), self.target))?;
            added += 1;
        }
        Ok(added)
    }
}
