// ─────────────────────────────────────────────────────────────────────
// RBField — Geometric Memory Benchmark
// ─────────────────────────────────────────────────────────────────────
//! Grows a field from a seed population toward a target center count
//! while tracking how well energy density is conserved.
//!
//! One adaptation cycle:
//!   1. Evolve the field by Δt
//!   2. Measure energy and efficiency 100·(E/K)/(E₀/K₀)
//!   3. Grow by one batch when efficiency exceeds the threshold
//!   4. Consolidation / compression bookkeeping
//!   5. Log the cycle

use std::time::Instant;

use serde::{Deserialize, Serialize};

use rbfield_physics::quantities::{emergence, energy};
use rbfield_physics::{adaptive_center, spiral_seed, EvolutionStepper, GrowthPolicy, RbfField};
use rbfield_types::{
    clamp_score, finite_or_zero, BenchmarkConfig, FieldError, FieldResult, MemoryScore,
};

/// Running measurements of a benchmark.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetrics {
    pub initial_centers: usize,
    pub current_centers: usize,
    pub max_centers_reached: usize,
    pub initial_energy: f64,
    pub current_energy: f64,
    /// E/K of the current field.
    pub energy_density: f64,
    /// Percent in [0, 100].
    pub energy_efficiency: f64,
    /// False while E₀ or K is zero.
    pub efficiency_defined: bool,
    /// Growth over the seed population in percent: 100·(K−K₀)/K₀.
    pub expansion_rate: f64,
    /// Emergence of the field.
    pub spatial_complexity: f64,
    /// (spatial complexity + manifold coherence) / 2.
    pub topological_efficiency: f64,
    /// Capacity fill K/capacity.
    pub manifold_coherence: f64,
    pub geometric_quality: f64,
    pub total_cycles: u64,
    pub total_expansions: u64,
    pub adaptation_events: u64,
    pub consolidation_events: u64,
    pub compression_events: u64,
}

/// Log entry for one adaptation cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleLog {
    pub cycle: u64,
    pub num_centers: usize,
    pub energy: f64,
    pub energy_density: f64,
    pub energy_efficiency: f64,
    pub centers_added: usize,
    pub adapted: bool,
    pub consolidated: bool,
    pub compressed: bool,
    /// Centers whose diffusion gain was capped during the step.
    pub limited_centers: usize,
}

/// Serializable end-of-run summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub config: BenchmarkConfig,
    pub metrics: MemoryMetrics,
    pub score: MemoryScore,
    pub target_reached: bool,
    pub total_time_ns: u64,
}

/// Expansion rate (percent) that earns full expansion achievement.
pub const FULL_EXPANSION_PERCENT: f64 = 1000.0;

/// Geometric memory benchmark driver.
pub struct GeometricMemoryBenchmark {
    config: BenchmarkConfig,
    field: RbfField,
    stepper: EvolutionStepper,
    growth: GrowthPolicy,
    metrics: MemoryMetrics,
    score: MemoryScore,
    history: Vec<CycleLog>,
    total_time_ns: u64,
}

impl GeometricMemoryBenchmark {
    pub fn new(config: BenchmarkConfig) -> FieldResult<Self> {
        config.validate()?;
        let field = RbfField::new(config.max_centers, config.fractal_dim)?;
        let stepper = EvolutionStepper::new(config.evolution.clone())?;
        let growth = GrowthPolicy::from_config(&config);
        log::info!(
            "GeometricMemoryBenchmark: {} → {} centers (capacity {}), efficiency target {:.1}%",
            config.initial_centers,
            config.target_centers,
            config.max_centers,
            config.energy_efficiency_target
        );
        Ok(Self {
            config,
            field,
            stepper,
            growth,
            metrics: MemoryMetrics::default(),
            score: MemoryScore::default(),
            history: Vec::new(),
            total_time_ns: 0,
        })
    }

    pub fn default_params() -> FieldResult<Self> {
        Self::new(BenchmarkConfig::default())
    }

    // ------------------------------------------------------------------
    // Population
    // ------------------------------------------------------------------

    /// Reset the field to `count` spiral-seeded centers and record the
    /// initial energy. Cycle counters and history are cleared.
    pub fn initialize(&mut self, count: usize) -> FieldResult<()> {
        if count > self.field.capacity() {
            return Err(FieldError::CapacityExceeded {
                capacity: self.field.capacity(),
            });
        }
        self.field.clear();
        for i in 0..count {
            self.field.add_spec(&spiral_seed(i, count))?;
        }
        let e0 = energy(&self.field);
        self.metrics = MemoryMetrics {
            initial_centers: count,
            current_centers: count,
            max_centers_reached: count,
            initial_energy: e0,
            current_energy: e0,
            ..Default::default()
        };
        self.score = MemoryScore::default();
        self.history.clear();
        self.measure_energy_efficiency();
        log::info!("initialized {count} centers, E₀ = {e0:.6}");
        Ok(())
    }

    /// Append one center at the adaptive growth position for the
    /// current count.
    pub fn add_geometric_center(&mut self) -> FieldResult<()> {
        let center = adaptive_center(self.field.len(), self.config.target_centers);
        self.field.add_spec(&center)?;
        self.record_growth(1);
        Ok(())
    }

    fn record_growth(&mut self, added: usize) {
        if added == 0 {
            return;
        }
        let k = self.field.len();
        self.metrics.current_centers = k;
        self.metrics.total_expansions += added as u64;
        self.metrics.max_centers_reached = self.metrics.max_centers_reached.max(k);
        log::trace!("{added} center(s) added, {k} total");
    }

    // ------------------------------------------------------------------
    // Cycles
    // ------------------------------------------------------------------

    /// Execute one adaptation cycle.
    pub fn run_cycle(&mut self) -> FieldResult<CycleLog> {
        let density_before = self.metrics.energy_density;
        self.metrics.total_cycles += 1;

        // 1. Evolve
        let step = self.stepper.step(&mut self.field, self.config.dt)?;

        // 2. Measure
        let efficiency = self.measure_energy_efficiency();

        // 3. Grow
        let adapted = self.growth.should_grow(&self.field, efficiency);
        let added = self.growth.spawn(&mut self.field, efficiency)?;
        self.record_growth(added);
        if adapted {
            self.metrics.adaptation_events += 1;
        }

        // 4. Bookkeeping
        let consolidated = step.energy_after <= step.energy_before;
        if consolidated {
            self.metrics.consolidation_events += 1;
        }
        if added > 0 {
            self.refresh_energy();
        }
        let compressed = self.metrics.energy_density < density_before;
        if compressed {
            self.metrics.compression_events += 1;
        }

        // 5. Log
        let log = CycleLog {
            cycle: self.metrics.total_cycles,
            num_centers: self.field.len(),
            energy: self.metrics.current_energy,
            energy_density: self.metrics.energy_density,
            energy_efficiency: efficiency,
            centers_added: added,
            adapted,
            consolidated,
            compressed,
            limited_centers: step.limited_centers,
        };
        self.history.push(log);
        Ok(log)
    }

    /// Seed, cycle until the target count or the cycle cap, then score.
    pub fn run_complete(&mut self) -> FieldResult<MemoryScore> {
        let start = Instant::now();
        self.initialize(self.config.initial_centers)?;

        while self.field.len() < self.config.target_centers
            && self.metrics.total_cycles < self.config.max_cycles
        {
            let log = self.run_cycle()?;
            let interval = self.config.monitor_interval;
            if interval > 0 && log.cycle % interval == 0 {
                log::info!(
                    "cycle {}: {} centers ({:.1}% expansion, {:.2}% efficiency)",
                    log.cycle,
                    log.num_centers,
                    self.measure_expansion_rate(),
                    log.energy_efficiency
                );
            }
        }

        self.measure_expansion_rate();
        self.measure_energy_efficiency();
        self.measure_geometric_quality();
        self.score = self.calculate_score();
        self.total_time_ns = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);

        log::info!(
            "benchmark finished in {:.2} ms: {} cycles, {} centers, efficiency {:.2}% ({:.6} → {:.6}), score {:.4}",
            self.total_time_ns as f64 / 1e6,
            self.metrics.total_cycles,
            self.metrics.current_centers,
            self.metrics.energy_efficiency,
            self.metrics.initial_energy,
            self.metrics.current_energy,
            self.score.overall_score
        );
        Ok(self.score.clone())
    }

    // ------------------------------------------------------------------
    // Measurements
    // ------------------------------------------------------------------

    fn refresh_energy(&mut self) {
        let k = self.field.len();
        let e = energy(&self.field);
        self.metrics.current_centers = k;
        self.metrics.current_energy = e;
        self.metrics.energy_density = if k > 0 { e / k as f64 } else { 0.0 };
    }

    /// 100·(K−K₀)/K₀ in percent; 0 without an initial population.
    pub fn measure_expansion_rate(&mut self) -> f64 {
        let k0 = self.metrics.initial_centers;
        let rate = if k0 > 0 {
            100.0 * (self.field.len() as f64 - k0 as f64) / k0 as f64
        } else {
            0.0
        };
        self.metrics.expansion_rate = rate;
        rate
    }

    /// 100·(E/K)/(E₀/K₀) clamped to [0, 100], from a fresh energy
    /// measurement. 0 and undefined when E₀, K₀ or K is 0.
    pub fn measure_energy_efficiency(&mut self) -> f64 {
        self.refresh_energy();
        let m = &mut self.metrics;
        let defined = m.initial_energy > 0.0 && m.initial_centers > 0 && m.current_centers > 0;
        let efficiency = if defined {
            let initial_density = m.initial_energy / m.initial_centers as f64;
            clamp_score(100.0 * m.energy_density / initial_density, 0.0, 100.0)
        } else {
            0.0
        };
        m.efficiency_defined = defined;
        m.energy_efficiency = efficiency;
        efficiency
    }

    /// (emergence + K/capacity) / 2.
    pub fn measure_geometric_quality(&mut self) -> f64 {
        let spatial = emergence(&self.field);
        let manifold = self.field.len() as f64 / self.field.capacity() as f64;
        let quality = clamp_score((spatial + manifold) / 2.0, 0.0, 1.0);
        let m = &mut self.metrics;
        m.spatial_complexity = spatial;
        m.manifold_coherence = manifold;
        m.topological_efficiency = quality;
        m.geometric_quality = quality;
        quality
    }

    /// Score from the current metrics; call the measurements first.
    pub fn calculate_score(&self) -> MemoryScore {
        let m = &self.metrics;
        let expansion = m.expansion_rate / FULL_EXPANSION_PERCENT;
        let efficiency = if self.config.energy_efficiency_target > 0.0 {
            m.energy_efficiency / self.config.energy_efficiency_target
        } else {
            1.0
        };
        let adaptation = if m.total_cycles > 0 {
            m.adaptation_events as f64 / m.total_cycles as f64
        } else {
            0.0
        };
        let mut score =
            MemoryScore::from_components(expansion, efficiency, m.geometric_quality, adaptation);

        let finite = [
            m.current_energy,
            m.energy_efficiency,
            m.geometric_quality,
            m.expansion_rate,
        ]
        .iter()
        .all(|v| v.is_finite());
        let checks = [m.total_cycles > 0, !self.field.is_empty(), finite];
        let passed = checks.iter().filter(|&&c| c).count();

        score.target_reached = self.field.len() >= self.config.target_centers;
        score.efficiency_valid =
            m.efficiency_defined && m.energy_efficiency >= self.config.energy_efficiency_target;
        score.is_authentic = passed == checks.len();
        score.authenticity_score = passed as f64 / checks.len() as f64;
        score
    }

    /// Center target and efficiency target both met. Stricter than the
    /// score's `target_reached`, which only counts centers.
    pub fn is_target_reached(&self) -> bool {
        self.field.len() >= self.config.target_centers
            && self.metrics.energy_efficiency >= self.config.energy_efficiency_target
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    pub fn field(&self) -> &RbfField {
        &self.field
    }

    pub fn metrics(&self) -> &MemoryMetrics {
        &self.metrics
    }

    pub fn score(&self) -> &MemoryScore {
        &self.score
    }

    pub fn history(&self) -> &[CycleLog] {
        &self.history
    }

    pub fn energy_density(&self) -> f64 {
        finite_or_zero(self.metrics.energy_density)
    }

    pub fn max_centers_reached(&self) -> usize {
        self.metrics.max_centers_reached
    }

    pub fn total_time_ns(&self) -> u64 {
        self.total_time_ns
    }

    pub fn report(&self) -> BenchmarkReport {
        BenchmarkReport {
            config: self.config.clone(),
            metrics: self.metrics.clone(),
            score: self.score.clone(),
            target_reached: self.is_target_reached(),
            total_time_ns: self.total_time_ns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> BenchmarkConfig {
        BenchmarkConfig {
            initial_centers: 20,
            target_centers: 60,
            max_centers: 100,
            max_cycles: 50,
            batch_switch: 40,
            ..BenchmarkConfig::default()
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = BenchmarkConfig {
            target_centers: 10,
            ..BenchmarkConfig::default()
        };
        assert!(GeometricMemoryBenchmark::new(cfg).is_err());
    }

    #[test]
    fn test_initialize() {
        let mut b = GeometricMemoryBenchmark::default_params().unwrap();
        b.initialize(100).unwrap();
        let m = b.metrics();
        assert_eq!(m.initial_centers, 100);
        assert_eq!(b.field().len(), 100);
        assert!(m.initial_energy > 0.0);
        assert!(m.efficiency_defined);
        assert!((m.energy_efficiency - 100.0).abs() < 1e-9);
        // Spiral seed: coefficient 0 is exactly 1
        assert!((b.field().centers()[0].coefficient().re - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_initialize_over_capacity() {
        let mut b = GeometricMemoryBenchmark::new(small_config()).unwrap();
        assert!(matches!(
            b.initialize(101),
            Err(FieldError::CapacityExceeded { capacity: 100 })
        ));
    }

    #[test]
    fn test_add_geometric_center() {
        let mut b = GeometricMemoryBenchmark::default_params().unwrap();
        b.initialize(10).unwrap();
        b.add_geometric_center().unwrap();
        assert_eq!(b.field().len(), 11);
        assert_eq!(b.metrics().total_expansions, 1);
        assert_eq!(b.max_centers_reached(), 11);
        let c = &b.field().centers()[10];
        // n = 10, T = 1000
        assert!((c.position().coords()[3] - 0.01).abs() < 1e-15);
        assert!((c.width() - (0.08 + 0.02 * 1.0f64.sin())).abs() < 1e-15);
    }

    #[test]
    fn test_efficiency_undefined_without_initial_energy() {
        let mut b = GeometricMemoryBenchmark::default_params().unwrap();
        assert_eq!(b.measure_energy_efficiency(), 0.0);
        assert!(!b.metrics().efficiency_defined);
        assert_eq!(b.measure_expansion_rate(), 0.0);
    }

    #[test]
    fn test_cycle_grows_small_batch() {
        let mut b = GeometricMemoryBenchmark::new(small_config()).unwrap();
        b.initialize(20).unwrap();
        let log = b.run_cycle().unwrap();
        assert_eq!(log.cycle, 1);
        assert!(log.adapted);
        assert_eq!(log.centers_added, 10);
        assert_eq!(b.field().len(), 30);
        assert_eq!(b.metrics().adaptation_events, 1);
        assert_eq!(b.metrics().total_expansions, 10);
        assert_eq!(b.metrics().current_centers, 30);
        assert_eq!(b.max_centers_reached(), 30);
        // Growth positions continue the adaptive layout
        let expected = adaptive_center(29, 60);
        assert_eq!(b.field().centers()[29].position(), &expected.position);
        assert!(log.energy_efficiency > 0.0 && log.energy_efficiency <= 100.0);
    }

    #[test]
    fn test_growth_stops_at_target() {
        let mut b = GeometricMemoryBenchmark::new(small_config()).unwrap();
        let score = b.run_complete().unwrap();
        assert!(b.field().len() <= 60);
        assert!(b.metrics().total_cycles <= 50);
        assert!(score.is_authentic);
        assert!((0.0..=1.0).contains(&score.overall_score));
    }

    #[test]
    fn test_complete_benchmark() {
        let mut b = GeometricMemoryBenchmark::default_params().unwrap();
        let score = b.run_complete().unwrap();
        let history = b.history();
        assert!(!history.is_empty());
        assert!(history.windows(2).all(|w| w[0].num_centers <= w[1].num_centers));
        assert!(b.field().len() >= 100);
        assert!(b.metrics().total_cycles > 0);
        assert!(score.is_authentic);
        assert_eq!(score.authenticity_score, 1.0);
        let m = b.metrics();
        assert_eq!(score.efficiency_valid, m.energy_efficiency >= 99.0);
        assert_eq!(score.target_reached, b.field().len() >= 1000);
        assert_eq!(
            m.total_expansions as usize,
            b.field().len() - m.initial_centers
        );
        for log in history {
            assert!(log.energy.is_finite());
            assert!((0.0..=100.0).contains(&log.energy_efficiency));
        }
    }

    #[test]
    fn test_expansion_rate_is_percent_growth() {
        let mut b = GeometricMemoryBenchmark::default_params().unwrap();
        b.initialize(100).unwrap();
        assert_eq!(b.measure_expansion_rate(), 0.0);
        for _ in 0..25 {
            b.add_geometric_center().unwrap();
        }
        assert!((b.measure_expansion_rate() - 25.0).abs() < 1e-12);
        assert!((b.metrics().expansion_rate - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_geometric_quality_uses_capacity_fill() {
        let mut b = GeometricMemoryBenchmark::default_params().unwrap();
        b.initialize(100).unwrap();
        let spatial = emergence(b.field());
        let q = b.measure_geometric_quality();
        let m = b.metrics();
        // capacity 10000
        assert!((m.manifold_coherence - 0.01).abs() < 1e-15);
        assert!((q - (spatial + 0.01) / 2.0).abs() < 1e-12);
        assert_eq!(m.topological_efficiency, q);
        assert_eq!(m.geometric_quality, q);
    }

    #[test]
    fn test_score_flags() {
        let mut b = GeometricMemoryBenchmark::new(small_config()).unwrap();
        b.run_complete().unwrap();
        let s = b.score().clone();
        let m = b.metrics();
        let rate = 100.0 * (b.field().len() as f64 - 20.0) / 20.0;
        assert!((m.expansion_rate - rate).abs() < 1e-9);
        assert!((s.expansion_achievement - (rate / 1000.0).min(1.0)).abs() < 1e-12);
        assert_eq!(s.target_reached, b.field().len() >= 60);
        assert_eq!(s.efficiency_valid, m.energy_efficiency >= 99.0);
        assert!(!b.is_target_reached() || s.target_reached);
    }

    #[test]
    fn test_score_weights() {
        let mut b = GeometricMemoryBenchmark::new(small_config()).unwrap();
        b.run_complete().unwrap();
        let s = b.score().clone();
        let expected = 0.30 * s.expansion_achievement
            + 0.40 * s.energy_efficiency_achievement
            + 0.20 * s.geometric_quality
            + 0.10 * s.adaptation_intelligence;
        assert!((s.overall_score - expected).abs() < 1e-12);
        assert_eq!(s, b.calculate_score());
    }

    #[test]
    fn test_report_serializes() {
        let mut b = GeometricMemoryBenchmark::new(small_config()).unwrap();
        b.run_complete().unwrap();
        let report = b.report();
        let json = serde_json::to_string(&report).unwrap();
        let back: BenchmarkReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.metrics.current_centers, report.metrics.current_centers);
        assert_eq!(back.metrics.total_cycles, report.metrics.total_cycles);
        assert_eq!(back.score.is_authentic, report.score.is_authentic);
        assert_eq!(back.config.target_centers, 60);
    }
}
