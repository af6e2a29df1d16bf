// ─────────────────────────────────────────────────────────────────────
// RBField — Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FieldResult};

fn parse_json<T: DeserializeOwned>(json: &str) -> FieldResult<T> {
    serde_json::from_str(json).map_err(|e| FieldError::Config(format!("JSON parse error: {e}")))
}

fn require_positive(name: &str, value: f64) -> FieldResult<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(FieldError::Config(format!(
            "{name} must be finite and > 0, got {value}"
        )));
    }
    Ok(())
}

/// Construction parameters for a bare field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Maximum number of centers the field can hold.
    pub capacity: usize,
    /// Fractal-dimension tag carried by the field.
    pub fractal_dim: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            fractal_dim: 2.5,
        }
    }
}

impl FieldConfig {
    pub fn validate(&self) -> FieldResult<()> {
        if self.capacity == 0 {
            return Err(FieldError::Config("capacity must be >= 1".to_string()));
        }
        if !self.fractal_dim.is_finite() {
            return Err(FieldError::Config(format!(
                "fractal_dim must be finite, got {}",
                self.fractal_dim
            )));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> FieldResult<Self> {
        parse_json(json)
    }
}

/// Streaming embedder configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Samples per second. Default: 44100.
    pub sample_rate: f64,
    /// Circular sample buffer length. Default: 1024.
    pub buffer_size: usize,
    /// Field capacity; the oldest center is evicted past this. Default: 100.
    pub max_centers: usize,
    /// Width of every streamed center. Default: 0.1.
    pub epsilon: f64,
    /// Fractal-dimension tag of the underlying field. Default: 2.5.
    pub fractal_dim: f64,
    /// Sixth embedding coordinate. Default: 0.0 (audio).
    pub modality: f64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100.0,
            buffer_size: 1024,
            max_centers: 100,
            epsilon: 0.1,
            fractal_dim: 2.5,
            modality: 0.0,
        }
    }
}

impl StreamConfig {
    /// Default configuration at the given sample rate.
    pub fn with_sample_rate(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> FieldResult<()> {
        require_positive("sample_rate", self.sample_rate)?;
        require_positive("epsilon", self.epsilon)?;
        if self.buffer_size < 3 {
            return Err(FieldError::Config(format!(
                "buffer_size must be >= 3, got {}",
                self.buffer_size
            )));
        }
        if self.max_centers == 0 {
            return Err(FieldError::Config("max_centers must be >= 1".to_string()));
        }
        if !(self.fractal_dim.is_finite() && self.modality.is_finite()) {
            return Err(FieldError::Config(
                "fractal_dim and modality must be finite".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> FieldResult<Self> {
        parse_json(json)
    }
}

/// Coefficients of the explicit evolution step
/// `Φ ← Φ + Δt·(D·L − α|Φ|²Φ + β·T(t))`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionParams {
    /// Diffusion coefficient D. Default: 0.1.
    pub diffusion: f64,
    /// Cubic damping α. Default: 0.05.
    pub nonlinearity: f64,
    /// Torsion strength β. Default: 0.02.
    pub torsion: f64,
    /// Neighbor cutoff τ on squared distance. Default: 0.1.
    pub neighbor_cutoff_sq: f64,
    /// Laplacian regularizer δ. Default: 1e-3.
    pub regularizer: f64,
    /// Cap the per-center diffusion gain at 1 so the explicit sweep
    /// stays a convex combination. Default: false (the plain update).
    pub limit_diffusion: bool,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            diffusion: 0.1,
            nonlinearity: 0.05,
            torsion: 0.02,
            neighbor_cutoff_sq: 0.1,
            regularizer: 1e-3,
            limit_diffusion: false,
        }
    }
}

impl EvolutionParams {
    /// Default coefficients with the diffusion gain limiter enabled.
    pub fn limited() -> Self {
        Self {
            limit_diffusion: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> FieldResult<()> {
        for (name, v) in [
            ("diffusion", self.diffusion),
            ("nonlinearity", self.nonlinearity),
            ("torsion", self.torsion),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(FieldError::Config(format!(
                    "{name} must be finite and >= 0, got {v}"
                )));
            }
        }
        require_positive("neighbor_cutoff_sq", self.neighbor_cutoff_sq)?;
        require_positive("regularizer", self.regularizer)?;
        Ok(())
    }

    pub fn from_json(json: &str) -> FieldResult<Self> {
        parse_json(json)
    }
}

/// Geometric-memory benchmark configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Centers placed by `initialize`. Default: 100.
    pub initial_centers: usize,
    /// Growth stops once the field holds this many. Default: 1000.
    pub target_centers: usize,
    /// Field capacity. Default: 10000.
    pub max_centers: usize,
    /// Efficiency (percent, 0–100) required for `target_reached`. Default: 99.0.
    pub energy_efficiency_target: f64,
    /// Efficiency (percent) above which a cycle spawns centers. Default: 0.95.
    pub expansion_threshold: f64,
    /// Hard stop for `run_complete`. Default: 1000.
    pub max_cycles: u64,
    /// Evolution time step per cycle. Default: 0.01.
    pub dt: f64,
    /// Centers added per growing cycle while below `batch_switch`. Default: 10.
    pub small_field_batch: usize,
    /// Centers added per growing cycle at or above `batch_switch`. Default: 1.
    pub large_field_batch: usize,
    /// Center count where the batch size drops. Default: 500.
    pub batch_switch: usize,
    /// Progress is logged every this many cycles (0 disables). Default: 100.
    pub monitor_interval: u64,
    /// Fractal-dimension tag of the benchmark field. Default: 2.5.
    pub fractal_dim: f64,
    /// Evolution step of each cycle. Default: [`EvolutionParams::limited`].
    /// Densely seeded growth drives Δt·D·Σw far above 1 and the plain
    /// explicit update overflows within a few cycles, so the benchmark
    /// opts into the gain limiter. An `evolution` object given in JSON
    /// starts from the plain defaults.
    pub evolution: EvolutionParams,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            initial_centers: 100,
            target_centers: 1000,
            max_centers: 10_000,
            energy_efficiency_target: 99.0,
            expansion_threshold: 0.95,
            max_cycles: 1000,
            dt: 0.01,
            small_field_batch: 10,
            large_field_batch: 1,
            batch_switch: 500,
            monitor_interval: 100,
            fractal_dim: 2.5,
            evolution: EvolutionParams::limited(),
        }
    }
}

impl BenchmarkConfig {
    pub fn validate(&self) -> FieldResult<()> {
        if self.initial_centers == 0 {
            return Err(FieldError::Config("initial_centers must be >= 1".to_string()));
        }
        if self.target_centers < self.initial_centers {
            return Err(FieldError::Config(format!(
                "target_centers ({}) must be >= initial_centers ({})",
                self.target_centers, self.initial_centers
            )));
        }
        if self.max_centers < self.target_centers {
            return Err(FieldError::Config(format!(
                "max_centers ({}) must be >= target_centers ({})",
                self.max_centers, self.target_centers
            )));
        }
        if !(0.0..=100.0).contains(&self.energy_efficiency_target) {
            return Err(FieldError::Config(format!(
                "energy_efficiency_target must be in [0, 100], got {}",
                self.energy_efficiency_target
            )));
        }
        if !self.expansion_threshold.is_finite() {
            return Err(FieldError::Config(
                "expansion_threshold must be finite".to_string(),
            ));
        }
        require_positive("dt", self.dt)?;
        if self.max_cycles == 0 {
            return Err(FieldError::Config("max_cycles must be >= 1".to_string()));
        }
        if !self.fractal_dim.is_finite() {
            return Err(FieldError::Config("fractal_dim must be finite".to_string()));
        }
        self.evolution.validate()
    }

    pub fn from_json(json: &str) -> FieldResult<Self> {
        parse_json(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        FieldConfig::default().validate().unwrap();
        StreamConfig::default().validate().unwrap();
        EvolutionParams::default().validate().unwrap();
        BenchmarkConfig::default().validate().unwrap();
    }

    #[test]
    fn test_stream_defaults_match_named_constants() {
        let c = StreamConfig::default();
        assert_eq!(c.buffer_size, 1024);
        assert_eq!(c.max_centers, 100);
        assert!((c.epsilon - 0.1).abs() < 1e-15);
        assert_eq!(c.modality, 0.0);
    }

    #[test]
    fn test_invalid_sample_rate() {
        let c = StreamConfig::with_sample_rate(0.0);
        assert!(c.validate().is_err());
        let c = StreamConfig::with_sample_rate(f64::NAN);
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_benchmark_ordering_checked() {
        let c = BenchmarkConfig {
            target_centers: 50,
            ..Default::default()
        };
        assert!(c.validate().is_err());

        let c = BenchmarkConfig {
            max_centers: 999,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_nested_evolution_validated() {
        let mut c = BenchmarkConfig::default();
        c.evolution.regularizer = 0.0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let c = BenchmarkConfig::from_json(r#"{"target_centers": 300, "dt": 0.02}"#).unwrap();
        assert_eq!(c.target_centers, 300);
        assert!((c.dt - 0.02).abs() < 1e-15);
        assert_eq!(c.initial_centers, 100);
        assert!(c.evolution.limit_diffusion);
    }

    #[test]
    fn test_limiter_is_opt_in() {
        assert!(!EvolutionParams::default().limit_diffusion);
        assert!(EvolutionParams::limited().limit_diffusion);
        assert!(BenchmarkConfig::default().evolution.limit_diffusion);
        let nested = BenchmarkConfig::from_json(r#"{"evolution": {"diffusion": 0.2}}"#).unwrap();
        assert!(!nested.evolution.limit_diffusion);
        assert!((nested.evolution.diffusion - 0.2).abs() < 1e-15);
    }

    #[test]
    fn test_json_roundtrip() {
        let c = StreamConfig::with_sample_rate(8000.0);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(StreamConfig::from_json(&json).unwrap(), c);
    }

    #[test]
    fn test_invalid_json() {
        let err = EvolutionParams::from_json("{not json").unwrap_err();
        assert!(matches!(err, FieldError::Config(_)));
    }
}
