// ─────────────────────────────────────────────────────────────────────
// RBField — Streaming Signal Embedder
// ─────────────────────────────────────────────────────────────────────
//! Embeds a scalar sample stream into the 6D field, one center per
//! sample:
//!
//!   x = (s, ṡ, s̈, t, t + 1/sr, m),   c = s + iṡ
//!
//! with backward differences over a circular buffer. The field is a
//! FIFO of the most recent `max_centers` samples: when full, the oldest
//! center is evicted before the new one is inserted.

use num_complex::Complex64;

use rbfield_physics::quantities::{energy, scalar_curvature};
use rbfield_physics::{Point, RbfField};
use rbfield_types::{FieldError, FieldResult, SignalDescriptors, StreamConfig};

pub struct SignalProcessor {
    config: StreamConfig,
    field: RbfField,
    buffer: Vec<f64>,
    /// Next write position.
    cursor: usize,
    sample_count: u64,
    last: SignalDescriptors,
}

impl SignalProcessor {
    /// Processor with the default configuration at `sample_rate` Hz.
    pub fn new(sample_rate: f64) -> FieldResult<Self> {
        Self::with_config(StreamConfig::with_sample_rate(sample_rate))
    }

    pub fn with_config(config: StreamConfig) -> FieldResult<Self> {
        config.validate()?;
        let field = RbfField::new(config.max_centers, config.fractal_dim)?;
        log::debug!(
            "SignalProcessor: sr={} Hz, buffer={}, max_centers={}",
            config.sample_rate,
            config.buffer_size,
            config.max_centers
        );
        Ok(Self {
            buffer: vec![0.0; config.buffer_size],
            config,
            field,
            cursor: 0,
            sample_count: 0,
            last: SignalDescriptors::default(),
        })
    }

    /// Embed one sample and return the updated descriptors.
    ///
    /// A non-finite sample is rejected and leaves the processor unchanged.
    pub fn process_sample(&mut self, sample: f64) -> FieldResult<SignalDescriptors> {
        if !sample.is_finite() {
            return Err(FieldError::InvalidArgument(format!(
                "sample must be finite, got {sample}"
            )));
        }
        let size = self.buffer.len();
        let pos = self.cursor;
        let prev = self.buffer[(pos + size - 1) % size];
        let prev2 = self.buffer[(pos + size - 2) % size];

        let sr = self.config.sample_rate;
        let t = self.time();
        let velocity = (sample - prev) * sr;
        let acceleration = (sample - 2.0 * prev + prev2) * sr * sr;
        let x = Point::from([sample, velocity, acceleration, t, t + 1.0 / sr, self.config.modality]);
        let coeff = Complex64::new(sample, velocity);

        // 1. Insert, evicting the oldest center when full
        match self.field.add_center(&x, coeff, self.config.epsilon) {
            Ok(()) => {}
            Err(FieldError::CapacityExceeded { .. }) => {
                self.field.remove_center(0)?;
                self.field.add_center(&x, coeff, self.config.epsilon)?;
            }
            Err(e) => return Err(e),
        }

        // 2. Commit the sample
        self.buffer[pos] = sample;
        self.cursor = (pos + 1) % size;

        // 3. Descriptors
        let (mean, variance) = self.buffer_statistics();
        let descriptors = SignalDescriptors {
            energy: energy(&self.field),
            curvature: scalar_curvature(&self.field, &x),
            num_components: self.count_peaks(pos),
            num_loops: 0,
            mean,
            variance,
            timestamp: t,
        };

        self.sample_count += 1;
        self.last = descriptors;
        Ok(descriptors)
    }

    /// Embed a block of samples; stops at the first rejected sample.
    pub fn process_block(&mut self, samples: &[f64]) -> FieldResult<Vec<SignalDescriptors>> {
        samples.iter().map(|&s| self.process_sample(s)).collect()
    }

    /// Descriptors of the most recent sample (all zero before the first).
    pub fn features(&self) -> SignalDescriptors {
        self.last
    }

    /// Zero the buffer, counters and clock and start from an empty field.
    pub fn reset(&mut self) -> FieldResult<()> {
        self.field = RbfField::new(self.config.max_centers, self.config.fractal_dim)?;
        self.buffer.iter_mut().for_each(|v| *v = 0.0);
        self.cursor = 0;
        self.sample_count = 0;
        self.last = SignalDescriptors::default();
        Ok(())
    }

    /// Strict local maxima at offsets 1..B−2 behind the newest sample,
    /// neighbors taken circularly.
    fn count_peaks(&self, newest: usize) -> usize {
        let size = self.buffer.len();
        (1..size - 1)
            .filter(|&i| {
                let idx = (newest + size - i) % size;
                let v = self.buffer[idx];
                v > self.buffer[(idx + size - 1) % size] && v > self.buffer[(idx + 1) % size]
            })
            .count()
    }

    /// Mean and population variance of the whole buffer.
    fn buffer_statistics(&self) -> (f64, f64) {
        let n = self.buffer.len() as f64;
        let mean = self.buffer.iter().sum::<f64>() / n;
        let variance = self.buffer.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        (mean, variance)
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn field(&self) -> &RbfField {
        &self.field
    }

    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    /// Stream clock: samples processed / sample rate.
    pub fn time(&self) -> f64 {
        self.sample_count as f64 / self.config.sample_rate
    }

    pub fn sample_rate(&self) -> f64 {
        self.config.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::TAU;
    use std::time::Instant;

    const SR: f64 = 44_100.0;

    fn sine(i: usize) -> f64 {
        (TAU * 440.0 * i as f64 / SR).sin()
    }

    #[test]
    fn test_invalid_sample_rate() {
        assert!(SignalProcessor::new(0.0).is_err());
        assert!(SignalProcessor::new(-1.0).is_err());
        assert!(SignalProcessor::new(f64::NAN).is_err());
    }

    #[test]
    fn test_first_sample() {
        let mut p = SignalProcessor::new(SR).unwrap();
        let d = p.process_sample(0.5).unwrap();
        assert_eq!(p.field().len(), 1);
        assert_eq!(d.timestamp, 0.0);
        assert_eq!(d.num_loops, 0);
        // c = 0.5 + i·0.5·sr
        let c = p.field().centers()[0].coefficient();
        assert!((c.re - 0.5).abs() < 1e-12);
        assert!((c.im - 0.5 * SR).abs() < 1e-6);
        assert!((d.energy - c.norm_sqr()).abs() < 1e-6 * c.norm_sqr());
        assert_eq!(p.features(), d);
        assert_eq!(p.sample_count(), 1);
    }

    #[test]
    fn test_rejects_non_finite_sample() {
        let mut p = SignalProcessor::new(SR).unwrap();
        p.process_sample(0.1).unwrap();
        let before = p.features();
        assert!(p.process_sample(f64::NAN).is_err());
        assert!(p.process_sample(f64::INFINITY).is_err());
        assert_eq!(p.sample_count(), 1);
        assert_eq!(p.field().len(), 1);
        assert_eq!(p.features(), before);
    }

    #[test]
    fn test_sine_wave() {
        let mut p = SignalProcessor::new(SR).unwrap();
        let buffer = p.config().buffer_size;
        for i in 0..4410 {
            let d = p.process_sample(sine(i)).unwrap();
            assert!(d.is_finite(), "sample {i}: {d:?}");
            assert!(d.curvature <= 0.0);
            if i >= buffer {
                assert!(d.num_components > 0, "sample {i}");
                assert!((d.variance - 0.5).abs() < 0.05, "sample {i}: var={}", d.variance);
            }
        }
        assert_eq!(p.field().len(), 100);
        assert!((p.time() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_fifo_eviction_keeps_newest() {
        let mut p = SignalProcessor::new(SR).unwrap();
        for i in 0..250 {
            p.process_sample(sine(i)).unwrap();
        }
        let field = p.field();
        assert_eq!(field.len(), 100);
        // τ₁ of the oldest surviving center is sample 150
        let oldest_t = field.centers()[0].position().coords()[3];
        assert!((oldest_t - 150.0 / SR).abs() < 1e-12);
        let newest_t = field.centers()[99].position().coords()[3];
        assert!((newest_t - 249.0 / SR).abs() < 1e-12);
    }

    #[test]
    fn test_anomaly_curvature() {
        let mut p = SignalProcessor::new(SR).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let mut curv = Vec::with_capacity(2000);
        for i in 0..2000 {
            let s = if (1000..1100).contains(&i) {
                rng.gen_range(-2.0..2.0)
            } else {
                sine(i)
            };
            let d = p.process_sample(s).unwrap();
            assert!(d.is_finite());
            curv.push(d.curvature.abs());
        }
        let mean = |r: std::ops::Range<usize>| curv[r.clone()].iter().sum::<f64>() / r.len() as f64;
        let baseline = mean(0..1000);
        let anomaly = mean(1000..1100);
        // The proxy saturates at the clip for large |Φ|: noise drives
        // every sample into saturation, the sine only most of them.
        assert!(anomaly >= baseline, "anomaly={anomaly} baseline={baseline}");
        assert!(anomaly > 900.0);
    }

    #[test]
    fn test_block_matches_samples() {
        let samples: Vec<f64> = (0..300).map(sine).collect();
        let mut a = SignalProcessor::new(SR).unwrap();
        let block = a.process_block(&samples).unwrap();
        let mut b = SignalProcessor::new(SR).unwrap();
        let last = samples.iter().map(|&s| b.process_sample(s).unwrap()).last();
        assert_eq!(block.len(), 300);
        assert_eq!(block.last().copied(), last);
    }

    #[test]
    fn test_reset_restores_fresh_state() {
        let samples: Vec<f64> = (0..500).map(sine).collect();
        let mut fresh = SignalProcessor::new(SR).unwrap();
        let expected = fresh.process_block(&samples[..50]).unwrap();

        let mut p = SignalProcessor::new(SR).unwrap();
        p.process_block(&samples).unwrap();
        p.reset().unwrap();
        assert_eq!(p.sample_count(), 0);
        assert_eq!(p.time(), 0.0);
        assert!(p.field().is_empty());
        assert_eq!(p.features(), SignalDescriptors::default());
        assert_eq!(p.process_block(&samples[..50]).unwrap(), expected);
    }

    #[test]
    fn test_peak_count_square_wave() {
        let cfg = StreamConfig {
            buffer_size: 16,
            ..StreamConfig::with_sample_rate(100.0)
        };
        let mut p = SignalProcessor::with_config(cfg).unwrap();
        // 0,1,0,1,... → each 1 is a strict maximum
        let mut last = SignalDescriptors::default();
        for i in 0..16 {
            last = p.process_sample((i % 2) as f64).unwrap();
        }
        // Newest sample (index 15, a 1) is excluded, as is offset B−1
        assert_eq!(last.num_components, 7);
        assert!((last.mean - 0.5).abs() < 1e-12);
        assert!((last.variance - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_per_sample_cost() {
        let mut p = SignalProcessor::new(SR).unwrap();
        for i in 0..200 {
            p.process_sample(sine(i)).unwrap();
        }
        let n = 2000;
        let start = Instant::now();
        for i in 0..n {
            p.process_sample(sine(i)).unwrap();
        }
        let per_sample = start.elapsed().as_secs_f64() / n as f64;
        assert!(per_sample < 1e-3, "per-sample {per_sample}s");
    }
}
