// ─────────────────────────────────────────────────────────────────────
// RBField — Engine Drivers
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Drivers built on the field physics: a streaming embedder that turns
//! a sample stream into field centers and signal descriptors, and the
//! geometric-memory benchmark that grows a field under evolution.
//!
//! # Invariants
//!
//! 1. **Bounded streaming state**: the embedder's field never holds more
//!    than `max_centers` centers; per-sample cost depends on the buffer
//!    size and center cap, never on how many samples were processed.
//!
//! 2. **Monotone growth**: the benchmark only appends centers, so the
//!    center count is non-decreasing across cycles.
//!
//! 3. **Finite outputs**: descriptors, metrics and scores are finite;
//!    undefined ratios are reported as 0 and flagged.

pub mod diagnostics;
pub mod memory;
pub mod stream;

pub use diagnostics::{read_series, write_coupling_weights, write_series};
pub use memory::{BenchmarkReport, CycleLog, GeometricMemoryBenchmark, MemoryMetrics};
pub use stream::SignalProcessor;
