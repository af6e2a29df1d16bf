// ─────────────────────────────────────────────────────────────────────
// RBField — Engine Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions, configuration, and error hierarchy shared by the
//! RBField physics layer, the streaming embedder and the geometric
//! memory benchmark.

pub mod config;
pub mod error;
pub mod score;

pub use config::{BenchmarkConfig, EvolutionParams, FieldConfig, StreamConfig};
pub use error::{FieldError, FieldResult};
pub use score::{clamp_score, finite_or_zero, MemoryScore, SignalDescriptors};
