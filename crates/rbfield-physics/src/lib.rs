// ─────────────────────────────────────────────────────────────────────
// RBField — Field Physics
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Complex-valued Gaussian RBF field on a 6D embedding space: center
//! storage and evaluation, metric tensors, derived quantities, explicit
//! snapshot evolution with neighbor diffusion, and global coupling.

pub mod coupling;
pub mod evolution;
pub mod field;
pub mod metric;
pub mod neighbors;
pub mod params;
pub mod primitives;
pub mod projection;
pub mod quantities;

pub use coupling::{CouplingEntry, CouplingKernel, CouplingMatrix, GlobalCoupling};
pub use evolution::{evolve, EvolutionStepper, GrowthPolicy, StepReport};
pub use field::{Center, RbfField, RbfKernel};
pub use metric::Metric;
pub use neighbors::{Neighbor, NeighborGraph};
pub use params::{adaptive_center, spiral_seed, CenterSpec, MANIFOLD_DIM, SLICE_DIM};
pub use primitives::Point;
pub use projection::SliceProjection;
pub use quantities::FieldSummary;

pub use num_complex::Complex64;
