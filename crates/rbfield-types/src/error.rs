// ─────────────────────────────────────────────────────────────────────
// RBField — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all RBField failures.
///
/// Every variant is recoverable from the caller's side: retry with
/// valid arguments or abandon the object.
#[derive(Error, Debug)]
pub enum FieldError {
    /// Out-of-range dimension, capacity or width; point dimension mismatch.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Insertion into a field already holding `capacity` centers.
    #[error("capacity exceeded: field already holds {capacity} centers")]
    CapacityExceeded { capacity: usize },

    /// A heap reservation could not be satisfied.
    #[error("allocation failure: {0}")]
    AllocationFailure(String),

    /// A quantity defined only above a center-count threshold was requested below it.
    #[error("{quantity} needs at least {required} centers, field has {actual}")]
    Underconstrained {
        quantity: &'static str,
        required: usize,
        actual: usize,
    },

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Numerical error (NaN/Inf in computation).
    #[error("numerical error: {0}")]
    Numerical(String),

    /// Diagnostic dump could not be written or read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FieldResult<T> = Result<T, FieldError>;
