//! Error types for the valla allocation engine.

use thiserror::Error;

/// Primary error type for planning and distribution operations.
#[derive(Error, Debug)]
pub enum DistError {
    #[error("no billboards to distribute")]
    EmptyInput,

    #[error("at least 2 partners required, got {0}")]
    TooFewPartners(usize),

    #[error("distribution not found: {0}")]
    DistributionNotFound(String),

    #[error("billboard not found in distribution: {0}")]
    BillboardNotFound(String),

    #[error("billboards {0} and {1} are already on the same partner")]
    SamePartnerSwap(String, String),

    #[error("no items match group key: {0}")]
    NoMatchingItems(String),

    #[error("store error: {0}")]
    Store(String),
}

/// Convenience Result type alias for DistError.
pub type Result<T> = std::result::Result<T, DistError>;
