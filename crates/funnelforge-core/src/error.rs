use thiserror::Error;

/// Core error type shared across Funnelforge crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Generation inputs are rejected before any work starts.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A generated dataset violates internal invariants.
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),
}

/// Convenience alias for results returned by Funnelforge crates.
pub type Result<T> = std::result::Result<T, Error>;
