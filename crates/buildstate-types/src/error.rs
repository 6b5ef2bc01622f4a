use thiserror::Error;

/// Errors related to registry operations.
///
/// A missing build is a routine outcome for the hot path and is returned
/// as `None` there; `NotFound` exists for callers that want a `Result`.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("build '{0}' not found")]
    NotFound(String),

    #[error("invalid registry config: {0}")]
    InvalidConfig(String),
}
