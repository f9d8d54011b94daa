//! Application-wide error types.

use thiserror::Error;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Application-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Pipeline failure: {0}")]
    PipelineFailure(String),

    #[error(
        "Gather phase timed out after {timeout_secs}s ({completed}/{total} units responded)"
    )]
    PhaseTimeout {
        timeout_secs: u64,
        completed: usize,
        total: usize,
    },

    #[error("Distribution unavailable: {0}")]
    DistributionUnavailable(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn pipeline(msg: impl Into<String>) -> Self {
        Self::PipelineFailure(msg.into())
    }

    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }
}
