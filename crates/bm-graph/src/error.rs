//! Graph-specific error types.

use bm_core::{FluxKey, ReservoirKey};

pub type GraphResult<T> = Result<T, GraphError>;

/// Graph construction and validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// A reservoir with this key is already registered.
    DuplicateKey { key: ReservoirKey },

    /// A flux whose source and destination are the same reservoir.
    InvalidFlux { key: FluxKey },

    /// A reservoir initial mass that is NaN or infinite.
    NonFiniteMass { key: ReservoirKey, value: f64 },

    /// A flux endpoint that names no registered reservoir.
    DanglingReference { flux: FluxKey, key: ReservoirKey },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::DuplicateKey { key } => {
                write!(f, "Reservoir key {} is already used", key)
            }
            GraphError::InvalidFlux { key } => {
                write!(f, "Flux {} starts and ends in the same reservoir", key)
            }
            GraphError::NonFiniteMass { key, value } => {
                write!(f, "Reservoir {} has non-finite initial mass {}", key, value)
            }
            GraphError::DanglingReference { flux, key } => {
                write!(f, "Flux {} refers to non-existent reservoir {}", flux, key)
            }
        }
    }
}

impl std::error::Error for GraphError {}
