//! Error types for simulation operations.

use thiserror::Error;

/// Errors raised by model construction and runs.
///
/// Every variant is a precondition violation detected before integration
/// starts; nothing is retried.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Results already exist; allow overwrite or confirm to replace them")]
    ResultsExist,

    #[error(transparent)]
    Graph(#[from] bm_graph::GraphError),

    #[error(transparent)]
    Core(#[from] bm_core::CoreError),
}

pub type SimResult<T> = Result<T, SimError>;
