//! Failure taxonomy for the dashboard.
//!
//! Query and compilation failures are never fatal: the view controller turns
//! them into notifications and keeps the last successful render.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    /// The remote database rejected or failed to run a SQL string.
    #[error("query execution failed: {0}")]
    QueryExecution(String),

    /// A map render spec could not be compiled into overlay imagery.
    #[error("spec compilation failed: {0}")]
    SpecCompilation(String),

    /// A refresh was requested before the viewport or filters existed.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The map or chart widget failed to accept an update.
    #[error("renderer error: {0}")]
    Render(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
