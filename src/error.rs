use std::path::PathBuf;

use thiserror::Error;

/// Every failure the dashboard core can report.
///
/// Load-time variants (`Io`, `Deserialization`, and `Schema` raised by a
/// loader) are fatal to the session; the rest are scoped to a single
/// interaction and leave the shared datasets and model untouched.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// A source file is missing, unreadable or in an unsupported format.
    #[error("cannot read {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// An expected column is absent or the table layout is malformed.
    #[error("schema error: {0}")]
    Schema(String),

    /// A client identifier is not present in a table.
    #[error("client {0} not found")]
    NotFound(i64),

    /// The model artifact is corrupt or of an incompatible kind.
    #[error("cannot deserialize model: {0}")]
    Deserialization(String),

    /// A value lies outside the domain an operation accepts.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl DashboardError {
    pub fn io(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        DashboardError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        DashboardError::Schema(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        DashboardError::InvalidArgument(msg.into())
    }
}

pub type Result<T, E = DashboardError> = std::result::Result<T, E>;
