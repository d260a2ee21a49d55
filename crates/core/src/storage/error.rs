use thiserror::Error;

use crate::contact::ContactError;
use crate::plan::PlanError;
use crate::record::FieldError;

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("{entity_type} already exists: {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Unsupported by this storage backend: {0}")]
    Unsupported(&'static str),
}

impl RepositoryError {
    /// HTTP status for a failed request. Duplicate emails in a batch are 409;
    /// an unreachable server is 503.
    pub fn status_code(&self) -> u16 {
        match self {
            RepositoryError::InvalidData(_) => 400,
            RepositoryError::NotFound { .. } => 404,
            RepositoryError::AlreadyExists { .. } => 409,
            RepositoryError::QueryFailed(_) | RepositoryError::Serialization(_) => 500,
            RepositoryError::Unsupported(_) => 501,
            RepositoryError::ConnectionFailed(_) => 503,
        }
    }

    /// Stable snake_case name of the variant, for error bodies and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RepositoryError::NotFound { .. } => "not_found",
            RepositoryError::AlreadyExists { .. } => "already_exists",
            RepositoryError::ConnectionFailed(_) => "connection_failed",
            RepositoryError::QueryFailed(_) => "query_failed",
            RepositoryError::Serialization(_) => "serialization",
            RepositoryError::InvalidData(_) => "invalid_data",
            RepositoryError::Unsupported(_) => "unsupported",
        }
    }
}

impl From<ContactError> for RepositoryError {
    fn from(err: ContactError) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}

impl From<FieldError> for RepositoryError {
    fn from(err: FieldError) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}

impl From<PlanError> for RepositoryError {
    fn from(err: PlanError) -> Self {
        RepositoryError::QueryFailed(err.to_string())
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
