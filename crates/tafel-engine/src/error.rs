//! Error types for the engine and its repository ports.

use tafel_core::CoreError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Failures reported by a repository implementation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RepoError {
    /// The entity to update or delete does not exist.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        /// Kind of entity, e.g. `"table"`.
        entity_type: &'static str,
        /// Requested identifier.
        id: String,
    },

    /// Reading or writing the backing store failed.
    #[error("storage error in {operation}: {message}")]
    Storage {
        /// Repository operation that failed.
        operation: &'static str,
        /// Underlying error text.
        message: String,
    },

    /// A stored document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors surfaced by roll, evaluation and CRUD use cases.
///
/// Unresolvable and circular references are not errors; they degrade the
/// output text instead.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A request was rejected before any work began.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A top-level table or template does not exist.
    #[error("{kind} with ID {id} not found")]
    NotFound {
        /// `"table"` or `"template"`.
        kind: &'static str,
        /// Requested identifier.
        id: String,
    },

    /// Domain validation failed.
    #[error("{0}")]
    Domain(#[from] CoreError),

    /// The repository failed.
    #[error("{0}")]
    Repo(#[from] RepoError),
}

impl EngineError {
    pub(crate) fn table_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "table",
            id: id.into(),
        }
    }

    pub(crate) fn template_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "template",
            id: id.into(),
        }
    }
}
