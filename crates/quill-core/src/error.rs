//! Domain, repository and gateway error types.

use thiserror::Error;
use uuid::Uuid;

use crate::validation::FormErrors;

/// Domain errors - business rule failures detected before any remote call.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: Uuid },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid form: {0}")]
    InvalidForm(FormErrors),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Unauthorized access")]
    Unauthorized,
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

/// Errors surfaced by a [`BlogGateway`](crate::ports::BlogGateway) or
/// [`AuthGateway`](crate::ports::AuthGateway).
///
/// Every variant renders as a single human-readable line; that line is what a
/// store slice keeps as its error message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// A required field was missing or malformed. Raised before the backend is contacted.
    #[error("{0}")]
    Validation(String),

    /// The backend refused the request; carries the backend's own message.
    #[error("{0}")]
    Rejected(String),

    /// A uniqueness rule (slug, email, username) was violated.
    #[error("{0}")]
    Conflict(String),

    /// The caller lacks the capability for this row, including deletes the
    /// backend reported as successful but did not perform.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("{0}")]
    Unauthenticated(String),

    /// The backend could not be reached.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

impl GatewayError {
    pub fn login_required() -> Self {
        Self::Unauthenticated("Please log in to continue".to_string())
    }
}

impl From<DomainError> for GatewayError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => {
                GatewayError::Rejected(format!("{entity_type} {id} not found"))
            }
            DomainError::Validation(msg) => GatewayError::Validation(msg),
            DomainError::InvalidForm(errors) => GatewayError::Validation(errors.to_string()),
            DomainError::Duplicate(msg) => GatewayError::Conflict(msg),
            DomainError::Unauthorized => GatewayError::login_required(),
        }
    }
}

impl From<RepoError> for GatewayError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Connection(msg) => GatewayError::Unavailable(msg),
            RepoError::Query(msg) => GatewayError::Rejected(msg),
            RepoError::NotFound => GatewayError::Rejected("Resource not found".to_string()),
            RepoError::Constraint(msg) => GatewayError::Conflict(msg),
        }
    }
}
