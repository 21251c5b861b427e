use super::directory::LookupError;
use super::repository::RepositoryError;
use super::session::TransitionError;

/// Per-request failures surfaced by the adoption engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdoptionError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl AdoptionError {
    pub const fn kind(&self) -> &'static str {
        match self {
            AdoptionError::NotFound(_) => "not_found",
            AdoptionError::InvalidState(_) => "invalid_state",
            AdoptionError::Forbidden(_) => "forbidden",
            AdoptionError::Conflict(_) => "conflict",
            AdoptionError::Unavailable(_) => "unavailable",
        }
    }
}

impl From<LookupError> for AdoptionError {
    fn from(value: LookupError) -> Self {
        match value {
            LookupError::Unavailable(detail) => Self::Unavailable(detail),
            other => Self::NotFound(other.to_string()),
        }
    }
}

impl From<RepositoryError> for AdoptionError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Conflict => {
                Self::Conflict("concurrent update lost, retry the request".to_string())
            }
            RepositoryError::NotFound => Self::NotFound("record not found".to_string()),
            RepositoryError::Unavailable(detail) => Self::Unavailable(detail),
        }
    }
}

impl From<TransitionError> for AdoptionError {
    fn from(value: TransitionError) -> Self {
        match value {
            TransitionError::UnknownAlternative { .. } => Self::NotFound(value.to_string()),
            other => Self::InvalidState(other.to_string()),
        }
    }
}
