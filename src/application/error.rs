use crate::domain::errors::DomainError;
use thiserror::Error;

pub type ApplicationResult<T> = Result<T, ApplicationError>;

/// Failures that leave the application layer.
///
/// Only `Domain` is fully classified. The other variants carry the raw driver
/// or runtime failure so the HTTP boundary can decide how to render it.
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// An integrity constraint rejected a statement; holds the driver error text.
    #[error("integrity constraint violated: {0}")]
    Integrity(String),

    /// The store failed for a reason other than a constraint (connectivity,
    /// bad SQL, pool exhaustion).
    #[error("{kind}: {message}")]
    Database { kind: &'static str, message: String },

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl ApplicationError {
    pub fn integrity(raw: impl Into<String>) -> Self {
        Self::Integrity(raw.into())
    }

    pub fn database(kind: &'static str, message: impl Into<String>) -> Self {
        Self::Database {
            kind,
            message: message.into(),
        }
    }

    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::Unexpected(anyhow::anyhow!(msg.into()))
    }

    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(err) => Some(err),
            _ => None,
        }
    }
}
