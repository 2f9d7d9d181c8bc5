//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Failures detected locally, before a request is sent.
///
/// Transport and backend failures live in the client crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Form input the backend would reject, or a rule it leaves to the client
    /// (e.g. an entrada without a supplier).
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Clashes with records already loaded (e.g. a second stock row for the
    /// same product and warehouse).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// The bare message, without the category prefix of `Display`.
    pub fn message(&self) -> String {
        match self {
            Self::Validation(m) | Self::InvalidId(m) | Self::Conflict(m) => m.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_drops_the_category() {
        let err = DomainError::validation("entradas must have an associated supplier");
        assert_eq!(err.to_string(), "validation failed: entradas must have an associated supplier");
        assert_eq!(err.message(), "entradas must have an associated supplier");
    }
}
