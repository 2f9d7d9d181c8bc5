//! Client error taxonomy.
//!
//! Every failure a screen can show ends up as one of these variants; the UI
//! (or the CLI) renders [`ClientError::user_message`] and moves on.

use serde_json::Value;

use inventario_auth::{AuthzError, Permission};
use inventario_core::DomainError;

use crate::token_store::TokenStoreError;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Rejected locally before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// The backend answered with a non-success status.
    #[error("{detail}")]
    Api { status: u16, detail: String },

    #[error("could not reach server: {0}")]
    Network(String),

    /// The backend rejected the bearer token; the session is gone.
    #[error("session expired, please sign in again")]
    SessionExpired,

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(Permission),

    /// The owning screen was closed before the response arrived.
    #[error("request cancelled")]
    Cancelled,

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("token storage failed: {0}")]
    Storage(#[from] TokenStoreError),
}

impl ClientError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Short text suitable for an error banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "could not reach server".to_string(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::SessionExpired => Some(401),
            _ => None,
        }
    }

    /// Errors that must abort a multi-request load instead of being
    /// tolerated as a partial failure.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::SessionExpired | Self::NotAuthenticated | Self::Cancelled)
    }
}

impl From<DomainError> for ClientError {
    fn from(err: DomainError) -> Self {
        Self::Validation(err.message())
    }
}

impl From<AuthzError> for ClientError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthenticated => Self::NotAuthenticated,
            AuthzError::Forbidden(permission) => Self::Forbidden(permission),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// The backend reports `{"detail": "..."}` for handled errors and
/// `{"detail": [{"msg": "...", ...}]}` for request validation failures.
/// Returns `None` when neither shape is present.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(obj) => {
                        let msg = obj.get("msg")?.as_str()?;
                        let field = obj
                            .get("loc")
                            .and_then(Value::as_array)
                            .and_then(|loc| loc.last())
                            .and_then(|last| match last {
                                Value::String(s) => Some(s.clone()),
                                _ => None,
                            });
                        Some(match field {
                            Some(field) => format!("{field}: {msg}"),
                            None => msg.to_string(),
                        })
                    }
                    _ => None,
                })
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inventario_auth::{Action, Resource};

    #[test]
    fn string_detail_is_used_verbatim() {
        assert_eq!(
            extract_detail(r#"{"detail":"Email ya registrado"}"#).as_deref(),
            Some("Email ya registrado")
        );
    }

    #[test]
    fn validation_detail_lists_fields() {
        let body = r#"{"detail":[
            {"loc":["body","email"],"msg":"field required","type":"value_error.missing"},
            {"loc":["body","cantidad"],"msg":"value is not a valid integer","type":"type_error.integer"}
        ]}"#;
        assert_eq!(
            extract_detail(body).as_deref(),
            Some("email: field required; cantidad: value is not a valid integer")
        );
    }

    #[test]
    fn non_json_or_missing_detail_yields_none() {
        assert_eq!(extract_detail("Internal Server Error"), None);
        assert_eq!(extract_detail(r#"{"message":"x"}"#), None);
        assert_eq!(extract_detail(r#"{"detail":null}"#), None);
    }

    #[test]
    fn network_errors_get_a_generic_banner() {
        let err = ClientError::Network("tcp connect error: Connection refused".into());
        assert_eq!(err.user_message(), "could not reach server");
    }

    #[test]
    fn authz_errors_map_to_client_variants() {
        let forbidden: ClientError =
            AuthzError::Forbidden(Permission::new(Resource::Users, Action::Create)).into();
        assert!(matches!(forbidden, ClientError::Forbidden(p) if p.resource == Resource::Users));

        let anon: ClientError = AuthzError::Unauthenticated.into();
        assert!(matches!(anon, ClientError::NotAuthenticated));
    }

    #[test]
    fn domain_errors_become_validation_without_prefix() {
        let err: ClientError = DomainError::validation("cantidad must be greater than zero").into();
        assert_eq!(err.user_message(), "cantidad must be greater than zero");
    }
}
