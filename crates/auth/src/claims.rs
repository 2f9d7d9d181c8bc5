use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims the backend puts in its bearer tokens.
///
/// The client treats the token as opaque for authentication; it only peeks
/// at these claims to skip a round-trip for a token that has already expired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the account email.
    #[serde(default)]
    pub sub: Option<String>,

    /// Expiration, seconds since the Unix epoch.
    #[serde(default)]
    pub exp: Option<i64>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is not a JWT (expected three dot-separated segments)")]
    NotJwt,

    #[error("token payload is not valid base64url: {0}")]
    Encoding(String),

    #[error("token payload is not a JSON claims object: {0}")]
    Payload(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,
}

/// Decode the payload segment of a JWT **without** verifying its signature.
///
/// Signature verification is the backend's job; never base an authorization
/// decision on these claims.
pub fn decode_unverified(token: &str) -> Result<TokenClaims, TokenError> {
    let mut segments = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (segments.next(), segments.next(), segments.next(), segments.next())
    else {
        return Err(TokenError::NotJwt);
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| TokenError::Encoding(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| TokenError::Payload(e.to_string()))
}

/// Deterministically validate token claims against `now`.
///
/// Claims without `exp` never expire from the client's point of view.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    match claims.exp {
        Some(exp) if now.timestamp() >= exp => Err(TokenValidationError::Expired),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{Algorithm, EncodingKey, Header};

    fn mint(sub: &str, exp: i64) -> String {
        let claims = TokenClaims {
            sub: Some(sub.to_string()),
            exp: Some(exp),
        };
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .expect("failed to encode jwt")
    }

    #[test]
    fn decodes_backend_style_token() {
        let exp = (Utc::now() + Duration::minutes(30)).timestamp();
        let claims = decode_unverified(&mint("a@b.com", exp)).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("a@b.com"));
        assert_eq!(claims.exp, Some(exp));
        assert_eq!(validate_claims(&claims, Utc::now()), Ok(()));
    }

    #[test]
    fn expired_token_is_detected() {
        let exp = (Utc::now() - Duration::minutes(1)).timestamp();
        let claims = decode_unverified(&mint("a@b.com", exp)).unwrap();
        assert_eq!(validate_claims(&claims, Utc::now()), Err(TokenValidationError::Expired));
    }

    #[test]
    fn opaque_tokens_are_not_jwts() {
        assert_eq!(decode_unverified("T"), Err(TokenError::NotJwt));
        assert_eq!(decode_unverified("a.b.c.d"), Err(TokenError::NotJwt));
        assert!(matches!(decode_unverified("a.!!!.c"), Err(TokenError::Encoding(_))));
    }

    #[test]
    fn claims_without_expiry_stay_valid() {
        let claims = TokenClaims { sub: None, exp: None };
        assert_eq!(validate_claims(&claims, Utc::now()), Ok(()));
    }
}
