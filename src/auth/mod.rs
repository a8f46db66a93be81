use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default token lifetime: one hour.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 60 * 60;

/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

const BEARER_PREFIX: &str = "bearer ";

/// Identity claim embedded in every issued token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject: the user's email
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(subject: impl Into<String>, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: subject.into(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token was not found in request headers")]
    Missing,

    #[error("Token has expired")]
    Expired,

    #[error("Token is invalid")]
    Invalid,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// Issues and verifies HS256 bearer tokens.
///
/// Both operations take an explicit clock reading in their `_at` form so that
/// expiry behaviour is deterministic under test; the plain forms read `Utc::now()`.
#[derive(Clone)]
pub struct CredentialGateway {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for CredentialGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialGateway")
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

impl CredentialGateway {
    /// `ttl_secs` is clamped to `MAX_TOKEN_TTL_SECS`.
    pub fn new(secret: &[u8], ttl_secs: u64) -> Self {
        let ttl_secs = ttl_secs.min(MAX_TOKEN_TTL_SECS) as i64;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    pub fn issue_token(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_token_at(subject, Utc::now())
    }

    pub fn issue_token_at(&self, subject: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims::new(subject, now, self.ttl);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify the raw `Authorization` header value and return the subject.
    pub fn verify_token(&self, header: Option<&str>) -> Result<String, TokenError> {
        self.verify_token_at(header, Utc::now())
    }

    pub fn verify_token_at(
        &self,
        header: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let raw = header.filter(|value| !value.is_empty()).ok_or(TokenError::Missing)?;
        let token = strip_bearer(raw);

        // Expiry is checked against the supplied clock below, after the signature.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                TokenError::Invalid
            })?
            .claims;

        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims.sub)
    }
}

/// Strip an optional, case-insensitive `Bearer ` prefix.
fn strip_bearer(raw: &str) -> &str {
    match raw.get(..BEARER_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(BEARER_PREFIX) => &raw[BEARER_PREFIX.len()..],
        _ => raw,
    }
}
