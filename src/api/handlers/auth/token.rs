//! Stateless session tokens.
//!
//! HS256 JWTs carrying `{sub, iat, exp}` only. No server-side session table:
//! the signature plus expiry is the whole session. Validation distinguishes
//! malformed, mis-signed, and expired tokens internally; the request gate
//! collapses all three to 401.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::AuthConfig;

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct Claims {
    pub(super) sub: String,
    pub(super) iat: i64,
    pub(super) exp: i64,
}

#[derive(Debug, PartialEq, Eq)]
pub(super) enum TokenError {
    Malformed,
    SignatureInvalid,
    Expired,
}

/// Mint a signed token for the given user id.
pub(crate) fn mint_token(user_id: Uuid, config: &AuthConfig) -> Result<String> {
    let now = Utc::now();
    let expires = now + Duration::seconds(config.token_ttl_seconds());

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: expires.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret().expose_secret().as_bytes()),
    )
    .context("failed to sign session token")
}

/// Validate a token and return the user id it was minted for.
pub(super) fn validate_token(token: &str, config: &AuthConfig) -> Result<Uuid, TokenError> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret().expose_secret().as_bytes()),
        &validation,
    )
    .map_err(|err| match err.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
        _ => TokenError::Malformed,
    })?;

    Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::Malformed)
}
