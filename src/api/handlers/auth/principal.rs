//! Authenticated principal extraction.
//!
//! Flow Overview: read the bearer token, validate it against the signing
//! secret, and return a principal that downstream handlers can use. Missing,
//! malformed, mis-signed, and expired tokens all collapse to a single 401 so
//! callers cannot probe which part failed.

use axum::http::{HeaderMap, StatusCode};

use super::state::AuthConfig;
use super::token::validate_token;
use super::utils::extract_bearer_token;

/// Authenticated user context derived from the bearer token.
#[derive(Clone, Debug)]
pub struct Principal {
    pub user_id: uuid::Uuid,
}

/// Resolve a bearer token into a principal, or return 401.
pub fn require_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<Principal, StatusCode> {
    let token = extract_bearer_token(headers).ok_or(StatusCode::UNAUTHORIZED)?;
    match validate_token(token, config) {
        Ok(user_id) => Ok(Principal { user_id }),
        Err(_) => Err(StatusCode::UNAUTHORIZED),
    }
}
