//! One-time-code issuance and verification endpoints.
//!
//! Issuance: generate a 6-digit code, hash it, upsert the single live ledger
//! entry for the email, then hand the plaintext to the mail sender. A delivery
//! failure surfaces as 500 but the ledger write stays; re-issuing overwrites.
//!
//! Verification: the read filters on expiry, the comparison is one-way against
//! the stored hash, and a match consumes the entry by deleting the exact row
//! that was compared, so concurrent verifies of the same code succeed at most
//! once. A mismatch keeps the entry alive until its TTL.

use anyhow::Context;
use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use crate::api::mailer::EmailMessage;

use super::password::{hash_secret, verify_secret};
use super::state::AuthState;
use super::storage::{
    consume_verification_code, fetch_live_verification_code, find_user_by_email,
    upsert_verification_code,
};
use super::types::{SendOtpRequest, StatusResponse, VerifyOtpRequest};
use super::utils::{generate_otp_code, normalize_email};

const OTP_EMAIL_TEMPLATE: &str = "otp_verification";

/// Issue a verification code for a known user's email.
#[utoipa::path(
    post,
    path = "/send-otp",
    request_body = SendOtpRequest,
    responses(
        (status = 200, description = "Code issued and handed to delivery", body = StatusResponse),
        (status = 400, description = "Missing email", body = String),
        (status = 404, description = "Unknown user", body = String),
        (status = 500, description = "Hash or delivery failure", body = String)
    ),
    tag = "auth"
)]
pub async fn send_otp(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<SendOtpRequest>>,
) -> impl IntoResponse {
    let request: SendOtpRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);
    if email.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing email".to_string()).into_response();
    }

    // Codes are only meaningful for existing accounts.
    match find_user_by_email(&pool, &email).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (StatusCode::NOT_FOUND, "User not found".to_string()).into_response();
        }
        Err(err) => {
            error!("Failed to lookup user for code issuance: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to send code".to_string(),
            )
                .into_response();
        }
    }

    let code = generate_otp_code();
    let code_hash = match hash_secret(&code) {
        Ok(hash) => hash,
        Err(err) => {
            error!("Failed to hash verification code: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to send code".to_string(),
            )
                .into_response();
        }
    };

    let ttl_seconds = auth_state.config().otp_ttl_seconds();
    if let Err(err) = upsert_verification_code(&pool, &email, &code_hash, ttl_seconds).await {
        error!("Failed to store verification code: {err}");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to send code".to_string(),
        )
            .into_response();
    }

    // The ledger write is not rolled back on delivery failure; the caller can
    // retry send-otp and the upsert replaces the undelivered code.
    if let Err(err) = deliver_code(&auth_state, email, &code, ttl_seconds) {
        error!("Failed to deliver verification code: {err}");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to send code".to_string(),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        Json(StatusResponse {
            success: true,
            message: "Verification code sent".to_string(),
        }),
    )
        .into_response()
}

/// Build the code email and hand it to the configured sender.
fn deliver_code(
    auth_state: &AuthState,
    email: String,
    code: &str,
    ttl_seconds: i64,
) -> anyhow::Result<()> {
    let payload_json = json!({
        "code": code,
        "ttl_minutes": ttl_seconds / 60,
    });
    let payload_text =
        serde_json::to_string(&payload_json).context("failed to serialize code email payload")?;

    let message = EmailMessage {
        to_email: email,
        template: OTP_EMAIL_TEMPLATE.to_string(),
        payload_json: payload_text,
    };

    auth_state.sender().send(&message)
}

/// Verify a supplied code; success consumes the ledger entry.
#[utoipa::path(
    post,
    path = "/verify-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Code verified and consumed", body = StatusResponse),
        (status = 400, description = "Missing fields or wrong code", body = String),
        (status = 404, description = "No live code for this email", body = String)
    ),
    tag = "auth"
)]
pub async fn verify_otp(
    pool: Extension<PgPool>,
    payload: Option<Json<VerifyOtpRequest>>,
) -> impl IntoResponse {
    let request: VerifyOtpRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);
    let code = request.code.trim();
    if email.is_empty() || code.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            "Missing email or code".to_string(),
        )
            .into_response();
    }

    // Expired-but-unpurged rows are filtered at read time, so "never issued"
    // and "expired" are indistinguishable here by design.
    let code_hash = match fetch_live_verification_code(&pool, &email).await {
        Ok(Some(hash)) => hash,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                "Code not found or expired".to_string(),
            )
                .into_response();
        }
        Err(err) => {
            error!("Failed to fetch verification code: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Verification failed".to_string(),
            )
                .into_response();
        }
    };

    match verify_secret(code, &code_hash) {
        Ok(true) => {}
        Ok(false) => {
            // Entry stays; retries are bounded only by the TTL.
            return (StatusCode::BAD_REQUEST, "Invalid code".to_string()).into_response();
        }
        Err(err) => {
            error!("Failed to compare verification code: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Verification failed".to_string(),
            )
                .into_response();
        }
    }

    // Single use: the matched entry must still be there to delete. A
    // concurrent verify or re-issue that got there first wins, and this
    // request reports the code gone.
    match consume_verification_code(&pool, &email, &code_hash).await {
        Ok(true) => {}
        Ok(false) => {
            return (
                StatusCode::NOT_FOUND,
                "Code not found or expired".to_string(),
            )
                .into_response();
        }
        Err(err) => {
            error!("Failed to consume verification code: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Verification failed".to_string(),
            )
                .into_response();
        }
    }

    (
        StatusCode::OK,
        Json(StatusResponse {
            success: true,
            message: "Code verified".to_string(),
        }),
    )
        .into_response()
}
