//! Account creation endpoint.

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use super::password::hash_secret;
use super::state::AuthState;
use super::storage::{SignupOutcome, find_user_by_email, find_user_by_username, insert_user};
use super::token::mint_token;
use super::types::{SignupRequest, SignupResponse, UserProfile};
use super::utils::{normalize_email, valid_email};

const MIN_USERNAME_CHARS: usize = 3;
const MIN_PASSWORD_CHARS: usize = 8;

/// Create an identity and return a session token alongside the profile.
#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = SignupResponse),
        (status = 400, description = "Invalid input", body = String),
        (status = 409, description = "Duplicate email or username", body = String)
    ),
    tag = "auth"
)]
pub async fn signup(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<SignupRequest>>,
) -> impl IntoResponse {
    let request: SignupRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    // All input validation happens before hashing or touching the database.
    let username = request.username.trim().to_string();
    if username.chars().count() < MIN_USERNAME_CHARS {
        return (
            StatusCode::BAD_REQUEST,
            "Username must be at least 3 characters".to_string(),
        )
            .into_response();
    }

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    if request.password.chars().count() < MIN_PASSWORD_CHARS {
        return (
            StatusCode::BAD_REQUEST,
            "Password must be at least 8 characters".to_string(),
        )
            .into_response();
    }

    // Email is checked and reported before username when both collide.
    match find_user_by_email(&pool, &email).await {
        Ok(Some(_)) => {
            return (StatusCode::CONFLICT, "Email already in use".to_string()).into_response();
        }
        Ok(None) => {}
        Err(err) => {
            error!("Failed to check email uniqueness: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Signup failed".to_string())
                .into_response();
        }
    }

    match find_user_by_username(&pool, &username).await {
        Ok(Some(_)) => {
            return (StatusCode::CONFLICT, "Username already taken".to_string()).into_response();
        }
        Ok(None) => {}
        Err(err) => {
            error!("Failed to check username uniqueness: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Signup failed".to_string())
                .into_response();
        }
    }

    let password_hash = match hash_secret(&request.password) {
        Ok(hash) => hash,
        Err(err) => {
            error!("Failed to hash password: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Signup failed".to_string())
                .into_response();
        }
    };

    let user_id = match insert_user(&pool, &username, &email, &password_hash).await {
        Ok(SignupOutcome::Created(id)) => id,
        Ok(SignupOutcome::Conflict) => {
            // Lost a race with a concurrent signup for the same email/username.
            return (
                StatusCode::CONFLICT,
                "Email or username already in use".to_string(),
            )
                .into_response();
        }
        Err(err) => {
            error!("Failed to insert user: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Signup failed".to_string())
                .into_response();
        }
    };

    let token = match mint_token(user_id, auth_state.config()) {
        Ok(token) => token,
        Err(err) => {
            error!("Failed to mint session token: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Signup failed".to_string())
                .into_response();
        }
    };

    (
        StatusCode::CREATED,
        Json(SignupResponse {
            token,
            user: UserProfile {
                id: user_id.to_string(),
                username,
                email,
            },
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::super::state::{AuthConfig, AuthState};
    use super::{SignupRequest, signup};
    use crate::api::mailer::LogEmailSender;
    use anyhow::Result;
    use axum::Json;
    use axum::extract::Extension;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;

    fn auth_state() -> Arc<AuthState> {
        let config = AuthConfig::new(SecretString::from("secret".to_string()));
        Arc::new(AuthState::new(config, Arc::new(LogEmailSender)))
    }

    fn request(username: &str, email: &str, password: &str) -> Option<Json<SignupRequest>> {
        Some(Json(SignupRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }))
    }

    #[tokio::test]
    async fn signup_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = signup(Extension(pool), Extension(auth_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn signup_short_username() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = signup(
            Extension(pool),
            Extension(auth_state()),
            request("ab", "alice@example.com", "password1"),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn signup_invalid_email() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = signup(
            Extension(pool),
            Extension(auth_state()),
            request("alice", "not-an-email", "password1"),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn signup_short_password() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = signup(
            Extension(pool),
            Extension(auth_state()),
            request("alice", "alice@example.com", "short"),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }
}
