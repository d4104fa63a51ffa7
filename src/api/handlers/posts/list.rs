//! Public post listing endpoint (authenticated).

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use crate::api::handlers::auth::{AuthState, require_auth};

use super::storage::list_public_posts;
use super::types::PostResponse;

/// List public posts, newest first.
#[utoipa::path(
    get,
    path = "/posts",
    params(
        ("Authorization" = String, Header, description = "Bearer session token")
    ),
    responses(
        (status = 200, description = "Public posts, newest first", body = [PostResponse]),
        (status = 401, description = "Unauthenticated", body = String)
    ),
    tag = "posts"
)]
pub async fn list_posts(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    if let Err(status) = require_auth(&headers, auth_state.config()) {
        return (status, "Unauthenticated".to_string()).into_response();
    }

    match list_public_posts(&pool).await {
        Ok(posts) => (StatusCode::OK, Json(posts)).into_response(),
        Err(err) => {
            error!("Failed to list posts: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to list posts".to_string(),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::list_posts;
    use crate::api::handlers::auth::{AuthConfig, AuthState};
    use crate::api::mailer::LogEmailSender;
    use anyhow::Result;
    use axum::extract::Extension;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;

    fn auth_state() -> Arc<AuthState> {
        let config = AuthConfig::new(SecretString::from("secret".to_string()));
        Arc::new(AuthState::new(config, Arc::new(LogEmailSender)))
    }

    #[tokio::test]
    async fn list_posts_requires_auth() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = list_posts(HeaderMap::new(), Extension(pool), Extension(auth_state()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }
}
