//! Post creation endpoint (authenticated, multipart).

use axum::{
    Json,
    extract::{Extension, Multipart},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;
use sqlx::PgPool;
use std::path::Path;
use std::sync::Arc;
use tracing::error;

use crate::api::handlers::auth::{AuthState, require_auth};

use super::state::MediaConfig;
use super::storage::{NewPost, insert_post};
use super::types::PostResponse;

/// Parsed multipart form fields for a new post.
#[derive(Default)]
struct PostForm {
    text: Option<String>,
    is_public: Option<String>,
    media_type: Option<String>,
    media: Option<MediaUpload>,
}

struct MediaUpload {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Create a post with optional text and an optional media file.
#[utoipa::path(
    post,
    path = "/posts",
    params(
        ("Authorization" = String, Header, description = "Bearer session token")
    ),
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Empty content or rejected media", body = String),
        (status = 401, description = "Unauthenticated", body = String)
    ),
    tag = "posts"
)]
pub async fn create_post(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    media_config: Extension<MediaConfig>,
    multipart: Multipart,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, auth_state.config()) {
        Ok(principal) => principal,
        Err(status) => return (status, "Unauthenticated".to_string()).into_response(),
    };

    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };

    let text = form
        .text
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty());

    if text.is_none() && form.media.is_none() {
        return (
            StatusCode::BAD_REQUEST,
            "Post must include text or media".to_string(),
        )
            .into_response();
    }

    let is_public = match parse_is_public(form.is_public.as_deref()) {
        Ok(is_public) => is_public,
        Err(()) => {
            return (
                StatusCode::BAD_REQUEST,
                "isPublic must be true or false".to_string(),
            )
                .into_response();
        }
    };

    // The media kind and locator travel together: without an upload both stay
    // NULL, and a client-supplied mediaType field is ignored.
    let mut media_type = None;
    let mut media_url = None;

    if let Some(upload) = &form.media {
        let Some(derived_kind) = media_kind(&upload.content_type) else {
            return (
                StatusCode::BAD_REQUEST,
                "Only image and video uploads are allowed".to_string(),
            )
                .into_response();
        };
        media_type = match resolve_media_kind(form.media_type.as_deref(), derived_kind) {
            Ok(kind) => Some(kind.to_string()),
            Err(()) => {
                return (
                    StatusCode::BAD_REQUEST,
                    "mediaType must be image or video".to_string(),
                )
                    .into_response();
            }
        };

        let filename = format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            sanitize_filename(&upload.filename)
        );
        if let Err(err) = store_media(media_config.upload_dir(), &filename, &upload.bytes).await {
            error!("Failed to store media file: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create post".to_string(),
            )
                .into_response();
        }
        media_url = Some(media_config.media_url(&filename));
    }

    let post = NewPost {
        user_id: principal.user_id,
        text,
        media_type: media_type.as_deref(),
        media_url: media_url.as_deref(),
        is_public,
    };

    match insert_post(&pool, post).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(err) => {
            error!("Failed to insert post: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create post".to_string(),
            )
                .into_response()
        }
    }
}

/// Drain the multipart body into a [`PostForm`]; unknown fields are ignored.
async fn read_form(mut multipart: Multipart) -> Result<PostForm, String> {
    let mut form = PostForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| "Malformed multipart body".to_string())?
    {
        match field.name().unwrap_or_default() {
            "text" => {
                form.text = Some(field.text().await.map_err(|_| "Malformed text field")?);
            }
            "isPublic" => {
                form.is_public =
                    Some(field.text().await.map_err(|_| "Malformed isPublic field")?);
            }
            "mediaType" => {
                form.media_type =
                    Some(field.text().await.map_err(|_| "Malformed mediaType field")?);
            }
            "media" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| "Malformed media field".to_string())?;
                form.media = Some(MediaUpload {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Parse the optional `isPublic` field as a strict boolean; absent means
/// public.
fn parse_is_public(value: Option<&str>) -> Result<bool, ()> {
    match value.map(str::trim) {
        None | Some("") => Ok(true),
        Some(value) if value.eq_ignore_ascii_case("true") => Ok(true),
        Some(value) if value.eq_ignore_ascii_case("false") => Ok(false),
        Some(_) => Err(()),
    }
}

/// Map an upload MIME type to a stored media kind; anything else is rejected.
fn media_kind(content_type: &str) -> Option<&'static str> {
    if content_type.starts_with("image/") {
        Some("image")
    } else if content_type.starts_with("video/") {
        Some("video")
    } else {
        None
    }
}

/// Pick the stored media kind for an upload.
///
/// A client-supplied `mediaType` must be one of the two allowed kinds;
/// without one, the kind derived from the upload's MIME type is used.
fn resolve_media_kind<'a>(supplied: Option<&'a str>, derived: &'a str) -> Result<&'a str, ()> {
    match supplied.map(str::trim) {
        None | Some("") => Ok(derived),
        Some(value) if value == "image" || value == "video" => Ok(value),
        Some(_) => Err(()),
    }
}

/// Strip anything that could escape the upload directory from a client name.
fn sanitize_filename(original: &str) -> String {
    let name: String = original
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
                ch
            } else {
                '_'
            }
        })
        .collect();
    if name.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        name
    }
}

async fn store_media(upload_dir: &str, filename: &str, bytes: &[u8]) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(upload_dir).await?;
    tokio::fs::write(Path::new(upload_dir).join(filename), bytes).await?;
    Ok(())
}
