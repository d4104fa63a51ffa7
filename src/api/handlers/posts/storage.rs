//! Database helpers for posts.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::types::PostResponse;

/// Fields persisted for a new post.
pub(super) struct NewPost<'a> {
    pub(super) user_id: Uuid,
    pub(super) text: Option<&'a str>,
    pub(super) media_type: Option<&'a str>,
    pub(super) media_url: Option<&'a str>,
    pub(super) is_public: bool,
}

/// Insert a post and return it enriched with the author's username.
pub(super) async fn insert_post(pool: &PgPool, post: NewPost<'_>) -> Result<PostResponse> {
    let query = r"
        INSERT INTO posts (user_id, text, media_type, media_url, is_public)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, created_at,
            (SELECT username FROM users WHERE users.id = $1) AS username
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(post.user_id)
        .bind(post.text)
        .bind(post.media_type)
        .bind(post.media_url)
        .bind(post.is_public)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to insert post")?;

    let id: Uuid = row.get("id");
    let created_at: DateTime<Utc> = row.get("created_at");
    Ok(PostResponse {
        id: id.to_string(),
        username: row.get("username"),
        text: post.text.map(str::to_string),
        media_type: post.media_type.map(str::to_string),
        media_url: post.media_url.map(str::to_string),
        is_public: post.is_public,
        created_at,
    })
}

/// List public posts newest-first, joined to users for the username only.
pub(super) async fn list_public_posts(pool: &PgPool) -> Result<Vec<PostResponse>> {
    let query = r"
        SELECT posts.id, posts.text, posts.media_type, posts.media_url,
               posts.is_public, posts.created_at, users.username
        FROM posts
        JOIN users ON users.id = posts.user_id
        WHERE posts.is_public
        ORDER BY posts.created_at DESC
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let rows = sqlx::query(query)
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("failed to list public posts")?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let id: Uuid = row.get("id");
            PostResponse {
                id: id.to_string(),
                username: row.get("username"),
                text: row.get("text"),
                media_type: row.get("media_type"),
                media_url: row.get("media_url"),
                is_public: row.get("is_public"),
                created_at: row.get("created_at"),
            }
        })
        .collect())
}
