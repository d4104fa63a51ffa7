//! Database helpers for user identities and the verification-code ledger.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use std::time::Duration;
use tracing::{Instrument, debug, warn};
use uuid::Uuid;

use super::utils::is_unique_violation;

const EXPIRY_SWEEP_INTERVAL_SECONDS: u64 = 60;

/// The fields login and code issuance need from a user row.
pub(super) struct UserRecord {
    pub(super) id: Uuid,
    pub(super) password_hash: String,
}

/// Outcome when attempting to create a new user.
#[derive(Debug)]
pub(super) enum SignupOutcome {
    Created(Uuid),
    Conflict,
}

/// Look up a user by normalized email.
pub(super) async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRecord>> {
    let query = "SELECT id, password_hash FROM users WHERE email = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user by email")?;

    Ok(row.map(user_from_row))
}

/// Look up a user by exact username.
pub(super) async fn find_user_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<UserRecord>> {
    let query = "SELECT id, password_hash FROM users WHERE username = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(username)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user by username")?;

    Ok(row.map(user_from_row))
}

/// Look up a user by login identifier (username first, then normalized email).
pub(super) async fn find_user_by_identifier(
    pool: &PgPool,
    identifier: &str,
) -> Result<Option<UserRecord>> {
    if let Some(user) = find_user_by_username(pool, identifier).await? {
        return Ok(Some(user));
    }
    find_user_by_email(pool, &identifier.trim().to_lowercase()).await
}

pub(super) async fn insert_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<SignupOutcome> {
    let query = r"
        INSERT INTO users (username, email, password_hash)
        VALUES ($1, $2, $3)
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match row {
        Ok(row) => Ok(SignupOutcome::Created(row.get("id"))),
        // Pre-insert duplicate checks race with concurrent signups; the unique
        // constraint is the authority.
        Err(err) if is_unique_violation(&err) => Ok(SignupOutcome::Conflict),
        Err(err) => Err(err).context("failed to insert user"),
    }
}

/// Upsert the single live verification entry for an email.
///
/// `ON CONFLICT (email) DO UPDATE` is the atomic at-most-one-live-code
/// guarantee: a new issuance replaces any prior entry, expired or not, and
/// concurrent issuance for the same email races only on last-write-wins.
pub(super) async fn upsert_verification_code(
    pool: &PgPool,
    email: &str,
    code_hash: &str,
    ttl_seconds: i64,
) -> Result<()> {
    let query = r"
        INSERT INTO verification_codes (email, code_hash, expires_at)
        VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'))
        ON CONFLICT (email) DO UPDATE
        SET code_hash = EXCLUDED.code_hash,
            expires_at = EXCLUDED.expires_at,
            created_at = NOW()
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(email)
        .bind(code_hash)
        .bind(ttl_seconds)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to upsert verification code")?;
    Ok(())
}

/// Fetch the stored code hash for an email, treating expired rows as absent.
///
/// The `expires_at > NOW()` filter is the authoritative expiry check; the
/// background sweep only keeps the table from growing.
pub(super) async fn fetch_live_verification_code(
    pool: &PgPool,
    email: &str,
) -> Result<Option<String>> {
    let query = r"
        SELECT code_hash
        FROM verification_codes
        WHERE email = $1
          AND expires_at > NOW()
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to fetch verification code")?;

    Ok(row.map(|row| row.get("code_hash")))
}

/// Consume the verification entry that still holds the compared hash.
///
/// Matching on both email and hash makes the fetch-compare-delete sequence
/// single use: of two concurrent verifies only one delete finds the row, and
/// a re-issued code is never consumed by a verify of the old one. Returns
/// whether this caller won.
pub(super) async fn consume_verification_code(
    pool: &PgPool,
    email: &str,
    code_hash: &str,
) -> Result<bool> {
    let query = "DELETE FROM verification_codes WHERE email = $1 AND code_hash = $2";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(email)
        .bind(code_hash)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to consume verification code")?;
    Ok(result.rows_affected() == 1)
}

async fn delete_expired_verification_codes(pool: &PgPool) -> Result<u64> {
    let query = "DELETE FROM verification_codes WHERE expires_at <= NOW()";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to delete expired verification codes")?;
    Ok(result.rows_affected())
}

/// Spawn the periodic sweep that purges expired ledger rows.
///
/// Readers never trust an unpurged row, so sweep failures are logged and
/// retried on the next tick rather than propagated.
pub(crate) fn spawn_expiry_sweeper(pool: PgPool) {
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(Duration::from_secs(EXPIRY_SWEEP_INTERVAL_SECONDS));
        loop {
            ticker.tick().await;
            match delete_expired_verification_codes(&pool).await {
                Ok(0) => {}
                Ok(purged) => debug!(purged, "purged expired verification codes"),
                Err(err) => warn!("verification code sweep failed: {err}"),
            }
        }
    });
}

fn user_from_row(row: sqlx::postgres::PgRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        password_hash: row.get("password_hash"),
    }
}

#[cfg(test)]
mod tests {
    use super::{SignupOutcome, UserRecord};
    use uuid::Uuid;

    #[test]
    fn signup_outcome_debug_names() {
        let id = Uuid::nil();
        assert_eq!(
            format!("{:?}", SignupOutcome::Created(id)),
            format!("Created({id:?})")
        );
        assert_eq!(format!("{:?}", SignupOutcome::Conflict), "Conflict");
    }

    #[test]
    fn user_record_holds_values() {
        let record = UserRecord {
            id: Uuid::nil(),
            password_hash: "$argon2id$stub".to_string(),
        };
        assert_eq!(record.id, Uuid::nil());
        assert_eq!(record.password_hash, "$argon2id$stub");
    }
}
