//! # Blip (social posting backend)
//!
//! `blip` is the backend for a small social-posting service: account signup
//! and login, one-time-code (OTP) email verification for account recovery,
//! and gated creation/listing of media posts.
//!
//! ## Credential & verification lifecycle
//!
//! The core of the service is the credential and verification subsystem:
//!
//! - Passwords and OTP codes are stored as Argon2id hashes only; the service
//!   never persists or logs a plaintext secret.
//! - At most one live verification code exists per email at any instant.
//!   Issuing a new code atomically replaces the previous one via a
//!   conditional upsert keyed by the normalized email.
//! - Codes are single-use: a successful verification consumes the ledger
//!   entry; a mismatch leaves it in place until its 10-minute expiry.
//! - Sessions are stateless signed tokens (`Authorization: Bearer <token>`);
//!   no server-side session table exists.
//!
//! ## Authorization
//!
//! Every protected route resolves the bearer token to a user id before any
//! domain logic runs. Validation failures are collapsed into an
//! undifferentiated `401` so callers cannot distinguish a missing, expired,
//! or mis-signed token.

pub mod api;
pub mod cli;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
