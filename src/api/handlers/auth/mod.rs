//! Credential and verification lifecycle: signup, login, OTP issue/verify,
//! session tokens, and the request authentication gate.

pub mod login;
pub mod otp;
pub mod principal;
pub mod signup;
pub mod types;

mod password;
mod state;
mod storage;
pub(crate) mod token;
mod utils;

pub use principal::{Principal, require_auth};
pub use state::{AuthConfig, AuthState};

pub(crate) use storage::spawn_expiry_sweeper;
