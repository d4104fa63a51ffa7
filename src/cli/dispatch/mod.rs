//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the appropriate
//! action, such as starting the API server with its full configuration state.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{auth, media};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let auth_opts = auth::Options::parse(matches)?;
    let media_opts = media::Options::parse(matches);

    Ok(Action::Server(Args {
        port,
        dsn,
        jwt_secret: auth_opts.jwt_secret,
        token_ttl_seconds: auth_opts.token_ttl_seconds,
        otp_ttl_seconds: auth_opts.otp_ttl_seconds,
        base_url: media_opts.base_url,
        upload_dir: media_opts.upload_dir,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn handler_builds_server_action() {
        temp_env::with_vars(
            [
                ("BLIP_DSN", None::<&str>),
                ("BLIP_JWT_SECRET", None::<&str>),
            ],
            || {
                let command = crate::cli::commands::new();
                let matches = command.get_matches_from(vec![
                    "blip",
                    "--dsn",
                    "postgres://user@localhost:5432/blip",
                    "--jwt-secret",
                    "secret",
                    "--token-ttl-seconds",
                    "1800",
                ]);
                let action = handler(&matches).expect("handler should succeed");
                let Action::Server(args) = action;
                assert_eq!(args.port, 8080);
                assert_eq!(args.dsn, "postgres://user@localhost:5432/blip");
                assert_eq!(args.jwt_secret.expose_secret(), "secret");
                assert_eq!(args.token_ttl_seconds, 1800);
                assert_eq!(args.otp_ttl_seconds, 600);
                assert_eq!(args.base_url, "http://localhost:8080");
                assert_eq!(args.upload_dir, "uploads");
            },
        );
    }
}
