use crate::api::{
    self,
    handlers::{auth::AuthConfig, posts::MediaConfig},
    mailer::LogEmailSender,
};
use anyhow::Result;
use secrecy::SecretString;
use std::sync::Arc;

pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub jwt_secret: SecretString,
    pub token_ttl_seconds: i64,
    pub otp_ttl_seconds: i64,
    pub base_url: String,
    pub upload_dir: String,
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("port", &self.port)
            .field("dsn", &self.dsn)
            .field("jwt_secret", &"***")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("otp_ttl_seconds", &self.otp_ttl_seconds)
            .field("base_url", &self.base_url)
            .field("upload_dir", &self.upload_dir)
            .finish()
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config = AuthConfig::new(args.jwt_secret)
        .with_token_ttl_seconds(args.token_ttl_seconds)
        .with_otp_ttl_seconds(args.otp_ttl_seconds);

    let media_config = MediaConfig::new(args.base_url, args.upload_dir);

    api::new(
        args.port,
        args.dsn,
        auth_config,
        media_config,
        Arc::new(LogEmailSender),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::Args;
    use secrecy::SecretString;

    #[test]
    fn args_debug_redacts_secret() {
        let args = Args {
            port: 8080,
            dsn: "postgres://localhost/blip".to_string(),
            jwt_secret: SecretString::from("topsecret".to_string()),
            token_ttl_seconds: 3600,
            otp_ttl_seconds: 600,
            base_url: "http://localhost:8080".to_string(),
            upload_dir: "uploads".to_string(),
        };
        let debug = format!("{args:?}");
        assert!(debug.contains("***"));
        assert!(!debug.contains("topsecret"));
    }
}
