//! Email delivery abstraction for verification codes.
//!
//! `send_otp` builds an [`EmailMessage`] and awaits the configured
//! [`EmailSender`]. The sender decides how to deliver (SMTP, API, etc.) and
//! returns `Ok`/`Err`; a delivery error surfaces to the caller as a 500 while
//! the already-written ledger entry stays valid, so the caller can either
//! retry with the same code or re-issue (which overwrites it).
//!
//! The default sender for local dev is `LogEmailSender`, which logs the
//! recipient and template and returns `Ok(())`. The message payload carries
//! the plaintext verification code and is never logged.

use anyhow::Result;
use tracing::info;

#[derive(Clone, Debug)]
pub struct EmailMessage {
    pub to_email: String,
    pub template: String,
    pub payload_json: String,
}

/// Email delivery abstraction.
pub trait EmailSender: Send + Sync {
    /// Deliver a message or return an error to surface delivery failure.
    fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Local dev sender that logs instead of sending real email.
///
/// The payload is deliberately omitted from the log line: it contains the
/// plaintext one-time code.
#[derive(Clone, Debug)]
pub struct LogEmailSender;

impl EmailSender for LogEmailSender {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            to_email = %message.to_email,
            template = %message.template,
            "email send stub"
        );
        Ok(())
    }
}

#[cfg(test)]
pub mod test_support {
    use super::{EmailMessage, EmailSender};
    use anyhow::{Result, anyhow};
    use std::sync::Mutex;

    /// Records sent messages so tests can assert on delivery without a
    /// transport; optionally fails every send.
    pub struct RecordingEmailSender {
        pub sent: Mutex<Vec<EmailMessage>>,
        pub fail: bool,
    }

    impl RecordingEmailSender {
        #[must_use]
        pub fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        #[must_use]
        pub fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }
    }

    impl EmailSender for RecordingEmailSender {
        fn send(&self, message: &EmailMessage) -> Result<()> {
            if self.fail {
                return Err(anyhow!("simulated delivery failure"));
            }
            self.sent
                .lock()
                .map_err(|_| anyhow!("sender mutex poisoned"))?
                .push(message.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EmailMessage, EmailSender, LogEmailSender};
    use super::test_support::RecordingEmailSender;

    fn message() -> EmailMessage {
        EmailMessage {
            to_email: "alice@example.com".to_string(),
            template: "otp_verification".to_string(),
            payload_json: r#"{"code":"123456"}"#.to_string(),
        }
    }

    #[test]
    fn log_sender_always_succeeds() {
        assert!(LogEmailSender.send(&message()).is_ok());
    }

    #[test]
    fn recording_sender_captures_messages() {
        let sender = RecordingEmailSender::new();
        sender.send(&message()).expect("send should succeed");
        let sent = sender.sent.lock().expect("lock");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to_email, "alice@example.com");
    }

    #[test]
    fn failing_sender_reports_error() {
        let sender = RecordingEmailSender::failing();
        assert!(sender.send(&message()).is_err());
    }
}
