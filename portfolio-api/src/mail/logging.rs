//! Mailer that only logs.
//!
//! Backs `MAIL_BACKEND=log` for local development. Nothing is delivered and
//! nothing is kept.

use async_trait::async_trait;
use tracing::info;

use super::{EmailMessage, MailError, Mailer};

#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            reply_to = ?message.reply_to,
            html_length = message.html.len(),
            "log_mailer_sent"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_always_succeeds() {
        let mailer = LogMailer::new();
        let message = EmailMessage {
            from: "noreply@example.com".to_string(),
            to: "owner@example.com".to_string(),
            subject: "Test".to_string(),
            html: "<p>Test</p>".to_string(),
            reply_to: None,
        };

        for _ in 0..3 {
            assert!(mailer.send(&message).await.is_ok());
        }
    }

    #[test]
    fn test_holds_no_state() {
        assert_eq!(std::mem::size_of::<LogMailer>(), 0);
    }
}
