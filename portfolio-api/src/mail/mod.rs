//! Outbound email delivery.
//!
//! Everything that leaves the server as an email goes through the [`Mailer`]
//! trait. Backends:
//! - [`ResendMailer`]: Resend-compatible transactional email API
//! - [`LogMailer`]: logs messages without sending (local development)
//! - [`MemoryMailer`]: records messages for inspection (tests)
//!
//! ```text
//! Handler → dispatch_submission / notify_view → Mailer → provider
//! ```

pub mod logging;
pub mod memory;
pub mod resend;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::{Config, MailBackend};

pub use logging::LogMailer;
pub use memory::MemoryMailer;
pub use resend::ResendMailer;

/// A single provider-independent email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

/// Errors raised while handing a message to the provider.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mail API url `{url}`: {source}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("mail request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail provider rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("mail backend unavailable: {0}")]
    Unavailable(String),

    #[error("mail backend not configured: {0}")]
    NotConfigured(&'static str),
}

/// Sends emails through some provider.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one message. Returns once the provider accepted or refused it.
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

/// Build the mailer selected by `config.mail_backend`.
pub fn build_mailer(config: &Config) -> Result<Arc<dyn Mailer>, MailError> {
    match config.mail_backend {
        MailBackend::Resend => {
            let api_key = config
                .resend_api_key
                .clone()
                .ok_or(MailError::NotConfigured("RESEND_API_KEY"))?;

            let mailer = ResendMailer::new(
                api_key,
                &config.resend_api_url,
                Duration::from_millis(config.request_timeout_ms),
            )?;

            info!(api_url = %config.resend_api_url, "mailer_resend_ready");
            Ok(Arc::new(mailer))
        }
        MailBackend::Log => {
            info!("mailer_log_ready");
            Ok(Arc::new(LogMailer::new()))
        }
    }
}
