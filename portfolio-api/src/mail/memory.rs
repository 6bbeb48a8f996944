//! In-memory mailer.
//!
//! Keeps a copy of every message for inspection and never drains it, so it
//! is meant for tests rather than a running server. Optionally starts
//! failing after a fixed number of sends.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{EmailMessage, MailError, Mailer};

#[derive(Clone, Default)]
pub struct MemoryMailer {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    /// Number of sends that succeed before every send fails
    fail_after: Option<usize>,
    attempts: Mutex<usize>,
    sent: Mutex<Vec<EmailMessage>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose first `successes` sends succeed and the rest fail.
    pub fn failing_after(successes: usize) -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                fail_after: Some(successes),
                ..Default::default()
            }),
        }
    }

    /// Messages accepted so far, in send order.
    pub async fn sent(&self) -> Vec<EmailMessage> {
        self.inner.sent.lock().await.clone()
    }

    /// Number of send calls, successful or not.
    pub async fn attempts(&self) -> usize {
        *self.inner.attempts.lock().await
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let attempt = {
            let mut attempts = self.inner.attempts.lock().await;
            *attempts += 1;
            *attempts
        };

        if let Some(limit) = self.inner.fail_after {
            if attempt > limit {
                warn!(to = %message.to, attempt = attempt, "memory_mailer_failing");
                return Err(MailError::Unavailable(format!(
                    "memory mailer configured to fail after {} sends",
                    limit
                )));
            }
        }

        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            html_length = message.html.len(),
            "memory_mailer_sent"
        );

        self.inner.sent.lock().await.push(message.clone());
        Ok(())
    }
}
