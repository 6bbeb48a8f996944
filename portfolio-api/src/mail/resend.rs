//! Resend-compatible HTTP mailer.
//!
//! Reference: https://resend.com/docs/api-reference/emails/send-email

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::{EmailMessage, MailError, Mailer};

/// Longest provider error body kept in a [`MailError::Rejected`].
const MAX_ERROR_BODY: usize = 512;

/// Mailer that posts to `{api_url}/emails` with a bearer token.
#[derive(Clone)]
pub struct ResendMailer {
    client: Client,
    api_key: String,
    endpoint: String,
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(Deserialize)]
struct SendEmailResponse {
    #[serde(default)]
    id: Option<String>,
}

impl ResendMailer {
    /// Create a mailer for the API rooted at `api_url`.
    pub fn new(api_key: String, api_url: &str, timeout: Duration) -> Result<Self, MailError> {
        url::Url::parse(api_url).map_err(|source| MailError::InvalidEndpoint {
            url: api_url.to_string(),
            source,
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(MailError::Client)?;

        Ok(Self {
            client,
            api_key,
            endpoint: format!("{}/emails", api_url.trim_end_matches('/')),
        })
    }

    /// Full URL messages are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let request = SendEmailRequest {
            from: &message.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
            reply_to: message.reply_to.as_deref(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!(to = %message.to, error = %e, "resend_request_timeout");
                } else {
                    error!(to = %message.to, error = %e, "resend_request_error");
                }
                MailError::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }

            error!(
                to = %message.to,
                status_code = status.as_u16(),
                body = %body,
                "resend_message_rejected"
            );
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        // A 2xx without a parseable id still counts as accepted.
        let id = response
            .json::<SendEmailResponse>()
            .await
            .ok()
            .and_then(|r| r.id);

        info!(
            to = %message.to,
            subject_length = message.subject.len(),
            provider_id = ?id,
            "resend_message_accepted"
        );

        Ok(())
    }
}
