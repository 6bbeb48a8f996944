//! Contact form submissions.
//!
//! A submission produces two emails, sent one after the other:
//! 1. a notification to the site owner (reply-to the submitter)
//! 2. an acknowledgment to the submitter (reply-to the owner)
//!
//! A failure on the first send aborts before the second is attempted.
//! Nothing is stored, so a repeated request sends both emails again.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::mail::{EmailMessage, MailError, Mailer};
use crate::util::{escape_html, text_to_html};

pub const MAX_NAME_LENGTH: usize = 200;
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Name/email/message triple posted by the contact form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

/// Reasons a submission is refused before any email is sent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("email address is not valid")]
    InvalidEmail,

    #[error("{0} contains control characters")]
    ControlCharacters(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("delivery failed: {0}")]
    Delivery(#[from] MailError),
}

impl Submission {
    /// Copy of the submission with surrounding whitespace removed.
    pub fn trimmed(&self) -> Submission {
        Submission {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            message: self.message.trim().to_string(),
        }
    }

    /// Check presence, lengths and the email address shape.
    ///
    /// Expects an already trimmed submission.
    pub fn validate(&self, max_message_length: usize) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::Missing("name"));
        }
        if self.email.is_empty() {
            return Err(ValidationError::Missing("email"));
        }
        if self.message.is_empty() {
            return Err(ValidationError::Missing("message"));
        }

        if self.name.chars().count() > MAX_NAME_LENGTH {
            return Err(ValidationError::TooLong { field: "name", max: MAX_NAME_LENGTH });
        }
        if self.email.chars().count() > MAX_EMAIL_LENGTH {
            return Err(ValidationError::TooLong { field: "email", max: MAX_EMAIL_LENGTH });
        }
        if self.message.chars().count() > max_message_length {
            return Err(ValidationError::TooLong { field: "message", max: max_message_length });
        }

        // The name ends up in subject lines.
        if self.name.chars().any(char::is_control) {
            return Err(ValidationError::ControlCharacters("name"));
        }

        if !is_plausible_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }

        Ok(())
    }
}

/// Single mailbox of the form `local@domain.tld`.
///
/// Rejects anything that could smuggle extra recipients or headers into the
/// provider request.
fn is_plausible_email(email: &str) -> bool {
    if email
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '<' | '>' | ',' | ';' | '"'))
    {
        return false;
    }

    let (local, domain) = match email.split_once('@') {
        Some(parts) => parts,
        None => return false,
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

/// Validate a submission and send the owner notification followed by the
/// submitter acknowledgment.
pub async fn dispatch_submission(
    mailer: &dyn Mailer,
    config: &Config,
    submission: &Submission,
) -> Result<(), DispatchError> {
    let submission = submission.trimmed();

    if let Err(e) = submission.validate(config.max_message_length) {
        warn!(reason = %e, "contact_submission_invalid");
        return Err(e.into());
    }

    info!(
        email = %submission.email,
        name_length = submission.name.chars().count(),
        message_length = submission.message.len(),
        "contact_dispatch_start"
    );

    let owner_message = owner_notification(config, &submission);
    if let Err(e) = mailer.send(&owner_message).await {
        error!(error = %e, to = %owner_message.to, "contact_owner_notification_failed");
        return Err(e.into());
    }
    info!(to = %owner_message.to, "contact_owner_notified");

    let ack_message = acknowledgment(config, &submission);
    if let Err(e) = mailer.send(&ack_message).await {
        error!(error = %e, to = %ack_message.to, "contact_acknowledgment_failed");
        return Err(e.into());
    }
    info!(to = %ack_message.to, "contact_acknowledgment_sent");

    Ok(())
}

/// Email telling the owner about a new submission.
pub fn owner_notification(config: &Config, submission: &Submission) -> EmailMessage {
    let html = format!(
        "<h2>New message from your {site} contact form</h2>\
         <p><strong>Name:</strong> {name}</p>\
         <p><strong>Email:</strong> {email}</p>\
         <p><strong>Message:</strong></p>\
         <p>{message}</p>",
        site = escape_html(&config.site_name),
        name = escape_html(&submission.name),
        email = escape_html(&submission.email),
        message = text_to_html(&submission.message),
    );

    EmailMessage {
        from: config.mail_from.clone(),
        to: config.owner().to_string(),
        subject: format!("New contact form submission from {}", submission.name),
        html,
        reply_to: Some(submission.email.clone()),
    }
}

/// Email confirming receipt to the submitter.
pub fn acknowledgment(config: &Config, submission: &Submission) -> EmailMessage {
    let html = format!(
        "<p>Hi {name},</p>\
         <p>Thanks for getting in touch through {site}. I received your message \
         and will get back to you as soon as I can.</p>\
         <p>For reference, here is what you sent:</p>\
         <blockquote>{message}</blockquote>",
        name = escape_html(&submission.name),
        site = escape_html(&config.site_name),
        message = text_to_html(&submission.message),
    );

    EmailMessage {
        from: config.mail_from.clone(),
        to: submission.email.clone(),
        subject: format!("Thanks for reaching out, {}", submission.name),
        html,
        reply_to: config.owner_email.clone(),
    }
}
