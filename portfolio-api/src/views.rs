//! Page view notifications.

use axum::http::{header, HeaderMap, HeaderName};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::config::Config;
use crate::mail::{EmailMessage, MailError, Mailer};
use crate::util::{escape_html, summarize_user_agent};

/// Reported when the request carries no usable `User-Agent`.
pub const UNKNOWN_USER_AGENT: &str = "Unknown";

/// Reported when the request carries no usable `Referer`.
pub const DIRECT_VISIT: &str = "Direct visit";

/// Metadata captured for one page load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewEvent {
    pub user_agent: String,
    pub referrer: String,
    pub timestamp: DateTime<Utc>,
}

impl ViewEvent {
    /// Build an event from request headers, using defaults for absent,
    /// empty or non UTF-8 values.
    pub fn from_headers(headers: &HeaderMap, timestamp: DateTime<Utc>) -> Self {
        Self {
            user_agent: header_or(headers, header::USER_AGENT, UNKNOWN_USER_AGENT),
            referrer: header_or(headers, header::REFERER, DIRECT_VISIT),
            timestamp,
        }
    }
}

fn header_or(headers: &HeaderMap, name: HeaderName, default: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Send the owner a single email describing the view.
pub async fn notify_view(
    mailer: &dyn Mailer,
    config: &Config,
    event: &ViewEvent,
) -> Result<(), MailError> {
    let message = view_notification(config, event);

    if let Err(e) = mailer.send(&message).await {
        error!(error = %e, "view_notification_failed");
        return Err(e);
    }

    info!(
        referrer = %event.referrer,
        user_agent_length = event.user_agent.len(),
        "view_notification_sent"
    );

    Ok(())
}

/// Email describing a page view.
pub fn view_notification(config: &Config, event: &ViewEvent) -> EmailMessage {
    let summary = summarize_user_agent(&event.user_agent);

    let html = format!(
        "<h2>Someone viewed {site}</h2>\
         <p><strong>Time:</strong> {time}</p>\
         <p><strong>Browser:</strong> {summary}</p>\
         <p><strong>User agent:</strong> {user_agent}</p>\
         <p><strong>Referrer:</strong> {referrer}</p>",
        site = escape_html(&config.site_name),
        time = event.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        summary = summary,
        user_agent = escape_html(&event.user_agent),
        referrer = escape_html(&event.referrer),
    );

    EmailMessage {
        from: config.mail_from.clone(),
        to: config.owner().to_string(),
        subject: "New portfolio view".to_string(),
        html,
        reply_to: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::mail::MemoryMailer;
    use axum::http::HeaderValue;
    use chrono::TimeZone;

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_from_headers_defaults() {
        let event = ViewEvent::from_headers(&HeaderMap::new(), timestamp());
        assert_eq!(event.user_agent, "Unknown");
        assert_eq!(event.referrer, "Direct visit");
        assert_eq!(event.timestamp, timestamp());
    }

    #[test]
    fn test_from_headers_reads_values() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("TestAgent/1.0"));
        headers.insert(header::REFERER, HeaderValue::from_static("https://news.example.com/"));

        let event = ViewEvent::from_headers(&headers, timestamp());
        assert_eq!(event.user_agent, "TestAgent/1.0");
        assert_eq!(event.referrer, "https://news.example.com/");
    }

    #[test]
    fn test_from_headers_blank_and_non_utf8_use_defaults() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("  "));
        headers.insert(header::REFERER, HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap());

        let event = ViewEvent::from_headers(&headers, timestamp());
        assert_eq!(event.user_agent, UNKNOWN_USER_AGENT);
        assert_eq!(event.referrer, DIRECT_VISIT);
    }

    #[test]
    fn test_view_notification_body() {
        let event = ViewEvent {
            user_agent: "<evil>".to_string(),
            referrer: DIRECT_VISIT.to_string(),
            timestamp: timestamp(),
        };

        let email = view_notification(&test_config(), &event);
        assert_eq!(email.to, "owner@example.com");
        assert_eq!(email.subject, "New portfolio view");
        assert!(email.html.contains("2024-05-01T12:30:00Z"));
        assert!(email.html.contains("&lt;evil&gt;"));
        assert!(email.html.contains("Direct visit"));
        assert!(email.html.contains("Other on Other"));
    }

    #[tokio::test]
    async fn test_notify_view_sends_one_email() {
        let mailer = MemoryMailer::new();
        let event = ViewEvent::from_headers(&HeaderMap::new(), timestamp());

        notify_view(&mailer, &test_config(), &event).await.unwrap();
        assert_eq!(mailer.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn test_notify_view_propagates_failure() {
        let mailer = MemoryMailer::failing_after(0);
        let event = ViewEvent::from_headers(&HeaderMap::new(), timestamp());

        assert!(notify_view(&mailer, &test_config(), &event).await.is_err());
    }
}
