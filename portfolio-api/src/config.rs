//! Configuration module for environment variable parsing.
//!
//! Every setting has a default so `from_env` never fails; `validate` is
//! called once at startup to reject combinations the server cannot run with.

use std::env;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use tracing::warn;

/// Which email backend the server sends through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailBackend {
    /// Resend-compatible HTTP API
    Resend,
    /// Log messages without sending them (local development)
    Log,
}

impl FromStr for MailBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "resend" => Ok(MailBackend::Resend),
            "log" | "memory" => Ok(MailBackend::Log),
            other => Err(format!("unknown mail backend `{}`", other)),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Email backend used for all notifications
    pub mail_backend: MailBackend,

    /// API key for the Resend backend
    pub resend_api_key: Option<String>,

    /// Base URL of the Resend-compatible API
    pub resend_api_url: String,

    /// Sender address for every outbound message
    pub mail_from: String,

    /// Site owner address; receives contact and view notifications
    pub owner_email: Option<String>,

    /// Site name used in email bodies
    pub site_name: String,

    /// HTTP request timeout for the email provider in milliseconds
    pub request_timeout_ms: u64,

    /// Maximum accepted length of a contact message, in characters
    pub max_message_length: usize,

    /// Origins allowed to call the API from a browser; `None` allows any
    pub allowed_origins: Option<Vec<String>>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            port: parse_or("PORT", 8080),

            mail_backend: parse_or("MAIL_BACKEND", MailBackend::Resend),

            resend_api_key: non_empty("RESEND_API_KEY"),

            resend_api_url: non_empty("RESEND_API_URL")
                .unwrap_or_else(|| "https://api.resend.com".to_string()),

            mail_from: non_empty("MAIL_FROM")
                .unwrap_or_else(|| "Portfolio <onboarding@resend.dev>".to_string()),

            owner_email: non_empty("OWNER_EMAIL"),

            site_name: non_empty("SITE_NAME").unwrap_or_else(|| "Portfolio".to_string()),

            request_timeout_ms: parse_or("REQUEST_TIMEOUT_MS", 8000),

            max_message_length: parse_or("MAX_MESSAGE_LENGTH", 5000),

            allowed_origins: parse_csv("CORS_ALLOWED_ORIGINS"),
        }
    }

    /// Check that the loaded configuration can actually deliver mail.
    pub fn validate(&self) -> Result<()> {
        if self.owner_email.is_none() {
            bail!("OWNER_EMAIL must be set");
        }

        if self.mail_backend == MailBackend::Resend {
            if self.resend_api_key.is_none() {
                bail!("RESEND_API_KEY must be set when MAIL_BACKEND=resend");
            }
            url::Url::parse(&self.resend_api_url)
                .with_context(|| format!("RESEND_API_URL `{}` is not a valid URL", self.resend_api_url))?;
        }

        if self.max_message_length == 0 {
            bail!("MAX_MESSAGE_LENGTH must be greater than zero");
        }

        Ok(())
    }

    /// Owner address, or an empty string when unset (rejected by `validate`).
    pub fn owner(&self) -> &str {
        self.owner_email.as_deref().unwrap_or_default()
    }
}

/// Parse an environment variable, falling back to `default` when it is
/// missing or malformed.
fn parse_or<T: FromStr>(name: &str, default: T) -> T {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }
    }
}

/// Read an environment variable, treating blank values as unset.
fn non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a comma-separated list of strings.
fn parse_csv(name: &str) -> Option<Vec<String>> {
    env::var(name).ok().map(|raw| {
        raw.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        port: 0,
        mail_backend: MailBackend::Log,
        resend_api_key: None,
        resend_api_url: "https://api.resend.com".to_string(),
        mail_from: "Portfolio <noreply@example.com>".to_string(),
        owner_email: Some("owner@example.com".to_string()),
        site_name: "Test Portfolio".to_string(),
        request_timeout_ms: 1000,
        max_message_length: 500,
        allowed_origins: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_defaults() {
        for name in [
            "PORT",
            "MAIL_BACKEND",
            "RESEND_API_KEY",
            "RESEND_API_URL",
            "MAIL_FROM",
            "OWNER_EMAIL",
            "SITE_NAME",
            "REQUEST_TIMEOUT_MS",
            "MAX_MESSAGE_LENGTH",
            "CORS_ALLOWED_ORIGINS",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env();
        assert_eq!(config.port, 8080);
        assert_eq!(config.mail_backend, MailBackend::Resend);
        assert_eq!(config.resend_api_key, None);
        assert_eq!(config.resend_api_url, "https://api.resend.com");
        assert_eq!(config.mail_from, "Portfolio <onboarding@resend.dev>");
        assert_eq!(config.owner_email, None);
        assert_eq!(config.site_name, "Portfolio");
        assert_eq!(config.request_timeout_ms, 8000);
        assert_eq!(config.max_message_length, 5000);
        assert_eq!(config.allowed_origins, None);
    }

    #[test]
    fn test_parse_or_valid() {
        env::set_var("TEST_PARSE_PORT", "9090");
        let result: u16 = parse_or("TEST_PARSE_PORT", 1);
        assert_eq!(result, 9090);
        env::remove_var("TEST_PARSE_PORT");
    }

    #[test]
    fn test_parse_or_invalid_uses_default() {
        env::set_var("TEST_PARSE_BAD", "not-a-number");
        let result: u64 = parse_or("TEST_PARSE_BAD", 42);
        assert_eq!(result, 42);
        env::remove_var("TEST_PARSE_BAD");
    }

    #[test]
    fn test_parse_or_default() {
        let result: usize = parse_or("NONEXISTENT_VAR", 10);
        assert_eq!(result, 10);
    }

    #[test]
    fn test_non_empty_blank() {
        env::set_var("TEST_BLANK", "   ");
        assert_eq!(non_empty("TEST_BLANK"), None);
        env::remove_var("TEST_BLANK");
    }

    #[test]
    fn test_parse_csv() {
        env::set_var("TEST_CSV", "https://a.dev, ,https://b.dev");
        let result = parse_csv("TEST_CSV");
        assert_eq!(
            result,
            Some(vec!["https://a.dev".to_string(), "https://b.dev".to_string()])
        );
        env::remove_var("TEST_CSV");
    }

    #[test]
    fn test_mail_backend_from_str() {
        assert_eq!("resend".parse::<MailBackend>(), Ok(MailBackend::Resend));
        assert_eq!(" LOG ".parse::<MailBackend>(), Ok(MailBackend::Log));
        assert!("smtp".parse::<MailBackend>().is_err());
    }

    #[test]
    fn test_validate_requires_owner() {
        let mut config = test_config();
        config.owner_email = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_resend_requires_key() {
        let mut config = test_config();
        config.mail_backend = MailBackend::Resend;
        assert!(config.validate().is_err());

        config.resend_api_key = Some("re_test".to_string());
        assert!(config.validate().is_ok());

        config.resend_api_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_log_backend() {
        assert!(test_config().validate().is_ok());
    }
}
