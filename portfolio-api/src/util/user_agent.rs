//! Coarse user agent classification for view notifications.

use std::fmt;

/// Browser and platform guessed from a `User-Agent` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserAgentSummary {
    pub browser: &'static str,
    pub platform: &'static str,
}

impl fmt::Display for UserAgentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.browser, self.platform)
    }
}

/// Classify a user agent string.
///
/// Token order matters: Edge and Opera also advertise Chrome, Chrome also
/// advertises Safari, iOS advertises Mac OS X and Android advertises Linux.
pub fn summarize_user_agent(user_agent: &str) -> UserAgentSummary {
    let lower = user_agent.to_ascii_lowercase();

    let browser = if ["bot", "crawler", "spider"].iter().any(|t| lower.contains(t)) {
        "Bot"
    } else if lower.contains("edg/") || lower.contains("edgios/") || lower.contains("edga/") {
        "Edge"
    } else if lower.contains("opr/") || lower.contains("opera") {
        "Opera"
    } else if lower.contains("firefox/") || lower.contains("fxios/") {
        "Firefox"
    } else if lower.contains("chrome/") || lower.contains("crios/") {
        "Chrome"
    } else if lower.contains("safari/") {
        "Safari"
    } else {
        "Other"
    };

    let platform = if lower.contains("iphone") || lower.contains("ipad") || lower.contains("ipod") {
        "iOS"
    } else if lower.contains("android") {
        "Android"
    } else if lower.contains("windows") {
        "Windows"
    } else if lower.contains("macintosh") || lower.contains("mac os x") {
        "macOS"
    } else if lower.contains("linux") {
        "Linux"
    } else {
        "Other"
    };

    UserAgentSummary { browser, platform }
}
