//! Small string helpers shared by the notification builders.

pub mod html;
pub mod user_agent;

pub use html::{escape_html, text_to_html};
pub use user_agent::{summarize_user_agent, UserAgentSummary};
