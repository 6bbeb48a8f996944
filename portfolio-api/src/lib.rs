//! Portfolio API - notification backend for a personal portfolio site.
//!
//! The site is static; this crate serves the two endpoints that email the
//! owner:
//! - `POST /api/contact`: contact form, owner notification plus an
//!   acknowledgment to the submitter
//! - `POST /api/track-view`: page view notification
//!
//! ## Architecture
//!
//! ```text
//! Browser → web::router → contact / views → mail::Mailer → email provider
//! ```
//!
//! Nothing is persisted and nothing is retried.

pub mod config;
pub mod contact;
pub mod mail;
pub mod util;
pub mod views;
pub mod web;

// Re-export commonly used types
pub use config::{Config, MailBackend};
pub use contact::{dispatch_submission, DispatchError, Submission, ValidationError};
pub use mail::{
    build_mailer, EmailMessage, LogMailer, MailError, Mailer, MemoryMailer, ResendMailer,
};
pub use views::{notify_view, ViewEvent};
pub use web::{router, AppState};
