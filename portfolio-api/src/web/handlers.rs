//! HTTP endpoint handlers.
//!
//! Every failure is caught here, logged, and turned into a JSON `{error}`
//! body. Delivery failures are opaque to the caller.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::contact::{dispatch_submission, DispatchError, Submission};
use crate::mail::Mailer;
use crate::views::{notify_view, ViewEvent};
use crate::Config;

pub const CONTACT_SUCCESS: &str = "Message sent successfully";
pub const CONTACT_FAILURE: &str = "Failed to send message";
pub const VIEW_SUCCESS: &str = "View tracked successfully";
pub const VIEW_FAILURE: &str = "Failed to track view";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(config: Config, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            config: Arc::new(config),
            mailer,
        }
    }
}

/// Success body.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Failure body.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn ok(message: &str) -> Response {
    (
        StatusCode::OK,
        Json(MessageResponse {
            message: message.to_string(),
        }),
    )
        .into_response()
}

fn fail(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: error.into() })).into_response()
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Contact Form
// =============================================================================

/// `POST /api/contact`
///
/// Sends the owner notification and the submitter acknowledgment.
/// Malformed bodies and invalid submissions get a 400; any delivery failure
/// gets an opaque 500.
pub async fn contact(
    State(state): State<AppState>,
    payload: Result<Json<Submission>, JsonRejection>,
) -> Response {
    let Json(submission) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "contact_body_rejected");
            return fail(StatusCode::BAD_REQUEST, "Invalid request body");
        }
    };

    info!(
        message_length = submission.message.len(),
        "contact_submission_received"
    );

    match dispatch_submission(state.mailer.as_ref(), &state.config, &submission).await {
        Ok(()) => {
            info!("contact_submission_complete");
            ok(CONTACT_SUCCESS)
        }
        Err(DispatchError::Invalid(e)) => fail(StatusCode::BAD_REQUEST, e.to_string()),
        Err(DispatchError::Delivery(e)) => {
            error!(error = %e, "contact_submission_failed");
            fail(StatusCode::INTERNAL_SERVER_ERROR, CONTACT_FAILURE)
        }
    }
}

// =============================================================================
// View Tracking
// =============================================================================

/// `POST /api/track-view`
///
/// Reads `User-Agent` and `Referer` and emails the owner.
pub async fn track_view(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let event = ViewEvent::from_headers(&headers, Utc::now());

    info!(
        referrer = %event.referrer,
        user_agent = %event.user_agent,
        "view_received"
    );

    match notify_view(state.mailer.as_ref(), &state.config, &event).await {
        Ok(()) => ok(VIEW_SUCCESS),
        Err(e) => {
            error!(error = %e, "view_tracking_failed");
            fail(StatusCode::INTERNAL_SERVER_ERROR, VIEW_FAILURE)
        }
    }
}
