//! Web server module.
//!
//! Routes:
//! - `GET /health`
//! - `POST /api/contact`
//! - `POST /api/track-view`

pub mod handlers;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub use handlers::{
    contact, health, track_view, AppState, ErrorResponse, HealthResponse, MessageResponse,
};

/// Build the application router with tracing and CORS layers.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(state.config.allowed_origins.as_deref());

    Router::new()
        .route("/health", get(health))
        .route("/api/contact", post(contact))
        .route("/api/track-view", post(track_view))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy: the configured origins, or any origin when none are set.
fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    // An empty list counts as unset, like the other blank variables.
    match origins {
        Some(list) if !list.is_empty() => {
            let allowed: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!(origin = %origin, "cors_origin_invalid");
                        None
                    }
                })
                .collect();
            layer.allow_origin(AllowOrigin::list(allowed))
        }
        _ => layer.allow_origin(Any),
    }
}
