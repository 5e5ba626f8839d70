//! HTTP route handlers and router configuration

mod health;
mod tables;

pub use health::HealthResponse;

use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the main application router
pub fn build_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        // Health / bootstrap observability
        .route("/health", get(health::health))
        // Table browsing
        .route("/tables", get(tables::list))
        .route("/tables/:table", get(tables::info))
        .route("/tables/:table/data", get(tables::data_files))
        // On-demand data load
        .route("/tables/:table/data/:file", post(tables::load_data_file))
        .with_state(state.clone());

    let mut router = router.layer(TraceLayer::new_for_http());

    if state.config.cors_enabled {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}

/// Whether the caller prefers an HTML rendering over JSON
pub(crate) fn accepts_html(headers: &axum::http::HeaderMap) -> bool {
    headers
        .get(axum::http::header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| {
            accept
                .split(',')
                .any(|part| part.trim().starts_with("text/html"))
        })
}

/// Minimal HTML escaping for values interpolated into rendered pages
pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::ACCEPT, HeaderMap, HeaderValue};

    #[test]
    fn html_preference_is_detected_in_accept_lists() {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9"),
        );
        assert!(accepts_html(&headers));

        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        assert!(!accepts_html(&headers));

        headers.remove(ACCEPT);
        assert!(!accepts_html(&headers));
    }

    #[test]
    fn html_escaping_neutralizes_markup() {
        assert_eq!(escape_html("a<b>&c"), "a&lt;b&gt;&amp;c");
    }
}
