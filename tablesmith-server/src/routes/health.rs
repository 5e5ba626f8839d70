//! Health endpoint: bootstrap status, operation counters, active settings

use super::{accepts_html, escape_html};
use crate::bootstrap::{BootstrapStatus, StatsSnapshot};
use crate::config::ServerConfig;
use crate::state::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

/// Health document: how far bootstrap got, what it did, how it was configured
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub startup_tasks_status: BootstrapStatus,
    pub stats: StatsSnapshot,
    pub settings: ServerConfig,
}

/// Health check endpoint
///
/// GET /health
///
/// Always answers, including mid-bootstrap and after a bootstrap error, so
/// an operator can see the last phase reached and the accumulated counters.
/// Renders HTML when the caller asks for it, JSON otherwise.
pub async fn health(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    tracing::debug!("health check requested");

    let doc = HealthResponse {
        startup_tasks_status: state.bootstrap.status(),
        stats: state.bootstrap.stats().snapshot(),
        settings: state.config.clone(),
    };

    if accepts_html(&headers) {
        Html(render_health_page(&doc)).into_response()
    } else {
        Json(doc).into_response()
    }
}

fn render_health_page(doc: &HealthResponse) -> String {
    let stats = &doc.stats;
    let settings_rows = serde_json::to_value(&doc.settings)
        .map(|value| {
            value
                .as_object()
                .map(|obj| {
                    obj.iter()
                        .map(|(key, val)| {
                            format!(
                                "<tr><td>{}</td><td>{}</td></tr>",
                                escape_html(key),
                                escape_html(&val.to_string())
                            )
                        })
                        .collect::<String>()
                })
                .unwrap_or_default()
        })
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html>\n\
         <html><head><title>tablesmith health</title></head><body>\n\
         <h1>Health</h1>\n\
         <p>Startup tasks: <strong>{status}</strong></p>\n\
         <h2>Stats</h2>\n\
         <table>\n\
         <tr><td>deleted</td><td>{deleted}</td></tr>\n\
         <tr><td>purged</td><td>{purged}</td></tr>\n\
         <tr><td>created</td><td>{created}</td></tr>\n\
         <tr><td>updated</td><td>{updated}</td></tr>\n\
         <tr><td>seeded</td><td>{seeded}</td></tr>\n\
         </table>\n\
         <h2>Settings</h2>\n\
         <table>{settings_rows}</table>\n\
         </body></html>\n",
        status = doc.startup_tasks_status,
        deleted = stats.deleted,
        purged = stats.purged,
        created = stats.created,
        updated = stats.updated,
        seeded = stats.seeded,
    )
}
