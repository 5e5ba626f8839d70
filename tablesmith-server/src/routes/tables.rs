//! Table browsing endpoints: list tables, list data files, load a file

use super::{accepts_html, escape_html};
use crate::bootstrap;
use crate::error::{Result, ServerError};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

/// List table names
///
/// GET /tables
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>> {
    let mut tables = state.store.list_tables().await?;
    tables.sort();
    Ok(Json(tables))
}

/// Table summary response
#[derive(Serialize)]
pub struct TableInfo {
    pub table: String,
    pub item_count: i64,
}

/// Describe one table
///
/// GET /tables/:table
pub async fn info(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
) -> Result<Json<TableInfo>> {
    validate_name(&table)?;
    let item_count = state.store.item_count(&table).await?;
    Ok(Json(TableInfo { table, item_count }))
}

/// List the data files loadable into a table
///
/// GET /tables/:table/data
pub async fn data_files(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    validate_name(&table)?;
    let mut files = state.data.load_files(&table)?;
    files.sort();

    if accepts_html(&headers) {
        let items: String = files
            .iter()
            .map(|f| format!("<li>{}</li>", escape_html(f)))
            .collect();
        Ok(Html(format!(
            "<!DOCTYPE html>\n<html><body><h1>Data files for {}</h1><ul>{}</ul></body></html>\n",
            escape_html(&table),
            items
        ))
        .into_response())
    } else {
        Ok(Json(files).into_response())
    }
}

/// Load outcome response
#[derive(Serialize)]
pub struct LoadResponse {
    pub status: &'static str,
    pub message: String,
}

/// Load one data file into a table on demand
///
/// POST /tables/:table/data/:file
///
/// Reuses the bootstrap seed path: classify by suffix, parse, put each
/// record. Per-record failures are logged and skipped, same as at startup.
pub async fn load_data_file(
    State(state): State<Arc<AppState>>,
    Path((table, file)): Path<(String, String)>,
) -> Result<Json<LoadResponse>> {
    validate_name(&table)?;
    validate_name(&file)?;

    let path = state.data.load_file_path(&table, &file);
    bootstrap::seed_table(&state.store, &table, &path).await?;

    Ok(Json(LoadResponse {
        status: "success",
        message: format!("Data file {file} loaded into table {table}."),
    }))
}

/// Reject names that could escape the data directory
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(ServerError::bad_request(format!("invalid name: {name}")));
    }
    Ok(())
}
