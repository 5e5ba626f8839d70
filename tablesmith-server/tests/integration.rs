use aws_sdk_dynamodb::config::retry::RetryConfig;
use aws_sdk_dynamodb::config::{BehaviorVersion, Credentials, Region};
use axum::body::Body;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value as JsonValue;
use std::fs;
use std::sync::Arc;
use tablesmith_server::bootstrap::{run_bootstrap, BootstrapStatus};
use tablesmith_server::routes::build_router;
use tablesmith_server::{AppState, ServerConfig, TelemetryConfig};
use tablesmith_store::TableStore;
use tempfile::TempDir;
use tower::ServiceExt;

/// Store client pointed at a port nothing listens on; every request fails
/// fast with a dispatch error
fn offline_store() -> TableStore {
    let conf = aws_sdk_dynamodb::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("test", "test", None, None, "static"))
        .endpoint_url("http://127.0.0.1:1")
        .retry_config(RetryConfig::disabled())
        .build();
    TableStore::from_client(aws_sdk_dynamodb::Client::from_conf(conf))
}

fn test_state(mutate: impl FnOnce(&mut ServerConfig)) -> (TempDir, Arc<AppState>) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let mut cfg = ServerConfig {
        data_path: tmp.path().to_path_buf(),
        cors_enabled: false,
        ..Default::default()
    };
    mutate(&mut cfg);
    let telemetry = TelemetryConfig::with_server_config(&cfg);
    let state = Arc::new(AppState::with_store(cfg, telemetry, offline_store()));
    (tmp, state)
}

async fn json_body(resp: http::Response<Body>) -> (StatusCode, JsonValue) {
    let status = resp.status();
    let bytes = resp
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    let json: JsonValue = serde_json::from_slice(&bytes).expect("valid JSON response");
    (status, json)
}

#[tokio::test]
async fn health_reports_status_stats_and_settings() {
    let (_tmp, state) = test_state(|_| {});
    let app = build_router(state);

    let resp = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let (status, json) = json_body(resp).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json.get("startupTasksStatus").and_then(|v| v.as_str()),
        Some("not_started")
    );
    assert_eq!(json["stats"]["seeded"], 0);
    assert_eq!(json["settings"]["create_tables_on_startup"], true);
}

#[tokio::test]
async fn health_renders_html_when_asked() {
    let (_tmp, state) = test_state(|_| {});
    let app = build_router(state);

    let resp = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .header("accept", "text/html,application/xhtml+xml")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let page = String::from_utf8(body.to_vec()).unwrap();
    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains("not_started"));
}

#[tokio::test]
async fn traversal_table_names_are_rejected_without_touching_the_store() {
    let (_tmp, state) = test_state(|_| {});
    let app = build_router(state);

    let resp = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/tables/a..b/data")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let (status, json) = json_body(resp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("invalid name"));
}

#[tokio::test]
async fn loading_an_unknown_format_is_a_bad_request() {
    let (_tmp, state) = test_state(|_| {});
    let app = build_router(state);

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/tables/users/data/items.parquet")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let (status, json) = json_body(resp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("unknown data file format"));
}

#[tokio::test]
async fn loading_a_missing_file_is_a_bad_request() {
    let (_tmp, state) = test_state(|_| {});
    let app = build_router(state);

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/tables/users/data/absent.csv")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let (status, _json) = json_body(resp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bootstrap_with_all_phases_disabled_finishes_without_store_calls() {
    let (_tmp, state) = test_state(|cfg| {
        cfg.delete_tables_on_startup = false;
        cfg.purge_tables_on_startup = false;
        cfg.create_tables_on_startup = false;
        cfg.update_tables_on_startup = false;
        cfg.seed_tables_on_startup = false;
    });

    run_bootstrap(state.clone()).await;

    assert_eq!(state.bootstrap.status(), BootstrapStatus::Finished);
    let stats = state.bootstrap.stats().snapshot();
    assert_eq!(stats.created, 0);
    assert_eq!(stats.seeded, 0);
}

#[tokio::test]
async fn bootstrap_with_empty_data_directories_finishes() {
    // Seed/create/update directories are absent: every enumeration is empty
    // and the unreachable store is never contacted.
    let (_tmp, state) = test_state(|cfg| {
        cfg.delete_tables_on_startup = false;
        cfg.purge_tables_on_startup = false;
    });

    run_bootstrap(state.clone()).await;

    assert_eq!(state.bootstrap.status(), BootstrapStatus::Finished);
}

#[tokio::test]
async fn corrupt_seed_file_does_not_block_later_files() {
    let (tmp, state) = test_state(|cfg| {
        cfg.delete_tables_on_startup = false;
        cfg.purge_tables_on_startup = false;
        cfg.create_tables_on_startup = false;
        cfg.update_tables_on_startup = false;
    });

    // Files process in name order: the corrupt one first, then one with an
    // unknown suffix, then a valid (empty) one. None carries records, so
    // the unreachable store is never contacted.
    let seed_dir = tmp.path().join("seed").join("users");
    fs::create_dir_all(&seed_dir).unwrap();
    fs::write(seed_dir.join("a-corrupt.json"), "[{").unwrap();
    fs::write(seed_dir.join("b-unknown.parquet"), "").unwrap();
    fs::write(seed_dir.join("c-valid.json"), "[]").unwrap();

    run_bootstrap(state.clone()).await;

    assert_eq!(state.bootstrap.status(), BootstrapStatus::Finished);
    // Only the fully attempted file counts
    assert_eq!(state.bootstrap.stats().snapshot().seeded, 1);
}

#[tokio::test]
async fn unreachable_store_during_seed_parks_bootstrap_in_error() {
    let (tmp, state) = test_state(|cfg| {
        cfg.delete_tables_on_startup = false;
        cfg.purge_tables_on_startup = false;
        cfg.create_tables_on_startup = false;
        cfg.update_tables_on_startup = false;
    });

    let seed_dir = tmp.path().join("seed").join("users");
    fs::create_dir_all(&seed_dir).unwrap();
    fs::write(seed_dir.join("users.csv"), "id,name\n1,Alice\n").unwrap();

    run_bootstrap(state.clone()).await;

    assert_eq!(state.bootstrap.status(), BootstrapStatus::Error);
    // The file was never fully attempted, so nothing was counted
    assert_eq!(state.bootstrap.stats().snapshot().seeded, 0);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (_tmp, state) = test_state(|_| {});
    let app = build_router(state);

    let resp = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
