//! Application state management
//!
//! One [`AppState`] is built at process start and shared (via `Arc`) between
//! the bootstrap task and request handlers. The store client and data source
//! are read-only after construction; the bootstrap state is the only mutable
//! piece, and it is single-writer (see [`crate::bootstrap`]).

use crate::bootstrap::BootstrapState;
use crate::config::ServerConfig;
use crate::datafiles::DataSource;
use crate::telemetry::TelemetryConfig;
use std::time::Instant;
use tablesmith_store::{StoreConfig, TableStore};

/// Shared application state
#[derive(Debug)]
pub struct AppState {
    /// DynamoDB boundary client
    pub store: TableStore,

    /// Schema and seed file enumeration
    pub data: DataSource,

    /// Server configuration
    pub config: ServerConfig,

    /// Telemetry configuration
    pub telemetry_config: TelemetryConfig,

    /// Bootstrap progress, written by the bootstrap task only
    pub bootstrap: BootstrapState,

    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create application state, building the store client from the shared
    /// AWS config with the configured endpoint override
    pub async fn new(config: ServerConfig, telemetry_config: TelemetryConfig) -> Self {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let store = TableStore::new(
            &sdk_config,
            StoreConfig {
                endpoint: Some(config.dynamodb_endpoint.clone()),
                ..Default::default()
            },
        );
        Self::with_store(config, telemetry_config, store)
    }

    /// Create application state around a pre-built store client (for testing)
    pub fn with_store(
        config: ServerConfig,
        telemetry_config: TelemetryConfig,
        store: TableStore,
    ) -> Self {
        let data = DataSource::new(&config.data_path);
        Self {
            store,
            data,
            config,
            telemetry_config,
            bootstrap: BootstrapState::new(),
            start_time: Instant::now(),
        }
    }

    /// Seconds since the server started
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
