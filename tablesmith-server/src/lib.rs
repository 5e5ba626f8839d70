//! Tablesmith HTTP server
//!
//! Bootstraps DynamoDB tables at startup (delete, purge, create, update,
//! seed, each phase individually switchable) and serves a small HTTP API
//! for observing bootstrap progress and browsing/loading table data.
//!
//! # Example
//!
//! ```ignore
//! use tablesmith_server::{ServerConfig, TablesmithServer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig::default();
//!     let server = TablesmithServer::new(config).await;
//!     server.run().await.unwrap();
//! }
//! ```

pub mod bootstrap;
pub mod config;
pub mod datafiles;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use state::AppState;
pub use telemetry::{init_logging, TelemetryConfig};

use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Tablesmith HTTP server
pub struct TablesmithServer {
    /// Application state
    state: Arc<AppState>,
    /// Configured router
    router: Router,
}

impl TablesmithServer {
    /// Create a new server with the given configuration
    pub async fn new(config: ServerConfig) -> Self {
        let telemetry_config = TelemetryConfig::with_server_config(&config);
        let state = Arc::new(AppState::new(config, telemetry_config).await);
        let router = routes::build_router(state.clone());

        Self { state, router }
    }

    /// Get a reference to the application state
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Get the router for testing
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server
    ///
    /// Spawns the bootstrap task, then serves requests until shutdown. The
    /// bootstrap task has its own error boundary: its outcome is visible in
    /// the state machine, never as a crash of the serving path.
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let addr = self.state.config.listen_addr;
        let listener = TcpListener::bind(addr).await?;

        let bootstrap_task = tokio::spawn(bootstrap::run_bootstrap(self.state.clone()));

        info!(
            addr = %addr,
            endpoint = %self.state.config.dynamodb_endpoint,
            data_path = %self.state.config.data_path.display(),
            "tablesmith server starting"
        );

        let result = axum::serve(listener, self.router).await;

        // Only reached on server shutdown; the process is exiting anyway
        bootstrap_task.abort();

        result
    }
}
