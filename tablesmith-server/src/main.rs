//! Tablesmith CLI
//!
//! Run with: `cargo run -p tablesmith-server -- --help`

use clap::Parser;
use tablesmith_server::{init_logging, ServerConfig, TablesmithServer, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::parse();

    let telemetry_config = TelemetryConfig::with_server_config(&config);
    init_logging(&telemetry_config);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.listen_addr,
        endpoint = %config.dynamodb_endpoint,
        data_path = %config.data_path.display(),
        delete = config.delete_tables_on_startup,
        purge = config.purge_tables_on_startup,
        create = config.create_tables_on_startup,
        update = config.update_tables_on_startup,
        seed = config.seed_tables_on_startup,
        "starting tablesmith"
    );

    let server = TablesmithServer::new(config).await;
    server.run().await.map_err(Into::into)
}
