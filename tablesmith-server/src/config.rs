//! Server configuration
//!
//! Loaded once at process start from CLI flags and `TABLESMITH_*` environment
//! variables; immutable afterwards. The active configuration is included in
//! the health document so an operator can see which lifecycle phases were
//! enabled for the current run.

use clap::Parser;
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Tablesmith HTTP server and bootstrap configuration
#[derive(Parser, Debug, Clone, Serialize)]
#[command(name = "tablesmith")]
#[command(about = "DynamoDB table bootstrap and seeding service")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "TABLESMITH_LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: SocketAddr,

    /// Base directory holding create/, update/, seed/ and load/ data
    #[arg(long, env = "TABLESMITH_DATA_PATH", default_value = "/data")]
    pub data_path: PathBuf,

    /// DynamoDB endpoint (e.g. DynamoDB Local)
    #[arg(
        long,
        env = "TABLESMITH_DYNAMODB_ENDPOINT",
        default_value = "http://dynamodb:8000"
    )]
    pub dynamodb_endpoint: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TABLESMITH_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Enable CORS (Cross-Origin Resource Sharing)
    #[arg(long, env = "TABLESMITH_CORS_ENABLED", default_value = "true")]
    pub cors_enabled: bool,

    /// Delete every table at startup before any other phase
    #[arg(long, env = "TABLESMITH_DELETE_TABLES_ON_STARTUP")]
    pub delete_tables_on_startup: bool,

    /// Purge all items from every table at startup
    #[arg(long, env = "TABLESMITH_PURGE_TABLES_ON_STARTUP")]
    pub purge_tables_on_startup: bool,

    /// Create tables from the create-schema directory at startup
    #[arg(
        long,
        env = "TABLESMITH_CREATE_TABLES_ON_STARTUP",
        default_value = "true"
    )]
    pub create_tables_on_startup: bool,

    /// Apply schema updates from the update-schema directory at startup
    #[arg(
        long,
        env = "TABLESMITH_UPDATE_TABLES_ON_STARTUP",
        default_value = "true"
    )]
    pub update_tables_on_startup: bool,

    /// Seed tables from the seed directory at startup
    #[arg(
        long,
        env = "TABLESMITH_SEED_TABLES_ON_STARTUP",
        default_value = "true"
    )]
    pub seed_tables_on_startup: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".parse().expect("valid default addr"),
            data_path: PathBuf::from("/data"),
            dynamodb_endpoint: "http://dynamodb:8000".to_string(),
            log_level: "info".to_string(),
            cors_enabled: true,
            delete_tables_on_startup: false,
            purge_tables_on_startup: false,
            create_tables_on_startup: true,
            update_tables_on_startup: true,
            seed_tables_on_startup: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_only_additive_phases() {
        let config = ServerConfig::default();
        assert!(!config.delete_tables_on_startup);
        assert!(!config.purge_tables_on_startup);
        assert!(config.create_tables_on_startup);
        assert!(config.update_tables_on_startup);
        assert!(config.seed_tables_on_startup);
    }

    #[test]
    fn config_serializes_for_health_document() {
        let config = ServerConfig::default();
        let json = serde_json::to_value(&config).expect("serializable");
        assert_eq!(json["data_path"], "/data");
        assert_eq!(json["create_tables_on_startup"], true);
    }
}
