//! Logging setup
//!
//! Unified tracing configuration: `RUST_LOG` wins when set, otherwise the
//! configured log level applies; output format switches between human and
//! JSON-ish compact via `LOG_FORMAT`.

use crate::config::ServerConfig;
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Primary log filter (RUST_LOG env var)
    pub log_filter: String,
    /// Fallback log level if RUST_LOG not set
    pub default_level: String,
    /// Log format ("human" or "json")
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Human,
    Json,
}

impl TelemetryConfig {
    /// Create telemetry config honoring the configured log level
    pub fn with_server_config(server_config: &ServerConfig) -> Self {
        let rust_log = env::var("RUST_LOG").unwrap_or_default();
        let default_level = if rust_log.is_empty() {
            env::var("LOG_LEVEL").unwrap_or_else(|_| server_config.log_level.clone())
        } else {
            server_config.log_level.clone()
        };

        Self {
            log_filter: rust_log,
            default_level,
            log_format: match env::var("LOG_FORMAT")
                .unwrap_or_default()
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Human,
            },
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self::with_server_config(&ServerConfig::default())
    }
}

/// Initialize the global tracing subscriber
///
/// Safe to call multiple times; only the first call installs a subscriber.
pub fn init_logging(config: &TelemetryConfig) {
    if tracing::dispatcher::has_been_set() {
        tracing::debug!("tracing subscriber already initialized, skipping");
        return;
    }

    let filter = if config.log_filter.is_empty() {
        EnvFilter::new(&config.default_level)
    } else {
        EnvFilter::new(&config.log_filter)
    };

    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
        LogFormat::Human => tracing_subscriber::fmt::layer().compact().boxed(),
    };

    // try_init so parallel tests racing to install a subscriber don't panic
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
