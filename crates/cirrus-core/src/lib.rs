pub mod config;
pub mod error;
pub mod query;
pub mod retry;
pub mod settings;

pub use config::{Config, DefaultLocation, EndpointConfig, TemperatureUnit};
pub use error::{AppError, ConfigError, NetworkError};
pub use query::{FetchState, QueryState, RequestToken};
pub use retry::{with_retry, RetryConfig, RetryDecision};
pub use settings::{JsonFileBackend, MemoryBackend, SettingsBackend, SettingsStore};

use anyhow::Result;

/// Initialize the core application
pub fn init() -> Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Cirrus core initialized");
    Ok(())
}
