pub mod config;
pub mod error;

pub use config::{
    Config, ConfigIssue, DisplayConfig, GeolocationConfig, Units, ValidationResult, WeatherConfig,
    API_KEY_ENV,
};
pub use error::{AppError, ConfigError, GeolocationError, NetworkError, WeatherError};

use anyhow::Result;

/// Initialize logging for the application.
///
/// Logs go to stderr so rendered output on stdout stays clean. The filter
/// defaults to `info` and can be overridden with `RUST_LOG`.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("Skycast core initialized");
    Ok(())
}
