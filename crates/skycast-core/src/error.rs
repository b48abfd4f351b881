//! Error taxonomy shared by every Skycast crate.
//!
//! Each leaf enum carries the technical detail for logs and exposes a short
//! `user_message()` for the banner shown above a weather card.

use thiserror::Error;

/// Top-level application error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Weather lookup failed: {0}")]
    Weather(#[from] WeatherError),

    #[error("Geolocation error: {0}")]
    Geolocation(#[from] GeolocationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Banner text. Never includes upstream detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
            AppError::Geolocation(e) => e.user_message(),
            AppError::Io(_) => "Could not read or write local files.",
            AppError::Other(_) => "Failed to fetch weather",
        }
    }
}

/// Transport-level failures talking to the weather service.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Weather service unreachable: {0}")]
    Unreachable(String),

    #[error("Request timed out")]
    Timeout,

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::Unreachable(_) => {
                "Can't reach the weather service. Check your connection."
            }
            NetworkError::Timeout => "The weather service took too long to answer.",
            NetworkError::Status { status, .. } if *status >= 500 => {
                "The weather service is having trouble. Try again later."
            }
            NetworkError::Status { .. } => "Failed to fetch weather",
            NetworkError::Malformed(_) => "The weather service sent data we couldn't read.",
        }
    }
}

/// Problems with the settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Cannot parse {path}: {reason}")]
    Parse { path: String, reason: String },
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Settings are invalid. Check config.toml.",
            ConfigError::Parse { .. } => "config.toml could not be read. Fix or delete it.",
        }
    }
}

/// Lookup-level failures, as the views describe them.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("No weather for {0}")]
    UnknownLocation(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("API key missing or invalid")]
    InvalidApiKey,

    #[error("Weather service unavailable")]
    Unavailable,

    #[error("No location given")]
    MissingQuery,
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::UnknownLocation(_) => "Location not found. Check and try again.",
            WeatherError::Rejected(_) => "Failed to fetch weather",
            WeatherError::InvalidApiKey => {
                "Weather API key is missing or invalid. Set SKYCAST_OPENWEATHER_API_KEY."
            }
            WeatherError::Unavailable => "Weather service unavailable. Try again later.",
            WeatherError::MissingQuery => "Enter a city name to search.",
        }
    }
}

/// Device position errors. The home view falls back to the default city on all of them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Geolocation not supported")]
    Unsupported,

    #[error("Position unavailable: {0}")]
    Unavailable(String),

    #[error("Location request timed out")]
    Timeout,
}

impl GeolocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            GeolocationError::PermissionDenied => {
                "Location access was denied. Showing the default city."
            }
            GeolocationError::Unsupported => "Geolocation not supported. Showing the default city.",
            GeolocationError::Unavailable(_) => {
                "Your position is unavailable. Showing the default city."
            }
            GeolocationError::Timeout => {
                "Finding your position took too long. Showing the default city."
            }
        }
    }
}

/// Classifies a reqwest failure.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            return NetworkError::Timeout;
        }
        if self.is_decode() || self.is_body() {
            return NetworkError::Malformed(self.to_string());
        }
        match self.status() {
            Some(status) => NetworkError::Status {
                status: status.as_u16(),
                message: self.to_string(),
            },
            None => NetworkError::Unreachable(self.to_string()),
        }
    }
}
