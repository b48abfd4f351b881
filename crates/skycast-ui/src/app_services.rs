//! Shared services handed to every view.
//!
//! One `AppServices` is built at startup from the loaded configuration and
//! passed to each model. It holds the runtime handle, the single shared
//! aggregator, the geolocation provider, and the shutdown token that parents
//! every request token.

use std::sync::Arc;

use anyhow::{Context, Result};
use skycast_core::Config;
use skycast_weather::{
    GeolocationOptions, GeolocationProvider, OpenWeatherClient, SharedAggregator,
    WeatherAggregator, WeatherApi,
};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

pub struct AppServices {
    runtime: Handle,
    aggregator: SharedAggregator,
    geolocation: Arc<dyn GeolocationProvider>,
    geolocation_options: GeolocationOptions,
    shutdown: CancellationToken,
}

impl AppServices {
    pub fn new(
        runtime: Handle,
        aggregator: SharedAggregator,
        geolocation: Arc<dyn GeolocationProvider>,
        geolocation_options: GeolocationOptions,
    ) -> Self {
        Self {
            runtime,
            aggregator,
            geolocation,
            geolocation_options,
            shutdown: CancellationToken::new(),
        }
    }

    /// Builds the OpenWeather client and aggregator from `config`.
    pub fn from_config(
        runtime: Handle,
        config: &Config,
        geolocation: Arc<dyn GeolocationProvider>,
    ) -> Result<Self> {
        let client = OpenWeatherClient::new(&config.weather)
            .context("Failed to create OpenWeather client")?;
        let api: Arc<dyn WeatherApi> = Arc::new(client);
        let aggregator = Arc::new(WeatherAggregator::new(api, config));

        tracing::info!(
            units = %config.weather.units,
            default_city = %config.weather.default_city,
            "Weather services initialized"
        );

        Ok(Self::new(
            runtime,
            aggregator,
            geolocation,
            GeolocationOptions::from(&config.geolocation),
        ))
    }

    pub fn runtime(&self) -> Handle {
        self.runtime.clone()
    }

    pub fn aggregator(&self) -> SharedAggregator {
        Arc::clone(&self.aggregator)
    }

    pub fn geolocation(&self) -> Arc<dyn GeolocationProvider> {
        Arc::clone(&self.geolocation)
    }

    pub fn geolocation_options(&self) -> GeolocationOptions {
        self.geolocation_options
    }

    /// Parent of every request token.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Cancels every live request of every view.
    pub fn shutdown(&self) {
        tracing::info!("AppServices shutdown initiated");
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}
