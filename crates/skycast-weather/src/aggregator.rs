//! Combines current conditions, air quality and forecast into one `WeatherView`.

use std::sync::Arc;

use chrono::{DateTime, Local};
use skycast_core::Config;
use tracing::instrument;

use crate::client::WeatherApi;
use crate::display::DisplayContext;
use crate::fallback::{AqiFallback, RandomAqiFallback};
use crate::types::{
    AirQualitySample, Coordinates, CurrentConditions, DisplayFields, ForecastDay, LocationQuery,
    Units, WeatherError, WeatherView,
};

/// Raw forecasts come every 3 hours; every 8th entry is roughly one per day.
const FORECAST_STRIDE: usize = 8;
const FORECAST_DAYS: usize = 5;

/// Source of the "updated at" time shown with each result.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Which name the forecast is requested by.
///
/// The home screen asks for the name the API resolved (so a coordinate lookup
/// forecasts the nearest named place). The search screen asks for the text the
/// user typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForecastLookup {
    ResolvedName,
    Query(String),
}

/// Keeps entries `0, 8, 16, ...`, at most five of them.
pub fn downsample_forecast(entries: Vec<ForecastDay>) -> Vec<ForecastDay> {
    entries
        .into_iter()
        .step_by(FORECAST_STRIDE)
        .take(FORECAST_DAYS)
        .collect()
}

/// The aggregator shared by every view.
pub type SharedAggregator = Arc<WeatherAggregator<Arc<dyn WeatherApi>>>;

pub struct WeatherAggregator<A> {
    api: A,
    fallback: Arc<dyn AqiFallback>,
    clock: Arc<dyn Clock>,
    units: Units,
    default_city: String,
    time_format: String,
}

impl<A: WeatherApi> WeatherAggregator<A> {
    pub fn new(api: A, config: &Config) -> Self {
        Self {
            api,
            fallback: Arc::new(RandomAqiFallback),
            clock: Arc::new(SystemClock),
            units: config.weather.units,
            default_city: config.weather.default_city.clone(),
            time_format: config.display.time_format.clone(),
        }
    }

    pub fn with_fallback(mut self, fallback: impl AqiFallback + 'static) -> Self {
        self.fallback = Arc::new(fallback);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn default_city(&self) -> &str {
        &self.default_city
    }

    pub fn units(&self) -> Units {
        self.units
    }

    /// Home-screen aggregation. `None` looks up the default city.
    ///
    /// Fails if current conditions or the forecast cannot be fetched. An
    /// air-quality failure is replaced by the fallback value.
    #[instrument(skip(self), level = "info")]
    pub async fn aggregate(
        &self,
        query: Option<&LocationQuery>,
    ) -> Result<WeatherView, WeatherError> {
        let current = match query {
            Some(LocationQuery::Coordinates(coordinates)) => {
                self.api
                    .fetch_current_by_coordinates(*coordinates, self.units)
                    .await?
            }
            Some(LocationQuery::City(name)) => {
                self.api.fetch_current_by_city(name, self.units).await?
            }
            None => {
                self.api
                    .fetch_current_by_city(&self.default_city, self.units)
                    .await?
            }
        };

        self.complete(current, ForecastLookup::ResolvedName, true)
            .await
    }

    /// Search-screen aggregation: the typed text drives both lookups.
    #[instrument(skip(self), level = "info")]
    pub async fn aggregate_search(&self, city: &str) -> Result<WeatherView, WeatherError> {
        let current = self.api.fetch_current_by_city(city, self.units).await?;
        self.complete(current, ForecastLookup::Query(city.to_string()), false)
            .await
    }

    async fn complete(
        &self,
        current: CurrentConditions,
        lookup: ForecastLookup,
        pin_default_city: bool,
    ) -> Result<WeatherView, WeatherError> {
        let air_quality = self.air_quality(current.coordinates).await;

        let forecast_name = match &lookup {
            ForecastLookup::ResolvedName => current.name.as_str(),
            ForecastLookup::Query(text) => text.as_str(),
        };
        let raw = self.api.fetch_forecast(forecast_name, self.units).await?;
        let raw_len = raw.len();
        let forecast = downsample_forecast(raw);
        tracing::debug!("Down-sampled {} forecast entries to {}", raw_len, forecast.len());

        let fields = DisplayFields::derive(
            &current,
            &forecast,
            &DisplayContext {
                units: self.units,
                now: self.clock.now(),
                time_format: &self.time_format,
                pin_default_city,
            },
        );

        tracing::info!(
            "Weather for {}: {}°C, PM2.5 {}",
            current.name,
            fields.temperature_c,
            air_quality.pm2_5
        );

        Ok(WeatherView {
            current,
            air_quality,
            forecast,
            display: fields,
        })
    }

    async fn air_quality(&self, coordinates: Coordinates) -> AirQualitySample {
        match self.api.fetch_air_quality(coordinates).await {
            Ok(sample) => sample,
            Err(e) => {
                let placeholder = self.fallback.placeholder();
                tracing::warn!("Failed to fetch AQI, using placeholder {}: {}", placeholder, e);
                AirQualitySample::fallback(placeholder)
            }
        }
    }
}
