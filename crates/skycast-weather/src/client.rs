//! OpenWeather API client.
//!
//! One request per call, no retries. Every call carries the API key as the
//! `appid` query parameter and is bounded by the configured timeout.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use skycast_core::error::ReqwestErrorExt;
use skycast_core::{NetworkError, WeatherConfig};
use tracing::instrument;

use crate::types::{AirQualitySample, Coordinates, CurrentConditions, ForecastDay, Units, WeatherError};

const USER_AGENT: &str = "Skycast/0.1.0";

/// The four weather lookups the aggregator depends on.
#[async_trait]
pub trait WeatherApi: Send + Sync {
    async fn fetch_current_by_coordinates(
        &self,
        coordinates: Coordinates,
        units: Units,
    ) -> Result<CurrentConditions, WeatherError>;

    async fn fetch_current_by_city(
        &self,
        name: &str,
        units: Units,
    ) -> Result<CurrentConditions, WeatherError>;

    /// Raw 3-hour entries in API order.
    async fn fetch_forecast(&self, name: &str, units: Units)
        -> Result<Vec<ForecastDay>, WeatherError>;

    /// Best effort: callers should not let a failure here abort their work.
    async fn fetch_air_quality(
        &self,
        coordinates: Coordinates,
    ) -> Result<AirQualitySample, WeatherError>;
}

#[async_trait]
impl<T: WeatherApi + ?Sized> WeatherApi for Arc<T> {
    async fn fetch_current_by_coordinates(
        &self,
        coordinates: Coordinates,
        units: Units,
    ) -> Result<CurrentConditions, WeatherError> {
        (**self).fetch_current_by_coordinates(coordinates, units).await
    }

    async fn fetch_current_by_city(
        &self,
        name: &str,
        units: Units,
    ) -> Result<CurrentConditions, WeatherError> {
        (**self).fetch_current_by_city(name, units).await
    }

    async fn fetch_forecast(
        &self,
        name: &str,
        units: Units,
    ) -> Result<Vec<ForecastDay>, WeatherError> {
        (**self).fetch_forecast(name, units).await
    }

    async fn fetch_air_quality(
        &self,
        coordinates: Coordinates,
    ) -> Result<AirQualitySample, WeatherError> {
        (**self).fetch_air_quality(coordinates).await
    }
}

// Wire shapes. Only the fields we display are declared; all of them are required.

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    name: String,
    coord: ApiCoord,
    main: ApiMain,
    wind: ApiWind,
    visibility: u32,
    weather: Vec<ApiCondition>,
    sys: ApiSys,
}

#[derive(Debug, Deserialize)]
struct ApiCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct ApiMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct ApiWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    main: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct ApiSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    list: Vec<ForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    dt: i64,
    main: ForecastMain,
    weather: Vec<ApiCondition>,
}

#[derive(Debug, Deserialize)]
struct ForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct AirPollutionResponse {
    list: Vec<AirPollutionEntry>,
}

#[derive(Debug, Deserialize)]
struct AirPollutionEntry {
    components: AirComponents,
}

#[derive(Debug, Deserialize)]
struct AirComponents {
    pm2_5: f64,
}

/// Error body returned alongside non-2xx statuses, e.g. `{"cod":"404","message":"city not found"}`
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

impl TryFrom<CurrentResponse> for CurrentConditions {
    type Error = WeatherError;

    fn try_from(resp: CurrentResponse) -> Result<Self, Self::Error> {
        let condition = resp
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::Parse("current weather has no condition".into()))?;

        Ok(Self {
            name: resp.name,
            country: resp.sys.country,
            temperature: resp.main.temp,
            humidity: resp.main.humidity,
            wind_speed: resp.wind.speed,
            visibility: resp.visibility,
            condition: condition.main,
            icon: condition.icon,
            coordinates: Coordinates::new(resp.coord.lat, resp.coord.lon),
        })
    }
}

impl TryFrom<ForecastEntry> for ForecastDay {
    type Error = WeatherError;

    fn try_from(entry: ForecastEntry) -> Result<Self, Self::Error> {
        let condition = entry.weather.into_iter().next().ok_or_else(|| {
            WeatherError::Parse(format!("forecast entry {} has no condition", entry.dt))
        })?;

        Ok(Self {
            timestamp: entry.dt,
            temperature: entry.main.temp,
            condition: condition.main,
            icon: condition.icon,
        })
    }
}

impl From<NetworkError> for WeatherError {
    fn from(e: NetworkError) -> Self {
        match e {
            NetworkError::Timeout => WeatherError::Timeout,
            NetworkError::Unreachable(msg) => WeatherError::Network(msg),
            NetworkError::Status { status, message } => WeatherError::Api { status, message },
            NetworkError::Malformed(msg) => WeatherError::Parse(msg),
        }
    }
}

/// HTTP client for the OpenWeather 2.5 API
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    /// Build a client from injected settings. The timeout comes from `config.timeout_secs`.
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        Self::with_timeout(config, Duration::from_secs(config.timeout_secs))
    }

    pub fn with_timeout(config: &WeatherConfig, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| WeatherError::Network(format!("failed to build HTTP client: {}", e)))?;

        if config.api_key.trim().is_empty() {
            tracing::warn!("OpenWeather client created without an API key");
        }

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// GET `{base_url}/{endpoint}` with `params` plus `appid`, decoding the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!(endpoint, "OpenWeather request");

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| WeatherError::from(e.into_network_error()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WeatherError::from(e.into_network_error()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

            tracing::warn!(endpoint, status = status.as_u16(), %message, "OpenWeather request failed");

            return Err(match status.as_u16() {
                401 => WeatherError::Unauthorized,
                400 | 404 => WeatherError::NotFound(message),
                code => WeatherError::Api {
                    status: code,
                    message,
                },
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(endpoint, "Unexpected response shape: {}", e);
            WeatherError::Parse(format!("{}: {}", endpoint, e))
        })
    }
}

#[async_trait]
impl WeatherApi for OpenWeatherClient {
    #[instrument(skip(self), level = "info")]
    async fn fetch_current_by_coordinates(
        &self,
        coordinates: Coordinates,
        units: Units,
    ) -> Result<CurrentConditions, WeatherError> {
        let resp: CurrentResponse = self
            .get_json(
                "weather",
                &[
                    ("lat", coordinates.lat.to_string()),
                    ("lon", coordinates.lon.to_string()),
                    ("units", units.as_str().to_string()),
                ],
            )
            .await?;
        let current = CurrentConditions::try_from(resp)?;
        tracing::info!("Current conditions resolved to {}", current.name);
        Ok(current)
    }

    #[instrument(skip(self), level = "info")]
    async fn fetch_current_by_city(
        &self,
        name: &str,
        units: Units,
    ) -> Result<CurrentConditions, WeatherError> {
        let resp: CurrentResponse = self
            .get_json(
                "weather",
                &[("q", name.to_string()), ("units", units.as_str().to_string())],
            )
            .await?;
        let current = CurrentConditions::try_from(resp)?;
        tracing::info!("Current conditions resolved to {}", current.name);
        Ok(current)
    }

    #[instrument(skip(self), level = "info")]
    async fn fetch_forecast(
        &self,
        name: &str,
        units: Units,
    ) -> Result<Vec<ForecastDay>, WeatherError> {
        let resp: ForecastResponse = self
            .get_json(
                "forecast",
                &[("q", name.to_string()), ("units", units.as_str().to_string())],
            )
            .await?;
        let entries = resp
            .list
            .into_iter()
            .map(ForecastDay::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        tracing::info!("Fetched {} forecast entries", entries.len());
        Ok(entries)
    }

    #[instrument(skip(self), level = "info")]
    async fn fetch_air_quality(
        &self,
        coordinates: Coordinates,
    ) -> Result<AirQualitySample, WeatherError> {
        let resp: AirPollutionResponse = self
            .get_json(
                "air_pollution",
                &[
                    ("lat", coordinates.lat.to_string()),
                    ("lon", coordinates.lon.to_string()),
                ],
            )
            .await?;
        let entry = resp
            .list
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::Parse("air quality list is empty".into()))?;
        let pm2_5 = entry.components.pm2_5;
        if !pm2_5.is_finite() || pm2_5 < 0.0 {
            return Err(WeatherError::Parse(format!("invalid pm2_5 value {}", pm2_5)));
        }
        let sample = AirQualitySample::measured(pm2_5.round() as u32);
        tracing::info!("Air quality PM2.5 {}", sample.pm2_5);
        Ok(sample)
    }
}
