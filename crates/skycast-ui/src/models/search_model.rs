use std::sync::Arc;
use std::time::Duration;

use skycast_core::AppError;
use skycast_weather::{ForecastDay, WeatherView};

use crate::app_services::AppServices;
use crate::error_mapping::SEARCH_FAILED_MESSAGE;
use crate::services::{FetchRequest, WeatherError, WeatherRequests};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Search screen state. No geolocation and no default city.
pub struct SearchModel {
    services: Arc<AppServices>,
    requests: WeatherRequests,
    input: String,
    view: Option<WeatherView>,
    error: Option<String>,
    aqi: u32,
    forecast: Vec<ForecastDay>,
}

impl SearchModel {
    pub fn new(services: Arc<AppServices>) -> Self {
        let requests = WeatherRequests::new(services.runtime(), services.shutdown_token());
        Self {
            services,
            requests,
            input: String::new(),
            view: None,
            error: None,
            aqi: 0,
            forecast: Vec::new(),
        }
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Looks up the typed city. The input is cleared either way.
    ///
    /// Returns false when the input was blank and no request was made.
    pub fn submit(&mut self) -> bool {
        let city = std::mem::take(&mut self.input).trim().to_string();

        if city.is_empty() {
            self.error = Some(AppError::from(WeatherError::EmptyQuery).user_message().to_string());
            return false;
        }

        tracing::info!("Searching weather for {}", city);
        self.requests
            .start(self.services.aggregator(), FetchRequest::Search(city));
        true
    }

    /// Applies a finished search. Returns true when view state changed.
    pub fn poll(&mut self) -> bool {
        let Some(result) = self.requests.try_recv() else {
            return false;
        };

        match result {
            Ok(view) => {
                self.aqi = view.air_quality.pm2_5;
                self.forecast = view.forecast.clone();
                self.view = Some(view);
                self.error = None;
            }
            Err(e) => {
                tracing::error!("Search failed: {}", AppError::from(e));
                self.error = Some(SEARCH_FAILED_MESSAGE.to_string());
                self.view = None;
                self.aqi = 0;
                self.forecast.clear();
            }
        }
        true
    }

    /// Polls until the search settles or `timeout` elapses. Returns false on timeout.
    pub async fn wait_idle(&mut self, timeout: Duration) -> bool {
        let settle = async {
            loop {
                self.poll();
                if !self.loading() {
                    break;
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        };
        tokio::time::timeout(timeout, settle).await.is_ok()
    }

    /// Abandons the live search, if any.
    pub fn cancel(&mut self) {
        self.requests.cancel();
    }

    pub fn loading(&self) -> bool {
        self.requests.in_flight()
    }

    pub fn view(&self) -> Option<&WeatherView> {
        self.view.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn aqi(&self) -> u32 {
        self.aqi
    }

    pub fn forecast(&self) -> &[ForecastDay] {
        &self.forecast
    }

    pub fn request_generation(&self) -> u64 {
        self.requests.generation()
    }
}
