//! Home screen state: weather for the device position, or the default city
//! until (or unless) a position is known.

use std::sync::Arc;
use std::time::Duration;

use skycast_core::AppError;
use skycast_weather::{
    ForecastDay, GeolocationError, Geolocator, LocationQuery, LocationResult, WeatherView,
};

use crate::app_services::AppServices;
use crate::services::{FetchRequest, WeatherRequests};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

pub struct HomeModel {
    services: Arc<AppServices>,
    requests: WeatherRequests,
    geolocator: Option<Geolocator>,
    location: LocationResult,
    mounted: bool,
    // View state
    view: Option<WeatherView>,
    error: Option<String>,
    geolocation_error: Option<GeolocationError>,
    aqi: u32,
    forecast: Vec<ForecastDay>,
}

impl HomeModel {
    pub fn new(services: Arc<AppServices>) -> Self {
        let requests = WeatherRequests::new(services.runtime(), services.shutdown_token());
        Self {
            services,
            requests,
            geolocator: None,
            location: LocationResult::Pending,
            mounted: false,
            view: None,
            error: None,
            geolocation_error: None,
            aqi: 0,
            forecast: Vec::new(),
        }
    }

    /// Starts the single position query and fetches the default city right away.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        tracing::info!("Home view mounted");

        self.mounted = true;
        self.location = LocationResult::Pending;
        self.geolocation_error = None;
        self.clear_result();
        self.error = None;
        self.geolocator = Some(Geolocator::start(
            &self.services.runtime(),
            self.services.geolocation(),
            self.services.geolocation_options(),
        ));
        self.requests
            .start(self.services.aggregator(), FetchRequest::Home(None));
    }

    /// Cancels everything in flight. Late results are discarded.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        tracing::info!("Home view unmounted");

        self.requests.cancel();
        self.geolocator = None;
        self.mounted = false;
    }

    /// Applies any finished work. Returns true when view state changed.
    pub fn poll(&mut self) -> bool {
        if !self.mounted {
            return false;
        }
        let mut changed = self.poll_location();

        if let Some(result) = self.requests.try_recv() {
            changed = true;
            match result {
                Ok(view) => {
                    self.aqi = view.air_quality.pm2_5;
                    self.forecast = view.forecast.clone();
                    self.view = Some(view);
                    self.error = None;
                }
                Err(e) => {
                    let app_err = AppError::from(e);
                    tracing::error!("Home weather failed: {}", app_err);
                    self.error = Some(app_err.user_message().to_string());
                    self.clear_result();
                }
            }
        }

        changed
    }

    fn clear_result(&mut self) {
        self.view = None;
        self.aqi = 0;
        self.forecast.clear();
    }

    fn poll_location(&mut self) -> bool {
        if !self.location.is_pending() {
            return false;
        }
        let Some(geolocator) = &self.geolocator else {
            return false;
        };

        match geolocator.current() {
            LocationResult::Pending => false,
            LocationResult::Coordinates(coordinates) => {
                self.location = LocationResult::Coordinates(coordinates);
                self.requests.start(
                    self.services.aggregator(),
                    FetchRequest::Home(Some(LocationQuery::Coordinates(coordinates))),
                );
                true
            }
            LocationResult::Error(e) => {
                tracing::warn!("Staying on the default city: {}", e);
                self.location = LocationResult::Error(e.clone());
                self.geolocation_error = Some(e);
                true
            }
        }
    }

    /// Polls until nothing is pending or `timeout` elapses. Returns false on timeout.
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

    /// True while the position is unknown or a request is in flight.
    pub fn loading(&self) -> bool {
        self.mounted && (self.location.is_pending() || self.requests.in_flight())
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn location(&self) -> &LocationResult {
        &self.location
    }

    pub fn view(&self) -> Option<&WeatherView> {
        self.view.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn geolocation_error(&self) -> Option<&GeolocationError> {
        self.geolocation_error.as_ref()
    }

    /// Fetch error first, then the geolocation notice.
    pub fn banner(&self) -> Option<String> {
        if let Some(error) = &self.error {
            return Some(error.clone());
        }
        self.geolocation_error
            .as_ref()
            .map(|e| AppError::from(e.clone()).user_message().to_string())
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

impl Drop for HomeModel {
    fn drop(&mut self) {
        self.unmount();
    }
}
