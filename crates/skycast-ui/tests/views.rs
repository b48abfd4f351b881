//! Home and search view behavior against a scripted weather API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use skycast_core::Config;
use skycast_weather::{
    AirQualitySample, Coordinates, CurrentConditions, FixedLocation, ForecastDay,
    GeolocationError, GeolocationOptions, GeolocationProvider, SharedAggregator, Units,
    Unsupported, WeatherAggregator, WeatherApi, WeatherError,
};
use skycast_ui::render::render_home;
use skycast_ui::{AppServices, HomeModel, SearchModel};
use tokio::runtime::Handle;
use tokio::sync::Notify;

const WAIT: Duration = Duration::from_secs(5);

/// City lookups echo the requested name; "Atlantis" is unknown and "Slow"
/// blocks until the gate opens. Coordinate lookups resolve to Paris unless
/// built with `unknown_coordinates`.
struct FakeApi {
    gate: Arc<Notify>,
    calls: Mutex<Vec<String>>,
    coordinates_known: bool,
}

impl FakeApi {
    fn new() -> Self {
        Self {
            gate: Arc::new(Notify::new()),
            calls: Mutex::new(Vec::new()),
            coordinates_known: true,
        }
    }

    fn unknown_coordinates() -> Self {
        Self {
            coordinates_known: false,
            ..Self::new()
        }
    }
}

fn conditions(name: &str, coordinates: Coordinates) -> CurrentConditions {
    CurrentConditions {
        name: name.to_string(),
        country: "IN".to_string(),
        temperature: 25.0,
        humidity: 65,
        wind_speed: 5.0,
        visibility: 4000,
        condition: "Clear".to_string(),
        icon: "01d".to_string(),
        coordinates,
    }
}

#[async_trait]
impl WeatherApi for FakeApi {
    async fn fetch_current_by_coordinates(
        &self,
        coordinates: Coordinates,
        _units: Units,
    ) -> Result<CurrentConditions, WeatherError> {
        self.calls.lock().push(format!("coords:{},{}", coordinates.lat, coordinates.lon));
        if !self.coordinates_known {
            return Err(WeatherError::NotFound("nothing to geocode".to_string()));
        }
        Ok(conditions("Paris", coordinates))
    }

    async fn fetch_current_by_city(
        &self,
        name: &str,
        _units: Units,
    ) -> Result<CurrentConditions, WeatherError> {
        self.calls.lock().push(format!("city:{}", name));
        if name == "Slow" {
            self.gate.notified().await;
        }
        if name == "Atlantis" {
            return Err(WeatherError::NotFound("city not found".to_string()));
        }
        Ok(conditions(name, Coordinates::new(26.9, 75.8)))
    }

    async fn fetch_forecast(
        &self,
        name: &str,
        _units: Units,
    ) -> Result<Vec<ForecastDay>, WeatherError> {
        self.calls.lock().push(format!("forecast:{}", name));
        Ok((0..40)
            .map(|i| ForecastDay {
                timestamp: 1_700_000_000 + i * 10_800,
                temperature: 20.0,
                condition: "Clear".to_string(),
                icon: "01d".to_string(),
            })
            .collect())
    }

    async fn fetch_air_quality(
        &self,
        _coordinates: Coordinates,
    ) -> Result<AirQualitySample, WeatherError> {
        Ok(AirQualitySample::measured(42))
    }
}

struct NeverLocates;

#[async_trait]
impl GeolocationProvider for NeverLocates {
    async fn locate(&self, _: &GeolocationOptions) -> Result<Coordinates, GeolocationError> {
        std::future::pending().await
    }
}

/// Reports `position` once the gate opens.
struct GatedLocation {
    gate: Arc<Notify>,
    position: Coordinates,
}

#[async_trait]
impl GeolocationProvider for GatedLocation {
    async fn locate(&self, _: &GeolocationOptions) -> Result<Coordinates, GeolocationError> {
        self.gate.notified().await;
        Ok(self.position)
    }
}

fn services(api: Arc<FakeApi>, geolocation: Arc<dyn GeolocationProvider>) -> Arc<AppServices> {
    services_for_city(api, geolocation, "Jaipur")
}

fn services_for_city(
    api: Arc<FakeApi>,
    geolocation: Arc<dyn GeolocationProvider>,
    default_city: &str,
) -> Arc<AppServices> {
    let mut config = Config::default();
    config.weather.default_city = default_city.to_string();
    let api: Arc<dyn WeatherApi> = api;
    let aggregator: SharedAggregator = Arc::new(WeatherAggregator::new(api, &config));
    Arc::new(AppServices::new(
        Handle::current(),
        aggregator,
        geolocation,
        GeolocationOptions::default(),
    ))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn home_moves_from_default_city_to_position() {
    let api = Arc::new(FakeApi::new());
    let position = Coordinates::new(48.85, 2.35);
    let services = services(api.clone(), Arc::new(FixedLocation(position)));

    let mut home = HomeModel::new(services);
    home.mount();
    assert!(home.loading());
    assert!(home.wait_idle(WAIT).await);

    let view = home.view().unwrap();
    assert_eq!(view.current.name, "Paris");
    assert_eq!(home.request_generation(), 2);
    assert_eq!(home.aqi(), 42);
    assert_eq!(home.forecast().len(), 5);
    assert!(home.banner().is_none());

    let calls = api.calls.lock().clone();
    assert!(calls.contains(&"coords:48.85,2.35".to_string()));
    assert!(calls.contains(&"forecast:Paris".to_string()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn home_geolocation_error_keeps_default_city() {
    let api = Arc::new(FakeApi::new());
    let services = services(api, Arc::new(Unsupported));

    let mut home = HomeModel::new(services);
    home.mount();
    assert!(home.wait_idle(WAIT).await);

    assert_eq!(home.view().unwrap().current.name, "Jaipur");
    assert_eq!(home.view().unwrap().display.country_label, "IN");
    assert_eq!(home.geolocation_error(), Some(&GeolocationError::Unsupported));
    assert!(home.error().is_none());
    assert!(home
        .banner()
        .unwrap()
        .starts_with("Geolocation not supported"));
    assert!(!home.loading());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn home_is_loading_while_position_pending() {
    let api = Arc::new(FakeApi::new());
    let services = services(api, Arc::new(NeverLocates));

    let mut home = HomeModel::new(services);
    home.mount();

    // Default city arrives, but the position query is still out.
    assert!(!home.wait_idle(Duration::from_millis(300)).await);
    assert_eq!(home.view().unwrap().current.name, "Jaipur");
    assert!(home.location().is_pending());
    assert!(home.loading());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn home_failed_position_lookup_replaces_default_city() {
    let api = Arc::new(FakeApi::unknown_coordinates());
    let gate = Arc::new(Notify::new());
    let provider = GatedLocation {
        gate: gate.clone(),
        position: Coordinates::new(0.0, 0.0),
    };
    let services = services(api, Arc::new(provider));

    let mut home = HomeModel::new(services);
    home.mount();
    assert!(!home.wait_idle(Duration::from_millis(300)).await);
    assert_eq!(home.view().unwrap().current.name, "Jaipur");

    gate.notify_one();
    assert!(home.wait_idle(WAIT).await);

    assert!(home.view().is_none());
    assert_eq!(home.aqi(), 0);
    assert!(home.forecast().is_empty());
    assert_eq!(
        home.banner().as_deref(),
        Some("Location not found. Check and try again.")
    );
    let screen = render_home(&home);
    assert!(screen.contains("Location not found"));
    assert!(!screen.contains("Jaipur"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn home_without_position_or_city_shows_no_weather() {
    let api = Arc::new(FakeApi::new());
    let services = services_for_city(api, Arc::new(Unsupported), "Atlantis");

    let mut home = HomeModel::new(services);
    home.mount();
    assert!(home.wait_idle(WAIT).await);

    assert!(home.view().is_none());
    assert_eq!(home.error(), Some("Location not found. Check and try again."));
    assert_eq!(home.geolocation_error(), Some(&GeolocationError::Unsupported));
    assert!(home.banner().is_some());
    assert!(!home.loading());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn remount_starts_from_empty_state() {
    let api = Arc::new(FakeApi::new());
    let services = services(api, Arc::new(Unsupported));

    let mut home = HomeModel::new(services);
    home.mount();
    assert!(home.wait_idle(WAIT).await);
    assert!(home.view().is_some());

    home.unmount();
    home.mount();
    assert!(home.view().is_none());
    assert_eq!(home.aqi(), 0);
    assert!(home.forecast().is_empty());
    assert!(home.loading());

    assert!(home.wait_idle(WAIT).await);
    assert_eq!(home.view().unwrap().current.name, "Jaipur");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unmounted_home_ignores_late_results() {
    let api = Arc::new(FakeApi::new());
    let services = services_for_city(api.clone(), Arc::new(NeverLocates), "Slow");

    let mut home = HomeModel::new(services);
    home.mount();
    home.unmount();
    api.gate.notify_one();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(!home.poll());
    assert!(home.view().is_none());
    assert!(!home.loading());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn search_success_then_unknown_city() {
    let api = Arc::new(FakeApi::new());
    let services = services(api.clone(), Arc::new(Unsupported));
    let mut search = SearchModel::new(services);

    search.set_input("Paris, FR");
    assert!(search.submit());
    assert_eq!(search.input(), "");
    assert!(search.wait_idle(WAIT).await);

    assert_eq!(search.view().unwrap().current.name, "Paris, FR");
    assert_eq!(search.view().unwrap().display.country_label, "IN");
    assert_eq!(search.aqi(), 42);
    assert_eq!(search.forecast().len(), 5);
    assert!(search.error().is_none());
    assert!(api.calls.lock().contains(&"forecast:Paris, FR".to_string()));

    search.set_input("Atlantis");
    assert!(search.submit());
    assert_eq!(search.input(), "");
    assert!(search.wait_idle(WAIT).await);

    assert_eq!(
        search.error(),
        Some("City not found or failed to fetch weather")
    );
    assert!(search.view().is_none());
    assert_eq!(search.aqi(), 0);
    assert!(search.forecast().is_empty());
    assert!(!api.calls.lock().contains(&"forecast:Atlantis".to_string()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn blank_search_is_rejected_locally() {
    let api = Arc::new(FakeApi::new());
    let services = services(api.clone(), Arc::new(Unsupported));
    let mut search = SearchModel::new(services);

    search.set_input("   ");
    assert!(!search.submit());

    assert_eq!(search.error(), Some("Enter a city name to search."));
    assert_eq!(search.input(), "");
    assert_eq!(search.request_generation(), 0);
    assert!(!search.loading());
    assert!(api.calls.lock().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancelled_search_changes_nothing() {
    let api = Arc::new(FakeApi::new());
    let services = services(api.clone(), Arc::new(Unsupported));
    let mut search = SearchModel::new(services);

    search.set_input("Slow");
    search.submit();
    search.cancel();
    api.gate.notify_one();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(!search.poll());
    assert!(search.view().is_none());
    assert!(search.error().is_none());
    assert!(!search.loading());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn newer_search_supersedes_older() {
    let api = Arc::new(FakeApi::new());
    let services = services(api.clone(), Arc::new(Unsupported));
    let mut search = SearchModel::new(services);

    search.set_input("Slow");
    search.submit();
    search.set_input("Oslo");
    search.submit();
    assert!(search.wait_idle(WAIT).await);
    assert_eq!(search.view().unwrap().current.name, "Oslo");

    api.gate.notify_one();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!search.poll());
    assert_eq!(search.view().unwrap().current.name, "Oslo");
    assert_eq!(search.request_generation(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shutdown_stops_live_requests() {
    let api = Arc::new(FakeApi::new());
    let services = services(api.clone(), Arc::new(Unsupported));
    let mut search = SearchModel::new(services.clone());

    search.set_input("Slow");
    search.submit();
    assert!(search.loading());

    services.shutdown();
    assert!(services.is_shut_down());
    assert!(!search.loading());

    api.gate.notify_one();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!search.poll());
    assert!(search.view().is_none());
}
