use serde::{Deserialize, Serialize};

pub use skycast_core::{GeolocationError, Units};

/// Geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// What an aggregation is asked to look up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationQuery {
    Coordinates(Coordinates),
    City(String),
}

impl LocationQuery {
    pub fn city(name: impl Into<String>) -> Self {
        Self::City(name.into())
    }
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationQuery::Coordinates(c) => write!(f, "{:.4}, {:.4}", c.lat, c.lon),
            LocationQuery::City(name) => f.write_str(name),
        }
    }
}

/// Current weather at one place, in the units it was requested in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub name: String,
    pub country: String,
    pub temperature: f64,
    /// Relative humidity, percent
    pub humidity: u8,
    pub wind_speed: f64,
    /// Meters
    pub visibility: u32,
    /// Primary condition label, e.g. "Clouds" or "Haze"
    pub condition: String,
    pub icon: String,
    pub coordinates: Coordinates,
}

/// Where an air-quality value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AqiSource {
    Measured,
    Fallback,
}

/// Fine-particulate (PM2.5) reading in µg/m³
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirQualitySample {
    pub pm2_5: u32,
    pub source: AqiSource,
}

impl AirQualitySample {
    pub fn measured(pm2_5: u32) -> Self {
        Self {
            pm2_5,
            source: AqiSource::Measured,
        }
    }

    pub fn fallback(pm2_5: u32) -> Self {
        Self {
            pm2_5,
            source: AqiSource::Fallback,
        }
    }

    pub fn level(&self) -> AirQualityLevel {
        AirQualityLevel::from_pm2_5(self.pm2_5)
    }
}

/// Severity bands for a PM2.5 value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirQualityLevel {
    Good,
    Moderate,
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AirQualityLevel {
    pub fn from_pm2_5(pm2_5: u32) -> Self {
        match pm2_5 {
            0..=50 => Self::Good,
            51..=100 => Self::Moderate,
            101..=150 => Self::UnhealthySensitive,
            151..=200 => Self::Unhealthy,
            201..=300 => Self::VeryUnhealthy,
            _ => Self::Hazardous,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Good => "Good air",
            Self::Moderate => "Moderate",
            Self::UnhealthySensitive => "Unhealthy for Sensitive Groups",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }
}

/// One forecast sample. Raw forecasts come at 3-hour resolution; after
/// down-sampling there is roughly one per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Unix epoch seconds
    pub timestamp: i64,
    pub temperature: f64,
    pub condition: String,
    pub icon: String,
}

/// Display strings for one forecast card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDisplay {
    /// Short weekday, e.g. "Mon"
    pub weekday: String,
    /// Day of month without padding, e.g. "7"
    pub day_of_month: String,
    /// e.g. "25°/ 77°F"
    pub temperature_label: String,
    pub icon_url: String,
}

/// Values derived from the raw response for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayFields {
    pub temperature_c: i64,
    pub temperature_f: i64,
    pub wind_kmh: i64,
    /// Not rounded
    pub visibility_km: f64,
    pub humidity_label: String,
    pub wind_label: String,
    pub country_label: String,
    /// Query time on the viewer's clock, not the observation time
    pub local_time: String,
    pub icon_url: String,
    pub forecast: Vec<ForecastDisplay>,
}

/// Everything a view needs to render one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherView {
    pub current: CurrentConditions,
    pub air_quality: AirQualitySample,
    /// At most five entries, oldest first
    pub forecast: Vec<ForecastDay>,
    pub display: DisplayFields,
}

/// State of a one-shot device position query
#[derive(Debug, Clone, PartialEq)]
pub enum LocationResult {
    Coordinates(Coordinates),
    Error(GeolocationError),
    Pending,
}

impl LocationResult {
    pub fn is_pending(&self) -> bool {
        matches!(self, LocationResult::Pending)
    }
}

/// Weather lookup errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized - API key missing or invalid")]
    Unauthorized,
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Location error: {0}")]
    Geolocation(#[from] GeolocationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_air_quality_levels() {
        assert_eq!(AirQualityLevel::from_pm2_5(0), AirQualityLevel::Good);
        assert_eq!(AirQualityLevel::from_pm2_5(50), AirQualityLevel::Good);
        assert_eq!(AirQualityLevel::from_pm2_5(51), AirQualityLevel::Moderate);
        assert_eq!(AirQualityLevel::from_pm2_5(150), AirQualityLevel::UnhealthySensitive);
        assert_eq!(AirQualityLevel::from_pm2_5(200), AirQualityLevel::Unhealthy);
        assert_eq!(AirQualityLevel::from_pm2_5(300), AirQualityLevel::VeryUnhealthy);
        assert_eq!(AirQualityLevel::from_pm2_5(301), AirQualityLevel::Hazardous);
    }

    #[test]
    fn test_level_description() {
        assert_eq!(AirQualitySample::measured(12).level().description(), "Good air");
        assert_eq!(AirQualityLevel::Hazardous.description(), "Hazardous");
    }

    #[test]
    fn test_location_query_display() {
        assert_eq!(LocationQuery::city("Jaipur").to_string(), "Jaipur");
        assert_eq!(
            LocationQuery::Coordinates(Coordinates::new(26.9, 75.8)).to_string(),
            "26.9000, 75.8000"
        );
    }

    #[test]
    fn test_location_result_pending() {
        assert!(LocationResult::Pending.is_pending());
        assert!(!LocationResult::Error(GeolocationError::Timeout).is_pending());
    }
}
