use crate::services::weather_service::WeatherError as UiWeatherError;
use skycast_core::{AppError, NetworkError, WeatherError};
use skycast_weather::WeatherError as LookupError;

/// Search banner for any failed lookup, whatever the cause.
pub const SEARCH_FAILED_MESSAGE: &str = "City not found or failed to fetch weather";

impl From<UiWeatherError> for AppError {
    fn from(e: UiWeatherError) -> Self {
        match e {
            UiWeatherError::Fetch(lookup) => match lookup {
                LookupError::Network(s) => AppError::Network(NetworkError::Unreachable(s)),
                LookupError::Timeout => AppError::Network(NetworkError::Timeout),
                LookupError::NotFound(s) => AppError::Weather(WeatherError::UnknownLocation(s)),
                LookupError::Unauthorized => AppError::Weather(WeatherError::InvalidApiKey),
                LookupError::Api { status, .. } if status >= 500 => {
                    AppError::Weather(WeatherError::Unavailable)
                }
                LookupError::Api { status, message } => {
                    AppError::Weather(WeatherError::Rejected(format!("{}: {}", status, message)))
                }
                LookupError::Parse(s) => AppError::Network(NetworkError::Malformed(s)),
                LookupError::Geolocation(g) => AppError::Geolocation(g),
            },
            UiWeatherError::EmptyQuery => AppError::Weather(WeatherError::MissingQuery),
        }
    }
}
