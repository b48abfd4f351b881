//! Weather data for Skycast
//!
//! Fetches current conditions, air quality and a 5-day forecast from the
//! OpenWeather API and shapes them into a display-ready [`WeatherView`].

pub mod aggregator;
pub mod client;
pub mod display;
pub mod fallback;
pub mod location;
pub mod types;

pub use aggregator::{
    downsample_forecast, Clock, ForecastLookup, SharedAggregator, SystemClock, WeatherAggregator,
};
pub use client::{OpenWeatherClient, WeatherApi};
pub use display::DisplayContext;
pub use fallback::{AqiFallback, FixedAqiFallback, RandomAqiFallback};
pub use location::{FixedLocation, GeolocationOptions, GeolocationProvider, Geolocator, Unsupported};
pub use types::*;
