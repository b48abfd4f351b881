//! Display derivations: unit conversion, labels and icon URLs.
//!
//! Temperatures and wind speeds are normalized to °C and m/s first, so the
//! derived values mean the same thing whichever `Units` the API was queried with.

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::types::{CurrentConditions, DisplayFields, ForecastDay, ForecastDisplay, Units};

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";
const HAZE_CONDITION: &str = "Haze";
const MPH_TO_MPS: f64 = 0.44704;
const KELVIN_OFFSET: f64 = 273.15;

/// Rounds halves toward positive infinity, so `-0.5` becomes `0` and `2.5` becomes `3`.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Converts an API temperature in `units` to °C.
pub fn to_celsius(temperature: f64, units: Units) -> f64 {
    match units {
        Units::Metric => temperature,
        Units::Imperial => (temperature - 32.0) * 5.0 / 9.0,
        Units::Standard => temperature - KELVIN_OFFSET,
    }
}

/// Converts an API wind speed in `units` to m/s.
pub fn to_meters_per_second(speed: f64, units: Units) -> f64 {
    match units {
        Units::Metric | Units::Standard => speed,
        Units::Imperial => speed * MPH_TO_MPS,
    }
}

/// Derives °F from an unrounded °C value.
pub fn celsius_to_fahrenheit(celsius: f64) -> i64 {
    round_half_up(celsius * 9.0 / 5.0 + 32.0)
}

pub fn mps_to_kmh(mps: f64) -> i64 {
    round_half_up(mps * 3.6)
}

pub fn meters_to_km(meters: u32) -> f64 {
    f64::from(meters) / 1000.0
}

/// Large icon for the current-conditions card.
pub fn current_icon_url(icon: &str) -> String {
    format!("{}/{}@2x.png", ICON_BASE_URL, icon)
}

/// Small icon for a forecast card.
pub fn forecast_icon_url(icon: &str) -> String {
    format!("{}/{}.png", ICON_BASE_URL, icon)
}

/// Whether the home card swaps the icon for the haze glyph.
pub fn shows_haze_glyph(condition: &str) -> bool {
    condition == HAZE_CONDITION
}

/// Country shown next to the place name. The home screen pins the default city to "IN".
pub fn country_label(current: &CurrentConditions, pin_default_city: bool) -> String {
    if pin_default_city && current.name == "Jaipur" {
        "IN".to_string()
    } else {
        current.country.clone()
    }
}

/// Labels for one forecast card. Dates are taken in UTC.
pub fn forecast_display(day: &ForecastDay, units: Units) -> ForecastDisplay {
    let celsius = to_celsius(day.temperature, units);
    let (weekday, day_of_month) = match Utc.timestamp_opt(day.timestamp, 0).single() {
        Some(at) => (at.format("%a").to_string(), at.format("%-d").to_string()),
        None => {
            tracing::warn!(timestamp = day.timestamp, "Forecast timestamp out of range");
            (String::new(), String::new())
        }
    };

    ForecastDisplay {
        weekday,
        day_of_month,
        temperature_label: format!(
            "{}°/ {}°F",
            round_half_up(celsius),
            celsius_to_fahrenheit(celsius)
        ),
        icon_url: forecast_icon_url(&day.icon),
    }
}

/// Inputs that are not part of the API responses.
#[derive(Debug, Clone, Copy)]
pub struct DisplayContext<'a> {
    pub units: Units,
    pub now: DateTime<Local>,
    pub time_format: &'a str,
    pub pin_default_city: bool,
}

impl DisplayFields {
    pub fn derive(
        current: &CurrentConditions,
        forecast: &[ForecastDay],
        ctx: &DisplayContext<'_>,
    ) -> Self {
        let celsius = to_celsius(current.temperature, ctx.units);
        let wind_kmh = mps_to_kmh(to_meters_per_second(current.wind_speed, ctx.units));

        Self {
            temperature_c: round_half_up(celsius),
            temperature_f: celsius_to_fahrenheit(celsius),
            wind_kmh,
            visibility_km: meters_to_km(current.visibility),
            humidity_label: format!("{}%", current.humidity),
            wind_label: format!("{} km/h", wind_kmh),
            country_label: country_label(current, ctx.pin_default_city),
            local_time: ctx.now.format(ctx.time_format).to_string(),
            icon_url: current_icon_url(&current.icon),
            forecast: forecast
                .iter()
                .map(|day| forecast_display(day, ctx.units))
                .collect(),
        }
    }
}
