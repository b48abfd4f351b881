//! Plain-text rendering of the home and search screens.

use std::fmt::Write;

use skycast_weather::display::shows_haze_glyph;
use skycast_weather::WeatherView;

use crate::models::{HomeModel, SearchModel};

/// Drawn in place of the condition icon when the sky is hazy.
const HAZE_GLYPH: [&str; 5] = [
    "      ────────",
    "     ──────────",
    "    ────────────",
    "     ──────────",
    "      ────────",
];

pub fn render_home(model: &HomeModel) -> String {
    let mut out = String::new();

    if let Some(banner) = model.banner() {
        let _ = writeln!(out, "! {}", banner);
    }

    match model.view() {
        Some(view) => {
            let _ = writeln!(out, "Today's Weather in {}", view.current.name);
            let _ = writeln!(out);
            render_card(&mut out, view, model.aqi());
            render_forecast(&mut out, view);
            if model.loading() {
                let _ = writeln!(out, "(updating...)");
            }
        }
        None if model.loading() => {
            let _ = writeln!(out, "Loading weather...");
        }
        None => {}
    }

    out
}

pub fn render_search(model: &SearchModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Search Weather");

    if let Some(error) = model.error() {
        let _ = writeln!(out, "! {}", error);
    }

    if model.loading() {
        let _ = writeln!(out, "Searching...");
    } else if let Some(view) = model.view() {
        let _ = writeln!(out);
        render_card(&mut out, view, model.aqi());
        render_forecast(&mut out, view);
    }

    out
}

/// Current-conditions card.
pub fn render_card(out: &mut String, view: &WeatherView, aqi: u32) {
    let d = &view.display;

    let _ = writeln!(out, "{}, {}", view.current.name, d.country_label);
    let _ = writeln!(out, "{}°C ({}°F)", d.temperature_c, d.temperature_f);
    let _ = writeln!(out, "{}", view.current.condition);
    let _ = writeln!(
        out,
        "Air Quality Index: {} ({})",
        aqi,
        view.air_quality.level().description()
    );
    let _ = writeln!(out, "Humidity: {}", d.humidity_label);
    let _ = writeln!(out, "Wind: {}", d.wind_label);
    let _ = writeln!(out, "Visibility: {} km", d.visibility_km);
    let _ = writeln!(out, "Updated: {}", d.local_time);

    if shows_haze_glyph(&view.current.condition) {
        for line in HAZE_GLYPH {
            let _ = writeln!(out, "{}", line);
        }
    } else {
        let _ = writeln!(out, "Icon: {}", d.icon_url);
    }
}

fn render_forecast(out: &mut String, view: &WeatherView) {
    if view.display.forecast.is_empty() {
        return;
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Weather overview of upcoming days");
    for (day, label) in view.forecast.iter().zip(&view.display.forecast) {
        let _ = writeln!(
            out,
            "{:<3} {:>2}  {:<12} {}",
            label.weekday, label.day_of_month, label.temperature_label, day.condition
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skycast_weather::{
        AirQualitySample, Coordinates, CurrentConditions, DisplayFields, ForecastDay,
        ForecastDisplay,
    };

    fn view(condition: &str) -> WeatherView {
        WeatherView {
            current: CurrentConditions {
                name: "Jaipur".to_string(),
                country: "IN".to_string(),
                temperature: 25.0,
                humidity: 65,
                wind_speed: 5.0,
                visibility: 4500,
                condition: condition.to_string(),
                icon: "50d".to_string(),
                coordinates: Coordinates::new(26.9, 75.8),
            },
            air_quality: AirQualitySample::measured(38),
            forecast: vec![ForecastDay {
                timestamp: 1_700_000_000,
                temperature: 25.0,
                condition: "Clear".to_string(),
                icon: "01d".to_string(),
            }],
            display: DisplayFields {
                temperature_c: 25,
                temperature_f: 77,
                wind_kmh: 18,
                visibility_km: 4.5,
                humidity_label: "65%".to_string(),
                wind_label: "18 km/h".to_string(),
                country_label: "IN".to_string(),
                local_time: "03:22 PM".to_string(),
                icon_url: "https://openweathermap.org/img/wn/50d@2x.png".to_string(),
                forecast: vec![ForecastDisplay {
                    weekday: "Tue".to_string(),
                    day_of_month: "14".to_string(),
                    temperature_label: "25°/ 77°F".to_string(),
                    icon_url: "https://openweathermap.org/img/wn/01d.png".to_string(),
                }],
            },
        }
    }

    #[test]
    fn card_shows_derived_values() {
        let mut out = String::new();
        render_card(&mut out, &view("Clear"), 38);

        assert!(out.contains("Jaipur, IN"));
        assert!(out.contains("25°C (77°F)"));
        assert!(out.contains("Air Quality Index: 38 (Good air)"));
        assert!(out.contains("Wind: 18 km/h"));
        assert!(out.contains("Visibility: 4.5 km"));
        assert!(out.contains("Updated: 03:22 PM"));
        assert!(out.contains("Icon: https://openweathermap.org/img/wn/50d@2x.png"));
    }

    #[test]
    fn haze_replaces_icon() {
        let mut out = String::new();
        render_card(&mut out, &view("Haze"), 38);

        assert!(out.contains(HAZE_GLYPH[2]));
        assert!(!out.contains("Icon:"));
    }

    #[test]
    fn forecast_rows() {
        let mut out = String::new();
        render_forecast(&mut out, &view("Clear"));

        assert!(out.contains("Weather overview of upcoming days"));
        assert!(out.contains("Tue 14  25°/ 77°F"));
        assert!(out.contains("Clear"));
    }
}
