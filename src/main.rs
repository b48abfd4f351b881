use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use skycast_core::{Config, Units};
use skycast_ui::render::{render_home, render_search};
use skycast_ui::{AppServices, HomeModel, SearchModel};
use skycast_weather::{Coordinates, FixedLocation, GeolocationProvider, Unsupported, WeatherView};

/// Current weather, air quality and a 5-day forecast from OpenWeather.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Config file to use instead of the per-user default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// metric, imperial or standard; overrides the config file
    #[arg(long, global = true)]
    units: Option<Units>,

    /// Print the weather view as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Weather for this device's position, or the default city
    Home {
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },
    /// Weather for a city, e.g. `skycast search Paris, FR`
    Search {
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    skycast_core::init()?;

    let (mut config, _) = Config::load_validated(cli.config.as_deref())?;
    if let Some(units) = cli.units {
        config.weather.units = units;
    }
    tracing::info!("Using config directory {}", config.config_dir.display());

    let command = cli.command.unwrap_or(Command::Home {
        lat: None,
        lon: None,
    });
    let wait = Duration::from_secs(
        config.weather.timeout_secs * 3 + config.geolocation.timeout_secs + 1,
    );

    match command {
        Command::Home { lat, lon } => {
            let position = lat
                .zip(lon)
                .or_else(|| config.geolocation.fixed_position());
            let geolocation: Arc<dyn GeolocationProvider> = match position {
                Some((lat, lon)) => Arc::new(FixedLocation(Coordinates::new(lat, lon))),
                None => Arc::new(Unsupported),
            };
            let services = Arc::new(
                AppServices::from_config(tokio::runtime::Handle::current(), &config, geolocation)
                    .context("Failed to start weather services")?,
            );
            run_home(services, wait, cli.json).await
        }
        Command::Search { city } => {
            let services = Arc::new(
                AppServices::from_config(
                    tokio::runtime::Handle::current(),
                    &config,
                    Arc::new(Unsupported),
                )
                .context("Failed to start weather services")?,
            );
            run_search(services, &city.join(" "), wait, cli.json).await
        }
    }
}

async fn run_home(services: Arc<AppServices>, wait: Duration, json: bool) -> Result<ExitCode> {
    let mut home = HomeModel::new(services.clone());
    home.mount();

    let settled = tokio::select! {
        settled = home.wait_idle(wait) => Some(settled),
        _ = tokio::signal::ctrl_c() => None,
    };
    let Some(settled) = settled else {
        home.unmount();
        services.shutdown();
        return Ok(ExitCode::from(130));
    };
    if !settled {
        tracing::warn!("Gave up waiting after {:?}", wait);
    }

    if json {
        if let Some(banner) = home.banner() {
            eprintln!("{}", banner);
        }
        return print_json(home.view());
    }

    print!("{}", render_home(&home));
    Ok(exit_code(home.view()))
}

async fn run_search(
    services: Arc<AppServices>,
    city: &str,
    wait: Duration,
    json: bool,
) -> Result<ExitCode> {
    let mut search = SearchModel::new(services.clone());
    search.set_input(city);
    search.submit();

    let settled = tokio::select! {
        settled = search.wait_idle(wait) => Some(settled),
        _ = tokio::signal::ctrl_c() => None,
    };
    let Some(settled) = settled else {
        search.cancel();
        services.shutdown();
        return Ok(ExitCode::from(130));
    };
    if !settled {
        tracing::warn!("Gave up waiting after {:?}", wait);
    }

    if json {
        if let Some(error) = search.error() {
            eprintln!("{}", error);
        }
        return print_json(search.view());
    }

    print!("{}", render_search(&search));
    Ok(exit_code(search.view()))
}

fn print_json(view: Option<&WeatherView>) -> Result<ExitCode> {
    match view {
        Some(view) => {
            let out = serde_json::to_string_pretty(view).context("Failed to serialize weather")?;
            println!("{}", out);
            Ok(ExitCode::SUCCESS)
        }
        None => Ok(ExitCode::FAILURE),
    }
}

fn exit_code(view: Option<&WeatherView>) -> ExitCode {
    if view.is_some() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
