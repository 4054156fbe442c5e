use std::{
    fs,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use anyhow::{Context, anyhow};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select, Text};
use world_weather_core::{
    CityDirectory, Config, Location, OpenWeatherService, TemperatureUnit, Weather,
    WeatherViewModel, cities::FULL_CITY_LIST_URL, provider::service_from_config,
};

use crate::autocomplete::{CityAutocomplete, SharedViewModel, known_city};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "world-weather", version, about = "Current weather for any city")]
pub struct Cli {
    /// City list JSON (plain or gzipped) to use instead of the default one.
    #[arg(long, global = true)]
    pub city_list: Option<PathBuf>,

    /// Log debug output (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and display preferences.
    Configure,

    /// List cities whose name starts with a prefix.
    Search {
        prefix: String,

        /// Maximum number of matches; defaults to the configured limit.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show current weather for a city ("City,Country"); prompts when omitted.
    Show {
        city: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Download OpenWeather's full city list and use it from now on.
    UpdateCities {
        /// Source of the gzipped list.
        #[arg(long, default_value = FULL_CITY_LIST_URL)]
        url: String,
    },

    /// Show current weather at coordinates.
    Coords {
        #[arg(long, allow_negative_numbers = true)]
        lat: f32,

        #[arg(long, allow_negative_numbers = true)]
        lon: f32,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Temperature unit: celsius, fahrenheit or kelvin.
    #[arg(long)]
    unit: Option<TemperatureUnit>,

    /// Write the condition icon (PNG) to this path.
    #[arg(long)]
    icon_out: Option<PathBuf>,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Configure => configure(config),
            Command::Search { prefix, limit } => {
                let cities = load_cities(self.city_list.as_ref(), &config)?;
                // Searching is offline; a missing key only matters once weather is fetched.
                let service = OpenWeatherService::new(config.resolve_api_key().unwrap_or_default());
                let mut vm = view_model(&config, cities, service, None)
                    .with_search_result_limit(limit.unwrap_or(config.search_result_limit));

                vm.filter_cities(&prefix);
                for name in vm.city_search_result.value().into_iter().flatten() {
                    println!("{name}");
                }
                Ok(())
            }
            Command::Show { city, output } => {
                let cities = load_cities(self.city_list.as_ref(), &config)?;
                let service = service_from_config(&config)?;
                let mut vm = view_model(&config, cities, service, output.unit);

                let city = match city {
                    Some(city) => city,
                    None => {
                        let shared = Arc::new(Mutex::new(vm));
                        let city = prompt_city(Arc::clone(&shared), config.search_result_limit)?;
                        vm = Arc::try_unwrap(shared)
                            .map_err(|_| anyhow!("City prompt is still holding the view model"))?
                            .into_inner()
                            .map_err(|_| anyhow!("View model lock poisoned"))?;
                        city
                    }
                };

                vm.load_weather(&city).await;
                render(&vm, &output)
            }
            Command::UpdateCities { url } => {
                let dest = Config::cached_city_list_path()?;
                let cities = CityDirectory::download(&url, &dest).await?;
                println!("Saved {} cities to {}", cities.len(), dest.display());
                Ok(())
            }
            Command::Coords { lat, lon, output } => {
                let cities = load_cities(self.city_list.as_ref(), &config)?;
                let service = service_from_config(&config)?;
                let mut vm = view_model(&config, cities, service, output.unit);
                vm.load_weather_at(Location { latitude: lat, longitude: lon }).await;
                render(&vm, &output)
            }
        }
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key.trim().to_string());

    let units =
        vec![TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit, TemperatureUnit::Kelvin];
    let start = units.iter().position(|u| *u == config.unit).unwrap_or(0);
    config.unit = Select::new("Temperature unit:", units)
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read temperature unit")?;

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

/// `--city-list`, then the configured list, then a downloaded full list, then the bundled one.
fn load_cities(override_path: Option<&PathBuf>, config: &Config) -> anyhow::Result<CityDirectory> {
    if let Some(path) = override_path.or(config.city_list.as_ref()) {
        return CityDirectory::load(path);
    }

    let cached = Config::cached_city_list_path()?;
    if cached.exists() {
        return CityDirectory::load(&cached);
    }

    CityDirectory::bundled()
}

fn prompt_city(vm: SharedViewModel<OpenWeatherService>, limit: usize) -> anyhow::Result<String> {
    Text::new("City:")
        .with_autocomplete(CityAutocomplete::new(Arc::clone(&vm)))
        .with_validator(known_city(vm))
        .with_page_size(limit.max(1))
        .prompt()
        .context("Failed to read city name")
}

fn view_model(
    config: &Config,
    cities: CityDirectory,
    service: OpenWeatherService,
    unit: Option<TemperatureUnit>,
) -> WeatherViewModel<OpenWeatherService> {
    WeatherViewModel::new(Weather::new(service, Arc::new(cities)))
        .with_unit(unit.unwrap_or(config.unit))
        .with_search_result_limit(config.search_result_limit)
}

fn render(vm: &WeatherViewModel<OpenWeatherService>, output: &OutputArgs) -> anyhow::Result<()> {
    if let Some(location) = vm.location_name.value() {
        println!("{location}");
    }

    let (Some(temp), Some(feels_like), Some(humidity), Some(description)) = (
        vm.current_temp.value(),
        vm.feels_like_temp.value(),
        vm.humidity.value(),
        vm.weather_description.value(),
    ) else {
        return Err(anyhow!("Weather data unavailable"));
    };

    println!("  {description}");
    println!("  Temperature: {temp}");
    println!("  Feels like:  {feels_like}");
    println!("  Humidity:    {humidity}");

    let observed_at = vm
        .weather()
        .snapshot()
        .reading()
        .and_then(|reading| reading.conditions.observed_at);
    if let Some(observed_at) = observed_at {
        println!("  Observed:    {}", observed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
    }

    if let (Some(path), Some(icon)) = (output.icon_out.as_ref(), vm.icon.value()) {
        fs::write(path, icon)
            .with_context(|| format!("Failed to write icon: {}", path.display()))?;
        println!("  Icon saved to {}", path.display());
    }

    Ok(())
}
