//! Core library for the `world-weather` lookup tool.
//!
//! This crate defines:
//! - The bundled city directory and prefix search
//! - Temperature conversion and display formatting
//! - The OpenWeather client behind the [`WeatherService`] trait
//! - The [`Weather`] domain object and its [`WeatherViewModel`] binding layer
//! - Configuration & credentials handling
//!
//! It is used by `world-weather-cli`, but can also be reused by other front ends.

pub mod cities;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod units;
pub mod view_model;
pub mod weather;

#[cfg(test)]
mod test_support;

pub use cities::{CityDirectory, CityId};
pub use config::Config;
pub use error::ServiceError;
pub use model::{CurrentConditions, Location, WeatherSnapshot};
pub use provider::{OpenWeatherService, WeatherService};
pub use units::TemperatureUnit;
pub use view_model::{Observable, WeatherViewModel};
pub use weather::Weather;
