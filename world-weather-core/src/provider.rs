use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config,
    cities::CityId,
    error::ServiceResult,
    model::{CurrentConditions, Location},
};

pub mod openweather;

pub use openweather::OpenWeatherService;

/// Source of current weather readings and condition icons.
#[async_trait]
pub trait WeatherService: Send + Sync + Debug {
    async fn current_by_city_id(&self, id: CityId) -> ServiceResult<CurrentConditions>;

    async fn current_by_location(&self, location: Location) -> ServiceResult<CurrentConditions>;

    /// PNG bytes of the named condition icon (e.g. `"10d"`).
    async fn icon(&self, icon_name: &str) -> ServiceResult<Vec<u8>>;
}

/// Construct the OpenWeather client using the API key resolved from config
/// and environment.
pub fn service_from_config(config: &Config) -> anyhow::Result<OpenWeatherService> {
    let api_key = config.resolve_api_key()?;
    Ok(OpenWeatherService::new(api_key))
}
