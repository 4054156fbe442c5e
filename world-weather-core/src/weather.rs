use std::sync::Arc;

use crate::{
    cities::CityDirectory,
    error::ServiceResult,
    model::{CurrentConditions, Location, WeatherSnapshot},
    provider::WeatherService,
};

/// Holds the city directory and the last fetched reading.
#[derive(Debug)]
pub struct Weather<S> {
    service: S,
    cities: Arc<CityDirectory>,
    snapshot: WeatherSnapshot,
}

impl<S: WeatherService> Weather<S> {
    pub fn new(service: S, cities: Arc<CityDirectory>) -> Self {
        Self { service, cities, snapshot: WeatherSnapshot::default() }
    }

    pub fn snapshot(&self) -> &WeatherSnapshot {
        &self.snapshot
    }

    pub fn cities_with_prefix(&self, prefix: &str, limit: usize) -> Vec<String> {
        self.cities.search(prefix, limit)
    }

    pub fn knows_city(&self, city_name: &str) -> bool {
        self.cities.id_of(city_name).is_some()
    }

    /// Refresh the snapshot for a `"City,Country"` display name.
    ///
    /// Returns `false`, with the snapshot cleared, when the name is unknown or
    /// any request fails.
    pub async fn update(&mut self, city_name: &str) -> bool {
        let Some(id) = self.cities.id_of(city_name) else {
            tracing::warn!(city = city_name, "city is not in the directory");
            self.snapshot.clear();
            return false;
        };

        let result = self.fetch(self.service.current_by_city_id(id).await).await;
        self.apply(result, city_name)
    }

    pub async fn update_for_location(&mut self, location: Location) -> bool {
        let result = self.fetch(self.service.current_by_location(location).await).await;
        self.apply(result, &location.to_string())
    }

    async fn fetch(
        &self,
        conditions: ServiceResult<CurrentConditions>,
    ) -> ServiceResult<(CurrentConditions, Vec<u8>)> {
        let conditions = conditions?;
        let icon = self.service.icon(&conditions.icon_name).await?;
        Ok((conditions, icon))
    }

    fn apply(&mut self, result: ServiceResult<(CurrentConditions, Vec<u8>)>, target: &str) -> bool {
        match result {
            Ok((conditions, icon)) => {
                tracing::info!(
                    target_place = target,
                    description = %conditions.description,
                    "weather updated"
                );
                self.snapshot.replace(conditions, icon);
                true
            }
            Err(err) => {
                tracing::warn!(target_place = target, error = %err, "weather data unavailable");
                self.snapshot.clear();
                false
            }
        }
    }
}
