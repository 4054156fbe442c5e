//! Presentation binding: display-ready strings derived from [`Weather`].
//!
//! Each field is an [`Observable`]. A front end binds one listener per field
//! and redraws whatever changed; the CLI simply reads the values after each
//! action.

use std::fmt;

use crate::{
    config::DEFAULT_SEARCH_RESULT_LIMIT,
    model::Location,
    provider::WeatherService,
    units::{self, TemperatureUnit},
    weather::Weather,
};

pub type Listener<T> = Box<dyn FnMut(Option<&T>) + Send>;

/// A value slot with at most one listener.
pub struct Observable<T> {
    value: Option<T>,
    listener: Option<Listener<T>>,
}

impl<T> Default for Observable<T> {
    fn default() -> Self {
        Self { value: None, listener: None }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("bound", &self.listener.is_some())
            .finish()
    }
}

impl<T> Observable<T> {
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Replace the listener and call it once with the current value.
    pub fn bind(&mut self, listener: impl FnMut(Option<&T>) + Send + 'static) {
        let mut listener: Listener<T> = Box::new(listener);
        listener(self.value.as_ref());
        self.listener = Some(listener);
    }

    pub fn unbind(&mut self) {
        self.listener = None;
    }

    pub fn set(&mut self, value: Option<T>) {
        self.value = value;
        if let Some(listener) = self.listener.as_mut() {
            listener(self.value.as_ref());
        }
    }
}

#[derive(Debug)]
pub struct WeatherViewModel<S> {
    weather: Weather<S>,
    unit: TemperatureUnit,
    search_result_limit: usize,

    pub location_name: Observable<String>,
    pub current_temp: Observable<String>,
    pub feels_like_temp: Observable<String>,
    pub humidity: Observable<String>,
    pub weather_description: Observable<String>,
    /// PNG bytes.
    pub icon: Observable<Vec<u8>>,
    pub city_search_result: Observable<Vec<String>>,
}

impl<S: WeatherService> WeatherViewModel<S> {
    pub fn new(weather: Weather<S>) -> Self {
        Self {
            weather,
            unit: TemperatureUnit::default(),
            search_result_limit: DEFAULT_SEARCH_RESULT_LIMIT,
            location_name: Observable::default(),
            current_temp: Observable::default(),
            feels_like_temp: Observable::default(),
            humidity: Observable::default(),
            weather_description: Observable::default(),
            icon: Observable::default(),
            city_search_result: Observable::default(),
        }
    }

    pub fn with_unit(mut self, unit: TemperatureUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_search_result_limit(mut self, limit: usize) -> Self {
        self.search_result_limit = limit;
        self
    }

    pub fn search_result_limit(&self) -> usize {
        self.search_result_limit
    }

    pub fn weather(&self) -> &Weather<S> {
        &self.weather
    }

    pub fn knows_city(&self, city_name: &str) -> bool {
        self.weather.knows_city(city_name)
    }

    pub fn filter_cities(&mut self, name_prefix: &str) {
        let found = if name_prefix.is_empty() {
            Vec::new()
        } else {
            self.weather.cities_with_prefix(name_prefix, self.search_result_limit)
        };
        self.city_search_result.set(Some(found));
    }

    pub async fn load_weather(&mut self, city_name: &str) {
        self.location_name.set(Some(city_name.to_string()));
        self.update_to_data_unavailable();

        if self.weather.update(city_name).await {
            self.update_from_model();
        } else {
            self.update_to_data_unavailable();
        }
    }

    pub async fn load_weather_at(&mut self, location: Location) {
        self.location_name.set(Some(location.to_string()));
        self.update_to_data_unavailable();

        if self.weather.update_for_location(location).await {
            let place = self
                .weather
                .snapshot()
                .reading()
                .and_then(|reading| reading.conditions.place_name.clone());
            if let Some(place) = place {
                self.location_name.set(Some(place));
            }
            self.update_from_model();
        } else {
            self.update_to_data_unavailable();
        }
    }

    fn update_from_model(&mut self) {
        let Some(reading) = self.weather.snapshot().reading().cloned() else {
            self.update_to_data_unavailable();
            return;
        };
        let conditions = reading.conditions;

        self.current_temp.set(Some(self.unit.format(conditions.temperature_k)));
        self.feels_like_temp.set(Some(self.unit.format(conditions.feels_like_k)));
        self.humidity.set(Some(units::format_humidity(conditions.humidity_pct)));
        self.weather_description.set(Some(units::capitalize_words(&conditions.description)));
        self.icon.set(Some(reading.icon));
    }

    fn update_to_data_unavailable(&mut self) {
        self.current_temp.set(None);
        self.feels_like_temp.set(None);
        self.humidity.set(None);
        self.weather_description.set(None);
        self.icon.set(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::tests::{StubService, weather};
    use std::sync::{Arc, Mutex};

    fn view_model() -> WeatherViewModel<StubService> {
        WeatherViewModel::new(weather())
    }

    #[test]
    fn default_state_is_empty() {
        let vm = view_model();
        assert!(vm.location_name.value().is_none());
        assert!(vm.current_temp.value().is_none());
        assert!(vm.weather_description.value().is_none());
        assert!(vm.feels_like_temp.value().is_none());
        assert!(vm.humidity.value().is_none());
        assert!(vm.icon.value().is_none());
        assert!(vm.city_search_result.value().is_none());
        assert_eq!(vm.search_result_limit(), 5);
    }

    #[test]
    fn blank_prefix_gives_empty_result() {
        let mut vm = view_model();
        vm.filter_cities("");
        assert_eq!(vm.city_search_result.value(), Some(&Vec::new()));
    }

    #[test]
    fn prefix_results_respect_limit() {
        let mut vm = view_model().with_search_result_limit(2);
        vm.filter_cities("A");
        assert_eq!(
            vm.city_search_result.value(),
            Some(&vec!["Aachen,DE".to_string(), "Aarhus,DK".to_string()])
        );
    }

    #[tokio::test]
    async fn load_weather_formats_reading() {
        let mut vm = view_model();
        vm.load_weather("Aachen,DE").await;

        assert_eq!(vm.location_name.value().map(String::as_str), Some("Aachen,DE"));
        assert_eq!(vm.current_temp.value().map(String::as_str), Some("40.0°C"));
        assert_eq!(vm.feels_like_temp.value().map(String::as_str), Some("42.0°C"));
        assert_eq!(vm.humidity.value().map(String::as_str), Some("30%"));
        assert_eq!(vm.weather_description.value().map(String::as_str), Some("Scattered Clouds"));
        assert!(vm.icon.value().is_some());
    }

    #[tokio::test]
    async fn load_weather_in_fahrenheit() {
        let mut vm = view_model().with_unit(TemperatureUnit::Fahrenheit);
        vm.load_weather("Aachen,DE").await;
        assert_eq!(vm.current_temp.value().map(String::as_str), Some("104.0°F"));
    }

    #[tokio::test]
    async fn failure_resets_all_fields() {
        let mut vm = view_model();
        vm.load_weather("Aachen,DE").await;
        assert!(vm.current_temp.value().is_some());

        vm.load_weather("Broken,XX").await;

        assert_eq!(vm.location_name.value().map(String::as_str), Some("Broken,XX"));
        assert!(vm.current_temp.value().is_none());
        assert!(vm.feels_like_temp.value().is_none());
        assert!(vm.humidity.value().is_none());
        assert!(vm.weather_description.value().is_none());
        assert!(vm.icon.value().is_none());
    }

    #[tokio::test]
    async fn location_uses_reported_place_name() {
        let mut vm = view_model();
        vm.load_weather_at(Location { latitude: 50.75, longitude: 6.0 }).await;

        assert_eq!(vm.location_name.value().map(String::as_str), Some("Aachen"));
        assert_eq!(vm.current_temp.value().map(String::as_str), Some("40.0°C"));
    }

    #[tokio::test]
    async fn failed_location_keeps_coordinates_label() {
        let mut vm = view_model();
        vm.load_weather_at(Location { latitude: 50.75, longitude: 6.0 }).await;
        assert!(vm.current_temp.value().is_some());

        vm.load_weather_at(Location { latitude: -95.5, longitude: 6.0 }).await;

        assert_eq!(vm.location_name.value().map(String::as_str), Some("-95.5, 6"));
        assert!(vm.current_temp.value().is_none());
        assert!(vm.feels_like_temp.value().is_none());
        assert!(vm.humidity.value().is_none());
        assert!(vm.weather_description.value().is_none());
        assert!(vm.icon.value().is_none());
    }

    #[tokio::test]
    async fn listeners_see_blank_then_value() {
        let seen: Arc<Mutex<Vec<Option<String>>>> = Arc::default();
        let sink = Arc::clone(&seen);

        let mut vm = view_model();
        vm.current_temp.bind(move |value| sink.lock().unwrap().push(value.cloned()));
        vm.load_weather("Aachen,DE").await;

        assert_eq!(*seen.lock().unwrap(), vec![None, None, Some("40.0°C".to_string())]);
    }

    #[test]
    fn bind_replaces_previous_listener() {
        let first: Arc<Mutex<u32>> = Arc::default();
        let second: Arc<Mutex<u32>> = Arc::default();

        let mut slot = Observable::default();
        let counter = Arc::clone(&first);
        slot.bind(move |_: Option<&u8>| *counter.lock().unwrap() += 1);
        let counter = Arc::clone(&second);
        slot.bind(move |_: Option<&u8>| *counter.lock().unwrap() += 1);

        slot.set(Some(7));

        assert_eq!(*first.lock().unwrap(), 1);
        assert_eq!(*second.lock().unwrap(), 2);
        assert_eq!(slot.value(), Some(&7));

        slot.unbind();
        slot.set(None);
        assert_eq!(*second.lock().unwrap(), 2);
    }
}
