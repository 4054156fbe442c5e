use std::sync::{Arc, Mutex};

use inquire::{
    CustomUserError,
    autocompletion::{Autocomplete, Replacement},
    validator::Validation,
};
use world_weather_core::{WeatherService, WeatherViewModel};

pub type SharedViewModel<S> = Arc<Mutex<WeatherViewModel<S>>>;

/// Suggests `"City,Country"` names while the user types.
///
/// Every keystroke runs the view model's `filter_cities`, and the suggestions
/// are whatever lands in `city_search_result`.
pub struct CityAutocomplete<S> {
    vm: SharedViewModel<S>,
}

impl<S> Clone for CityAutocomplete<S> {
    fn clone(&self) -> Self {
        Self { vm: Arc::clone(&self.vm) }
    }
}

impl<S: WeatherService> CityAutocomplete<S> {
    pub fn new(vm: SharedViewModel<S>) -> Self {
        Self { vm }
    }

    fn suggestions(&self, input: &str) -> Result<Vec<String>, CustomUserError> {
        let mut vm = self.vm.lock().map_err(|_| "view model lock poisoned")?;
        vm.filter_cities(input);
        Ok(vm.city_search_result.value().cloned().unwrap_or_default())
    }
}

impl<S: WeatherService + 'static> Autocomplete for CityAutocomplete<S> {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        self.suggestions(input)
    }

    fn get_completion(
        &mut self,
        input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        // Tab without a highlight completes to the first match.
        match highlighted_suggestion {
            Some(suggestion) => Ok(Some(suggestion)),
            None => Ok(self.suggestions(input)?.into_iter().next()),
        }
    }
}

/// Accept only names the view model's directory knows.
pub fn known_city<S: WeatherService>(
    vm: SharedViewModel<S>,
) -> impl Fn(&str) -> Result<Validation, CustomUserError> + Clone {
    move |input: &str| {
        let vm = vm.lock().map_err(|_| "view model lock poisoned")?;
        if vm.knows_city(input) {
            Ok(Validation::Valid)
        } else {
            Ok(Validation::Invalid("Pick a city from the suggestions".into()))
        }
    }
}
