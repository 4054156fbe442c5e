use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f32,
    pub longitude: f32,
}

/// `"lat, lon"`, the label shown until the API names the place.
impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// Fields read from one current-weather response. Temperatures are in Kelvin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_k: f64,
    pub feels_like_k: f64,
    pub humidity_pct: f64,
    pub description: String,
    pub icon_name: String,
    /// Place name reported by the API, if any.
    pub place_name: Option<String>,
    pub observed_at: Option<DateTime<Utc>>,
}

/// Last successfully fetched reading, or nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherSnapshot {
    reading: Option<Reading>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub conditions: CurrentConditions,
    pub icon: Vec<u8>,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    pub fn is_available(&self) -> bool {
        self.reading.is_some()
    }

    pub fn reading(&self) -> Option<&Reading> {
        self.reading.as_ref()
    }

    pub fn replace(&mut self, conditions: CurrentConditions, icon: Vec<u8>) {
        self.reading = Some(Reading { conditions, icon, fetched_at: Utc::now() });
    }

    pub fn clear(&mut self) {
        self.reading = None;
    }
}
