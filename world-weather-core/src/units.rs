//! Temperature conversion and the display strings shown for a reading.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

const ZERO_CELSIUS_IN_KELVIN: f64 = 273.15;

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - ZERO_CELSIUS_IN_KELVIN
}

pub fn kelvin_to_fahrenheit(kelvin: f64) -> f64 {
    kelvin_to_celsius(kelvin) * 9.0 / 5.0 + 32.0
}

/// Unit used when rendering temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TemperatureUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
            TemperatureUnit::Kelvin => "kelvin",
        }
    }

    /// Render a Kelvin reading with one decimal place and the unit suffix.
    pub fn format(&self, kelvin: f64) -> String {
        match self {
            TemperatureUnit::Celsius => format_celsius(kelvin),
            TemperatureUnit::Fahrenheit => format!("{:.1}°F", kelvin_to_fahrenheit(kelvin)),
            TemperatureUnit::Kelvin => format!("{kelvin:.1}K"),
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown temperature unit '{0}'. Supported units: celsius, fahrenheit, kelvin.")]
pub struct UnknownUnit(String);

impl FromStr for TemperatureUnit {
    type Err = UnknownUnit;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "c" | "celsius" => Ok(TemperatureUnit::Celsius),
            "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            "k" | "kelvin" => Ok(TemperatureUnit::Kelvin),
            _ => Err(UnknownUnit(value.to_string())),
        }
    }
}

/// `"%.1f°C"` of the Celsius value.
pub fn format_celsius(kelvin: f64) -> String {
    format!("{:.1}°C", kelvin_to_celsius(kelvin))
}

/// Whole percent, halves rounded to even like C's `%.0f`.
pub fn format_humidity(humidity: f64) -> String {
    format!("{:.0}%", humidity.round_ties_even())
}

/// Upper-case the first letter of every word and lower-case the rest.
pub fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;

    for ch in text.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            out.push(ch);
        } else if at_word_start {
            at_word_start = false;
            out.extend(ch.to_uppercase());
        } else {
            out.extend(ch.to_lowercase());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn celsius_uses_one_decimal() {
        assert_eq!(format_celsius(313.15), "40.0°C");
        assert_eq!(format_celsius(315.15), "42.0°C");
        assert_eq!(format_celsius(273.15), "0.0°C");
        assert_eq!(format_celsius(263.65), "-9.5°C");
    }

    #[test]
    fn humidity_rounds_half_to_even() {
        assert_eq!(format_humidity(30.5), "30%");
        assert_eq!(format_humidity(31.5), "32%");
        assert_eq!(format_humidity(30.6), "31%");
        assert_eq!(format_humidity(87.0), "87%");
    }

    #[test]
    fn other_units() {
        assert_eq!(TemperatureUnit::Fahrenheit.format(313.15), "104.0°F");
        assert_eq!(TemperatureUnit::Kelvin.format(313.15), "313.1K");
        assert_eq!(TemperatureUnit::Celsius.format(313.15), "40.0°C");
    }

    #[test]
    fn unit_parsing() {
        assert_eq!("F".parse::<TemperatureUnit>().unwrap(), TemperatureUnit::Fahrenheit);
        assert_eq!("Celsius".parse::<TemperatureUnit>().unwrap(), TemperatureUnit::Celsius);

        let err = "rankine".parse::<TemperatureUnit>().unwrap_err();
        assert!(err.to_string().contains("Unknown temperature unit"));
    }

    #[test]
    fn capitalizes_each_word() {
        assert_eq!(capitalize_words("light rain"), "Light Rain");
        assert_eq!(capitalize_words("OVERCAST clouds"), "Overcast Clouds");
        assert_eq!(capitalize_words(""), "");
    }
}
