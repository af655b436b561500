use std::fmt;

use serde_json::Value;
use thiserror::Error;

pub mod alert;
pub mod fetch;
pub mod pipeline;
pub mod sink;

/// Longest city name an [`Observation`] will carry, in bytes.
pub const LOCATION_NAME_CAPACITY: usize = 49;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub const fn new(name: &'static str, latitude: f64, longitude: f64) -> Self {
        Self {
            name,
            latitude,
            longitude,
        }
    }
}

/// Every location fetched by a run, in fetch order.
pub const LOCATIONS: &[Location] = &[
    Location::new("Karachi", 24.8608, 67.0104),
    Location::new("Lahore", 31.5580, 74.3507),
    Location::new("Islamabad", 33.7215, 73.0433),
    Location::new("Quetta", 30.1841, 67.0014),
    Location::new("Peshawar", 34.008, 71.5785),
];

/// A city name cut down to [`LOCATION_NAME_CAPACITY`] bytes.
///
/// Names that don't fit are truncated on the last char boundary that does,
/// this is never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationName(String);

impl LocationName {
    pub fn new(name: &str) -> Self {
        let kept = truncate_str(name, LOCATION_NAME_CAPACITY);
        if kept.len() < name.len() {
            log::warn!(
                "City name `{name}` is longer than {LOCATION_NAME_CAPACITY} bytes, keeping `{kept}`"
            );
        }
        Self(kept.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for LocationName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a char.
pub(crate) fn truncate_str(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub city: LocationName,
    /// m/s
    pub wind_speed: f64,
    /// °C
    pub temperature: f64,
    // Never filled by the current request, always 0.0
    pub precipitation: f64,
    pub is_day: i32,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Malformed document: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Current weather data missing")]
    MissingCurrentWeather,
}

impl Observation {
    /// The record used when nothing could be fetched or parsed for `city`.
    pub fn with_defaults(city: &str) -> Self {
        Self {
            city: LocationName::new(city),
            wind_speed: 0.0,
            temperature: 0.0,
            precipitation: 0.0,
            is_day: 0,
        }
    }

    /// Parse an Open-Meteo forecast body.
    ///
    /// The `current_weather` object is mandatory, its fields are not: any of
    /// `windspeed`, `temperature` or `is_day` that is missing or isn't a number
    /// keeps its default value.
    pub fn parse(city: &str, body: &[u8]) -> Result<Self, ParseError> {
        let document: Value = serde_json::from_slice(body)?;
        let current = document
            .get("current_weather")
            .ok_or(ParseError::MissingCurrentWeather)?;

        let number = |field: &str| current.get(field).and_then(Value::as_f64);

        let mut observation = Self::with_defaults(city);
        if let Some(wind_speed) = number("windspeed") {
            observation.wind_speed = wind_speed;
        }
        if let Some(temperature) = number("temperature") {
            observation.temperature = temperature;
        }
        if let Some(is_day) = number("is_day") {
            // saturating, truncates toward zero
            observation.is_day = is_day as i32;
        }

        log::info!(
            "Parsed data for {}: wind speed = {:.2}, temperature = {:.2}, is day = {}",
            observation.city,
            observation.wind_speed,
            observation.temperature,
            observation.is_day
        );

        Ok(observation)
    }
}
