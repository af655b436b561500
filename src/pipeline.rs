//! One pass over the location registry: fetch, parse, persist, alert, and
//! finally the mean wind speed of the whole batch.

use std::collections::TryReserveError;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::alert::{check_thresholds, Notifier, Thresholds};
use crate::fetch::{FetchError, WeatherSource};
use crate::sink::{DataLog, PROCESSED_DATA_PATH, RAW_DATA_PATH};
use crate::{Location, Observation, ParseError};

#[derive(Debug, Clone)]
pub struct Config {
    pub thresholds: Thresholds,
    pub raw_data_path: PathBuf,
    pub processed_data_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            raw_data_path: PathBuf::from(RAW_DATA_PATH),
            processed_data_path: PathBuf::from(PROCESSED_DATA_PATH),
        }
    }
}

/// Why a location ended up with a default [`Observation`].
#[derive(Debug, Error)]
pub enum ObservationError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Error, Diagnostic)]
pub enum BatchError {
    #[error("Memory allocation failed for {count} observations")]
    #[diagnostic(
        code(windwatch::allocation),
        help("nothing was fetched or written, run again once memory is available")
    )]
    Allocation {
        count: usize,
        #[source]
        source: TryReserveError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// One per location, in registry order.
    pub observations: Vec<Observation>,
    pub average_wind_speed: f64,
}

pub fn try_observe(
    source: &impl WeatherSource,
    location: &Location,
) -> Result<Observation, ObservationError> {
    let body = source.fetch(location)?;
    Ok(Observation::parse(location.name, &body)?)
}

/// Never fails: whatever goes wrong for `location` is logged and replaced by
/// [`Observation::with_defaults`].
pub fn observe(source: &impl WeatherSource, location: &Location) -> Observation {
    try_observe(source, location).unwrap_or_else(|e| {
        log::error!("{}: {e}", location.name);
        Observation::with_defaults(location.name)
    })
}

/// Sum of all wind speeds divided by the registry length, failed locations
/// included. An empty registry averages to 0.
pub fn mean_wind_speed(observations: &[Observation], registry_len: usize) -> f64 {
    if registry_len == 0 {
        return 0.0;
    }
    let total = observations
        .iter()
        .fold(0.0, |total, observation| total + observation.wind_speed);
    total / registry_len as f64
}

pub fn run(
    config: &Config,
    registry: &[Location],
    source: &impl WeatherSource,
    notifier: &impl Notifier,
) -> Result<RunSummary, BatchError> {
    log::info!("Fetching weather data...");

    let mut observations = Vec::new();
    observations
        .try_reserve_exact(registry.len())
        .map_err(|source| BatchError::Allocation {
            count: registry.len(),
            source,
        })?;

    let data_log = DataLog::new(&config.raw_data_path, &config.processed_data_path);

    for location in registry {
        let observation = observe(source, location);
        if let Err(e) = data_log.write_raw(&observation) {
            log::error!("{e}");
        }
        check_thresholds(&observation, &config.thresholds, notifier);
        observations.push(observation);
    }

    let average_wind_speed = mean_wind_speed(&observations, registry.len());
    log::info!("Average wind speed: {average_wind_speed:.2}");
    if let Err(e) = data_log.write_processed(average_wind_speed) {
        log::error!("{e}");
    }

    Ok(RunSummary {
        observations,
        average_wind_speed,
    })
}
