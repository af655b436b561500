use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::Observation;

pub const RAW_DATA_PATH: &str = "raw_data.txt";
pub const PROCESSED_DATA_PATH: &str = "processed_data.txt";

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub fn raw_line(observation: &Observation) -> String {
    format!(
        "City: {}, Wind Speed: {:.2}, Temperature: {:.2}, Is Day: {}",
        observation.city, observation.wind_speed, observation.temperature, observation.is_day
    )
}

pub fn processed_line(average_wind_speed: f64) -> String {
    format!("Average Wind Speed: {average_wind_speed:.2}")
}

/// The two append-only text logs of a run. Files are created on first write
/// and never truncated.
#[derive(Debug, Clone)]
pub struct DataLog {
    raw_path: PathBuf,
    processed_path: PathBuf,
}

impl DataLog {
    pub fn new(raw_path: impl Into<PathBuf>, processed_path: impl Into<PathBuf>) -> Self {
        Self {
            raw_path: raw_path.into(),
            processed_path: processed_path.into(),
        }
    }

    pub fn raw_path(&self) -> &Path {
        &self.raw_path
    }

    pub fn processed_path(&self) -> &Path {
        &self.processed_path
    }

    pub fn write_raw(&self, observation: &Observation) -> Result<(), SinkError> {
        append_line(&self.raw_path, &raw_line(observation))
    }

    pub fn write_processed(&self, average_wind_speed: f64) -> Result<(), SinkError> {
        append_line(&self.processed_path, &processed_line(average_wind_speed))
    }
}

impl Default for DataLog {
    fn default() -> Self {
        Self::new(RAW_DATA_PATH, PROCESSED_DATA_PATH)
    }
}

fn append_line(path: &Path, line: &str) -> Result<(), SinkError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| SinkError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    writeln!(file, "{line}").map_err(|source| SinkError::Write {
        path: path.to_path_buf(),
        source,
    })
}
