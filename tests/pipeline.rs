use std::collections::HashMap;
use std::path::Path;

use tempfile::TempDir;
use windwatch::alert::{RecordingNotifier, Thresholds};
use windwatch::fetch::{FetchError, WeatherSource};
use windwatch::pipeline::{run, Config};
use windwatch::{Location, Observation, LOCATIONS};

/// Serves canned bodies by city name, any other city is unreachable.
#[derive(Default)]
struct CannedSource {
    bodies: HashMap<&'static str, String>,
}

impl CannedSource {
    fn with(mut self, city: &'static str, body: impl Into<String>) -> Self {
        self.bodies.insert(city, body.into());
        self
    }

    fn current(self, city: &'static str, wind_speed: f64, temperature: f64, is_day: i32) -> Self {
        self.with(
            city,
            format!(
                r#"{{"current_weather": {{"windspeed": {wind_speed}, "temperature": {temperature}, "is_day": {is_day}}}}}"#
            ),
        )
    }
}

impl WeatherSource for CannedSource {
    fn fetch(&self, location: &Location) -> Result<Vec<u8>, FetchError> {
        match self.bodies.get(location.name) {
            Some(body) => Ok(body.as_bytes().to_vec()),
            None => Err(FetchError::Body {
                url: format!("canned://{}", location.name),
                source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
            }),
        }
    }
}

fn test_config(dir: &TempDir) -> Config {
    Config {
        raw_data_path: dir.path().join("raw_data.txt"),
        processed_data_path: dir.path().join("processed_data.txt"),
        ..Config::default()
    }
}

fn lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

const ABC: &[Location] = &[
    Location::new("A", 1.0, 1.0),
    Location::new("B", 2.0, 2.0),
    Location::new("C", 3.0, 3.0),
];

#[test]
fn computes_mean_and_alerts() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let source = CannedSource::default()
        .current("A", 10.0, 15.0, 1)
        .current("B", 30.0, 20.0, 0)
        .current("C", 5.0, 25.5, 1);
    let notifier = RecordingNotifier::new();

    let summary = run(&config, ABC, &source, &notifier).unwrap();

    assert_eq!(summary.observations.len(), 3);
    assert_eq!(summary.average_wind_speed, 15.0);
    assert_eq!(
        notifier.messages(),
        vec![
            "High Wind Speed Alert for B: 30.00 m/s".to_string(),
            "High Temperature Alert for C: 25.50 °C".to_string(),
        ]
    );
    assert_eq!(
        lines(&config.raw_data_path),
        vec![
            "City: A, Wind Speed: 10.00, Temperature: 15.00, Is Day: 1",
            "City: B, Wind Speed: 30.00, Temperature: 20.00, Is Day: 0",
            "City: C, Wind Speed: 5.00, Temperature: 25.50, Is Day: 1",
        ]
    );
    assert_eq!(
        lines(&config.processed_data_path),
        vec!["Average Wind Speed: 15.00"]
    );
}

#[test]
fn every_fetch_failing_still_writes_every_line() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let notifier = RecordingNotifier::new();

    let summary = run(&config, LOCATIONS, &CannedSource::default(), &notifier).unwrap();

    assert_eq!(summary.observations.len(), LOCATIONS.len());
    for (observation, location) in summary.observations.iter().zip(LOCATIONS) {
        assert_eq!(observation, &Observation::with_defaults(location.name));
    }
    assert_eq!(summary.average_wind_speed, 0.0);
    assert!(notifier.messages().is_empty());

    let raw = lines(&config.raw_data_path);
    assert_eq!(raw.len(), LOCATIONS.len());
    assert_eq!(
        raw[0],
        "City: Karachi, Wind Speed: 0.00, Temperature: 0.00, Is Day: 0"
    );
    assert_eq!(
        lines(&config.processed_data_path),
        vec!["Average Wind Speed: 0.00"]
    );
}

#[test]
fn bad_documents_default_without_aborting() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let source = CannedSource::default()
        .with("A", "<html>502 Bad Gateway</html>")
        .with("B", r#"{"error": true, "reason": "Cannot initialize WeatherVariable"}"#)
        .current("C", 9.0, 11.0, 1);

    let summary = run(&config, ABC, &source, &RecordingNotifier::new()).unwrap();

    assert_eq!(
        summary.observations,
        vec![
            Observation::with_defaults("A"),
            Observation::with_defaults("B"),
            Observation {
                wind_speed: 9.0,
                temperature: 11.0,
                is_day: 1,
                ..Observation::with_defaults("C")
            },
        ]
    );
    assert_eq!(summary.average_wind_speed, 3.0);
}

#[test]
fn runs_append_to_previous_output() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let source = CannedSource::default().current("A", 4.0, 4.0, 1);
    let notifier = RecordingNotifier::new();

    run(&config, ABC, &source, &notifier).unwrap();
    run(&config, ABC, &source, &notifier).unwrap();

    assert_eq!(lines(&config.raw_data_path).len(), 6);
    assert_eq!(
        lines(&config.processed_data_path),
        vec!["Average Wind Speed: 1.33", "Average Wind Speed: 1.33"]
    );
}

#[test]
fn unwritable_raw_log_does_not_stop_the_run() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        raw_data_path: dir.path().join("no-such-dir").join("raw_data.txt"),
        ..test_config(&dir)
    };
    let source = CannedSource::default().current("B", 21.0, 0.0, 0);
    let notifier = RecordingNotifier::new();

    let summary = run(&config, ABC, &source, &notifier).unwrap();

    assert_eq!(summary.average_wind_speed, 7.0);
    assert_eq!(notifier.messages().len(), 1);
    assert!(!config.raw_data_path.exists());
    assert_eq!(
        lines(&config.processed_data_path),
        vec!["Average Wind Speed: 7.00"]
    );
}

#[test]
fn thresholds_come_from_config() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        thresholds: Thresholds {
            wind_speed: 1.0,
            temperature: 100.0,
        },
        ..test_config(&dir)
    };
    let source = CannedSource::default()
        .current("A", 1.0, 50.0, 1)
        .current("C", 1.5, 50.0, 1);
    let notifier = RecordingNotifier::new();

    run(&config, ABC, &source, &notifier).unwrap();

    assert_eq!(
        notifier.messages(),
        vec!["High Wind Speed Alert for C: 1.50 m/s".to_string()]
    );
}

#[test]
fn empty_registry_is_not_a_division_by_zero() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    let summary = run(&config, &[], &CannedSource::default(), &RecordingNotifier::new()).unwrap();

    assert!(summary.observations.is_empty());
    assert_eq!(summary.average_wind_speed, 0.0);
    assert_eq!(
        lines(&config.processed_data_path),
        vec!["Average Wind Speed: 0.00"]
    );
}
