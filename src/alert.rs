use std::cell::RefCell;
use std::process::{Command, ExitStatus};

use thiserror::Error;

use crate::{truncate_str, Observation};

/// Longest alert message handed to a [`Notifier`], in bytes.
pub const ALERT_MESSAGE_CAPACITY: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// m/s
    pub wind_speed: f64,
    /// °C
    pub temperature: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            wind_speed: 20.0,
            temperature: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    HighWindSpeed,
    HighTemperature,
}

impl Alert {
    pub fn message(self, observation: &Observation) -> String {
        let mut message = match self {
            Self::HighWindSpeed => format!(
                "High Wind Speed Alert for {}: {:.2} m/s",
                observation.city, observation.wind_speed
            ),
            Self::HighTemperature => format!(
                "High Temperature Alert for {}: {:.2} °C",
                observation.city, observation.temperature
            ),
        };
        let len = truncate_str(&message, ALERT_MESSAGE_CAPACITY).len();
        message.truncate(len);
        message
    }
}

/// Alerts raised by `observation`, wind first. Both limits are exclusive.
pub fn evaluate(observation: &Observation, thresholds: &Thresholds) -> Vec<Alert> {
    let mut alerts = Vec::new();
    if observation.wind_speed > thresholds.wind_speed {
        alerts.push(Alert::HighWindSpeed);
    }
    if observation.temperature > thresholds.temperature {
        alerts.push(Alert::HighTemperature);
    }
    alerts
}

/// Sends one notification per exceeded threshold. A notifier failure is
/// logged and doesn't stop the remaining alerts.
pub fn check_thresholds(
    observation: &Observation,
    thresholds: &Thresholds,
    notifier: &impl Notifier,
) {
    for alert in evaluate(observation, thresholds) {
        let message = alert.message(observation);
        log::info!("{message}");
        if let Err(e) = notifier.notify(&message) {
            log::error!("Could not send alert for {}: {e}", observation.city);
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Could not run the notifier: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("Notifier exited with {0}")]
    Failed(ExitStatus),
}

pub trait Notifier {
    fn notify(&self, message: &str) -> Result<(), NotifyError>;
}

/// zenity renders `--text` as Pango markup.
fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Shows a warning popup on the local X display with `zenity`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZenityNotifier;

impl Notifier for ZenityNotifier {
    fn notify(&self, message: &str) -> Result<(), NotifyError> {
        let status = Command::new("zenity")
            .env("DISPLAY", ":0")
            .arg("--warning")
            .arg(format!("--text={}", escape_markup(message)))
            .status()?;
        if !status.success() {
            return Err(NotifyError::Failed(status));
        }
        Ok(())
    }
}

/// Keeps every message instead of showing it.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: RefCell<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) -> Result<(), NotifyError> {
        self.messages.borrow_mut().push(message.to_string());
        Ok(())
    }
}
