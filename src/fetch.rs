use std::io::Read;

use thiserror::Error;

use crate::Location;

pub const API_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Forecast request for one point: hourly wind and temperature series plus
/// the current weather block.
pub fn request_url(base_url: &str, latitude: f64, longitude: f64) -> String {
    format!(
        "{base_url}?latitude={latitude:.4}&longitude={longitude:.4}&hourly=windspeed_10m,temperature_2m&current_weather=true"
    )
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Could not initialize request to `{url}`: {source}")]
    Init {
        url: String,
        #[source]
        source: Box<ureq::Transport>,
    },
    #[error("Request to `{url}` failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<ureq::Transport>,
    },
    #[error("Could not read the response of `{url}`: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

pub trait WeatherSource {
    /// Raw response body for `location`.
    fn fetch(&self, location: &Location) -> Result<Vec<u8>, FetchError>;
}

pub struct OpenMeteoClient {
    agent: ureq::Agent,
    base_url: String,
}

impl OpenMeteoClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for OpenMeteoClient {
    fn default() -> Self {
        Self::new(API_URL)
    }
}

impl WeatherSource for OpenMeteoClient {
    fn fetch(&self, location: &Location) -> Result<Vec<u8>, FetchError> {
        let url = request_url(&self.base_url, location.latitude, location.longitude);
        log::debug!("Fetching {} from {url}", location.name);

        let response = match self.agent.get(&url).call() {
            Ok(response) => response,
            // An error status still comes with a body, let the parser judge it.
            Err(ureq::Error::Status(code, response)) => {
                log::warn!("Server answered {code} for {}", location.name);
                response
            }
            Err(ureq::Error::Transport(transport)) => {
                let source = Box::new(transport);
                return Err(match source.kind() {
                    ureq::ErrorKind::InvalidUrl | ureq::ErrorKind::UnknownScheme => {
                        FetchError::Init { url, source }
                    }
                    _ => FetchError::Transport { url, source },
                });
            }
        };

        let mut body = Vec::new();
        if let Err(source) = response.into_reader().read_to_end(&mut body) {
            return Err(FetchError::Body { url, source });
        }
        Ok(body)
    }
}
