use std::{fmt, path::PathBuf};

use reqwest::StatusCode;
use thiserror::Error;

/// Which OpenWeather endpoint a request was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    CurrentWeather,
    AirPollution,
    Forecast,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::CurrentWeather => "current weather",
            Endpoint::AirPollution => "air pollution",
            Endpoint::Forecast => "forecast",
        }
    }

    /// Path below the API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::CurrentWeather => "weather",
            Endpoint::AirPollution => "air_pollution",
            Endpoint::Forecast => "forecast",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single weather, pollution or forecast request.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to reach OpenWeather ({endpoint}): {source}")]
    Network {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("OpenWeather {endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: Endpoint,
        status: StatusCode,
        body: String,
    },

    #[error("unexpected OpenWeather {endpoint} payload: {reason}")]
    Payload { endpoint: Endpoint, reason: String },
}

impl FetchError {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            FetchError::Network { endpoint, .. }
            | FetchError::Status { endpoint, .. }
            | FetchError::Payload { endpoint, .. } => *endpoint,
        }
    }

    pub fn payload(endpoint: Endpoint, reason: impl Into<String>) -> Self {
        FetchError::Payload { endpoint, reason: reason.into() }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("City data file not found at {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read city data file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error decoding city data JSON file {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
