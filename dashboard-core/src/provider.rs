use crate::{
    config::Settings,
    error::FetchError,
    model::Coordinates,
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

pub mod openweather;

/// Current conditions for one city as reported by the upstream API.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub description: String,
    pub coordinates: Coordinates,
}

/// One 3-hour step of the 5-day forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSample {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub description: String,
}

/// The three upstream calls the dashboard is built from.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn current_weather(&self, city: &str) -> Result<CurrentWeather, FetchError>;

    /// AQI of the first pollution record, `None` if the list is empty.
    async fn air_quality(&self, at: Coordinates) -> Result<Option<u8>, FetchError>;

    async fn forecast(&self, at: Coordinates) -> Result<Vec<ForecastSample>, FetchError>;
}

/// Construct the OpenWeather source from validated settings.
pub fn source_from_settings(settings: &Settings) -> anyhow::Result<OpenWeatherClient> {
    OpenWeatherClient::new(
        settings.api_key.clone(),
        &settings.base_url,
        settings.request_timeout,
    )
}

/// Capitalize the first letter of every word: "light rain" -> "Light Rain".
pub(crate) fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }

    out
}
