use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One entry of the city catalog file. Other fields (`id`, `state`,
/// `coord`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CityRecord {
    pub name: String,
    /// Missing or `null` in some catalog rows; such rows never match.
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Current weather merged with the air quality index for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityWeatherSnapshot {
    /// The name that was asked for, not the one the API echoes back.
    pub city: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub description: String,
    /// 1 (best) to 5 (worst); absent when the pollution list was empty.
    pub aqi: Option<u8>,
    pub latitude: f64,
    pub longitude: f64,
}

impl CityWeatherSnapshot {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates { lat: self.latitude, lon: self.longitude }
    }
}

/// Daily temperature range derived from the 3-hour forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub min_temperature: f64,
    pub max_temperature: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AqiClassification {
    pub label: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message surfaced to the user alongside the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}
