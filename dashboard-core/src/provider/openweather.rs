use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{error::{Endpoint, FetchError}, model::Coordinates};

use super::{CurrentWeather, ForecastSample, WeatherSource, title_case};

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        params: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}/{}", self.base_url, endpoint.path());
        tracing::debug!(%endpoint, ?params, "requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(params)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|source| network_error(endpoint, source))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| network_error(endpoint, source))?;

        if !status.is_success() {
            return Err(FetchError::Status { endpoint, status, body: truncate_body(&body) });
        }

        serde_json::from_str(&body).map_err(|e| FetchError::payload(endpoint, e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    coord: OwCoord,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwPollutionMain {
    aqi: u8,
}

#[derive(Debug, Deserialize)]
struct OwPollutionEntry {
    main: OwPollutionMain,
}

#[derive(Debug, Deserialize)]
struct OwPollutionResponse {
    list: Vec<OwPollutionEntry>,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn current_weather(&self, city: &str) -> Result<CurrentWeather, FetchError> {
        let endpoint = Endpoint::CurrentWeather;
        let parsed: OwCurrentResponse = self
            .get_json(endpoint, &[("q", city.to_string()), ("units", "metric".to_string())])
            .await?;

        let description = parsed
            .weather
            .first()
            .map(|w| title_case(&w.description))
            .ok_or_else(|| FetchError::payload(endpoint, "no weather conditions in response"))?;

        Ok(CurrentWeather {
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            humidity: parsed.main.humidity,
            wind_speed: parsed.wind.speed,
            description,
            coordinates: Coordinates { lat: parsed.coord.lat, lon: parsed.coord.lon },
        })
    }

    async fn air_quality(&self, at: Coordinates) -> Result<Option<u8>, FetchError> {
        let parsed: OwPollutionResponse = self
            .get_json(
                Endpoint::AirPollution,
                &[("lat", at.lat.to_string()), ("lon", at.lon.to_string())],
            )
            .await?;

        Ok(parsed.list.first().map(|entry| entry.main.aqi))
    }

    async fn forecast(&self, at: Coordinates) -> Result<Vec<ForecastSample>, FetchError> {
        let endpoint = Endpoint::Forecast;
        let parsed: OwForecastResponse = self
            .get_json(
                endpoint,
                &[
                    ("lat", at.lat.to_string()),
                    ("lon", at.lon.to_string()),
                    ("units", "metric".to_string()),
                ],
            )
            .await?;

        parsed
            .list
            .into_iter()
            .map(|entry| {
                let time = unix_to_utc(entry.dt).ok_or_else(|| {
                    FetchError::payload(endpoint, format!("timestamp {} out of range", entry.dt))
                })?;
                let description = entry
                    .weather
                    .first()
                    .map(|w| title_case(&w.description))
                    .ok_or_else(|| FetchError::payload(endpoint, "forecast entry without weather"))?;

                Ok(ForecastSample { time, temperature: entry.main.temp, description })
            })
            .collect()
    }
}

/// The request URL carries `appid`, so it is stripped before the error
/// can reach a notice or a log line.
fn network_error(endpoint: Endpoint, source: reqwest::Error) -> FetchError {
    FetchError::Network { endpoint, source: source.without_url() }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("city not found"), "city not found");
    }

    #[test]
    fn truncate_body_cuts_on_char_boundary() {
        let body = "é".repeat(300);
        let truncated = truncate_body(&body);

        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client =
            OpenWeatherClient::new("KEY".into(), "http://localhost:1234/data/2.5/", Duration::from_secs(1))
                .expect("client builds");
        assert_eq!(client.base_url, "http://localhost:1234/data/2.5");
    }
}
