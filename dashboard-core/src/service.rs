use std::time::Duration;

use crate::{
    cache::{CacheKey, TtlCache},
    error::FetchError,
    forecast::aggregate_daily,
    model::{CityWeatherSnapshot, Coordinates, ForecastPoint},
    provider::WeatherSource,
};

/// Memoizing front of a [`WeatherSource`]: only successful results are
/// cached, failures always reach the caller.
#[derive(Debug)]
pub struct WeatherService<S> {
    source: S,
    snapshots: TtlCache<CityWeatherSnapshot>,
    forecasts: TtlCache<Vec<ForecastPoint>>,
}

impl<S: WeatherSource> WeatherService<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            snapshots: TtlCache::new(ttl),
            forecasts: TtlCache::new(ttl),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Current weather and AQI for `city`.
    ///
    /// An empty pollution list leaves `aqi` absent; every other failure,
    /// including a failed pollution call, fails the whole snapshot.
    pub async fn city_snapshot(&self, city: &str) -> Result<CityWeatherSnapshot, FetchError> {
        let key = CacheKey::new("city_snapshot", city);
        if let Some(snapshot) = self.snapshots.get(&key).await {
            return Ok(snapshot);
        }

        let current = self.source.current_weather(city).await?;
        let aqi = self.source.air_quality(current.coordinates).await?;

        let snapshot = CityWeatherSnapshot {
            city: city.to_string(),
            temperature: current.temperature,
            feels_like: current.feels_like,
            humidity: current.humidity,
            wind_speed: current.wind_speed,
            description: current.description,
            aqi,
            latitude: current.coordinates.lat,
            longitude: current.coordinates.lon,
        };

        self.snapshots.put(key, snapshot.clone()).await;
        Ok(snapshot)
    }

    /// Daily min/max temperatures for the 5-day forecast at `at`.
    pub async fn daily_forecast(&self, at: Coordinates) -> Result<Vec<ForecastPoint>, FetchError> {
        let key = CacheKey::new("daily_forecast", format!("{},{}", at.lat, at.lon));
        if let Some(points) = self.forecasts.get(&key).await {
            return Ok(points);
        }

        let samples = self.source.forecast(at).await?;
        let points = aggregate_daily(&samples);

        self.forecasts.put(key, points.clone()).await;
        Ok(points)
    }

    /// Drop everything memoized so far.
    pub async fn clear_cache(&self) {
        self.snapshots.clear().await;
        self.forecasts.clear().await;
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory [`WeatherSource`] that counts calls.

    use std::{
        collections::HashMap,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use reqwest::StatusCode;

    use crate::{
        error::{Endpoint, FetchError},
        model::Coordinates,
        provider::{CurrentWeather, ForecastSample, WeatherSource},
    };

    #[derive(Debug, Clone)]
    pub enum Pollution {
        Aqi(u8),
        Empty,
        Fails,
    }

    #[derive(Debug, Default)]
    pub struct FakeSource {
        cities: Mutex<HashMap<String, (CurrentWeather, Pollution)>>,
        weather_calls: AtomicUsize,
        pollution_calls: AtomicUsize,
        forecast_calls: AtomicUsize,
        forecast_fails: Mutex<bool>,
    }

    impl FakeSource {
        pub fn with_city(self, name: &str, lat: f64, lon: f64, pollution: Pollution) -> Self {
            let current = CurrentWeather {
                temperature: 30.0 + lat / 10.0,
                feels_like: 33.0,
                humidity: 70,
                wind_speed: 3.5,
                description: "Haze".into(),
                coordinates: Coordinates { lat, lon },
            };
            self.cities
                .lock()
                .unwrap()
                .insert(name.to_string(), (current, pollution));
            self
        }

        pub fn failing_forecast(self) -> Self {
            *self.forecast_fails.lock().unwrap() = true;
            self
        }

        pub fn weather_calls(&self) -> usize {
            self.weather_calls.load(Ordering::SeqCst)
        }

        pub fn pollution_calls(&self) -> usize {
            self.pollution_calls.load(Ordering::SeqCst)
        }

        pub fn forecast_calls(&self) -> usize {
            self.forecast_calls.load(Ordering::SeqCst)
        }

        pub fn network_calls(&self) -> usize {
            self.weather_calls() + self.pollution_calls() + self.forecast_calls()
        }

        fn pollution_at(&self, at: Coordinates) -> Option<Pollution> {
            self.cities
                .lock()
                .unwrap()
                .values()
                .find(|(c, _)| c.coordinates == at)
                .map(|(_, p)| p.clone())
        }
    }

    #[async_trait]
    impl WeatherSource for FakeSource {
        async fn current_weather(&self, city: &str) -> Result<CurrentWeather, FetchError> {
            self.weather_calls.fetch_add(1, Ordering::SeqCst);
            self.cities
                .lock()
                .unwrap()
                .get(city)
                .map(|(c, _)| c.clone())
                .ok_or_else(|| FetchError::Status {
                    endpoint: Endpoint::CurrentWeather,
                    status: StatusCode::NOT_FOUND,
                    body: r#"{"cod":"404","message":"city not found"}"#.into(),
                })
        }

        async fn air_quality(&self, at: Coordinates) -> Result<Option<u8>, FetchError> {
            self.pollution_calls.fetch_add(1, Ordering::SeqCst);
            match self.pollution_at(at) {
                Some(Pollution::Aqi(aqi)) => Ok(Some(aqi)),
                Some(Pollution::Empty) => Ok(None),
                Some(Pollution::Fails) | None => Err(FetchError::Status {
                    endpoint: Endpoint::AirPollution,
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: "boom".into(),
                }),
            }
        }

        async fn forecast(&self, at: Coordinates) -> Result<Vec<ForecastSample>, FetchError> {
            self.forecast_calls.fetch_add(1, Ordering::SeqCst);
            if *self.forecast_fails.lock().unwrap() {
                return Err(FetchError::payload(Endpoint::Forecast, "missing field `list`"));
            }

            let samples = (0..40)
                .map(|step| ForecastSample {
                    time: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
                        + chrono::Duration::hours(3 * step),
                    temperature: at.lat + (step % 8) as f64,
                    description: "Clear Sky".into(),
                })
                .collect();
            Ok(samples)
        }
    }
}
