//! Presentation state of the dashboard.
//!
//! Each user interaction maps to one handler that recomputes only the
//! sections it affects. Network work is bounded by the service's cache.

use std::path::Path;

use serde::Serialize;

use crate::{
    aqi,
    catalog,
    model::{AqiClassification, CityWeatherSnapshot, ForecastPoint, Notice},
    provider::WeatherSource,
    service::WeatherService,
};

pub const EMPTY_SELECTION_MESSAGE: &str = "Please select at least one city.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub city: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityCard {
    #[serde(flatten)]
    pub snapshot: CityWeatherSnapshot,
    pub aqi_class: AqiClassification,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub city: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSection {
    pub city: String,
    pub points: Vec<ForecastPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedView {
    pub notices: Vec<Notice>,
    pub map: Vec<MapPoint>,
    pub cards: Vec<CityCard>,
    pub temperature: Vec<Bar>,
    pub humidity: Vec<Bar>,
    pub forecast_cities: Vec<String>,
    pub forecast: Option<ForecastSection>,
}

/// Everything needed to draw the dashboard once.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DashboardView {
    /// Nothing selected.
    Empty { message: String, notices: Vec<Notice> },
    /// Cities were selected but none could be fetched.
    Unavailable { notices: Vec<Notice> },
    Loaded(LoadedView),
}

impl DashboardView {
    pub fn notices(&self) -> &[Notice] {
        match self {
            DashboardView::Empty { notices, .. }
            | DashboardView::Unavailable { notices }
            | DashboardView::Loaded(LoadedView { notices, .. }) => notices,
        }
    }
}

#[derive(Debug)]
pub struct Dashboard<S> {
    service: WeatherService<S>,
    catalog: Vec<String>,
    selection: Vec<String>,
    snapshots: Vec<CityWeatherSnapshot>,
    forecast_city: Option<String>,
    forecast: Option<Vec<ForecastPoint>>,
    notices: Vec<Notice>,
}

impl<S: WeatherSource> Dashboard<S> {
    /// Load the catalog for `country` from `catalog_path`. A catalog that
    /// cannot be loaded is reported and leaves the dashboard with no cities.
    pub fn new(
        service: WeatherService<S>,
        catalog_path: &Path,
        country: &str,
        default_cities: &[String],
    ) -> Self {
        let mut notices = Vec::new();
        let catalog = catalog::load_city_names(catalog_path, country).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "city catalog unavailable");
            notices.push(Notice::error(err.to_string()));
            Vec::new()
        });

        let mut dashboard = Self::with_catalog(service, catalog, default_cities);
        dashboard.notices = notices;
        dashboard
    }

    /// `catalog` must be sorted and free of duplicates.
    pub fn with_catalog(
        service: WeatherService<S>,
        catalog: Vec<String>,
        default_cities: &[String],
    ) -> Self {
        let selection = default_cities
            .iter()
            .filter(|c| catalog.binary_search(c).is_ok())
            .cloned()
            .collect();

        Self {
            service,
            catalog,
            selection,
            snapshots: Vec::new(),
            forecast_city: None,
            forecast: None,
            notices: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    pub fn snapshots(&self) -> &[CityWeatherSnapshot] {
        &self.snapshots
    }

    pub fn forecast_city(&self) -> Option<&str> {
        self.forecast_city.as_deref()
    }

    pub fn service(&self) -> &WeatherService<S> {
        &self.service
    }

    /// Handler for "selection changed".
    pub async fn on_selection_changed(&mut self, cities: Vec<String>) {
        let mut selection: Vec<String> = Vec::with_capacity(cities.len());
        for city in cities {
            if selection.contains(&city) {
                continue;
            }
            if self.catalog.binary_search(&city).is_err() {
                self.notices.push(Notice::error(format!("Unknown city '{city}', skipped.")));
                continue;
            }
            selection.push(city);
        }

        self.selection = selection;
        self.reload_weather().await;
    }

    /// Handler for "forecast city changed". Only the forecast section is
    /// recomputed.
    pub async fn on_forecast_city_changed(&mut self, city: &str) {
        if !self.snapshots.iter().any(|s| s.city == city) {
            self.notices.push(Notice::error(format!(
                "No weather data for '{city}'; choose one of the displayed cities."
            )));
            return;
        }

        self.forecast_city = Some(city.to_string());
        self.reload_forecast().await;
    }

    /// Re-run every section for the current selection.
    pub async fn refresh(&mut self) {
        self.reload_weather().await;
    }

    /// Snapshot of the current state. Pending notices are handed over and
    /// will not be reported again.
    pub fn present(&mut self) -> DashboardView {
        let notices = self.drain_notices();

        if self.selection.is_empty() {
            return DashboardView::Empty { message: EMPTY_SELECTION_MESSAGE.to_string(), notices };
        }
        if self.snapshots.is_empty() {
            return DashboardView::Unavailable { notices };
        }

        let map = self
            .snapshots
            .iter()
            .map(|s| MapPoint { city: s.city.clone(), lat: s.latitude, lon: s.longitude })
            .collect();
        let cards = self
            .snapshots
            .iter()
            .map(|s| CityCard { snapshot: s.clone(), aqi_class: aqi::classify(s.aqi) })
            .collect();
        let temperature = self
            .snapshots
            .iter()
            .map(|s| Bar { city: s.city.clone(), value: s.temperature })
            .collect();
        let humidity = self
            .snapshots
            .iter()
            .map(|s| Bar { city: s.city.clone(), value: f64::from(s.humidity) })
            .collect();
        let forecast = self
            .forecast_city
            .clone()
            .zip(self.forecast.clone())
            .map(|(city, points)| ForecastSection { city, points });

        DashboardView::Loaded(LoadedView {
            notices,
            map,
            cards,
            temperature,
            humidity,
            forecast_cities: self.snapshots.iter().map(|s| s.city.clone()).collect(),
            forecast,
        })
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    async fn reload_weather(&mut self) {
        self.snapshots.clear();

        if self.selection.is_empty() {
            self.forecast_city = None;
            self.forecast = None;
            return;
        }

        for city in &self.selection {
            match self.service.city_snapshot(city).await {
                Ok(snapshot) => self.snapshots.push(snapshot),
                Err(err) => {
                    tracing::warn!(city = %city, error = %err, "dropping city");
                    self.notices.push(Notice::error(format!("Error fetching data for {city}: {err}")));
                }
            }
        }

        let keep_current = self
            .forecast_city
            .as_ref()
            .is_some_and(|fc| self.snapshots.iter().any(|s| &s.city == fc));
        if !keep_current {
            self.forecast_city = self.snapshots.first().map(|s| s.city.clone());
        }

        self.reload_forecast().await;
    }

    async fn reload_forecast(&mut self) {
        let at = self
            .forecast_city
            .as_ref()
            .and_then(|fc| self.snapshots.iter().find(|s| &s.city == fc))
            .map(CityWeatherSnapshot::coordinates);

        let Some(at) = at else {
            self.forecast = None;
            return;
        };

        self.forecast = match self.service.daily_forecast(at).await {
            Ok(points) => Some(points),
            Err(err) => {
                tracing::warn!(error = %err, "forecast unavailable");
                self.notices.push(Notice::error(format!("Error fetching forecast data: {err}")));
                None
            }
        };
    }
}
