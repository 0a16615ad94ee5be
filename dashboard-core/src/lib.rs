//! Core library for the weather & AQI dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The city catalog loader
//! - The OpenWeather source and a TTL-memoizing service in front of it
//! - Dashboard state, its event handlers and the view it produces
//!
//! It is used by `dashboard-cli`, but can also be reused by other binaries or services.

pub mod aqi;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod forecast;
pub mod model;
pub mod provider;
pub mod service;

pub use config::{Config, Settings};
pub use dashboard::{Dashboard, DashboardView};
pub use error::{CatalogError, Endpoint, FetchError};
pub use model::{CityWeatherSnapshot, Coordinates, ForecastPoint, Notice, NoticeLevel};
pub use provider::{WeatherSource, openweather::OpenWeatherClient};
pub use service::WeatherService;
