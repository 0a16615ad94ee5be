//! Plain-text rendering of a [`DashboardView`].

use std::fmt::Write;

use dashboard_core::{
    NoticeLevel,
    dashboard::{Bar, CityCard, DashboardView, ForecastSection, LoadedView, MapPoint},
};

const MAP_WIDTH: usize = 48;
const MAP_HEIGHT: usize = 14;
const BAR_WIDTH: usize = 36;
const FORECAST_WIDTH: usize = 36;

pub fn render(view: &DashboardView) -> String {
    let mut out = String::new();
    out.push_str("Weather & AQI Dashboard\n");
    out.push_str("Real-time weather and air quality across cities.\n\n");

    for notice in view.notices() {
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        };
        let _ = writeln!(out, "[{tag}] {}", notice.message);
    }
    if !view.notices().is_empty() {
        out.push('\n');
    }

    match view {
        DashboardView::Empty { message, .. } => {
            let _ = writeln!(out, "{message}");
        }
        DashboardView::Unavailable { .. } => {
            out.push_str("No weather data available for the selected cities.\n");
        }
        DashboardView::Loaded(data) => render_loaded(&mut out, data),
    }

    out
}

fn render_loaded(out: &mut String, data: &LoadedView) {
    section(out, "City Locations & Key Metrics");
    out.push_str(&point_map(&data.map));
    out.push('\n');
    for card in &data.cards {
        out.push_str(&city_card(card));
        out.push('\n');
    }

    section(out, "Comparative Analysis");
    out.push_str(&bar_chart("Temperature Comparison (°C)", &data.temperature, "°C"));
    out.push('\n');
    out.push_str(&bar_chart("Humidity Comparison (%)", &data.humidity, "%"));
    out.push('\n');

    section(out, "5-Day Forecast");
    let _ = writeln!(out, "Cities: {}", data.forecast_cities.join(", "));
    match &data.forecast {
        Some(forecast) => out.push_str(&forecast_chart(forecast)),
        None => out.push_str("Forecast unavailable.\n"),
    }
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "== {title} ==");
}

/// Scatter the cities on a lat/lon grid; each is marked with a letter.
pub fn point_map(points: &[MapPoint]) -> String {
    let mut out = String::new();
    if points.is_empty() {
        return out;
    }

    let (min_lat, max_lat) = bounds(points.iter().map(|p| p.lat));
    let (min_lon, max_lon) = bounds(points.iter().map(|p| p.lon));
    let lat_span = (max_lat - min_lat).max(f64::EPSILON);
    let lon_span = (max_lon - min_lon).max(f64::EPSILON);

    let mut grid = vec![vec![' '; MAP_WIDTH]; MAP_HEIGHT];
    for (i, p) in points.iter().enumerate() {
        let x = ((p.lon - min_lon) / lon_span * (MAP_WIDTH - 1) as f64).round() as usize;
        // North is up.
        let y = ((max_lat - p.lat) / lat_span * (MAP_HEIGHT - 1) as f64).round() as usize;
        grid[y.min(MAP_HEIGHT - 1)][x.min(MAP_WIDTH - 1)] = marker(i);
    }

    let border = format!("+{}+\n", "-".repeat(MAP_WIDTH));
    out.push_str(&border);
    for row in grid {
        let _ = writeln!(out, "|{}|", row.into_iter().collect::<String>());
    }
    out.push_str(&border);

    for (i, p) in points.iter().enumerate() {
        let _ = writeln!(out, "  {} {} ({:.2}, {:.2})", marker(i), p.city, p.lat, p.lon);
    }

    out
}

fn marker(i: usize) -> char {
    const MARKERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
    MARKERS.get(i).map_or('*', |&b| char::from(b))
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

pub fn city_card(card: &CityCard) -> String {
    let s = &card.snapshot;
    let aqi = s.aqi.map_or_else(|| "n/a".to_string(), |v| v.to_string());

    format!(
        "{city}: {desc}\n  Temp: {temp}°C (feels like {feels}°C)\n  Humidity: {hum}%\n  \
         Wind: {wind} m/s\n  AQI: {aqi} ({label}, {color})\n",
        city = s.city,
        desc = s.description,
        temp = s.temperature,
        feels = s.feels_like,
        hum = s.humidity,
        wind = s.wind_speed,
        label = card.aqi_class.label,
        color = card.aqi_class.color,
    )
}

/// Horizontal bars scaled so the largest magnitude fills the width.
pub fn bar_chart(title: &str, bars: &[Bar], unit: &str) -> String {
    let mut out = format!("{title}\n");

    let name_width = bars.iter().map(|b| b.city.chars().count()).max().unwrap_or(0);
    let max = bars.iter().map(|b| b.value.abs()).fold(0.0, f64::max);

    for bar in bars {
        let len = if max > 0.0 {
            (bar.value.abs() / max * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let _ = writeln!(
            out,
            "  {:<name_width$} |{} {:.1}{unit}",
            bar.city,
            "#".repeat(len),
            bar.value,
        );
    }

    out
}

/// One row per day: the min..max range drawn against the whole period.
pub fn forecast_chart(forecast: &ForecastSection) -> String {
    let mut out = format!("5-Day Min/Max Temperature Forecast for {}\n", forecast.city);
    if forecast.points.is_empty() {
        out.push_str("  (no forecast entries)\n");
        return out;
    }

    let lo = forecast.points.iter().map(|p| p.min_temperature).fold(f64::INFINITY, f64::min);
    let hi = forecast.points.iter().map(|p| p.max_temperature).fold(f64::NEG_INFINITY, f64::max);
    let span = (hi - lo).max(f64::EPSILON);
    let scale = |t: f64| ((t - lo) / span * (FORECAST_WIDTH - 1) as f64).round() as usize;

    for p in &forecast.points {
        let start = scale(p.min_temperature);
        let end = scale(p.max_temperature).max(start);

        let mut track = vec![' '; FORECAST_WIDTH];
        for cell in &mut track[start..=end] {
            *cell = '-';
        }
        track[start] = 'o';
        track[end] = 'o';

        let _ = writeln!(
            out,
            "  {}  {:>6.1}°C [{}] {:>6.1}°C",
            p.date.format("%a %Y-%m-%d"),
            p.min_temperature,
            track.into_iter().collect::<String>(),
            p.max_temperature,
        );
    }

    out
}
