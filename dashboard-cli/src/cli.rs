use std::{
    fmt,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dashboard_core::{
    Config, Dashboard, DashboardView, OpenWeatherClient, Settings, WeatherService, catalog,
    provider::source_from_settings,
};
use inquire::{InquireError, MultiSelect, Password, PasswordDisplayMode, Select, Text};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dashboard", version, about = "Weather & AQI dashboard")]
pub struct Cli {
    /// Use this config file instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and the city data file location.
    Configure,

    /// List the cities available for selection.
    Cities {
        /// Only show names containing this text (case-insensitive).
        #[arg(long)]
        filter: Option<String>,
    },

    /// Render the dashboard once.
    Show {
        /// City to compare; repeat for several. Defaults to the configured preset.
        #[arg(long = "city")]
        cities: Vec<String>,

        /// City whose forecast is charted; defaults to the first fetched city.
        #[arg(long)]
        forecast_city: Option<String>,

        /// Print the dashboard as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Pick cities and forecast city interactively.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };

        match self.command {
            // Env overrides must not leak into the saved file.
            Command::Configure => configure(Config::load_file(&path)?, &path),
            Command::Cities { filter } => {
                for name in matching_cities(&settings_at(&path)?, filter.as_deref()) {
                    println!("{name}");
                }
                Ok(())
            }
            Command::Show { cities, forecast_city, json } => {
                let mut dashboard = open_dashboard(&settings_at(&path)?)?;

                let selection =
                    if cities.is_empty() { dashboard.selection().to_vec() } else { cities };
                dashboard.on_selection_changed(selection).await;
                if let Some(city) = forecast_city {
                    dashboard.on_forecast_city_changed(&city).await;
                }

                print_view(&dashboard.present(), json)
            }
            Command::Interactive => interactive(open_dashboard(&settings_at(&path)?)?).await,
        }
    }
}

fn settings_at(path: &Path) -> Result<Settings> {
    Config::load_from(path)?.settings()
}

fn open_dashboard(settings: &Settings) -> Result<Dashboard<OpenWeatherClient>> {
    let source = source_from_settings(settings)?;
    let service = WeatherService::new(source, settings.cache_ttl);

    Ok(Dashboard::new(
        service,
        &settings.city_data_path,
        &settings.country,
        &settings.default_cities,
    ))
}

fn print_view(view: &DashboardView, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(view).context("Failed to serialize dashboard")?;
        println!("{out}");
    } else {
        print!("{}", render::render(view));
    }
    Ok(())
}

fn configure(mut config: Config, path: &Path) -> Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;

    let current_path = config
        .city_data_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let city_data = Text::new("Path to city.list.json:")
        .with_initial_value(&current_path)
        .prompt()?;

    config.api_key = Some(api_key.trim().to_string());
    config.city_data_path = Some(PathBuf::from(city_data.trim()));

    config.save_to(path)?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}

/// A catalog that cannot be loaded is reported and lists nothing.
fn matching_cities(settings: &Settings, filter: Option<&str>) -> Vec<String> {
    let names = match catalog::load_city_names(&settings.city_data_path, &settings.country) {
        Ok(names) => names,
        Err(err) => {
            eprintln!("error: {err}");
            return Vec::new();
        }
    };

    let needle = filter.map(str::to_lowercase);
    names
        .into_iter()
        .filter(|n| needle.as_ref().is_none_or(|f| n.to_lowercase().contains(f)))
        .collect()
}

#[derive(Debug, Clone, Copy)]
enum MenuAction {
    ChangeCities,
    ChangeForecastCity,
    Refresh,
    Quit,
}

impl MenuAction {
    const ALL: [MenuAction; 4] = [
        MenuAction::ChangeCities,
        MenuAction::ChangeForecastCity,
        MenuAction::Refresh,
        MenuAction::Quit,
    ];
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MenuAction::ChangeCities => "Change cities",
            MenuAction::ChangeForecastCity => "Change forecast city",
            MenuAction::Refresh => "Refresh",
            MenuAction::Quit => "Quit",
        })
    }
}

async fn interactive(mut dashboard: Dashboard<OpenWeatherClient>) -> Result<()> {
    let initial = match prompt_cities(&dashboard)? {
        Some(cities) => cities,
        None => return Ok(()),
    };
    dashboard.on_selection_changed(initial).await;
    print_view(&dashboard.present(), false)?;

    loop {
        let action = match cancellable(
            Select::new("What next?", MenuAction::ALL.to_vec()).prompt(),
        )? {
            Some(action) => action,
            None => return Ok(()),
        };

        match action {
            MenuAction::ChangeCities => match prompt_cities(&dashboard)? {
                Some(cities) => dashboard.on_selection_changed(cities).await,
                None => continue,
            },
            MenuAction::ChangeForecastCity => {
                let options: Vec<String> =
                    dashboard.snapshots().iter().map(|s| s.city.clone()).collect();
                if options.is_empty() {
                    println!("No cities with weather data to choose from.");
                    continue;
                }
                let cursor = dashboard
                    .forecast_city()
                    .and_then(|fc| options.iter().position(|o| o == fc))
                    .unwrap_or(0);

                match cancellable(
                    Select::new("Select a city:", options).with_starting_cursor(cursor).prompt(),
                )? {
                    Some(city) => dashboard.on_forecast_city_changed(&city).await,
                    None => continue,
                }
            }
            MenuAction::Refresh => dashboard.refresh().await,
            MenuAction::Quit => return Ok(()),
        }

        print_view(&dashboard.present(), false)?;
    }
}

/// `None` when the user backs out of the prompt.
fn prompt_cities(dashboard: &Dashboard<OpenWeatherClient>) -> Result<Option<Vec<String>>> {
    let catalog = dashboard.catalog();
    if catalog.is_empty() {
        return Ok(Some(Vec::new()));
    }

    let defaults: Vec<usize> = dashboard
        .selection()
        .iter()
        .filter_map(|c| catalog.binary_search(c).ok())
        .collect();

    cancellable(
        MultiSelect::new("Select cities to compare:", catalog.to_vec())
            .with_default(&defaults)
            .with_page_size(15)
            .prompt(),
    )
}

fn cancellable<T>(answer: Result<T, InquireError>) -> Result<Option<T>> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}
