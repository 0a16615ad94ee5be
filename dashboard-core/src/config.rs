use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const ENV_API_KEY: &str = "WEATHER_DASHBOARD_API_KEY";
pub const ENV_CITY_DATA: &str = "WEATHER_DASHBOARD_CITY_DATA";
pub const ENV_TIMEOUT_SECS: &str = "WEATHER_DASHBOARD_TIMEOUT_SECS";
pub const ENV_CACHE_TTL_SECS: &str = "WEATHER_DASHBOARD_CACHE_TTL_SECS";

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_COUNTRY: &str = "IN";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;

fn default_cities() -> Vec<String> {
    ["Kolkata", "Mumbai", "Delhi", "Bengaluru"].map(String::from).to_vec()
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// city_data_path = "/data/city.list.json"
/// cache_ttl_secs = 600
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub city_data_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    /// ISO country code the catalog is filtered to.
    pub country: String,
    pub default_cities: Vec<String>,
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            city_data_path: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            country: DEFAULT_COUNTRY.to_string(),
            default_cities: default_cities(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Validated configuration the dashboard runs with.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub city_data_path: PathBuf,
    pub request_timeout: Duration,
    pub cache_ttl: Duration,
    pub country: String,
    pub default_cities: Vec<String>,
    pub base_url: String,
}

impl Config {
    /// Load config from `path` (defaults if it doesn't exist yet), then apply
    /// environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::load_from_with(path, |name| env::var(name).ok())
    }

    pub fn load_from_with<F>(path: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::load_file(path)?;
        cfg.apply_env_overrides(lookup)?;
        Ok(cfg)
    }

    /// Only what is stored in `path`, without environment overrides. Use this
    /// when the result is going to be saved back.
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "weather-dashboard")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Environment variables win over values read from the file.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_API_KEY).filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(path) = lookup(ENV_CITY_DATA).filter(|p| !p.trim().is_empty()) {
            self.city_data_path = Some(PathBuf::from(path));
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            self.request_timeout_secs = parse_secs(ENV_TIMEOUT_SECS, &secs)?;
        }
        if let Some(secs) = lookup(ENV_CACHE_TTL_SECS) {
            self.cache_ttl_secs = parse_secs(ENV_CACHE_TTL_SECS, &secs)?;
        }
        Ok(())
    }

    /// Validate and resolve into [`Settings`]. Missing credentials or city
    /// data are fatal.
    pub fn settings(&self) -> Result<Settings> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API key configured.\n\
                     Hint: run `weather-dashboard configure` or set {ENV_API_KEY}."
                )
            })?;

        let city_data_path = self.city_data_path.clone().ok_or_else(|| {
            anyhow!(
                "No city data file configured.\n\
                 Hint: run `weather-dashboard configure` or set {ENV_CITY_DATA} \
                 to the path of a city.list.json file."
            )
        })?;

        if self.request_timeout_secs == 0 {
            return Err(anyhow!("request_timeout_secs must be greater than zero"));
        }

        Ok(Settings {
            api_key: api_key.to_string(),
            city_data_path,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            country: self.country.clone(),
            default_cities: self.default_cities.clone(),
            base_url: self.base_url.clone(),
        })
    }
}

fn parse_secs(name: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .with_context(|| format!("{name} must be a whole number of seconds, got '{value}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    fn configured() -> Config {
        Config {
            api_key: Some("KEY".into()),
            city_data_path: Some(PathBuf::from("city.list.json")),
            ..Config::default()
        }
    }

    #[test]
    fn defaults_match_dashboard_presets() {
        let cfg = Config::default();
        assert_eq!(cfg.country, "IN");
        assert_eq!(cfg.cache_ttl_secs, 600);
        assert_eq!(cfg.default_cities, vec!["Kolkata", "Mumbai", "Delhi", "Bengaluru"]);
    }

    #[test]
    fn settings_errors_when_api_key_missing() {
        let cfg = Config { api_key: None, ..configured() };
        let err = cfg.settings().unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No OpenWeather API key configured"));
        assert!(msg.contains("weather-dashboard configure"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let cfg = Config { api_key: Some("   ".into()), ..configured() };
        assert!(cfg.settings().is_err());
    }

    #[test]
    fn settings_errors_when_city_data_missing() {
        let cfg = Config { city_data_path: None, ..configured() };
        let err = cfg.settings().unwrap_err();
        assert!(err.to_string().contains("No city data file configured"));
    }

    #[test]
    fn settings_resolve_durations() {
        let settings = configured().settings().expect("settings resolve");
        assert_eq!(settings.api_key, "KEY");
        assert_eq!(settings.cache_ttl, Duration::from_secs(600));
        assert_eq!(settings.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn env_overrides_beat_file_values() {
        let mut cfg = configured();
        cfg.apply_env_overrides(lookup(&[
            (ENV_API_KEY, "ENV_KEY"),
            (ENV_CITY_DATA, "/data/cities.json"),
            (ENV_CACHE_TTL_SECS, "30"),
        ]))
        .expect("overrides apply");

        assert_eq!(cfg.api_key.as_deref(), Some("ENV_KEY"));
        assert_eq!(cfg.city_data_path, Some(PathBuf::from("/data/cities.json")));
        assert_eq!(cfg.cache_ttl_secs, 30);
        assert_eq!(cfg.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn invalid_numeric_override_is_an_error() {
        let mut cfg = configured();
        let err = cfg.apply_env_overrides(lookup(&[(ENV_TIMEOUT_SECS, "soon")])).unwrap_err();
        assert!(err.to_string().contains(ENV_TIMEOUT_SECS));
    }

    #[test]
    fn save_and_load_through_toml() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config { cache_ttl_secs: 120, ..configured() };
        cfg.save_to(&path).expect("config saves");

        let contents = fs::read_to_string(&path).expect("config readable");
        let loaded: Config = toml::from_str(&contents).expect("config parses");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn load_file_leaves_out_env_overrides() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        Config { cache_ttl_secs: 120, ..configured() }.save_to(&path).expect("config saves");

        let overridden = Config::load_from_with(&path, lookup(&[(ENV_CACHE_TTL_SECS, "30")]))
            .expect("config loads");
        assert_eq!(overridden.cache_ttl_secs, 30);

        let stored = Config::load_file(&path).expect("config loads");
        assert_eq!(stored.cache_ttl_secs, 120);

        // Saving what was read from the file keeps the stored value.
        stored.save_to(&path).expect("config saves");
        assert_eq!(Config::load_file(&path).expect("config loads").cache_ttl_secs, 120);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cfg = Config::load_file(&dir.path().join("absent.toml")).expect("defaults");
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let loaded: Config = toml::from_str(r#"api_key = "K""#).expect("config parses");
        assert_eq!(loaded.api_key.as_deref(), Some("K"));
        assert_eq!(loaded.base_url, DEFAULT_BASE_URL);
        assert_eq!(loaded.default_cities.len(), 4);
    }
}
