use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    location::{self, DEFAULT_CITY, Location},
    provider::cwb::DEFAULT_BASE_URL,
};

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Taipei;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_token = "CWB-..."
/// city = "臺北市"
/// timezone = "Asia/Taipei"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// CWB open-data authorization key.
    pub api_token: Option<String>,

    /// Selected city; the one persisted user preference.
    pub city: Option<String>,

    /// IANA zone shared by the sun-times table and "now".
    pub timezone: Option<String>,

    pub sun_times_path: Option<PathBuf>,

    pub request_timeout_secs: Option<u64>,

    pub api_base_url: Option<String>,
}

impl Config {
    pub fn api_token(&self) -> Result<&str> {
        self.api_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No API token configured.\n\
                     Hint: run `cwb-weather configure` and enter your CWB authorization key."
                )
            })
    }

    /// The selected city, or the default one when none is stored.
    pub fn selected_location(&self) -> Result<&'static Location> {
        let name = self.city.as_deref().unwrap_or(DEFAULT_CITY);
        location::find_location(name).ok_or_else(|| {
            anyhow!(
                "Configured city '{name}' is not supported.\n\
                 Hint: run `cwb-weather city --list` to see available cities."
            )
        })
    }

    /// Validate and store the selected city.
    pub fn set_city(&mut self, city_name: &str) -> Result<&'static Location> {
        let location = location::find_location(city_name).ok_or_else(|| {
            anyhow!(
                "Unknown city '{city_name}'. Supported cities: {}.",
                location::city_names().collect::<Vec<_>>().join(", ")
            )
        })?;

        self.city = Some(location.city_name.to_string());
        Ok(location)
    }

    pub fn timezone(&self) -> Result<Tz> {
        match self.timezone.as_deref() {
            None => Ok(DEFAULT_TIMEZONE),
            Some(name) => name
                .parse::<Tz>()
                .map_err(|e| anyhow!("Invalid timezone '{name}' in config: {e}")),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Where the generated sun-times table is read from.
    pub fn sun_times_path(&self) -> Result<PathBuf> {
        match &self.sun_times_path {
            Some(path) => Ok(path.clone()),
            None => Ok(project_dirs()?.data_dir().join("sun-times.json")),
        }
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

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
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "cwb-weather", "cwb-weather")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_token_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.api_token().unwrap_err();
        assert!(err.to_string().contains("No API token configured"));

        let blank = Config {
            api_token: Some("  ".into()),
            ..Config::default()
        };
        assert!(blank.api_token().is_err());
    }

    #[test]
    fn selected_location_defaults_to_taipei() {
        let cfg = Config::default();
        assert_eq!(cfg.selected_location().unwrap().city_name, DEFAULT_CITY);
    }

    #[test]
    fn set_city_validates_and_persists_choice() {
        let mut cfg = Config::default();

        let hualien = cfg.set_city("花蓮縣").expect("listed city");
        assert_eq!(hualien.station_name, "花蓮");
        assert_eq!(cfg.city.as_deref(), Some("花蓮縣"));

        let err = cfg.set_city("Atlantis").unwrap_err();
        assert!(err.to_string().contains("Unknown city 'Atlantis'"));
        assert_eq!(cfg.city.as_deref(), Some("花蓮縣"));
    }

    #[test]
    fn unsupported_stored_city_is_reported() {
        let cfg = Config {
            city: Some("Atlantis".into()),
            ..Config::default()
        };
        let msg = cfg.selected_location().unwrap_err().to_string();
        assert!(msg.contains("'Atlantis' is not supported"));
    }

    #[test]
    fn timezone_parses_or_defaults() {
        assert_eq!(Config::default().timezone().unwrap(), DEFAULT_TIMEZONE);

        let tokyo = Config {
            timezone: Some("Asia/Tokyo".into()),
            ..Config::default()
        };
        assert_eq!(tokyo.timezone().unwrap(), chrono_tz::Asia::Tokyo);

        let bad = Config {
            timezone: Some("Not/AZone".into()),
            ..Config::default()
        };
        assert!(bad.timezone().is_err());
    }

    #[test]
    fn defaults_for_timeout_and_base_url() {
        let cfg = Config::default();
        assert_eq!(cfg.request_timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(cfg.api_base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_keeps_city_preference() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config {
            api_token: Some("CWB-TOKEN".into()),
            request_timeout_secs: Some(3),
            ..Config::default()
        };
        cfg.set_city("澎湖縣").unwrap();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.selected_location().unwrap().station_name, "澎湖");
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "city = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
