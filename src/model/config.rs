use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::DatabaseConfig;

const ENV_CONFIG_PATH: &str = "MRNA_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_GEOJSON_PATH: &str = "countries.geojson";
const DEFAULT_MAX_PRICE: f64 = 25.0;

/// Choropleth map configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Path of the country boundary GeoJSON file
    pub geojson_path: PathBuf,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            geojson_path: PathBuf::from(DEFAULT_GEOJSON_PATH),
        }
    }
}

/// Defaults applied to the filtered table views
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Price ceiling used by the contracts view when the request names none
    pub default_max_price: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_max_price: DEFAULT_MAX_PRICE,
        }
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub views: ViewConfig,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub map: MapConfig,
    pub views: ViewConfig,
    pub database: DatabaseConfig,
    pub port: u16,
    pub host: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            map: MapConfig::default(),
            views: ViewConfig::default(),
            database: DatabaseConfig::default(),
            port: 8080,
            host: "127.0.0.1".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let config_path = std::env::var(ENV_CONFIG_PATH)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let file = Self::load_config_file(Path::new(&config_path)).unwrap_or_default();

        Self {
            map: file.map,
            views: file.views,
            database: DatabaseConfig::from_env(),
            port,
            host,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &Path) -> Option<ConfigFile> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse_config(&contents) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), "Loaded configuration from file");
                    Some(config)
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                    None
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    fn parse_config(contents: &str) -> Result<ConfigFile, serde_yaml::Error> {
        let contents = contents.trim();
        if contents.is_empty() {
            return Ok(ConfigFile::default());
        }
        serde_yaml::from_str(contents)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
