use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::domain::Coordinates;

/// Environment variable holding the provider credential. It is never read
/// from the config file or the command line.
pub const API_KEY_ENV: &str = "MAPS_API_KEY";

const APP: &str = "restomap";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0:?}")]
    NotFound(PathBuf),

    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Provider credential. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Blank values count as "not configured"
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into().trim().to_string();
        if value.is_empty() { None } else { Some(Self(value)) }
    }

    pub fn from_env() -> Option<Self> {
        std::env::var(API_KEY_ENV).ok().and_then(Self::new)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

fn default_city() -> String {
    "Vilnius".to_string()
}
fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8888
}
fn default_geocode_url() -> String {
    "https://maps.googleapis.com/maps/api/geocode/json".to_string()
}
fn default_text_search_url() -> String {
    "https://maps.googleapis.com/maps/api/place/textsearch/json".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_center_lat() -> f64 {
    54.6872
}
fn default_center_lng() -> f64 {
    25.2797
}
fn default_zoom() -> u8 {
    13
}

#[derive(Debug, Deserialize)]
pub struct FileConfig {
    #[serde(default = "default_city")]
    pub default_city: String,
    /// Remote proxy endpoint (`http://host:port/proxy`). When unset the CLI
    /// runs the gateway in-process.
    #[serde(default)]
    pub proxy_url: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub map: MapConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            default_city: default_city(),
            proxy_url: None,
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
            map: MapConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,
    #[serde(default = "default_text_search_url")]
    pub text_search_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            geocode_url: default_geocode_url(),
            text_search_url: default_text_search_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Initial map view before the first search recenters it
#[derive(Debug, Deserialize, Clone)]
pub struct MapConfig {
    #[serde(default = "default_center_lat")]
    pub center_lat: f64,
    #[serde(default = "default_center_lng")]
    pub center_lng: f64,
    #[serde(default = "default_zoom")]
    pub zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lat: default_center_lat(),
            center_lng: default_center_lng(),
            zoom: default_zoom(),
        }
    }
}

impl MapConfig {
    pub fn center(&self) -> Coordinates {
        Coordinates::new(self.center_lat, self.center_lng)
    }
}

impl FileConfig {
    /// Load the first parsable config file from the well-known locations.
    pub fn load() -> Option<Self> {
        for path in config_paths() {
            if !path.exists() {
                continue;
            }
            match Self::from_path(&path) {
                Ok(config) => return Some(config),
                Err(e) => tracing::warn!("Skipping config file: {}", e),
            }
        }
        None
    }

    /// Load an explicitly requested config file
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Working directory first, then the platform config dir, then home
fn config_paths() -> Vec<PathBuf> {
    let file = format!("{}.toml", APP);
    let hidden = format!(".{}", file);
    let mut paths = vec![PathBuf::from(&file), PathBuf::from(&hidden)];

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join(APP).join("config.toml"));
        paths.push(config_dir.join(&file));
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(&hidden));
        paths.push(home.join(".config").join(APP).join("config.toml"));
    }

    paths
}
