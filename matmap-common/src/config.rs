//! Bootstrap configuration
//!
//! Settings are resolved in priority order:
//! 1. Command-line arguments (handled by the binary)
//! 2. Environment variables
//! 3. TOML config file
//! 4. Compiled defaults
//!
//! A missing config file at the default location is not an error: the service
//! logs a warning and starts with defaults. A file named explicitly (CLI or
//! `MATMAP_CONFIG`) must exist.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::compose::{
    CompositionPolicy, DEFAULT_FAR_RADIUS_M, DEFAULT_NEAR_RADIUS_M, DEFAULT_RADIUS_M,
};
use crate::{Error, Result};

/// Environment variable naming the config file
pub const ENV_CONFIG_PATH: &str = "MATMAP_CONFIG";
/// Environment variable holding the place-search API key
pub const ENV_PLACES_API_KEY: &str = "MATMAP_PLACES_API_KEY";

pub const DEFAULT_PORT: u16 = 5780;
pub const DEFAULT_PLACES_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Listen address
    pub host: String,
    /// HTTP server port
    pub port: u16,
    /// Keyword table override (built-in table when absent)
    pub keywords_file: Option<PathBuf>,
    pub places: PlacesConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            keywords_file: None,
            places: PlacesConfig::default(),
            search: SearchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Place-search provider settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlacesConfig {
    /// Provider API key. Never sent to clients.
    pub api_key: Option<String>,
    pub base_url: String,
    /// Result language (BCP-47)
    pub language: String,
    /// Region bias (ccTLD)
    pub region: String,
    pub timeout_secs: u64,
    /// Default photo width when the client does not ask for one
    pub photo_max_width: u32,
}

impl PlacesConfig {
    /// Configured API key, trimmed, or `None` when unset or blank
    pub fn usable_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .filter(|k| is_valid_key(k))
            .map(str::trim)
    }
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_PLACES_BASE_URL.to_string(),
            language: "ko".to_string(),
            region: "kr".to_string(),
            timeout_secs: 10,
            photo_max_width: 400,
        }
    }
}

/// Search radius settings, in meters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub near_radius_m: u32,
    pub far_radius_m: u32,
    pub default_radius_m: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            near_radius_m: DEFAULT_NEAR_RADIUS_M,
            far_radius_m: DEFAULT_FAR_RADIUS_M,
            default_radius_m: DEFAULT_RADIUS_M,
        }
    }
}

impl SearchConfig {
    /// Composition policy using these radii
    pub fn policy(&self) -> CompositionPolicy {
        CompositionPolicy {
            near_radius_m: self.near_radius_m,
            far_radius_m: self.far_radius_m,
            default_radius_m: self.default_radius_m,
            ..CompositionPolicy::default()
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Resolve, load and apply environment overrides
    ///
    /// `cli_path` is the `--config` argument, if any.
    pub fn resolve(cli_path: Option<&Path>) -> Result<Self> {
        let mut config = match resolve_config_path(cli_path) {
            ConfigSource::Explicit(path) | ConfigSource::Default(path) => {
                info!("Loading config from {}", path.display());
                Self::load(&path)?
            }
            ConfigSource::None => {
                warn!("No config file found, using compiled defaults");
                Self::default()
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Environment values take priority over the TOML file
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(ENV_PLACES_API_KEY) {
            if is_valid_key(&key) {
                if self.places.api_key.as_deref().is_some_and(is_valid_key) {
                    warn!(
                        "Places API key found in both {} and TOML; using environment",
                        ENV_PLACES_API_KEY
                    );
                }
                self.places.api_key = Some(key.trim().to_string());
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let s = &self.search;
        if s.near_radius_m == 0 || s.far_radius_m == 0 || s.default_radius_m == 0 {
            return Err(Error::Config("search radii must be positive".to_string()));
        }
        if s.near_radius_m > s.far_radius_m {
            return Err(Error::Config(format!(
                "near_radius_m ({}) exceeds far_radius_m ({})",
                s.near_radius_m, s.far_radius_m
            )));
        }
        if self.places.photo_max_width == 0 {
            return Err(Error::Config("photo_max_width must be positive".to_string()));
        }
        Ok(())
    }
}

/// Where the config file came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named on the command line or via `MATMAP_CONFIG`
    Explicit(PathBuf),
    /// Found at the platform default location
    Default(PathBuf),
    None,
}

/// Locate the config file
pub fn resolve_config_path(cli_path: Option<&Path>) -> ConfigSource {
    if let Some(path) = cli_path {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
        if !path.trim().is_empty() {
            return ConfigSource::Explicit(PathBuf::from(path));
        }
    }

    match default_config_path() {
        Some(path) if path.exists() => ConfigSource::Default(path),
        _ => ConfigSource::None,
    }
}

/// `<config_dir>/matmap/config.toml` for the current platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("matmap").join("config.toml"))
}

/// Non-empty, non-whitespace key
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.places.base_url, DEFAULT_PLACES_BASE_URL);
        assert_eq!(config.search.near_radius_m, DEFAULT_NEAR_RADIUS_M);
        assert!(config.keywords_file.is_none());
    }

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("abc"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   "));
    }

    #[test]
    fn test_blank_api_key_is_unset() {
        let config = TomlConfig::from_toml_str("[places]\napi_key = \"  \"\n").unwrap();
        assert_eq!(config.places.usable_api_key(), None);

        let config = TomlConfig::from_toml_str("[places]\napi_key = \" abc \"\n").unwrap();
        assert_eq!(config.places.usable_api_key(), Some("abc"));
    }

    #[test]
    fn test_zero_radius_rejected() {
        let result = TomlConfig::from_toml_str("[search]\nnear_radius_m = 0\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_near_beyond_far_rejected() {
        let result =
            TomlConfig::from_toml_str("[search]\nnear_radius_m = 9000\nfar_radius_m = 5000\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_search_policy_uses_radii() {
        let config = TomlConfig::from_toml_str("[search]\ndefault_radius_m = 7000\n").unwrap();
        let policy = config.search.policy();
        assert_eq!(policy.default_radius_m, 7000);
        assert_eq!(policy.near_radius_m, DEFAULT_NEAR_RADIUS_M);
    }
}
