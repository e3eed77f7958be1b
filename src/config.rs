//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::report::{ReportBranding, ReportLocale, ReportSettings};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Record store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

fn default_database_path() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("hope").join("records.db").to_string_lossy().to_string())
        .unwrap_or_else(|| "./hope_data/records.db".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Report presentation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub locale: ReportLocale,

    #[serde(default = "default_hospital_name")]
    pub hospital_name: String,

    #[serde(default = "default_footer")]
    pub footer: String,
}

fn default_hospital_name() -> String {
    ReportBranding::default().hospital_name
}

fn default_footer() -> String {
    ReportBranding::default().footer
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            locale: ReportLocale::default(),
            hospital_name: default_hospital_name(),
            footer: default_footer(),
        }
    }
}

impl ReportConfig {
    /// Settings handed to the report engine
    pub fn settings(&self) -> ReportSettings {
        ReportSettings {
            locale: self.locale,
            branding: ReportBranding {
                hospital_name: self.hospital_name.clone(),
                footer: self.footer.clone(),
            },
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Install the global tracing subscriber
    ///
    /// `RUST_LOG` wins over the configured level. Calling this twice is a no-op.
    pub fn init(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("hope={},tower_http={}", self.level, self.level))
        });

        let result = if self.format.eq_ignore_ascii_case("json") {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .try_init()
        };

        if let Err(e) = result {
            tracing::debug!("Tracing subscriber already installed: {}", e);
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    ///
    /// Nothing is logged here since the subscriber is normally installed from
    /// the loaded config. Call [`ConfigSource::log`] once logging is up.
    pub fn load_default() -> (Self, ConfigSource) {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("hope").join("config.toml")),
            Some(PathBuf::from("/etc/hope/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::load_first(&config_paths)
    }

    /// Load the first candidate that exists and parses, remembering failures
    fn load_first(candidates: &[PathBuf]) -> (Self, ConfigSource) {
        let mut source = ConfigSource::default();

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_with_env(path) {
                Ok(config) => {
                    source.path = Some(path.clone());
                    return (config, source);
                }
                Err(e) => source.skipped.push(e),
            }
        }

        (Self::from_env(), source)
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Storage overrides
        if let Some(path) = var("HOPE_DATABASE_PATH") {
            self.storage.database_path = path;
        }

        // API overrides
        if let Some(host) = var("HOPE_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("HOPE_API_PORT") {
            match port.parse() {
                Ok(p) => self.api.port = p,
                Err(_) => tracing::warn!("Ignoring invalid HOPE_API_PORT: {}", port),
            }
        }

        // Report overrides
        if let Some(locale) = var("HOPE_REPORT_LOCALE") {
            match ReportLocale::parse(&locale) {
                Some(l) => self.report.locale = l,
                None => tracing::warn!("Ignoring unknown HOPE_REPORT_LOCALE: {}", locale),
            }
        }
        if let Some(name) = var("HOPE_HOSPITAL_NAME") {
            self.report.hospital_name = name;
        }

        // Logging overrides
        if let Some(level) = var("HOPE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("HOPE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Where [`Config::load_default`] found its settings
#[derive(Debug, Default)]
pub struct ConfigSource {
    /// File the config came from, `None` for defaults plus environment
    pub path: Option<PathBuf>,
    /// Files that existed but could not be loaded
    pub skipped: Vec<ConfigError>,
}

impl ConfigSource {
    pub fn log(&self) {
        for error in &self.skipped {
            tracing::warn!("Ignoring config file: {}", error);
        }

        match &self.path {
            Some(path) => tracing::info!("Loaded config from {:?}", path),
            None => tracing::info!("Using default config with environment overrides"),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# HOPE Configuration
#
# Environment variables override these settings:
# - HOPE_DATABASE_PATH
# - HOPE_API_HOST
# - HOPE_API_PORT
# - HOPE_REPORT_LOCALE
# - HOPE_HOSPITAL_NAME
# - HOPE_LOG_LEVEL
# - HOPE_LOG_FORMAT

[storage]
# SQLite database holding record creation times
database_path = "./hope_data/records.db"

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 3000

# Allowed CORS origins (empty = allow any)
cors_origins = []

# Request timeout in seconds
request_timeout_secs = 30

[report]
# Report language: en or es
locale = "en"

# Hospital name shown in the title and summary
hospital_name = "HOPE"

# Footer line printed at the bottom of every report
footer = "Hospital HOPE - Calle Falsa 123, Ciudad - Tel: +502 1234-5678"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();

        assert_eq!(config.storage.database_path, "./hope_data/records.db");
        assert_eq!(config.api.port, 3000);
        assert_eq!(config.api.request_timeout_secs, 30);
        assert_eq!(config.report.locale, ReportLocale::En);
        assert_eq!(config.report.hospital_name, "HOPE");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [report]
            locale = "es"
            hospital_name = "San Juan"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.addr(), "0.0.0.0:3000");
        let settings = config.report.settings();
        assert_eq!(settings.locale, ReportLocale::Es);
        assert_eq!(settings.branding.hospital_name, "San Juan");
        assert_eq!(settings.branding.footer, ReportBranding::default().footer);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("HOPE_DATABASE_PATH", "/tmp/records.db"),
            ("HOPE_API_PORT", "9090"),
            ("HOPE_REPORT_LOCALE", "ES"),
            ("HOPE_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.storage.database_path, "/tmp/records.db");
        assert_eq!(config.api.port, 9090);
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.report.locale, ReportLocale::Es);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_invalid_overrides_are_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "HOPE_API_PORT" => Some("not-a-port".to_string()),
            "HOPE_REPORT_LOCALE" => Some("klingon".to_string()),
            _ => None,
        });

        assert_eq!(config.api.port, 3000);
        assert_eq!(config.report.locale, ReportLocale::En);
    }

    #[test]
    fn test_broken_config_is_reported_and_skipped() {
        let dir = tempdir().unwrap();
        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[report\nlocale = ").unwrap();
        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[report]\nhospital_name = \"San Juan\"\n").unwrap();
        let missing = dir.path().join("missing.toml");

        let (config, source) = Config::load_first(&[missing, broken.clone(), good.clone()]);

        assert_eq!(config.report.hospital_name, "San Juan");
        assert_eq!(source.path, Some(good));
        assert_eq!(source.skipped.len(), 1);
        assert!(matches!(
            &source.skipped[0],
            ConfigError::Parse { path, .. } if *path == broken
        ));
    }

    #[test]
    fn test_no_config_file_uses_defaults() {
        let dir = tempdir().unwrap();

        let (config, source) = Config::load_first(&[dir.path().join("absent.toml")]);

        assert!(source.path.is_none());
        assert!(source.skipped.is_empty());
        assert_eq!(config.api.request_timeout_secs, 30);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();

        let missing = Config::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));

        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[api\nport = ").unwrap();
        let broken = Config::load(&path).unwrap_err();
        assert!(matches!(broken, ConfigError::Parse { .. }));
    }
}
