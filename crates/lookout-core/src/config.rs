//! Configuration management for Lookout.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/lookout/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Job store settings
    pub storage: StorageConfig,
    /// Probe execution settings
    pub probing: ProbingConfig,
}

impl AppConfig {
    /// Load configuration from the default location, falling back to defaults
    /// if the file does not exist.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path.
    ///
    /// Unlike [`AppConfig::load`], a missing file is an error.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// See [`AppConfig::apply_env`] for the supported variables.
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `LOOKOUT_HOST`: Override listen host
    /// - `LOOKOUT_PORT`: Override listen port
    /// - `LOOKOUT_DATABASE`: Override job database path
    /// - `LOOKOUT_PROBE_TIMEOUT_SECS`: Override per-probe timeout
    /// - `LOOKOUT_SITES_DIR`: Override site definitions directory
    pub fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("LOOKOUT_HOST") {
            tracing::debug!("Override server.host from env: {}", val);
            self.server.host = val;
        }

        if let Ok(val) = std::env::var("LOOKOUT_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
                tracing::debug!("Override server.port from env: {}", port);
            }
        }

        if let Ok(val) = std::env::var("LOOKOUT_DATABASE") {
            tracing::debug!("Override storage.database_path from env: {}", val);
            self.storage.database_path = Some(PathBuf::from(val));
        }

        if let Ok(val) = std::env::var("LOOKOUT_PROBE_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.probing.timeout_secs = secs;
                tracing::debug!("Override probing.timeout_secs from env: {}", secs);
            }
        }

        if let Ok(val) = std::env::var("LOOKOUT_SITES_DIR") {
            tracing::debug!("Override probing.sites_dir from env: {}", val);
            self.probing.sites_dir = Some(PathBuf::from(val));
        }
    }

    /// Check values that deserialize fine but make no sense.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.probing.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "probing.timeout_secs".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.probing.max_concurrent_probes == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "probing.max_concurrent_probes".to_string(),
                reason: "must be at least 1 when set".to_string(),
            });
        }

        if self.probing.max_concurrent_jobs == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "probing.max_concurrent_jobs".to_string(),
                reason: "must be at least 1 when set".to_string(),
            });
        }

        if self.storage.retention_days == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "storage.retention_days".to_string(),
                reason: "must be at least 1 when set (omit it to keep jobs forever)".to_string(),
            });
        }

        Ok(())
    }

    /// Save configuration to the default location.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/lookout/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("org", "lookout", "lookout").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/lookout`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("org", "lookout", "lookout").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Resolve the job database path, defaulting to `<data_dir>/lookout.db`.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        match &self.storage.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("lookout.db")),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
        }
    }
}

/// Job store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// `SQLite` database file; defaults to the data directory
    pub database_path: Option<PathBuf>,
    /// Days to keep finished jobs. `None` keeps them forever.
    pub retention_days: Option<u32>,
}

impl StorageConfig {
    /// Retention window as a duration, if eviction is enabled.
    #[must_use]
    pub fn retention(&self) -> Option<Duration> {
        self.retention_days
            .map(|days| Duration::from_secs(u64::from(days) * 24 * 60 * 60))
    }
}

/// Probe execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbingConfig {
    /// Per-probe timeout in seconds
    pub timeout_secs: u64,
    /// Cap on simultaneously running probes within one job (`None` = all at once)
    pub max_concurrent_probes: Option<usize>,
    /// Cap on simultaneously running jobs (`None` = unbounded)
    pub max_concurrent_jobs: Option<usize>,
    /// User agent sent with every probe request
    pub user_agent: String,
    /// Directory containing site definition TOML files
    pub sites_dir: Option<PathBuf>,
}

impl ProbingConfig {
    /// Per-probe timeout as a duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProbingConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_concurrent_probes: None,
            max_concurrent_jobs: None,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0"
                .to_string(),
            sites_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.probing.timeout_secs, 10);
        assert_eq!(config.probing.timeout(), Duration::from_secs(10));
        assert!(config.probing.max_concurrent_jobs.is_none());
        assert!(config.storage.retention().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[probing]"));

        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(parsed.server.port, config.server.port);
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");

        let mut config = AppConfig::default();
        config.server.port = 8080;
        config.storage.retention_days = Some(7);

        let contents = toml::to_string_pretty(&config).expect("serialize config");
        fs::write(&config_path, contents).expect("write config file");

        let loaded = AppConfig::load_from(&config_path).expect("load config");
        assert_eq!(loaded.server.port, 8080);
        assert_eq!(
            loaded.storage.retention(),
            Some(Duration::from_secs(7 * 24 * 60 * 60))
        );
    }

    #[test]
    fn test_load_from_missing_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let result = AppConfig::load_from(&tmp.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[probing]
timeout_secs = 3
max_concurrent_jobs = 4
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.probing.timeout_secs, 3);
        assert_eq!(config.probing.max_concurrent_jobs, Some(4));
        // These should be defaults
        assert_eq!(config.server.port, 5001);
        assert!(config.storage.database_path.is_none());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = AppConfig::default();
        config.probing.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.storage.retention_days = Some(0);
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.probing.max_concurrent_probes = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_database_path_wins() {
        let mut config = AppConfig::default();
        config.storage.database_path = Some(PathBuf::from("/tmp/jobs.db"));
        assert_eq!(
            config.database_path().expect("resolve path"),
            PathBuf::from("/tmp/jobs.db")
        );
    }
}
