use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::{Config, MAX_TIMEOUT_SECS};

/// Project-local configuration directory.
pub const CONFIG_DIR: &str = ".atlas";

/// Prefix of environment overrides; `__` separates nested keys.
pub const ENV_PREFIX: &str = "ATLAS_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid worker interval_secs: {0}. Must be at least 1")]
    InvalidInterval(u64),

    #[error(
        "Invalid lease_timeout_secs: {0}. Must be longer than the worker interval ({1}s)"
    )]
    InvalidLeaseTimeout(u64, u64),

    #[error("Worker work_type cannot be empty")]
    EmptyWorkType,

    #[error("Invalid download_timeout_ms: {0}. Must be at least 1")]
    InvalidDownloadTimeout(u64),

    #[error("{field} is too large: {value}. Must be at most {max}")]
    TimeoutTooLarge {
        field: &'static str,
        value: u64,
        max: u64,
    },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .atlas/config.yaml
    /// 3. .atlas/local.yaml (optional)
    /// 4. Environment variables (ATLAS_* prefix)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(CONFIG_DIR)
    }

    /// Same as [`ConfigLoader::load`] with the configuration directory
    /// rooted elsewhere.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Config> {
        let dir = dir.as_ref();
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(
                config.logging.rotation.clone(),
            ));
        }

        let bounded = [
            ("worker.interval_secs", config.worker.interval_secs, MAX_TIMEOUT_SECS),
            ("worker.lease_timeout_secs", config.worker.lease_timeout_secs, MAX_TIMEOUT_SECS),
            ("resolution.retry_timeout_secs", config.resolution.retry_timeout_secs, MAX_TIMEOUT_SECS),
            (
                "resolution.download_timeout_ms",
                config.resolution.download_timeout_ms,
                MAX_TIMEOUT_SECS * 1000,
            ),
        ];
        for (field, value, max) in bounded {
            if value > max {
                return Err(ConfigError::TimeoutTooLarge { field, value, max });
            }
        }

        if config.worker.interval_secs == 0 {
            return Err(ConfigError::InvalidInterval(config.worker.interval_secs));
        }

        // A lease shorter than a tick would be reclaimed while still in use.
        if config.worker.lease_timeout_secs <= config.worker.interval_secs {
            return Err(ConfigError::InvalidLeaseTimeout(
                config.worker.lease_timeout_secs,
                config.worker.interval_secs,
            ));
        }

        if config.worker.work_type.trim().is_empty() {
            return Err(ConfigError::EmptyWorkType);
        }

        if config.resolution.download_timeout_ms == 0 {
            return Err(ConfigError::InvalidDownloadTimeout(
                config.resolution.download_timeout_ms,
            ));
        }

        if !config.node.address.is_empty() && !config.node.address.starts_with("0x") {
            return Err(ConfigError::ValidationFailed(format!(
                "node address '{}' must be 0x-prefixed",
                config.node.address
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::{ResolutionMode, StrategyKind};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.database.path, ".atlas/atlas.db");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.worker.work_type, "AtlasChallengeResolution");
        assert_eq!(config.worker.mode, ResolutionMode::One);
        assert_eq!(config.resolution.strategy, StrategyKind::ResolveAll);
        assert_eq!(config.resolution.retry_timeout_secs, 86_400);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
node:
  address: '0xAbC'
database:
  path: /custom/path.db
  max_connections: 3
logging:
  level: debug
  format: pretty
worker:
  interval_secs: 2
  mode: all
resolution:
  strategy: resolve_none
  retry_timeout_secs: 120
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.node.address, "0xAbC");
        assert_eq!(config.database.path, "/custom/path.db");
        assert_eq!(config.database.max_connections, 3);
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.worker.interval_secs, 2);
        assert_eq!(config.worker.mode, ResolutionMode::All);
        assert_eq!(config.worker.lease_timeout_secs, 600, "unset fields keep defaults");
        assert_eq!(config.resolution.strategy, StrategyKind::ResolveNone);

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "loud"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidLogFormat(_)
        ));
    }

    #[test]
    fn test_validate_empty_database_path() {
        let mut config = Config::default();
        config.database.path = String::new();

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::EmptyDatabasePath
        ));
    }

    #[test]
    fn test_validate_zero_interval() {
        let mut config = Config::default();
        config.worker.interval_secs = 0;

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidInterval(0)
        ));
    }

    #[test]
    fn test_validate_lease_shorter_than_interval() {
        let mut config = Config::default();
        config.worker.interval_secs = 30;
        config.worker.lease_timeout_secs = 10;

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidLeaseTimeout(10, 30)
        ));
    }

    #[test]
    fn test_validate_rejects_unrepresentable_timeouts() {
        let mut config = Config::default();
        config.resolution.retry_timeout_secs = u64::MAX;
        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::TimeoutTooLarge { field, value, .. } => {
                assert_eq!(field, "resolution.retry_timeout_secs");
                assert_eq!(value, u64::MAX);
            }
            other => panic!("Expected TimeoutTooLarge error, got {other:?}"),
        }

        let mut config = Config::default();
        config.worker.lease_timeout_secs = u64::MAX;
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::TimeoutTooLarge {
                field: "worker.lease_timeout_secs",
                ..
            }
        ));

        let mut config = Config::default();
        config.resolution.download_timeout_ms = u64::MAX;
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::TimeoutTooLarge { .. }
        ));

        let mut config = Config::default();
        config.resolution.retry_timeout_secs = MAX_TIMEOUT_SECS;
        ConfigLoader::validate(&config).expect("the bound itself is accepted");
    }

    #[test]
    fn test_validate_empty_work_type() {
        let mut config = Config::default();
        config.worker.work_type = "  ".to_string();

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::EmptyWorkType
        ));
    }

    #[test]
    fn test_validate_node_address_prefix() {
        let mut config = Config::default();
        config.node.address = "abc".to_string();

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::ValidationFailed(_)
        ));
    }

    #[test]
    fn test_env_override() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.yaml"), "worker:\n  interval_secs: 7\n").unwrap();

        let config = temp_env::with_vars(
            [
                ("ATLAS_WORKER__INTERVAL_SECS", Some("9")),
                ("ATLAS_LOGGING__LEVEL", Some("debug")),
                ("ATLAS_NODE__ADDRESS", Some("0xbeef")),
            ],
            || ConfigLoader::load_from_dir(dir.path()),
        )
        .unwrap();

        assert_eq!(config.worker.interval_secs, 9, "env should win over file");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.node.address, "0xbeef");
    }

    #[test]
    fn test_hierarchical_merging() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.yaml"),
            "logging:\n  level: info\n  format: pretty\nworker:\n  mode: all\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("local.yaml"), "logging:\n  level: debug\n").unwrap();

        let config = temp_env::with_vars_unset(
            ["ATLAS_LOGGING__LEVEL", "ATLAS_LOGGING__FORMAT", "ATLAS_WORKER__MODE"],
            || ConfigLoader::load_from_dir(dir.path()),
        )
        .unwrap();

        assert_eq!(config.logging.level, "debug", "local.yaml should win");
        assert_eq!(config.logging.format, "pretty", "config.yaml value should persist");
        assert_eq!(config.worker.mode, ResolutionMode::All);
    }

    #[test]
    fn test_load_from_file_rejects_invalid_values() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "database:\n  max_connections: 0").unwrap();
        file.flush().unwrap();

        let err = ConfigLoader::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("max_connections"));
    }
}
