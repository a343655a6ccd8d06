use serde::{Deserialize, Serialize};

/// Upper bound for every configured timeout and interval, in seconds (ten
/// years). Larger values overflow timestamp arithmetic.
pub const MAX_TIMEOUT_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// `secs` as a signed duration, or `None` when it exceeds
/// [`MAX_TIMEOUT_SECS`].
pub fn duration_from_secs(secs: u64) -> Option<chrono::Duration> {
    if secs > MAX_TIMEOUT_SECS {
        return None;
    }
    i64::try_from(secs).ok().and_then(chrono::Duration::try_seconds)
}

/// Main configuration structure for the resolver node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Identity of this node on the ledger
    #[serde(default)]
    pub node: NodeConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Periodic worker configuration
    #[serde(default)]
    pub worker: WorkerConfig,

    /// Resolution policy configuration
    #[serde(default)]
    pub resolution: ResolutionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node: NodeConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            worker: WorkerConfig::default(),
            resolution: ResolutionConfig::default(),
        }
    }
}

/// Node identity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NodeConfig {
    /// Ledger address this node resolves as
    #[serde(default)]
    pub address: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file, shared by all processes of the node
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".atlas/atlas.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    pub fn url(&self) -> String {
        format!("sqlite:{}", self.path)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Rotation of file logs: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// How many propositions a tick resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMode {
    /// Stop after the first successful resolution
    #[default]
    One,
    /// Attempt every open proposition
    All,
}

/// Periodic worker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WorkerConfig {
    /// Seconds between ticks
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Seconds after which a held lease is considered abandoned
    #[serde(default = "default_lease_timeout_secs")]
    pub lease_timeout_secs: u64,

    /// Lease key shared by all processes of this node
    #[serde(default = "default_work_type")]
    pub work_type: String,

    /// Resolve one or all open propositions per tick
    #[serde(default)]
    pub mode: ResolutionMode,
}

const fn default_interval_secs() -> u64 {
    5
}

const fn default_lease_timeout_secs() -> u64 {
    600
}

fn default_work_type() -> String {
    "AtlasChallengeResolution".to_string()
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            lease_timeout_secs: default_lease_timeout_secs(),
            work_type: default_work_type(),
            mode: ResolutionMode::default(),
        }
    }
}

/// Participation strategy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    ResolveAll,
    ResolveNone,
}

/// Resolution policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResolutionConfig {
    /// Participation strategy
    #[serde(default)]
    pub strategy: StrategyKind,

    /// Backoff after a failed resolution, in seconds
    #[serde(default = "default_retry_timeout_secs")]
    pub retry_timeout_secs: u64,

    /// Timeout for a single bundle download, in milliseconds
    #[serde(default = "default_download_timeout_ms")]
    pub download_timeout_ms: u64,
}

const fn default_retry_timeout_secs() -> u64 {
    86_400
}

const fn default_download_timeout_ms() -> u64 {
    10_000
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            retry_timeout_secs: default_retry_timeout_secs(),
            download_timeout_ms: default_download_timeout_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_from_secs_is_bounded() {
        assert_eq!(duration_from_secs(600), Some(chrono::Duration::seconds(600)));
        assert_eq!(
            duration_from_secs(MAX_TIMEOUT_SECS),
            Some(chrono::Duration::seconds(315_360_000))
        );
        assert_eq!(duration_from_secs(MAX_TIMEOUT_SECS + 1), None);
        assert_eq!(duration_from_secs(u64::MAX), None);
    }
}
