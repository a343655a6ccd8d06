//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - YAML file loading from `.atlas/`
//! - Environment variable overrides (`ATLAS_` prefix)
//! - Configuration validation

pub mod loader;

pub use loader::{ConfigError, ConfigLoader, CONFIG_DIR, ENV_PREFIX};
