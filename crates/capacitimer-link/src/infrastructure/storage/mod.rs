//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads and writes the TOML file holding the
//! connection settings, falling back to defaults on first run.

pub mod config;

pub use config::{AppConfig, ConfigError};
