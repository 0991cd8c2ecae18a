//! Domain layer for capacitimer-link.
//!
//! Pure configuration types.  Nothing here opens a socket or reads a file;
//! the infrastructure layer populates [`ModuleConfig`] from disk or CLI flags.

pub mod config;

pub use config::{ModuleConfig, ParameterStyle, SharedConfig, Target};
