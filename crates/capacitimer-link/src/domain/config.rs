//! Connection configuration and host resolution.
//!
//! [`ModuleConfig`] is what the user edits in the host's connection settings.
//! [`ModuleConfig::resolve_target`] turns it into a concrete [`Target`] using
//! a fixed precedence:
//!
//! 1. the explicitly configured host, when non-blank;
//! 2. otherwise the host picked from the discovery list;
//! 3. otherwise nothing, and callers fail fast without touching the network.
//!
//! # Runtime updates
//!
//! [`SharedConfig`] is the one place the config is mutated at runtime (on
//! reconfiguration).  Every reader resolves the target afresh, so a command
//! issued after `config_updated` always uses the new host.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Shortest poll cadence honoured; smaller values (including 0) are raised
/// to this.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// User-facing connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Explicit server address.  Blank or absent means "use discovery".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// The address picked from the discovery list, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovered_host: Option<String>,

    /// HTTP port of the server's REST API.
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// WebSocket port of the server's push channel.
    #[serde(default = "default_ws_port")]
    pub ws_port: u16,

    /// Whether numeric action parameters are plain numbers or
    /// variable-interpolated text fields.
    #[serde(default)]
    pub parameter_style: ParameterStyle,

    /// Fixed delay between WebSocket reconnect attempts.
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,

    /// Cadence of the HTTP polling fallback.  Never faster than
    /// [`MIN_POLL_INTERVAL`].
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// How numeric action parameters are presented in the action schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterStyle {
    /// Number inputs with min/max.
    Numeric,
    /// Text inputs that accept `$(variable)` references.
    #[default]
    InterpolatedText,
}

/// A fully resolved server address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub http_port: u16,
    pub ws_port: u16,
}

fn default_http_port() -> u16 {
    80
}
fn default_ws_port() -> u16 {
    3001
}
fn default_reconnect_delay_secs() -> u64 {
    5
}
fn default_poll_interval_ms() -> u64 {
    1000
}

impl Default for ModuleConfig {
    /// No host configured; standard Capacitimer ports.
    ///
    /// | Field                | Default          |
    /// |----------------------|------------------|
    /// | http_port            | 80               |
    /// | ws_port              | 3001             |
    /// | parameter_style      | interpolated_text|
    /// | reconnect_delay_secs | 5                |
    /// | poll_interval_ms     | 1000             |
    fn default() -> Self {
        Self {
            host: None,
            discovered_host: None,
            http_port: default_http_port(),
            ws_port: default_ws_port(),
            parameter_style: ParameterStyle::default(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl ModuleConfig {
    /// Convenience constructor for an explicitly addressed server.
    pub fn with_host(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            ..Self::default()
        }
    }

    /// Resolves the server address: explicit host, then discovery selection.
    pub fn resolve_target(&self) -> Option<Target> {
        let host = non_blank(self.host.as_deref())
            .or_else(|| non_blank(self.discovered_host.as_deref()))?;
        Some(Target {
            host: host.to_string(),
            http_port: self.http_port,
            ws_port: self.ws_port,
        })
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms).max(MIN_POLL_INTERVAL)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl Target {
    /// `http://{host}:{http_port}{path}`.
    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}:{}{path}", self.url_host(), self.http_port)
    }

    /// `ws://{host}:{ws_port}`.
    pub fn ws_url(&self) -> String {
        format!("ws://{}:{}", self.url_host(), self.ws_port)
    }

    /// IPv6 literals need brackets inside a URL authority.
    fn url_host(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        }
    }
}

/// The live configuration, shared between the command channel and the
/// module instance.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig(Arc<RwLock<ModuleConfig>>);

impl SharedConfig {
    pub fn new(config: ModuleConfig) -> Self {
        Self(Arc::new(RwLock::new(config)))
    }

    /// Returns a copy of the current configuration.
    pub fn get(&self) -> ModuleConfig {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Replaces the configuration wholesale.
    pub fn replace(&self, config: ModuleConfig) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = config;
    }

    /// Resolves the target against the current configuration.
    pub fn resolve_target(&self) -> Option<Target> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .resolve_target()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
