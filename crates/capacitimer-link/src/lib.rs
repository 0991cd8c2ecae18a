//! capacitimer-link library crate.
//!
//! Connects a button panel to a Capacitimer countdown server: buttons issue
//! commands over HTTP, and live timer state flows back over a WebSocket (with
//! an HTTP polling fallback) into exported variables and button feedbacks.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Host framework (button panel)
//!         ↕  HostSurface / VariableInterpolator traits
//! [capacitimer-link]
//!   ├── domain/           ModuleConfig, host resolution
//!   ├── application/      State store, command channel, actions,
//!   │                     feedbacks, discovery tracking
//!   ├── infrastructure/
//!   │     ├── http/         reqwest transport
//!   │     ├── push/         tokio-tungstenite transport
//!   │     ├── sync_engine/  reconnect loop + polling fallback
//!   │     ├── storage/      TOML config file
//!   │     └── console_host/ HostSurface that logs through tracing
//!   └── instance          ModuleInstance facade (init / configUpdated / destroy)
//!         ↕  HTTP + WebSocket
//! Capacitimer server
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O.
//! - `application` depends on `domain`, `capacitimer-core`, and the port
//!   traits it declares (`HttpTransport`, `HostSurface`, …).
//! - `infrastructure` implements those ports with tokio, reqwest and
//!   tokio-tungstenite.

/// Domain layer: configuration and target resolution (no I/O).
pub mod domain;

/// Application layer: use cases and the ports they depend on.
pub mod application;

/// Infrastructure layer: network transports, sync engine, config storage.
pub mod infrastructure;

/// The facade a host embeds.
pub mod instance;

pub use instance::ModuleInstance;
