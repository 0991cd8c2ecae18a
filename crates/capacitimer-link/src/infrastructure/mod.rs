//! Infrastructure layer for the Capacitimer integration.
//!
//! Contains the I/O-facing adapters: the reqwest HTTP transport, the
//! tokio-tungstenite push transport, the sync engine that drives them, TOML
//! config persistence, and a console `HostSurface` for the CLI.
//!
//! **Dependency rule**: this layer may depend on `application`, `domain` and
//! `capacitimer_core`, but MUST NOT be imported by the `application` or
//! `domain` layers.

pub mod console_host;
pub mod http;
pub mod push;
pub mod storage;
pub mod sync_engine;
