//! # capacitimer-core
//!
//! Shared library for Capacitimer Link containing the timer domain types, the
//! JSON wire messages spoken by a Capacitimer server, and the pure display
//! logic (time formatting, exported variables, feedback predicates).
//!
//! This crate has zero dependencies on sockets, HTTP clients, or async
//! runtimes.  Everything here can be unit-tested without a server.
//!
//! # Architecture overview
//!
//! A Capacitimer server owns the countdown.  It pushes snapshots of its state
//! over WebSocket and accepts commands over HTTP.  A control surface (a button
//! panel) wants two things from it: buttons that issue commands, and buttons
//! that change colour or text to reflect the live timer.
//!
//! - **`domain`** – `TimerState` (the server's countdown snapshot),
//!   `Settings` (the server's display preferences) and `DiscoveredInstance`
//!   (a server found on the LAN).
//!
//! - **`protocol`** – The JSON frames pushed over WebSocket, the
//!   `{success, state?}` envelope returned by HTTP commands, and the typed
//!   `TimerCommand` that maps onto an endpoint + body.
//!
//! - **`format`**, **`variables`**, **`feedback`** – Pure functions the
//!   integration layer runs every time a new snapshot arrives.

pub mod domain;
pub mod feedback;
pub mod format;
pub mod protocol;
pub mod variables;

// Re-export the most-used types at the crate root so callers can write
// `capacitimer_core::TimerState` instead of the full module path.
pub use domain::instance::DiscoveredInstance;
pub use domain::settings::{DisplayElement, Settings, SettingsPatch};
pub use domain::timer::{RunState, TimerState};
pub use feedback::FeedbackKind;
pub use format::format_time;
pub use protocol::messages::{decode_push_frame, CommandResponse, FrameError, PushFrame, TimerCommand};
pub use variables::{export_variables, VariableValues};
