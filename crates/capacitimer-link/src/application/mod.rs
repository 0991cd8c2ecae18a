//! Application layer use cases for the Capacitimer integration.
//!
//! Use cases here orchestrate the pure core types and talk to the outside
//! world only through traits (`HostSurface`, `VariableInterpolator`,
//! `HttpTransport`).  Concrete transports live in `infrastructure`.
//!
//! # Sub-modules
//!
//! - **`host`** – The host framework contract and the schema types handed to
//!   it (action/feedback definitions, option values).
//!
//! - **`state_store`** – The single place TimerState and Settings are
//!   written.  Every write re-exports variables and asks the host to
//!   re-evaluate feedbacks.
//!
//! - **`send_command`** – HTTP command channel: resolves the host, posts a
//!   command, applies the returned snapshot.
//!
//! - **`dispatch_action`** – Maps a pressed button (action id + options) to a
//!   command.
//!
//! - **`evaluate_feedback`** – Feedback definitions and their evaluation
//!   against the stored state.
//!
//! - **`track_discovery`** – Keeps the list of servers seen on the LAN.

pub mod dispatch_action;
pub mod evaluate_feedback;
pub mod host;
pub mod send_command;
pub mod state_store;
pub mod track_discovery;

#[cfg(test)]
pub(crate) mod test_support;
