//! Domain entities for Capacitimer Link.
//!
//! Everything in this module is plain data mirrored from the server.  The
//! client never computes elapsed time itself; it only interprets the snapshot
//! it was last told about.

/// Countdown snapshot and the derived run state.
pub mod timer;

/// Display preferences cached from the server.
pub mod settings;

/// Servers discovered on the local network.
pub mod instance;
