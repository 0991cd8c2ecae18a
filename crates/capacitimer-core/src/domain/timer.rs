//! Countdown snapshot pushed by the Capacitimer server.
//!
//! A [`TimerState`] is always replaced wholesale: a new snapshot from the
//! WebSocket, from the HTTP poller, or from a command response overwrites the
//! previous one entirely.  Nothing in this crate patches individual fields.
//!
//! # Run state
//!
//! The server reports two booleans, `isRunning` and `isPaused`, but they are
//! not independent.  Together they encode three states:
//!
//! | isRunning | isPaused | RunState  |
//! |-----------|----------|-----------|
//! | false     | false    | Stopped   |
//! | true      | false    | Running   |
//! | any       | true     | Paused    |
//!
//! `isPaused` wins over `isRunning`; see [`TimerState::run_state`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Snapshot of the server's countdown.
///
/// The JSON representation uses camelCase keys, exactly as the server sends
/// them:
///
/// ```json
/// {"timeRemaining":-75,"isRunning":true,"isPaused":false,"lastSetTime":300,
///  "endTime":1700000000000,"pausedTimeRemaining":0,"startTime":1699999700000,
///  "initialTimeRemaining":300,"serverTime":1700000075000}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    /// Seconds left on the countdown.  Negative once the timer has crossed
    /// zero and is counting up.
    #[serde(deserialize_with = "whole_seconds")]
    pub time_remaining: i64,

    /// `true` while the countdown is (or was, if paused) running.
    pub is_running: bool,

    /// `true` while the countdown is paused.
    pub is_paused: bool,

    /// The duration most recently set on the server, in seconds.  `null`
    /// reads as 0.
    #[serde(default, deserialize_with = "whole_seconds_or_zero")]
    pub last_set_time: i64,

    // Server bookkeeping.  Opaque to the client and round-tripped verbatim.
    #[serde(default)]
    pub end_time: Value,
    #[serde(default)]
    pub paused_time_remaining: Value,
    #[serde(default)]
    pub start_time: Value,
    #[serde(default)]
    pub initial_time_remaining: Value,
    #[serde(default)]
    pub server_time: Value,
}

/// The three mutually exclusive states encoded by `isRunning` / `isPaused`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Neither running nor paused.
    Stopped,
    /// Running and not paused.
    Running,
    /// Paused, regardless of `isRunning`.
    Paused,
}

impl TimerState {
    /// Derives the run state from the two server booleans.
    pub fn run_state(&self) -> RunState {
        if self.is_paused {
            RunState::Paused
        } else if self.is_running {
            RunState::Running
        } else {
            RunState::Stopped
        }
    }

    /// Returns `true` once the countdown has crossed zero.
    pub fn is_counting_up(&self) -> bool {
        self.time_remaining < 0
    }
}

impl Default for TimerState {
    /// The state assumed before the first snapshot arrives.
    fn default() -> Self {
        Self {
            time_remaining: 0,
            is_running: false,
            is_paused: false,
            last_set_time: 0,
            end_time: Value::Null,
            paused_time_remaining: Value::from(0),
            start_time: Value::Null,
            initial_time_remaining: Value::from(0),
            server_time: Value::from(0),
        }
    }
}

/// Accepts any JSON number and truncates it toward zero.
///
/// The server computes seconds from millisecond timestamps, so fractional
/// values occasionally appear on the wire.
fn whole_seconds<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    truncate_seconds(f64::deserialize(deserializer)?)
}

/// Like [`whole_seconds`], but `null` reads as 0.
fn whole_seconds_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<f64>::deserialize(deserializer)? {
        Some(raw) => truncate_seconds(raw),
        None => Ok(0),
    }
}

fn truncate_seconds<E: serde::de::Error>(raw: f64) -> Result<i64, E> {
    if !raw.is_finite() {
        return Err(E::custom("seconds must be a finite number"));
    }
    Ok(raw.trunc() as i64)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
