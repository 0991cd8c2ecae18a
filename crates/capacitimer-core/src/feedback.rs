//! Feedback predicates over the current [`TimerState`].
//!
//! The host re-evaluates these whenever a new snapshot is applied and uses the
//! result to recolour buttons.  Every predicate is pure and synchronous.
//!
//! Thresholds are per-feedback options (each button picks its own), not
//! global settings.

use std::str::FromStr;

use crate::domain::timer::{RunState, TimerState};

/// Default threshold for [`FeedbackKind::TimeRemainingLessThan`], in seconds.
pub const DEFAULT_LESS_THAN_SECONDS: i64 = 60;
/// Default threshold for [`FeedbackKind::TimeRemainingGreaterThan`], in seconds.
pub const DEFAULT_GREATER_THAN_SECONDS: i64 = 300;

/// Every boolean feedback this integration offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackKind {
    TimerRunning,
    TimerPaused,
    TimerStopped,
    TimeRemainingLessThan,
    TimeRemainingGreaterThan,
    TimerNegative,
}

impl FeedbackKind {
    pub const ALL: [FeedbackKind; 6] = [
        FeedbackKind::TimerRunning,
        FeedbackKind::TimerPaused,
        FeedbackKind::TimerStopped,
        FeedbackKind::TimeRemainingLessThan,
        FeedbackKind::TimeRemainingGreaterThan,
        FeedbackKind::TimerNegative,
    ];

    /// Stable identifier used by the host to persist button configuration.
    pub fn id(self) -> &'static str {
        match self {
            FeedbackKind::TimerRunning => "timer_running",
            FeedbackKind::TimerPaused => "timer_paused",
            FeedbackKind::TimerStopped => "timer_stopped",
            FeedbackKind::TimeRemainingLessThan => "time_remaining_less_than",
            FeedbackKind::TimeRemainingGreaterThan => "time_remaining_greater_than",
            FeedbackKind::TimerNegative => "timer_negative",
        }
    }

    /// Whether this feedback takes a `seconds` threshold option.
    pub fn takes_threshold(self) -> bool {
        matches!(
            self,
            FeedbackKind::TimeRemainingLessThan | FeedbackKind::TimeRemainingGreaterThan
        )
    }

    /// Evaluates the feedback.  `threshold` is ignored by feedbacks that do
    /// not take one.
    pub fn evaluate(self, state: &TimerState, threshold: i64) -> bool {
        match self {
            FeedbackKind::TimerRunning => is_running(state),
            FeedbackKind::TimerPaused => is_paused(state),
            FeedbackKind::TimerStopped => is_stopped(state),
            FeedbackKind::TimeRemainingLessThan => remaining_below(state, threshold),
            FeedbackKind::TimeRemainingGreaterThan => remaining_above(state, threshold),
            FeedbackKind::TimerNegative => is_counting_up(state),
        }
    }
}

impl FromStr for FeedbackKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| format!("unknown feedback '{s}'"))
    }
}

/// Running and not paused.
pub fn is_running(state: &TimerState) -> bool {
    state.run_state() == RunState::Running
}

pub fn is_paused(state: &TimerState) -> bool {
    state.run_state() == RunState::Paused
}

/// Neither running nor paused.
pub fn is_stopped(state: &TimerState) -> bool {
    state.run_state() == RunState::Stopped
}

/// Strictly below `threshold` and still above zero.  A countdown that has
/// crossed zero is "negative", not "below threshold".
pub fn remaining_below(state: &TimerState, threshold: i64) -> bool {
    state.time_remaining < threshold && state.time_remaining > 0
}

/// Strictly above `threshold`.
pub fn remaining_above(state: &TimerState, threshold: i64) -> bool {
    state.time_remaining > threshold
}

/// Counting up past zero.
pub fn is_counting_up(state: &TimerState) -> bool {
    state.time_remaining < 0
}

// ── Tests ─────────────────────────────────────────────────────────────────────
