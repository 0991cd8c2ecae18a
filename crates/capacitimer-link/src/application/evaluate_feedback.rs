//! Feedback definitions and their evaluation against the stored state.
//!
//! The predicates themselves live in `capacitimer_core::feedback`; this module
//! adds what the host needs around them: a default style per feedback, the
//! `seconds` option for the threshold feedbacks, and option resolution.

use capacitimer_core::feedback::{DEFAULT_GREATER_THAN_SECONDS, DEFAULT_LESS_THAN_SECONDS};
use capacitimer_core::FeedbackKind;
use tracing::debug;

use super::host::{
    combine_rgb, ButtonStyle, FeedbackDefinition, OptionField, OptionKind, OptionValue,
    OptionValues,
};
use super::state_store::StateStore;

const THRESHOLD: &str = "seconds";
const MAX_THRESHOLD: i64 = 86_400;

const BLACK: u32 = combine_rgb(0, 0, 0);
const WHITE: u32 = combine_rgb(255, 255, 255);

fn name(kind: FeedbackKind) -> &'static str {
    match kind {
        FeedbackKind::TimerRunning => "Timer Running",
        FeedbackKind::TimerPaused => "Timer Paused",
        FeedbackKind::TimerStopped => "Timer Stopped",
        FeedbackKind::TimeRemainingLessThan => "Time Remaining Less Than",
        FeedbackKind::TimeRemainingGreaterThan => "Time Remaining Greater Than",
        FeedbackKind::TimerNegative => "Timer Negative (Count Up)",
    }
}

fn description(kind: FeedbackKind) -> &'static str {
    match kind {
        FeedbackKind::TimerRunning => "Change button color when timer is running",
        FeedbackKind::TimerPaused => "Change button color when timer is paused",
        FeedbackKind::TimerStopped => "Change button color when timer is stopped",
        FeedbackKind::TimeRemainingLessThan => {
            "Change button color when time remaining is less than threshold"
        }
        FeedbackKind::TimeRemainingGreaterThan => {
            "Change button color when time remaining is greater than threshold"
        }
        FeedbackKind::TimerNegative => "Change button color when timer is counting up past zero",
    }
}

fn default_style(kind: FeedbackKind) -> ButtonStyle {
    match kind {
        FeedbackKind::TimerRunning | FeedbackKind::TimeRemainingGreaterThan => ButtonStyle {
            bgcolor: combine_rgb(0, 255, 0),
            color: BLACK,
        },
        FeedbackKind::TimerPaused => ButtonStyle {
            bgcolor: combine_rgb(255, 165, 0),
            color: BLACK,
        },
        FeedbackKind::TimerStopped | FeedbackKind::TimeRemainingLessThan => ButtonStyle {
            bgcolor: combine_rgb(255, 0, 0),
            color: WHITE,
        },
        FeedbackKind::TimerNegative => ButtonStyle {
            bgcolor: combine_rgb(204, 0, 0),
            color: WHITE,
        },
    }
}

/// The threshold used when a button does not set one.
pub fn default_threshold(kind: FeedbackKind) -> i64 {
    match kind {
        FeedbackKind::TimeRemainingGreaterThan => DEFAULT_GREATER_THAN_SECONDS,
        _ => DEFAULT_LESS_THAN_SECONDS,
    }
}

/// Builds the feedback schema handed to the host.
pub fn feedback_definitions() -> Vec<FeedbackDefinition> {
    FeedbackKind::ALL
        .into_iter()
        .map(|kind| FeedbackDefinition {
            id: kind.id(),
            name: name(kind),
            description: description(kind),
            default_style: default_style(kind),
            options: if kind.takes_threshold() {
                vec![OptionField {
                    id: THRESHOLD,
                    label: "Seconds",
                    kind: OptionKind::Number {
                        default: default_threshold(kind),
                        min: 0,
                        max: MAX_THRESHOLD,
                    },
                }]
            } else {
                Vec::new()
            },
        })
        .collect()
}

/// Evaluates feedbacks against the current snapshot.
#[derive(Clone)]
pub struct FeedbackEvaluator {
    store: StateStore,
}

impl FeedbackEvaluator {
    pub fn new(store: StateStore) -> Self {
        Self { store }
    }

    /// Evaluates one feedback with the button's option values.
    pub fn evaluate(&self, kind: FeedbackKind, options: &OptionValues) -> bool {
        let threshold = if kind.takes_threshold() {
            threshold(options, default_threshold(kind))
        } else {
            0
        };
        kind.evaluate(&self.store.timer(), threshold)
    }

    /// Evaluates a feedback by its string id.  Unknown ids are false.
    pub fn evaluate_by_id(&self, feedback_id: &str, options: &OptionValues) -> bool {
        match feedback_id.parse::<FeedbackKind>() {
            Ok(kind) => self.evaluate(kind, options),
            Err(e) => {
                debug!(feedback = feedback_id, "{e}");
                false
            }
        }
    }
}

fn threshold(options: &OptionValues, default: i64) -> i64 {
    match options.get(THRESHOLD) {
        Some(OptionValue::Number(n)) if n.is_finite() => n.trunc() as i64,
        Some(OptionValue::Text(raw)) => raw.trim().parse().unwrap_or(default),
        _ => default,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::host::HostSurface;
    use crate::application::state_store::UpdateSource;
    use crate::application::test_support::RecordingHost;
    use capacitimer_core::TimerState;
    use std::sync::Arc;

    fn evaluator_with(remaining: i64, is_running: bool, is_paused: bool) -> FeedbackEvaluator {
        let store = StateStore::new(Arc::new(RecordingHost::default()) as Arc<dyn HostSurface>);
        store.apply_timer(
            TimerState {
                time_remaining: remaining,
                is_running,
                is_paused,
                ..TimerState::default()
            },
            UpdateSource::Push,
        );
        FeedbackEvaluator::new(store)
    }

    fn seconds(n: f64) -> OptionValues {
        let mut options = OptionValues::new();
        options.insert(THRESHOLD.to_string(), OptionValue::Number(n));
        options
    }

    #[test]
    fn test_less_than_is_false_at_zero() {
        let eval = evaluator_with(0, true, false);
        assert!(!eval.evaluate(FeedbackKind::TimeRemainingLessThan, &seconds(60.0)));
    }

    #[test]
    fn test_less_than_uses_default_threshold() {
        let eval = evaluator_with(59, true, false);
        assert!(eval.evaluate(FeedbackKind::TimeRemainingLessThan, &OptionValues::new()));
    }

    #[test]
    fn test_greater_than_default_is_300() {
        let eval = evaluator_with(301, true, false);
        assert!(eval.evaluate(FeedbackKind::TimeRemainingGreaterThan, &OptionValues::new()));
        let eval = evaluator_with(300, true, false);
        assert!(!eval.evaluate(FeedbackKind::TimeRemainingGreaterThan, &OptionValues::new()));
    }

    #[test]
    fn test_button_threshold_overrides_default() {
        let eval = evaluator_with(100, true, false);
        assert!(eval.evaluate(FeedbackKind::TimeRemainingLessThan, &seconds(120.0)));
    }

    #[test]
    fn test_run_state_feedbacks() {
        let paused = evaluator_with(10, true, true);
        assert!(paused.evaluate_by_id("timer_paused", &OptionValues::new()));
        assert!(!paused.evaluate_by_id("timer_running", &OptionValues::new()));
        assert!(!paused.evaluate_by_id("timer_stopped", &OptionValues::new()));
    }

    #[test]
    fn test_unknown_feedback_is_false() {
        let eval = evaluator_with(10, true, false);
        assert!(!eval.evaluate_by_id("timer_on_fire", &OptionValues::new()));
    }

    #[test]
    fn test_definitions_carry_styles_and_threshold_options() {
        // Act
        let defs = feedback_definitions();

        // Assert
        assert_eq!(defs.len(), FeedbackKind::ALL.len());
        let paused = defs.iter().find(|d| d.id == "timer_paused").unwrap();
        assert_eq!(paused.default_style.bgcolor, 0xFFA500);
        assert!(paused.options.is_empty());

        let less = defs.iter().find(|d| d.id == "time_remaining_less_than").unwrap();
        assert_eq!(
            less.options[0].kind,
            OptionKind::Number {
                default: 60,
                min: 0,
                max: 86_400
            }
        );
    }
}
