//! ActionDispatcher: turns a button press into a [`TimerCommand`].
//!
//! The host calls [`ActionDispatcher::execute`] with an action id and the
//! option values the user configured on the button.  The dispatcher resolves
//! the options (interpolating `$(variable)` references in text fields), builds
//! the command, and sends it through the [`CommandChannel`].
//!
//! # Parameter styles
//!
//! Numeric options are offered either as plain number inputs or as text
//! inputs that accept variable references, depending on
//! [`ParameterStyle`].  The resolver accepts both value forms regardless of
//! the style, so a button saved under one style keeps working under the other.
//! A numeric text that does not parse after interpolation falls back to the
//! option's declared default.
//!
//! # Failures
//!
//! [`execute`](ActionDispatcher::execute) never fails: a rejected or failed
//! command is logged at error level with the action id, and the button press
//! is otherwise a no-op.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use capacitimer_core::{DisplayElement, RunState, SettingsPatch, TimerCommand};
use tracing::{debug, error, info};

use super::host::{
    ActionDefinition, Choice, OptionField, OptionKind, OptionValue, OptionValues,
    VariableInterpolator,
};
use super::send_command::{CommandChannel, CommandError, CommandOutcome};
use crate::domain::ParameterStyle;

/// Every action this integration offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionId {
    StartTimer,
    PauseTimer,
    ResetTimer,
    ToggleTimer,
    SetTimer,
    AdjustTimer,
    UpdateSettings,
    SetColors,
    SetThresholds,
    SetFontSize,
    SetFontFamily,
}

impl ActionId {
    pub const ALL: [ActionId; 11] = [
        ActionId::StartTimer,
        ActionId::PauseTimer,
        ActionId::ResetTimer,
        ActionId::ToggleTimer,
        ActionId::SetTimer,
        ActionId::AdjustTimer,
        ActionId::UpdateSettings,
        ActionId::SetColors,
        ActionId::SetThresholds,
        ActionId::SetFontSize,
        ActionId::SetFontFamily,
    ];

    /// Stable identifier the host stores in button configuration.
    pub fn id(self) -> &'static str {
        match self {
            ActionId::StartTimer => "start_timer",
            ActionId::PauseTimer => "pause_timer",
            ActionId::ResetTimer => "reset_timer",
            ActionId::ToggleTimer => "toggle_timer",
            ActionId::SetTimer => "set_timer",
            ActionId::AdjustTimer => "adjust_timer",
            ActionId::UpdateSettings => "update_settings",
            ActionId::SetColors => "set_colors",
            ActionId::SetThresholds => "set_thresholds",
            ActionId::SetFontSize => "set_font_size",
            ActionId::SetFontFamily => "set_font_family",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ActionId::StartTimer => "Start Timer",
            ActionId::PauseTimer => "Pause Timer",
            ActionId::ResetTimer => "Reset Timer",
            ActionId::ToggleTimer => "Toggle Timer (Start/Pause)",
            ActionId::SetTimer => "Set Timer",
            ActionId::AdjustTimer => "Adjust Timer",
            ActionId::UpdateSettings => "Update Settings",
            ActionId::SetColors => "Set Colors",
            ActionId::SetThresholds => "Set Warning Thresholds",
            ActionId::SetFontSize => "Set Font Size",
            ActionId::SetFontFamily => "Set Font Family",
        }
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ActionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.id() == s)
            .ok_or_else(|| format!("unknown action '{s}'"))
    }
}

// ── Option ids and defaults ───────────────────────────────────────────────────

const HOURS: &str = "hours";
const MINUTES: &str = "minutes";
const SECONDS: &str = "seconds";
const KEEP_RUNNING: &str = "keepRunning";
const SHOW_HOURS: &str = "showHours";
const SHOW_MINUTES: &str = "showMinutes";
const SHOW_SECONDS: &str = "showSeconds";
const SHOW_MILLISECONDS: &str = "showMilliseconds";
const COUNT_UP_AFTER_ZERO: &str = "countUpAfterZero";
const SHOW_TIME_OF_DAY: &str = "showTimeOfDay";
const COLOR_NORMAL: &str = "colorNormal";
const COLOR_WARNING: &str = "colorWarning";
const COLOR_CRITICAL: &str = "colorCritical";
const WARNING_THRESHOLD: &str = "warningThreshold";
const CRITICAL_THRESHOLD: &str = "criticalThreshold";
const ELEMENT: &str = "element";
const SIZE: &str = "size";
const FAMILY: &str = "family";

const DEFAULT_FONT_SIZE: i64 = 100;
const DEFAULT_FONT_FAMILY: &str = "Roboto Mono";

/// Builds the action schema for the given parameter style.
pub fn action_definitions(style: ParameterStyle) -> Vec<ActionDefinition> {
    let number = |id, label, default, min, max| OptionField {
        id,
        label,
        kind: match style {
            ParameterStyle::Numeric => OptionKind::Number { default, min, max },
            ParameterStyle::InterpolatedText => OptionKind::NumericText { default },
        },
    };
    let flag = |id, label, default| OptionField {
        id,
        label,
        kind: OptionKind::Checkbox { default },
    };
    let text = |id, label, default: &str| OptionField {
        id,
        label,
        kind: OptionKind::Text {
            default: default.to_string(),
        },
    };
    let element_choice = OptionField {
        id: ELEMENT,
        label: "Element",
        kind: OptionKind::Dropdown {
            default: DisplayElement::Timer.id(),
            choices: DisplayElement::ALL
                .into_iter()
                .map(|e| Choice {
                    id: e.id(),
                    label: e.label(),
                })
                .collect(),
        },
    };

    ActionId::ALL
        .into_iter()
        .map(|action| {
            let options = match action {
                ActionId::StartTimer
                | ActionId::PauseTimer
                | ActionId::ResetTimer
                | ActionId::ToggleTimer => Vec::new(),
                ActionId::SetTimer => vec![
                    number(HOURS, "Hours", 0, 0, 23),
                    number(MINUTES, "Minutes", 5, 0, 59),
                    number(SECONDS, "Seconds", 0, 0, 59),
                    flag(KEEP_RUNNING, "Keep Running", false),
                ],
                ActionId::AdjustTimer => vec![number(
                    SECONDS,
                    "Seconds (positive to add, negative to subtract)",
                    30,
                    -3600,
                    3600,
                )],
                ActionId::UpdateSettings => vec![
                    flag(SHOW_HOURS, "Show Hours", true),
                    flag(SHOW_MINUTES, "Show Minutes", true),
                    flag(SHOW_SECONDS, "Show Seconds", true),
                    flag(SHOW_MILLISECONDS, "Show Milliseconds", false),
                    flag(COUNT_UP_AFTER_ZERO, "Count Up After Zero", false),
                    flag(SHOW_TIME_OF_DAY, "Show Time of Day", true),
                ],
                ActionId::SetColors => vec![
                    text(COLOR_NORMAL, "Normal Color", "#44ff44"),
                    text(COLOR_WARNING, "Warning Color", "#ffaa00"),
                    text(COLOR_CRITICAL, "Critical Color", "#ff4444"),
                ],
                ActionId::SetThresholds => vec![
                    number(WARNING_THRESHOLD, "Warning Threshold (seconds)", 60, 0, 86_400),
                    number(CRITICAL_THRESHOLD, "Critical Threshold (seconds)", 30, 0, 86_400),
                ],
                ActionId::SetFontSize => vec![
                    element_choice.clone(),
                    number(SIZE, "Font Size", DEFAULT_FONT_SIZE, 8, 1000),
                ],
                ActionId::SetFontFamily => vec![
                    element_choice.clone(),
                    text(FAMILY, "Font Family", DEFAULT_FONT_FAMILY),
                ],
            };
            ActionDefinition {
                id: action.id(),
                name: action.name(),
                options,
            }
        })
        .collect()
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

/// Resolves button options and sends the resulting command.
#[derive(Clone)]
pub struct ActionDispatcher {
    channel: CommandChannel,
    interpolator: Arc<dyn VariableInterpolator>,
}

impl ActionDispatcher {
    pub fn new(channel: CommandChannel, interpolator: Arc<dyn VariableInterpolator>) -> Self {
        Self {
            channel,
            interpolator,
        }
    }

    /// Runs an action, logging and swallowing every failure.
    ///
    /// Returns the outcome when the command reached the server.
    pub async fn execute(&self, action: ActionId, options: &OptionValues) -> Option<CommandOutcome> {
        match self.try_execute(action, options).await {
            Ok(CommandOutcome::Rejected(reason)) => {
                error!(
                    action = action.id(),
                    reason = reason.as_deref().unwrap_or("unspecified"),
                    "action rejected by server"
                );
                Some(CommandOutcome::Rejected(reason))
            }
            Ok(outcome) => {
                info!(action = action.id(), ?outcome, "action completed");
                Some(outcome)
            }
            Err(e) => {
                error!(action = action.id(), error = %e, "action failed");
                None
            }
        }
    }

    /// Runs an action by its string id.  Unknown ids are logged and ignored.
    pub async fn execute_by_id(&self, action_id: &str, options: &OptionValues) -> Option<CommandOutcome> {
        match action_id.parse::<ActionId>() {
            Ok(action) => self.execute(action, options).await,
            Err(e) => {
                error!(action = action_id, "{e}");
                None
            }
        }
    }

    /// Builds and sends the command, propagating errors.
    pub async fn try_execute(
        &self,
        action: ActionId,
        options: &OptionValues,
    ) -> Result<CommandOutcome, CommandError> {
        let command = self.build_command(action, options).await;
        self.channel.send(&command).await
    }

    /// Maps an action and its option values to a command.
    ///
    /// `toggle_timer` decides from the state stored *now*; a snapshot that
    /// arrives while the command is in flight does not change the decision.
    pub async fn build_command(&self, action: ActionId, options: &OptionValues) -> TimerCommand {
        match action {
            ActionId::StartTimer => TimerCommand::Start,
            ActionId::PauseTimer => TimerCommand::Pause,
            ActionId::ResetTimer => TimerCommand::Reset,
            ActionId::ToggleTimer => {
                if self.channel.store().timer().run_state() == RunState::Running {
                    TimerCommand::Pause
                } else {
                    TimerCommand::Start
                }
            }
            ActionId::SetTimer => {
                let hours = self.number(options, HOURS, 0).await;
                let minutes = self.number(options, MINUTES, 5).await;
                let seconds = self.number(options, SECONDS, 0).await;
                TimerCommand::Set {
                    seconds: hours
                        .saturating_mul(3600)
                        .saturating_add(minutes.saturating_mul(60))
                        .saturating_add(seconds),
                    keep_running: checkbox(options, KEEP_RUNNING, false),
                }
            }
            ActionId::AdjustTimer => TimerCommand::Adjust {
                seconds: self.number(options, SECONDS, 30).await,
            },
            ActionId::UpdateSettings => TimerCommand::UpdateSettings(SettingsPatch {
                show_hours: Some(checkbox(options, SHOW_HOURS, true)),
                show_minutes: Some(checkbox(options, SHOW_MINUTES, true)),
                show_seconds: Some(checkbox(options, SHOW_SECONDS, true)),
                show_milliseconds: Some(checkbox(options, SHOW_MILLISECONDS, false)),
                count_up_after_zero: Some(checkbox(options, COUNT_UP_AFTER_ZERO, false)),
                show_time_of_day: Some(checkbox(options, SHOW_TIME_OF_DAY, true)),
                ..SettingsPatch::default()
            }),
            ActionId::SetColors => TimerCommand::UpdateSettings(SettingsPatch {
                color_normal: Some(self.text(options, COLOR_NORMAL, "#44ff44").await),
                color_warning: Some(self.text(options, COLOR_WARNING, "#ffaa00").await),
                color_critical: Some(self.text(options, COLOR_CRITICAL, "#ff4444").await),
                ..SettingsPatch::default()
            }),
            ActionId::SetThresholds => TimerCommand::UpdateSettings(SettingsPatch {
                warning_threshold: Some(self.number(options, WARNING_THRESHOLD, 60).await),
                critical_threshold: Some(self.number(options, CRITICAL_THRESHOLD, 30).await),
                ..SettingsPatch::default()
            }),
            ActionId::SetFontSize => {
                let size = self.number(options, SIZE, DEFAULT_FONT_SIZE).await;
                let size = u32::try_from(size).unwrap_or_else(|_| {
                    debug!(option = SIZE, size, "font size out of range, using default");
                    DEFAULT_FONT_SIZE as u32
                });
                TimerCommand::UpdateSettings(SettingsPatch::font_size(element(options), size))
            }
            ActionId::SetFontFamily => {
                let family = self.text(options, FAMILY, DEFAULT_FONT_FAMILY).await;
                TimerCommand::UpdateSettings(SettingsPatch::font_family(element(options), family))
            }
        }
    }

    /// Resolves a numeric option, falling back to `default` when it is
    /// missing or does not parse.
    async fn number(&self, options: &OptionValues, id: &str, default: i64) -> i64 {
        match options.get(id) {
            Some(OptionValue::Number(n)) if n.is_finite() => n.trunc() as i64,
            Some(OptionValue::Text(raw)) => {
                let resolved = self.interpolator.parse_variables(raw).await;
                parse_integer(&resolved).unwrap_or_else(|| {
                    debug!(option = id, value = %resolved, default, "not a number, using default");
                    default
                })
            }
            Some(other) => {
                debug!(option = id, value = ?other, default, "not a number, using default");
                default
            }
            None => default,
        }
    }

    /// Resolves a text option through the interpolator.
    async fn text(&self, options: &OptionValues, id: &str, default: &str) -> String {
        match options.get(id) {
            Some(OptionValue::Text(raw)) => self.interpolator.parse_variables(raw).await,
            _ => default.to_string(),
        }
    }
}

fn checkbox(options: &OptionValues, id: &str, default: bool) -> bool {
    match options.get(id) {
        Some(OptionValue::Bool(flag)) => *flag,
        _ => default,
    }
}

fn element(options: &OptionValues) -> DisplayElement {
    match options.get(ELEMENT) {
        Some(OptionValue::Text(id)) => DisplayElement::from_id(id).unwrap_or(DisplayElement::Timer),
        _ => DisplayElement::Timer,
    }
}

/// Integer parsing that tolerates surrounding whitespace and a fractional
/// part (truncated toward zero).
fn parse_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    text.parse::<i64>().ok().or_else(|| {
        text.parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(|n| n.trunc() as i64)
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
