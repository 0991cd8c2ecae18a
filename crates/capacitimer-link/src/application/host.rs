//! The host framework contract.
//!
//! The button panel that embeds this integration provides the UI, the
//! action/feedback registry and the variable engine.  This module describes
//! what we need from it as traits, plus the plain schema types we hand it.
//!
//! ```text
//! capacitimer-link                         host framework
//! ─────────────────────────────────────────────────────────────
//! set_action_definitions(&[..])   ──────>  registers buttons
//! update_status(Ok, None)         ──────>  connection indicator
//! set_variable_values(&values)    ──────>  $(capacitimer:time_remaining)
//! check_feedbacks()               ──────>  re-runs feedback callbacks
//! parse_variables("$(x:y)")       <──────  interpolated text
//! ```
//!
//! Implementations must be cheap and non-blocking: the sync engine calls
//! `set_variable_values` and `check_feedbacks` on every applied snapshot.

use std::collections::BTreeMap;

use async_trait::async_trait;
use capacitimer_core::variables::{VariableDefinition, VariableValues};
use capacitimer_core::DiscoveredInstance;

/// Connection status reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceStatus {
    Connecting,
    Ok,
    ConnectionFailure,
    Disconnected,
}

/// Callbacks into the host framework.
pub trait HostSurface: Send + Sync {
    /// Reports the connection status, with optional human-readable detail.
    fn update_status(&self, status: InstanceStatus, message: Option<&str>);

    /// Publishes new values for exported variables.
    fn set_variable_values(&self, values: &VariableValues);

    /// Asks the host to re-evaluate every feedback on every button.
    fn check_feedbacks(&self);

    fn set_action_definitions(&self, definitions: &[ActionDefinition]);

    fn set_feedback_definitions(&self, definitions: &[FeedbackDefinition]);

    fn set_variable_definitions(&self, definitions: &[VariableDefinition]);

    /// The discovery candidate list changed; the connection settings should
    /// offer the new set.
    fn refresh_config_fields(&self, candidates: &[DiscoveredInstance]);
}

/// Resolves `$(module:variable)` references in user-entered text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VariableInterpolator: Send + Sync {
    async fn parse_variables(&self, text: &str) -> String;
}

/// An interpolator that returns text unchanged.
///
/// Used by the standalone CLI, which has no variable engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughInterpolator;

#[async_trait]
impl VariableInterpolator for PassthroughInterpolator {
    async fn parse_variables(&self, text: &str) -> String {
        text.to_string()
    }
}

// ── Schema types ──────────────────────────────────────────────────────────────

/// A value the host supplies for one option of an action or feedback.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Number(f64),
    /// Free text, numeric text, or a dropdown choice id.
    Text(String),
    Bool(bool),
}

/// All option values for one invocation, keyed by option id.
pub type OptionValues = BTreeMap<String, OptionValue>;

/// One entry in a dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub id: &'static str,
    pub label: &'static str,
}

/// How an option is presented and what its default is.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionKind {
    Number { default: i64, min: i64, max: i64 },
    /// Text that is interpolated and then parsed as an integer.
    NumericText { default: i64 },
    /// Text that is interpolated and used verbatim.
    Text { default: String },
    Checkbox { default: bool },
    Dropdown { default: &'static str, choices: Vec<Choice> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionField {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: OptionKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub options: Vec<OptionField>,
}

/// Packed `0xRRGGBB` colours applied when a feedback is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonStyle {
    pub bgcolor: u32,
    pub color: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub default_style: ButtonStyle,
    pub options: Vec<OptionField>,
}

/// Packs an RGB triple into `0xRRGGBB`.
pub const fn combine_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}
