//! Display preferences declared by the server.
//!
//! [`Settings`] is a read-only cache on the client side: the server pushes a
//! full `settings-update` whenever anything changes, and the client replaces
//! its copy.  The only rules the client applies itself are the show-flags,
//! which control how the two time-valued variables are formatted.
//!
//! Changing settings goes the other way through [`SettingsPatch`], a partial
//! object containing only the keys the caller wants to change.
//!
//! # Serde default values
//!
//! Every field falls back to the server's factory default when absent, so an
//! older server that does not know about (for example) font settings still
//! produces a valid `Settings`.  Keys this crate does not recognise are kept in
//! [`Settings::extra`] rather than discarded.
//!
//! Only the show-flags are strictly typed.  Colours, thresholds and fonts are
//! never read by the client, so a value of the wrong shape (a fractional font
//! size, a `null` colour) falls back to the default instead of rejecting the
//! whole update.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Display configuration mirrored from the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_true")]
    pub show_hours: bool,
    #[serde(default = "default_true")]
    pub show_minutes: bool,
    #[serde(default = "default_true")]
    pub show_seconds: bool,
    #[serde(default)]
    pub show_milliseconds: bool,
    #[serde(default = "default_true")]
    pub show_time_of_day: bool,
    /// Whether the server keeps counting (upward) after reaching zero.
    #[serde(default)]
    pub count_up_after_zero: bool,

    /// Colour used while above the warning threshold, e.g. `"#44ff44"`.
    #[serde(default = "default_color_normal", deserialize_with = "lenient_color_normal")]
    pub color_normal: String,
    #[serde(default = "default_color_warning", deserialize_with = "lenient_color_warning")]
    pub color_warning: String,
    #[serde(default = "default_color_critical", deserialize_with = "lenient_color_critical")]
    pub color_critical: String,

    /// Seconds remaining at which the display switches to the warning colour.
    #[serde(default = "default_warning_threshold", deserialize_with = "lenient_warning_threshold")]
    pub warning_threshold: i64,
    /// Seconds remaining at which the display switches to the critical colour.
    #[serde(default = "default_critical_threshold", deserialize_with = "lenient_critical_threshold")]
    pub critical_threshold: i64,

    #[serde(default = "default_font_family", deserialize_with = "lenient_font_family")]
    pub timer_font_family: String,
    #[serde(default = "default_timer_font_size", deserialize_with = "lenient_timer_font_size")]
    pub timer_font_size: u32,
    #[serde(default = "default_font_family", deserialize_with = "lenient_font_family")]
    pub time_of_day_font_family: String,
    #[serde(
        default = "default_time_of_day_font_size",
        deserialize_with = "lenient_time_of_day_font_size"
    )]
    pub time_of_day_font_size: u32,

    /// Server keys this version does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A partial settings update sent with `POST /api/settings`.
///
/// Only `Some` fields are serialized, so the server leaves everything else
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_hours: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_minutes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_seconds: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_milliseconds: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_time_of_day: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_up_after_zero: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_normal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_critical: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning_threshold: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical_threshold: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer_font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer_font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_of_day_font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_of_day_font_size: Option<u32>,
}

/// A text element on the server's display that has its own font settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DisplayElement {
    /// The countdown itself.
    Timer,
    /// The wall-clock line shown under the countdown.
    TimeOfDay,
}

impl DisplayElement {
    /// All elements, in the order they appear in choice lists.
    pub const ALL: [DisplayElement; 2] = [DisplayElement::Timer, DisplayElement::TimeOfDay];

    /// The identifier used in action choice lists.
    pub fn id(self) -> &'static str {
        match self {
            DisplayElement::Timer => "timer",
            DisplayElement::TimeOfDay => "timeOfDay",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            DisplayElement::Timer => "Timer",
            DisplayElement::TimeOfDay => "Time of Day",
        }
    }

    /// Looks up an element by its [`id`](Self::id).
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.id() == id)
    }
}

impl SettingsPatch {
    /// Builds a patch that changes the font size of one element.
    pub fn font_size(element: DisplayElement, size: u32) -> Self {
        match element {
            DisplayElement::Timer => Self {
                timer_font_size: Some(size),
                ..Self::default()
            },
            DisplayElement::TimeOfDay => Self {
                time_of_day_font_size: Some(size),
                ..Self::default()
            },
        }
    }

    /// Builds a patch that changes the font family of one element.
    pub fn font_family(element: DisplayElement, family: String) -> Self {
        match element {
            DisplayElement::Timer => Self {
                timer_font_family: Some(family),
                ..Self::default()
            },
            DisplayElement::TimeOfDay => Self {
                time_of_day_font_family: Some(family),
                ..Self::default()
            },
        }
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}
fn default_color_normal() -> String {
    "#44ff44".to_string()
}
fn default_color_warning() -> String {
    "#ffaa00".to_string()
}
fn default_color_critical() -> String {
    "#ff4444".to_string()
}
fn default_warning_threshold() -> i64 {
    60
}
fn default_critical_threshold() -> i64 {
    30
}
fn default_font_family() -> String {
    "Roboto Mono".to_string()
}
fn default_timer_font_size() -> u32 {
    200
}
fn default_time_of_day_font_size() -> u32 {
    48
}

// ── Lenient field parsers ─────────────────────────────────────────────────────

/// Accepts a JSON string; anything else yields `fallback()`.
fn text_or<'de, D>(deserializer: D, fallback: fn() -> String) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        _ => fallback(),
    })
}

/// Accepts any finite JSON number, truncated toward zero, that fits `T`;
/// anything else yields `fallback()`.
fn number_or<'de, D, T>(deserializer: D, fallback: fn() -> T) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(raw
        .as_f64()
        .filter(|n| n.is_finite())
        .and_then(|n| T::try_from(n.trunc() as i64).ok())
        .unwrap_or_else(fallback))
}

fn lenient_color_normal<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    text_or(d, default_color_normal)
}
fn lenient_color_warning<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    text_or(d, default_color_warning)
}
fn lenient_color_critical<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    text_or(d, default_color_critical)
}
fn lenient_font_family<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    text_or(d, default_font_family)
}
fn lenient_warning_threshold<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    number_or(d, default_warning_threshold)
}
fn lenient_critical_threshold<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    number_or(d, default_critical_threshold)
}
fn lenient_timer_font_size<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    number_or(d, default_timer_font_size)
}
fn lenient_time_of_day_font_size<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    number_or(d, default_time_of_day_font_size)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_hours: default_true(),
            show_minutes: default_true(),
            show_seconds: default_true(),
            show_milliseconds: false,
            show_time_of_day: default_true(),
            count_up_after_zero: false,
            color_normal: default_color_normal(),
            color_warning: default_color_warning(),
            color_critical: default_color_critical(),
            warning_threshold: default_warning_threshold(),
            critical_threshold: default_critical_threshold(),
            timer_font_family: default_font_family(),
            timer_font_size: default_timer_font_size(),
            time_of_day_font_family: default_font_family(),
            time_of_day_font_size: default_time_of_day_font_size(),
            extra: Map::new(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
