//! Variables exported to the control surface.
//!
//! The host displays these on buttons (e.g. `$(capacitimer:time_remaining)`).
//! They are recomputed from scratch every time a new snapshot is applied.

use std::collections::BTreeMap;

use crate::domain::settings::Settings;
use crate::domain::timer::TimerState;
use crate::format::format_time;

/// Flat mapping of variable id → display string.
pub type VariableValues = BTreeMap<&'static str, String>;

/// Declares one exported variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableDefinition {
    pub id: &'static str,
    pub name: &'static str,
}

pub const TIME_REMAINING: &str = "time_remaining";
pub const TIME_REMAINING_SECONDS: &str = "time_remaining_seconds";
pub const IS_RUNNING: &str = "is_running";
pub const IS_PAUSED: &str = "is_paused";
pub const LAST_SET_TIME: &str = "last_set_time";

/// Every variable this integration exports, in display order.
pub const VARIABLE_DEFINITIONS: [VariableDefinition; 5] = [
    VariableDefinition { id: TIME_REMAINING, name: "Time Remaining (Formatted)" },
    VariableDefinition { id: TIME_REMAINING_SECONDS, name: "Time Remaining (Seconds)" },
    VariableDefinition { id: IS_RUNNING, name: "Is Running" },
    VariableDefinition { id: IS_PAUSED, name: "Is Paused" },
    VariableDefinition { id: LAST_SET_TIME, name: "Last Set Time (Formatted)" },
];

/// Computes all variable values for the given snapshot.
pub fn export_variables(timer: &TimerState, settings: &Settings) -> VariableValues {
    let mut values = VariableValues::new();
    values.insert(TIME_REMAINING, format_time(timer.time_remaining, settings));
    values.insert(TIME_REMAINING_SECONDS, timer.time_remaining.to_string());
    values.insert(IS_RUNNING, yes_no(timer.is_running));
    values.insert(IS_PAUSED, yes_no(timer.is_paused));
    values.insert(LAST_SET_TIME, format_time(timer.last_set_time, settings));
    values
}

fn yes_no(flag: bool) -> String {
    if flag { "Yes" } else { "No" }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_covers_every_definition() {
        let values = export_variables(&TimerState::default(), &Settings::default());
        for def in VARIABLE_DEFINITIONS {
            assert!(values.contains_key(def.id), "missing variable {}", def.id);
        }
        assert_eq!(values.len(), VARIABLE_DEFINITIONS.len());
    }

    #[test]
    fn test_export_formats_running_countdown() {
        // Arrange
        let timer = TimerState {
            time_remaining: -75,
            is_running: true,
            is_paused: false,
            last_set_time: 300,
            ..TimerState::default()
        };

        // Act
        let values = export_variables(&timer, &Settings::default());

        // Assert
        assert_eq!(values[TIME_REMAINING], "-00:01:15");
        assert_eq!(values[TIME_REMAINING_SECONDS], "-75");
        assert_eq!(values[IS_RUNNING], "Yes");
        assert_eq!(values[IS_PAUSED], "No");
        assert_eq!(values[LAST_SET_TIME], "00:05:00");
    }

    #[test]
    fn test_export_honours_show_flags() {
        let settings = Settings {
            show_hours: false,
            ..Settings::default()
        };
        let timer = TimerState {
            time_remaining: 3725,
            ..TimerState::default()
        };
        assert_eq!(export_variables(&timer, &settings)[TIME_REMAINING], "62:05");
    }
}
