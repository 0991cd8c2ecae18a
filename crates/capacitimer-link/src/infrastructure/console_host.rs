//! A [`HostSurface`] for running the integration without a button panel.
//!
//! Status changes and variable updates become `tracing` events; definitions
//! and discovery candidates are logged once at debug/info.  Identical
//! variable sets are not re-logged, so the one-second poll stays quiet while
//! the timer is stopped.

use std::sync::{Mutex, PoisonError};

use capacitimer_core::variables::{
    VariableDefinition, VariableValues, IS_PAUSED, IS_RUNNING, TIME_REMAINING,
};
use capacitimer_core::DiscoveredInstance;
use tracing::{debug, info, warn};

use crate::application::host::{
    ActionDefinition, FeedbackDefinition, HostSurface, InstanceStatus,
};

#[derive(Debug, Default)]
pub struct ConsoleHost {
    last_status: Mutex<Option<InstanceStatus>>,
    last_values: Mutex<VariableValues>,
}

impl ConsoleHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> Option<InstanceStatus> {
        *self.last_status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The most recently published variables.
    pub fn variables(&self) -> VariableValues {
        self.last_values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl HostSurface for ConsoleHost {
    fn update_status(&self, status: InstanceStatus, message: Option<&str>) {
        *self.last_status.lock().unwrap_or_else(PoisonError::into_inner) = Some(status);
        let detail = message.unwrap_or("");
        match status {
            InstanceStatus::ConnectionFailure => warn!(?status, "{detail}"),
            _ => info!(?status, "{detail}"),
        }
    }

    fn set_variable_values(&self, values: &VariableValues) {
        {
            let mut last = self.last_values.lock().unwrap_or_else(PoisonError::into_inner);
            if *last == *values {
                return;
            }
            *last = values.clone();
        }
        let field = |id: &str| values.get(id).map_or("", String::as_str);
        info!(
            time_remaining = field(TIME_REMAINING),
            running = field(IS_RUNNING),
            paused = field(IS_PAUSED),
            "timer"
        );
    }

    fn check_feedbacks(&self) {}

    fn set_action_definitions(&self, definitions: &[ActionDefinition]) {
        debug!(count = definitions.len(), "action definitions published");
    }

    fn set_feedback_definitions(&self, definitions: &[FeedbackDefinition]) {
        debug!(count = definitions.len(), "feedback definitions published");
    }

    fn set_variable_definitions(&self, definitions: &[VariableDefinition]) {
        debug!(count = definitions.len(), "variable definitions published");
    }

    fn refresh_config_fields(&self, candidates: &[DiscoveredInstance]) {
        for candidate in candidates {
            info!(host = %candidate.host, port = candidate.port, "{}", candidate.label());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_latest_status() {
        let host = ConsoleHost::new();
        assert_eq!(host.status(), None);

        host.update_status(InstanceStatus::Connecting, None);
        host.update_status(InstanceStatus::ConnectionFailure, Some("refused"));

        assert_eq!(host.status(), Some(InstanceStatus::ConnectionFailure));
    }

    #[test]
    fn test_keeps_latest_variables() {
        // Arrange
        let host = ConsoleHost::new();
        let mut values = VariableValues::new();
        values.insert(TIME_REMAINING, "00:05:00".to_string());

        // Act
        host.set_variable_values(&values);
        values.insert(TIME_REMAINING, "00:04:59".to_string());
        host.set_variable_values(&values);

        // Assert
        assert_eq!(host.variables()[TIME_REMAINING], "00:04:59");
    }
}
