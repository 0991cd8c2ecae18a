//! The single writer for TimerState and Settings.
//!
//! Three paths produce snapshots: WebSocket push frames, the HTTP poller, and
//! command responses.  All of them funnel through [`StateStore::apply_timer`]
//! or [`StateStore::apply_settings`], which replace the stored value and then
//! notify the host (variable export + feedback re-evaluation).  Whichever
//! snapshot arrives last wins.
//!
//! Locks are held only for the copy in or out, never across an `.await` or a
//! host callback.

use std::sync::{Arc, PoisonError, RwLock};

use capacitimer_core::{export_variables, Settings, TimerState};
use tracing::trace;

use super::host::HostSurface;

/// Which path produced a snapshot.  Used only for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateSource {
    Push,
    Poll,
    CommandResponse,
}

#[derive(Debug, Default)]
struct Snapshot {
    timer: TimerState,
    settings: Settings,
}

/// Shared state cell.  Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct StateStore {
    inner: Arc<RwLock<Snapshot>>,
    host: Arc<dyn HostSurface>,
}

impl StateStore {
    /// Creates a store holding the all-zero initial timer and default settings.
    pub fn new(host: Arc<dyn HostSurface>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Snapshot::default())),
            host,
        }
    }

    pub fn timer(&self) -> TimerState {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .timer
            .clone()
    }

    pub fn settings(&self) -> Settings {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .settings
            .clone()
    }

    /// Replaces the timer snapshot and notifies the host.
    pub fn apply_timer(&self, timer: TimerState, source: UpdateSource) {
        trace!(?source, time_remaining = timer.time_remaining, "applying timer snapshot");
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .timer = timer;
        self.publish();
    }

    /// Replaces the settings and notifies the host.
    ///
    /// Variables are re-exported because the show-flags change how the
    /// time-valued variables are formatted.
    pub fn apply_settings(&self, settings: Settings, source: UpdateSource) {
        trace!(?source, "applying settings snapshot");
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .settings = settings;
        self.publish();
    }

    /// Exports the current variables without changing anything.
    pub fn export_current(&self) {
        let values = {
            let snapshot = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            export_variables(&snapshot.timer, &snapshot.settings)
        };
        self.host.set_variable_values(&values);
    }

    fn publish(&self) {
        self.export_current();
        self.host.check_feedbacks();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::RecordingHost;
    use capacitimer_core::variables::{IS_RUNNING, TIME_REMAINING};

    fn store() -> (StateStore, Arc<RecordingHost>) {
        let host = Arc::new(RecordingHost::default());
        let store = StateStore::new(Arc::clone(&host) as Arc<dyn HostSurface>);
        (store, host)
    }

    #[test]
    fn test_initial_state_is_all_zero() {
        let (store, host) = store();
        assert_eq!(store.timer(), TimerState::default());
        assert_eq!(store.settings(), Settings::default());
        assert!(host.last_variables().is_none(), "construction must not notify");
    }

    #[test]
    fn test_apply_timer_replaces_and_notifies() {
        // Arrange
        let (store, host) = store();
        let timer = TimerState {
            time_remaining: 90,
            is_running: true,
            ..TimerState::default()
        };

        // Act
        store.apply_timer(timer.clone(), UpdateSource::Push);

        // Assert
        assert_eq!(store.timer(), timer);
        let values = host.last_variables().unwrap();
        assert_eq!(values[TIME_REMAINING], "00:01:30");
        assert_eq!(values[IS_RUNNING], "Yes");
        assert_eq!(host.feedback_checks(), 1);
    }

    #[test]
    fn test_apply_timer_is_wholesale_replacement() {
        let (store, _host) = store();
        store.apply_timer(
            TimerState {
                time_remaining: 10,
                is_running: true,
                is_paused: true,
                last_set_time: 60,
                ..TimerState::default()
            },
            UpdateSource::Push,
        );

        store.apply_timer(
            TimerState {
                time_remaining: 5,
                ..TimerState::default()
            },
            UpdateSource::Poll,
        );

        let timer = store.timer();
        assert!(!timer.is_running);
        assert!(!timer.is_paused);
        assert_eq!(timer.last_set_time, 0);
    }

    #[test]
    fn test_apply_settings_reformats_variables() {
        // Arrange
        let (store, host) = store();
        store.apply_timer(
            TimerState {
                time_remaining: 3725,
                ..TimerState::default()
            },
            UpdateSource::Push,
        );

        // Act
        store.apply_settings(
            Settings {
                show_hours: false,
                ..Settings::default()
            },
            UpdateSource::Push,
        );

        // Assert
        assert_eq!(host.last_variables().unwrap()[TIME_REMAINING], "62:05");
        assert_eq!(host.feedback_checks(), 2);
    }

    #[test]
    fn test_clones_share_state() {
        let (store, _host) = store();
        let other = store.clone();
        other.apply_timer(
            TimerState {
                time_remaining: -4,
                ..TimerState::default()
            },
            UpdateSource::CommandResponse,
        );
        assert_eq!(store.timer().time_remaining, -4);
    }
}
