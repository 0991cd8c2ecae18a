//! JSON message types spoken by a Capacitimer server.
//!
//! # Two channels
//!
//! ```text
//! Server → Client:  WebSocket text frame  →  PushFrame
//! Client → Server:  HTTP POST + JSON body →  CommandResponse
//! ```
//!
//! The WebSocket is receive-only: the server pushes snapshots, and every
//! command travels over HTTP.
//!
//! # Push frame discriminant
//!
//! Every push frame is an object with a `"type"` tag and a `"data"` payload:
//!
//! ```json
//! {"type":"timer-update","data":{"timeRemaining":42,"isRunning":true,"isPaused":false}}
//! {"type":"settings-update","data":{"showHours":false}}
//! ```
//!
//! Decoding happens in two steps so that a well-formed frame with a type this
//! client does not know about can be told apart from garbage: the first step
//! only requires `type` to be a string, the second interprets `data`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::settings::{Settings, SettingsPatch};
use crate::domain::timer::TimerState;

/// HTTP endpoint paths, relative to `http://{host}:{port}`.
pub mod endpoints {
    /// `GET` – current [`TimerState`](crate::TimerState).
    pub const TIMER: &str = "/api/timer";
    pub const START: &str = "/api/timer/start";
    pub const PAUSE: &str = "/api/timer/pause";
    pub const RESET: &str = "/api/timer/reset";
    /// Body: [`SetTimerBody`](super::SetTimerBody).
    pub const SET: &str = "/api/timer/set";
    /// Body: [`AdjustTimerBody`](super::AdjustTimerBody).
    pub const ADJUST: &str = "/api/timer/adjust";
    /// Body: partial settings ([`SettingsPatch`](crate::SettingsPatch)).
    pub const SETTINGS: &str = "/api/settings";
}

const TIMER_UPDATE: &str = "timer-update";
const SETTINGS_UPDATE: &str = "settings-update";

// ── Push frames ───────────────────────────────────────────────────────────────

/// A decoded WebSocket frame from the server.
#[derive(Debug, Clone, PartialEq)]
pub enum PushFrame {
    /// Full replacement of the countdown snapshot.
    TimerUpdate(TimerState),
    /// Full replacement of the display settings.
    SettingsUpdate(Settings),
}

/// Reasons a push frame could not be turned into a [`PushFrame`].
#[derive(Debug, Error)]
pub enum FrameError {
    /// The frame is not JSON, lacks a `type`, or its `data` does not match
    /// the shape its `type` promises.
    #[error("malformed push frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The frame is well-formed but carries a type this client ignores.
    #[error("unknown push frame type '{0}'")]
    UnknownType(String),
}

/// First decoding step: just the envelope.
#[derive(Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

/// Decodes one WebSocket text frame.
///
/// # Errors
///
/// Returns [`FrameError::Malformed`] when the text is not a valid frame and
/// [`FrameError::UnknownType`] when the `type` tag is not recognised.
pub fn decode_push_frame(text: &str) -> Result<PushFrame, FrameError> {
    let raw: RawFrame = serde_json::from_str(text)?;
    match raw.kind.as_str() {
        TIMER_UPDATE => Ok(PushFrame::TimerUpdate(serde_json::from_value(raw.data)?)),
        SETTINGS_UPDATE => Ok(PushFrame::SettingsUpdate(serde_json::from_value(raw.data)?)),
        _ => Err(FrameError::UnknownType(raw.kind)),
    }
}

/// Encodes a frame the way the server would send it.
pub fn encode_push_frame(frame: &PushFrame) -> Result<String, serde_json::Error> {
    let value = match frame {
        PushFrame::TimerUpdate(state) => {
            serde_json::json!({ "type": TIMER_UPDATE, "data": state })
        }
        PushFrame::SettingsUpdate(settings) => {
            serde_json::json!({ "type": SETTINGS_UPDATE, "data": settings })
        }
    };
    serde_json::to_string(&value)
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// The envelope returned by every `POST` endpoint.
///
/// ```json
/// {"success":true,"state":{"timeRemaining":300,"isRunning":true,"isPaused":false}}
/// {"success":false,"error":"timer is not running"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    /// A fresh snapshot, present when the command changed the countdown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<TimerState>,
    /// Optional human-readable failure reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `POST /api/timer/set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTimerBody {
    pub seconds: i64,
    pub keep_running: bool,
}

/// Body of `POST /api/timer/adjust`.  `seconds` is a signed delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustTimerBody {
    pub seconds: i64,
}

/// A command the client can send to the server.
#[derive(Debug, Clone, PartialEq)]
pub enum TimerCommand {
    Start,
    Pause,
    Reset,
    /// Load a new duration, optionally keeping the countdown running.
    Set { seconds: i64, keep_running: bool },
    /// Add (positive) or remove (negative) seconds.
    Adjust { seconds: i64 },
    /// Change any subset of the display settings.
    UpdateSettings(SettingsPatch),
}

impl TimerCommand {
    /// The endpoint path this command is posted to.
    pub fn endpoint(&self) -> &'static str {
        match self {
            TimerCommand::Start => endpoints::START,
            TimerCommand::Pause => endpoints::PAUSE,
            TimerCommand::Reset => endpoints::RESET,
            TimerCommand::Set { .. } => endpoints::SET,
            TimerCommand::Adjust { .. } => endpoints::ADJUST,
            TimerCommand::UpdateSettings(_) => endpoints::SETTINGS,
        }
    }

    /// The JSON body, or `None` for commands posted without one.
    ///
    /// # Errors
    ///
    /// Propagates `serde_json` serialization failures.
    pub fn body(&self) -> Result<Option<Value>, serde_json::Error> {
        let body = match self {
            TimerCommand::Start | TimerCommand::Pause | TimerCommand::Reset => return Ok(None),
            TimerCommand::Set {
                seconds,
                keep_running,
            } => serde_json::to_value(SetTimerBody {
                seconds: *seconds,
                keep_running: *keep_running,
            })?,
            TimerCommand::Adjust { seconds } => {
                serde_json::to_value(AdjustTimerBody { seconds: *seconds })?
            }
            TimerCommand::UpdateSettings(patch) => serde_json::to_value(patch)?,
        };
        Ok(Some(body))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::timer::RunState;
    use serde_json::json;

    #[test]
    fn test_decode_timer_update() {
        // Arrange
        let text = r#"{"type":"timer-update","data":{"timeRemaining":42,"isRunning":true,"isPaused":false,"lastSetTime":60}}"#;

        // Act
        let frame = decode_push_frame(text).unwrap();

        // Assert
        match frame {
            PushFrame::TimerUpdate(state) => {
                assert_eq!(state.time_remaining, 42);
                assert_eq!(state.run_state(), RunState::Running);
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn test_decode_settings_update() {
        let text = r#"{"type":"settings-update","data":{"showHours":false}}"#;
        match decode_push_frame(text).unwrap() {
            PushFrame::SettingsUpdate(settings) => assert!(!settings.show_hours),
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn test_settings_update_with_odd_cosmetic_values_still_decodes() {
        // Arrange
        let text = r#"{"type":"settings-update","data":{"showHours":false,"timerFontSize":120.5,"colorNormal":null}}"#;

        // Act
        let frame = decode_push_frame(text);

        // Assert
        match frame {
            Ok(PushFrame::SettingsUpdate(settings)) => {
                assert!(!settings.show_hours);
                assert_eq!(settings.color_normal, "#44ff44");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_timer_update_with_null_last_set_time_decodes() {
        let text = r#"{"type":"timer-update","data":{"timeRemaining":9,"isRunning":false,"isPaused":true,"lastSetTime":null}}"#;
        match decode_push_frame(text) {
            Ok(PushFrame::TimerUpdate(state)) => {
                assert_eq!(state.time_remaining, 9);
                assert_eq!(state.last_set_time, 0);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_decode_non_json_is_malformed() {
        let result = decode_push_frame("not json at all");
        assert!(matches!(result, Err(FrameError::Malformed(_))));
    }

    #[test]
    fn test_decode_missing_type_is_malformed() {
        let result = decode_push_frame(r#"{"data":{}}"#);
        assert!(matches!(result, Err(FrameError::Malformed(_))));
    }

    #[test]
    fn test_decode_timer_update_with_bad_data_is_malformed() {
        // `isRunning` must be a boolean.
        let text = r#"{"type":"timer-update","data":{"timeRemaining":1,"isRunning":"yes","isPaused":false}}"#;
        assert!(matches!(decode_push_frame(text), Err(FrameError::Malformed(_))));
    }

    #[test]
    fn test_decode_unknown_type_is_reported_separately() {
        let result = decode_push_frame(r#"{"type":"message-update","data":{"text":"hi"}}"#);
        match result {
            Err(FrameError::UnknownType(kind)) => assert_eq!(kind, "message-update"),
            other => panic!("expected UnknownType, got {other:?}"),
        }
    }

    #[test]
    fn test_encode_then_decode_timer_frame() {
        let state = TimerState {
            time_remaining: -3,
            is_running: true,
            ..TimerState::default()
        };
        let text = encode_push_frame(&PushFrame::TimerUpdate(state.clone())).unwrap();
        assert_eq!(decode_push_frame(&text).unwrap(), PushFrame::TimerUpdate(state));
    }

    #[test]
    fn test_command_response_without_state() {
        let resp: CommandResponse = serde_json::from_value(json!({"success": true})).unwrap();
        assert!(resp.success);
        assert!(resp.state.is_none());
        assert!(resp.error.is_none());
    }

    #[test]
    fn test_command_response_with_state_and_extra_fields() {
        let resp: CommandResponse = serde_json::from_value(json!({
            "success": true,
            "message": "started",
            "state": {"timeRemaining": 300, "isRunning": true, "isPaused": false, "lastSetTime": 300}
        }))
        .unwrap();
        assert_eq!(resp.state.unwrap().time_remaining, 300);
    }

    #[test]
    fn test_command_endpoints() {
        assert_eq!(TimerCommand::Start.endpoint(), "/api/timer/start");
        assert_eq!(TimerCommand::Pause.endpoint(), "/api/timer/pause");
        assert_eq!(TimerCommand::Reset.endpoint(), "/api/timer/reset");
        assert_eq!(
            TimerCommand::Set { seconds: 1, keep_running: false }.endpoint(),
            "/api/timer/set"
        );
        assert_eq!(TimerCommand::Adjust { seconds: -1 }.endpoint(), "/api/timer/adjust");
        assert_eq!(
            TimerCommand::UpdateSettings(SettingsPatch::default()).endpoint(),
            "/api/settings"
        );
    }

    #[test]
    fn test_bodyless_commands_have_no_body() {
        assert_eq!(TimerCommand::Start.body().unwrap(), None);
        assert_eq!(TimerCommand::Pause.body().unwrap(), None);
        assert_eq!(TimerCommand::Reset.body().unwrap(), None);
    }

    #[test]
    fn test_set_body_uses_camel_case() {
        let body = TimerCommand::Set { seconds: 3725, keep_running: true }.body().unwrap();
        assert_eq!(body, Some(json!({"seconds": 3725, "keepRunning": true})));
    }

    #[test]
    fn test_adjust_body_keeps_sign() {
        let body = TimerCommand::Adjust { seconds: -30 }.body().unwrap();
        assert_eq!(body, Some(json!({"seconds": -30})));
    }
}
