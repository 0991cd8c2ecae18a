//! CommandChannel: sends commands to the server over HTTP.
//!
//! Every command is a `POST` to `http://{host}:{http_port}{endpoint}`.  The
//! server answers with a `{success, state?, error?}` envelope:
//!
//! | response                        | outcome                          |
//! |---------------------------------|----------------------------------|
//! | `success: true` with `state`    | state applied → `Applied`        |
//! | `success: true` without `state` | → `Accepted`                     |
//! | `success: false`                | logged at error → `Rejected`     |
//! | connect/timeout/bad body        | `Err(CommandFailed)`             |
//! | no host configured              | `Err(NoHostConfigured)`, no I/O  |
//!
//! The channel also serves the poll fallback through
//! [`CommandChannel::refresh_timer`], which fetches the current state with a
//! plain `GET`.
//!
//! # Architecture
//!
//! The HTTP client is injected as an [`HttpTransport`] so the use case can be
//! tested against a scripted transport.  The reqwest implementation lives in
//! `infrastructure::http`.

use std::sync::Arc;

use async_trait::async_trait;
use capacitimer_core::protocol::endpoints;
use capacitimer_core::{CommandResponse, TimerCommand, TimerState};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use super::state_store::{StateStore, UpdateSource};
use crate::domain::SharedConfig;

/// Errors from the HTTP transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection refused, DNS failure, timeout, and similar.
    #[error("request failed: {0}")]
    Request(String),

    #[error("server answered with HTTP {0}")]
    Status(u16),

    #[error("response is not the expected JSON: {0}")]
    Decode(String),

    #[error("could not encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Minimal JSON-over-HTTP client.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// `GET url`, requiring a 2xx status and a JSON body.
    async fn get_json(&self, url: &str) -> Result<Value, TransportError>;

    /// `POST url` with an optional JSON body.  The response body is decoded
    /// as JSON whatever the status, since the server reports rejections in
    /// the envelope.
    async fn post_json(&self, url: &str, body: Option<&Value>) -> Result<Value, TransportError>;
}

/// What the server did with a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Accepted, and the returned snapshot replaced local state.
    Applied,
    /// Accepted without a snapshot.
    Accepted,
    /// The server answered `success: false`, with its reason if it gave one.
    Rejected(Option<String>),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("no Capacitimer host configured")]
    NoHostConfigured,

    #[error("command to {endpoint} failed: {source}")]
    CommandFailed {
        endpoint: &'static str,
        source: TransportError,
    },
}

/// Sends commands and applies the snapshots they return.
#[derive(Clone)]
pub struct CommandChannel {
    config: SharedConfig,
    http: Arc<dyn HttpTransport>,
    store: StateStore,
}

impl CommandChannel {
    pub fn new(config: SharedConfig, http: Arc<dyn HttpTransport>, store: StateStore) -> Self {
        Self {
            config,
            http,
            store,
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Posts `command` to the resolved server.
    ///
    /// # Errors
    ///
    /// [`CommandError::NoHostConfigured`] when neither an explicit nor a
    /// discovered host is set (no request is made), and
    /// [`CommandError::CommandFailed`] on transport or decoding failure.
    /// A server-side rejection is `Ok(CommandOutcome::Rejected(_))`.
    pub async fn send(&self, command: &TimerCommand) -> Result<CommandOutcome, CommandError> {
        let target = self
            .config
            .resolve_target()
            .ok_or(CommandError::NoHostConfigured)?;
        let endpoint = command.endpoint();
        let failed = |source: TransportError| CommandError::CommandFailed { endpoint, source };

        let body = command
            .body()
            .map_err(|e| failed(TransportError::Encode(e)))?;
        let url = target.http_url(endpoint);
        debug!(%url, "sending command");

        let raw = self
            .http
            .post_json(&url, body.as_ref())
            .await
            .map_err(failed)?;
        let response: CommandResponse = serde_json::from_value(raw)
            .map_err(|e| failed(TransportError::Decode(e.to_string())))?;

        if !response.success {
            error!(
                endpoint,
                reason = response.error.as_deref().unwrap_or("unspecified"),
                "server rejected command"
            );
            return Ok(CommandOutcome::Rejected(response.error));
        }

        match response.state {
            Some(state) => {
                self.store.apply_timer(state, UpdateSource::CommandResponse);
                Ok(CommandOutcome::Applied)
            }
            None => Ok(CommandOutcome::Accepted),
        }
    }

    /// Fetches `GET /api/timer` and applies it as a full replacement.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send); a non-2xx status is a transport failure.
    pub async fn refresh_timer(&self) -> Result<(), CommandError> {
        let target = self
            .config
            .resolve_target()
            .ok_or(CommandError::NoHostConfigured)?;
        let failed = |source: TransportError| CommandError::CommandFailed {
            endpoint: endpoints::TIMER,
            source,
        };

        let raw = self
            .http
            .get_json(&target.http_url(endpoints::TIMER))
            .await
            .map_err(failed)?;
        let state: TimerState = serde_json::from_value(raw)
            .map_err(|e| failed(TransportError::Decode(e.to_string())))?;
        self.store.apply_timer(state, UpdateSource::Poll);
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
