//! WebSocket push channel.
//!
//! The server pushes JSON text frames; the client never sends anything.  The
//! sync engine talks to the socket only through [`PushTransport`] and
//! [`PushConnection`], so its reconnect logic can be exercised against a fake
//! transport under a paused clock.
//!
//! Frame handling in [`WsConnection`]:
//!
//! | frame        | result                                   |
//! |--------------|------------------------------------------|
//! | Text         | returned                                 |
//! | Binary UTF-8 | returned as text                         |
//! | Binary other | skipped                                  |
//! | Ping / Pong  | skipped (tungstenite answers pings)      |
//! | Close / EOF  | `None`                                   |
//! | error        | `Some(Err(PushError::Receive))`          |

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace};

/// Upper bound on the TCP connect plus WebSocket handshake.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum PushError {
    #[error("could not connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("push channel error: {0}")]
    Receive(String),
}

/// Opens push connections.
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn open(&self, url: &str) -> Result<Box<dyn PushConnection>, PushError>;
}

/// One open push connection.
#[async_trait]
pub trait PushConnection: Send {
    /// Waits for the next text frame.  `None` means the server closed the
    /// connection cleanly.
    async fn next_text(&mut self) -> Option<Result<String, PushError>>;

    /// Starts a graceful close.
    async fn close(&mut self);
}

/// tokio-tungstenite implementation of [`PushTransport`].
#[derive(Debug, Clone, Copy)]
pub struct WsTransport {
    connect_timeout: Duration,
}

impl WsTransport {
    pub fn with_connect_timeout(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for WsTransport {
    fn default() -> Self {
        Self::with_connect_timeout(CONNECT_TIMEOUT)
    }
}

#[async_trait]
impl PushTransport for WsTransport {
    async fn open(&self, url: &str) -> Result<Box<dyn PushConnection>, PushError> {
        let connect_error = |reason: String| PushError::Connect {
            url: url.to_string(),
            reason,
        };
        let (stream, _response) = tokio::time::timeout(self.connect_timeout, connect_async(url))
            .await
            .map_err(|_| connect_error(format!("timed out after {:?}", self.connect_timeout)))?
            .map_err(|e| connect_error(e.to_string()))?;
        Ok(Box::new(WsConnection { stream }))
    }
}

struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl PushConnection for WsConnection {
    async fn next_text(&mut self) -> Option<Result<String, PushError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                    Ok(text) => return Some(Ok(text)),
                    Err(_) => debug!("skipping non-UTF-8 binary frame"),
                },
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "server closed push channel");
                    return None;
                }
                Ok(other) => trace!(?other, "skipping control frame"),
                Err(e) => return Some(Err(PushError::Receive(e.to_string()))),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!("push channel close: {e}");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
