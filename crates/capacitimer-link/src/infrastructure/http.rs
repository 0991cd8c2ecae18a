//! reqwest implementation of [`HttpTransport`].
//!
//! Capacitimer servers live on the local network, so the client ignores any
//! system proxy and uses short timeouts: a dead server should fail a button
//! press within seconds, not hang it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;

use crate::application::send_command::{HttpTransport, TransportError};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] if the client cannot be built.
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .no_proxy()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(request_error)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get_json(&self, url: &str) -> Result<Value, TransportError> {
        let response = self.client.get(url).send().await.map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        decode(response).await
    }

    async fn post_json(&self, url: &str, body: Option<&Value>) -> Result<Value, TransportError> {
        let mut request = self.client.post(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(request_error)?;
        let status = response.status();
        match decode(response).await {
            Ok(value) => Ok(value),
            // A non-JSON error page says more through its status than its body.
            Err(_) if !status.is_success() => Err(TransportError::Status(status.as_u16())),
            Err(e) => Err(e),
        }
    }
}

async fn decode(response: Response) -> Result<Value, TransportError> {
    response
        .json::<Value>()
        .await
        .map_err(|e| TransportError::Decode(e.to_string()))
}

fn request_error(e: reqwest::Error) -> TransportError {
    TransportError::Request(e.to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
