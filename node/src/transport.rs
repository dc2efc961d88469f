//! Outbound delivery of advertisements to neighbors.
//!
//! [`Transport`] is the seam between the update scheduler and the network.
//! [`HttpTransport`] posts JSON to `http://{neighbor}/receive_update`, the
//! endpoint served by `ripd-rpc` on every node.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use ripd_types::UpdateMessage;

/// Upper bound on the TCP connect phase.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("neighbor answered with HTTP {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Request(String),
}

/// Delivers one advertisement to one neighbor.
///
/// Implementations must not retry: the next periodic cycle resends the
/// current state anyway.
pub trait Transport: Send + Sync + 'static {
    fn send(
        &self,
        neighbor: &str,
        message: &UpdateMessage,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// JSON-over-HTTP transport with a shared connection pool.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(CONNECT_TIMEOUT))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    fn endpoint(neighbor: &str) -> String {
        format!("http://{neighbor}/receive_update")
    }
}

impl Transport for HttpTransport {
    async fn send(&self, neighbor: &str, message: &UpdateMessage) -> Result<(), TransportError> {
        let response = self
            .client
            .post(Self::endpoint(neighbor))
            .json(message)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(e.to_string())
                } else if e.is_connect() {
                    TransportError::Connect(e.to_string())
                } else {
                    TransportError::Request(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}
