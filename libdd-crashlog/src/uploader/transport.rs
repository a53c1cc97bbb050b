// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TransportError {
    /// The TCP/socket connection to the collector could not be established.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    /// The request did not complete within the transmit timeout.
    #[error("request timed out")]
    TimedOut,
    /// Anything but 200 is a rejection, including other 2xx codes.
    #[error("collector answered with status {status}")]
    UnexpectedStatus { status: u16 },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("I/O error: {0}")]
    Io(String),
}

/// Delivers one batch body to the collector. Blocking; called from the
/// upload thread.
pub trait Transport: Send + Sync {
    fn send(&self, body: Bytes) -> Result<(), TransportError>;
}

/// POSTs batch bodies over HTTP.
///
/// Each send runs on its own current-thread runtime, so the transport must not
/// be used from within an async context.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: reqwest::Url,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, TransportError> {
        let endpoint = reqwest::Url::parse(endpoint)
            .map_err(|e| TransportError::InvalidConfig(format!("endpoint {endpoint:?}: {e}")))?;
        // Pooled connections would outlive the runtime of the send that opened them.
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| TransportError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &reqwest::Url {
        &self.endpoint
    }

    async fn post(&self, body: Bytes) -> Result<(), TransportError> {
        let request = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send();
        let response = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| TransportError::TimedOut)?
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        debug!("collector answered with status {status}");
        if status == 200 {
            Ok(())
        } else {
            Err(TransportError::UnexpectedStatus { status })
        }
    }
}

impl Transport for HttpTransport {
    fn send(&self, body: Bytes) -> Result<(), TransportError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TransportError::Io(e.to_string()))?;
        runtime.block_on(self.post(body))
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::TimedOut
    } else if e.is_connect() {
        TransportError::ConnectionFailed(e.to_string())
    } else {
        TransportError::Io(e.to_string())
    }
}
