//! HTTP transport adapter posting envelopes to remote `/a2a` endpoints.

use crate::rpc::{
    codec,
    domain::{Endpoint, RpcRequest, RpcResponse},
    ports::{RpcTransport, TransportError, TransportResult},
};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

/// Settings for the HTTP transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTransportConfig {
    /// Deadline for a whole call, connection included.
    pub call_timeout: Duration,
    /// Deadline for establishing the connection.
    pub connect_timeout: Duration,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(3),
        }
    }
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: HttpTransportConfig,
}

impl HttpTransport {
    /// Builds a transport with the given deadlines.
    ///
    /// # Errors
    ///
    /// Returns the underlying client error when the HTTP client cannot be
    /// constructed.
    pub fn new(config: HttpTransportConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.call_timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    fn classify(&self, endpoint: &Endpoint, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                endpoint: endpoint.clone(),
                timeout: self.config.call_timeout,
            }
        } else {
            TransportError::connection(endpoint, err)
        }
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(
        &self,
        endpoint: &Endpoint,
        request: RpcRequest,
    ) -> TransportResult<RpcResponse> {
        let response = self
            .client
            .post(endpoint.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(codec::encode_request(&request))
            .send()
            .await
            .map_err(|err| self.classify(endpoint, err))?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Err(TransportError::NoResponse {
                endpoint: endpoint.clone(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| self.classify(endpoint, err))?;

        codec::decode_response(&body).map_err(|source| {
            if status.is_success() {
                TransportError::MalformedResponse {
                    endpoint: endpoint.clone(),
                    source,
                }
            } else {
                TransportError::NoResponse {
                    endpoint: endpoint.clone(),
                    status: status.as_u16(),
                }
            }
        })
    }
}
