//! Transport port for issuing remote calls to other agents.

use crate::rpc::codec::ParseError;
use crate::rpc::domain::{Endpoint, RpcRequest, RpcResponse};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Carries one request envelope to an endpoint and returns its response.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Sends a request that expects a response.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the endpoint cannot be reached, does
    /// not answer within the timeout, or answers with something other than a
    /// response envelope.
    async fn call(&self, endpoint: &Endpoint, request: RpcRequest)
    -> TransportResult<RpcResponse>;
}

/// Transport-level failures. All of them are treated as retryable.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The connection could not be established or broke mid-call.
    #[error("connection to {endpoint} failed: {source}")]
    Connection {
        /// Target endpoint.
        endpoint: Endpoint,
        /// Underlying cause.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// The call did not complete before its deadline.
    #[error("call to {endpoint} timed out after {timeout:?}")]
    Timeout {
        /// Target endpoint.
        endpoint: Endpoint,
        /// Deadline that elapsed.
        timeout: Duration,
    },

    /// The endpoint answered without a response envelope.
    #[error("{endpoint} sent no response envelope (HTTP status {status})")]
    NoResponse {
        /// Target endpoint.
        endpoint: Endpoint,
        /// HTTP status received.
        status: u16,
    },

    /// The endpoint answered with an undecodable envelope.
    #[error("malformed response from {endpoint}: {source}")]
    MalformedResponse {
        /// Target endpoint.
        endpoint: Endpoint,
        /// Decoding failure.
        source: ParseError,
    },
}

impl TransportError {
    /// Wraps a connection failure.
    #[must_use]
    pub fn connection(
        endpoint: &Endpoint,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            endpoint: endpoint.clone(),
            source: Arc::new(err),
        }
    }
}
