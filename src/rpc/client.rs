//! Outbound call helper assigning correlation tokens.

use crate::rpc::domain::{Endpoint, RequestId, RpcError, RpcRequest};
use crate::rpc::ports::{RpcTransport, TransportError};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use thiserror::Error;

/// Failure of a remote call as seen by the caller.
#[derive(Debug, Clone, Error)]
pub enum CallError {
    /// No response envelope arrived.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The remote agent answered with an error response.
    #[error("remote error: {0}")]
    Remote(RpcError),
}

/// Issues method calls over an [`RpcTransport`].
pub struct RpcClient<T: RpcTransport> {
    transport: Arc<T>,
    next_id: AtomicI64,
}

impl<T: RpcTransport> RpcClient<T> {
    /// Creates a client over the given transport.
    #[must_use]
    pub const fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            next_id: AtomicI64::new(1),
        }
    }

    /// Calls `method` on the agent at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::Transport`] when no response arrives and
    /// [`CallError::Remote`] when the agent answers with an error.
    pub async fn call(
        &self,
        endpoint: &Endpoint,
        method: &str,
        params: Value,
    ) -> Result<Value, CallError> {
        let id = RequestId::from(self.next_id.fetch_add(1, Ordering::Relaxed));
        let request = RpcRequest::new(method, params, id);
        let response = self.transport.call(endpoint, request).await?;
        response.into_result().map_err(CallError::Remote)
    }
}
