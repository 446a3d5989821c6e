//! In-process transport adapter for tests and single-process deployments.

use crate::rpc::{
    codec,
    dispatcher::Dispatcher,
    domain::{Endpoint, RpcRequest, RpcResponse},
    ports::{RpcTransport, TransportError, TransportResult},
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// Routes calls straight to in-process dispatchers.
///
/// Requests and responses still pass through the codec so handlers see
/// exactly what they would see over HTTP.
#[derive(Clone, Default)]
pub struct LoopbackTransport {
    state: Arc<RwLock<LoopbackState>>,
}

#[derive(Default)]
struct LoopbackState {
    agents: HashMap<Endpoint, Arc<Dispatcher>>,
    unreachable: HashSet<Endpoint>,
}

fn lock_error(err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(err.to_string())
}

impl LoopbackTransport {
    /// Creates a transport with no mounted agents.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounts a dispatcher at an endpoint, replacing any earlier mount.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when lock acquisition fails.
    pub fn mount(&self, endpoint: Endpoint, dispatcher: Arc<Dispatcher>) -> std::io::Result<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.agents.insert(endpoint, dispatcher);
        Ok(())
    }

    /// Makes calls to an endpoint fail as if the connection were refused.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when lock acquisition fails.
    pub fn set_unreachable(&self, endpoint: &Endpoint, unreachable: bool) -> std::io::Result<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if unreachable {
            state.unreachable.insert(endpoint.clone());
        } else {
            state.unreachable.remove(endpoint);
        }
        Ok(())
    }

    fn lookup(&self, endpoint: &Endpoint) -> TransportResult<Arc<Dispatcher>> {
        let state = self
            .state
            .read()
            .map_err(|err| TransportError::connection(endpoint, lock_error(err)))?;
        if state.unreachable.contains(endpoint) {
            return Err(TransportError::connection(
                endpoint,
                std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
            ));
        }
        state.agents.get(endpoint).cloned().ok_or_else(|| {
            TransportError::connection(
                endpoint,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no agent mounted"),
            )
        })
    }
}

#[async_trait]
impl RpcTransport for LoopbackTransport {
    async fn call(
        &self,
        endpoint: &Endpoint,
        request: RpcRequest,
    ) -> TransportResult<RpcResponse> {
        let dispatcher = self.lookup(endpoint)?;
        let response = match codec::decode(&codec::encode_request(&request)) {
            Ok(decoded) => dispatcher.dispatch(decoded).await,
            Err(err) => Some(err.to_response()),
        };
        let Some(response) = response else {
            return Err(TransportError::NoResponse {
                endpoint: endpoint.clone(),
                status: 204,
            });
        };
        codec::decode_response(&codec::encode(&response)).map_err(|source| {
            TransportError::MalformedResponse {
                endpoint: endpoint.clone(),
                source,
            }
        })
    }
}
