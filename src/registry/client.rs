//! Caching registry lookup used by agents to find each other.

use crate::registry::domain::{AgentCard, AgentName};
use crate::registry::services::{GetAgentParams, ListAgentsResult};
use crate::rpc::{
    client::{CallError, RpcClient},
    domain::{Endpoint, ErrorCode, empty_params},
    ports::RpcTransport,
};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tracing::{debug, warn};

/// Failures resolving an agent card.
#[derive(Debug, Clone, Error)]
pub enum RegistryClientError {
    /// The registry has no card under the name. This is a configuration
    /// fault and retrying will not help.
    #[error("agent '{0}' is not registered")]
    UnknownAgent(AgentName),

    /// The registry could not be reached or failed to answer.
    #[error("registry unavailable: {0}")]
    RegistryUnavailable(#[source] CallError),

    /// The registry answered with something that is not a valid card.
    #[error("registry returned an invalid card: {0}")]
    InvalidCard(Arc<serde_json::Error>),
}

impl RegistryClientError {
    /// Returns `true` when a later attempt may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RegistryUnavailable(_))
    }
}

/// Resolves agent cards through the registry agent, caching results for the
/// life of the process.
///
/// The cache is the only shared mutable state. Concurrent misses for the
/// same name may both call the registry; the later insert overwrites the
/// earlier one with an identical card.
pub struct RegistryClient<T: RpcTransport> {
    rpc: Arc<RpcClient<T>>,
    registry: Endpoint,
    cache: RwLock<HashMap<AgentName, AgentCard>>,
}

impl<T: RpcTransport> RegistryClient<T> {
    /// Creates a client for the registry agent at `registry`.
    #[must_use]
    pub fn new(rpc: Arc<RpcClient<T>>, registry: Endpoint) -> Self {
        Self {
            rpc,
            registry,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the registry endpoint.
    #[must_use]
    pub const fn registry(&self) -> &Endpoint {
        &self.registry
    }

    /// Resolves the card registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryClientError::UnknownAgent`] when the registry reports
    /// the name as not found, [`RegistryClientError::RegistryUnavailable`] on
    /// transport or registry failure, and
    /// [`RegistryClientError::InvalidCard`] when the answer is not a card.
    pub async fn resolve(&self, name: &AgentName) -> Result<AgentCard, RegistryClientError> {
        if let Some(card) = self.cached(name) {
            return Ok(card);
        }

        let params = serde_json::to_value(GetAgentParams {
            name: name.as_str().to_owned(),
        })
        .map_err(|err| RegistryClientError::InvalidCard(Arc::new(err)))?;

        let value = self
            .rpc
            .call(&self.registry, "get_agent", params)
            .await
            .map_err(|err| match err {
                CallError::Remote(ref remote) if remote.is(ErrorCode::NotFound) => {
                    RegistryClientError::UnknownAgent(name.clone())
                }
                other => {
                    warn!(agent = %name, error = %other, "registry lookup failed");
                    RegistryClientError::RegistryUnavailable(other)
                }
            })?;

        let card: AgentCard = serde_json::from_value(value)
            .map_err(|err| RegistryClientError::InvalidCard(Arc::new(err)))?;
        debug!(agent = %name, endpoint = %card.endpoint(), "resolved agent card");
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.clone(), card.clone());
        Ok(card)
    }

    /// Drops the cached card for `name`, forcing the next resolve to ask the
    /// registry again.
    pub fn invalidate(&self, name: &AgentName) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
    }

    /// Lists every registered card. Results are not cached.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryClientError::RegistryUnavailable`] on transport or
    /// registry failure, and [`RegistryClientError::InvalidCard`] when the
    /// answer cannot be decoded.
    pub async fn list_agents(&self) -> Result<Vec<AgentCard>, RegistryClientError> {
        let value = self
            .rpc
            .call(&self.registry, "list_agents", empty_params())
            .await
            .map_err(RegistryClientError::RegistryUnavailable)?;
        let result: ListAgentsResult = serde_json::from_value(value)
            .map_err(|err| RegistryClientError::InvalidCard(Arc::new(err)))?;
        Ok(result.agents)
    }

    fn cached(&self, name: &AgentName) -> Option<AgentCard> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}
