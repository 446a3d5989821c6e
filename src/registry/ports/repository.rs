//! Repository port for agent card persistence.

use crate::registry::domain::{AgentCard, AgentName};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for registry store operations.
pub type RegistryStoreResult<T> = Result<T, RegistryStoreError>;

/// Durable mapping of agent name to agent card.
///
/// Cards are write-once: there is no update or delete.
#[async_trait]
pub trait AgentCardRepository: Send + Sync {
    /// Stores a new card.
    ///
    /// The name check and the insert happen atomically, so of two concurrent
    /// registrations under one name exactly one succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryStoreError::DuplicateName`] when the name is already
    /// registered.
    async fn register(&self, card: &AgentCard) -> RegistryStoreResult<()>;

    /// Finds a card by name.
    ///
    /// Returns `None` when no card has the given name.
    async fn find_by_name(&self, name: &AgentName) -> RegistryStoreResult<Option<AgentCard>>;

    /// Returns all cards in insertion order.
    async fn list(&self) -> RegistryStoreResult<Vec<AgentCard>>;
}

/// Errors returned by registry store implementations.
#[derive(Debug, Clone, Error)]
pub enum RegistryStoreError {
    /// A card with the same name already exists.
    #[error("duplicate agent name: {0}")]
    DuplicateName(AgentName),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl RegistryStoreError {
    /// Wraps a data-quality or deserialization error from persisted rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
