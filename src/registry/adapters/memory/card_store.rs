//! In-memory agent card store for tests and single-process runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::registry::{
    domain::{AgentCard, AgentName},
    ports::{AgentCardRepository, RegistryStoreError, RegistryStoreResult},
};

/// Thread-safe in-memory card store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCardStore {
    state: Arc<RwLock<InMemoryCardState>>,
}

#[derive(Debug, Default)]
struct InMemoryCardState {
    cards: HashMap<AgentName, AgentCard>,
    order: Vec<AgentName>,
}

impl InMemoryCardStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> RegistryStoreError {
    RegistryStoreError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl AgentCardRepository for InMemoryCardStore {
    async fn register(&self, card: &AgentCard) -> RegistryStoreResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;

        if state.cards.contains_key(card.name()) {
            return Err(RegistryStoreError::DuplicateName(card.name().clone()));
        }

        state.order.push(card.name().clone());
        state.cards.insert(card.name().clone(), card.clone());
        Ok(())
    }

    async fn find_by_name(&self, name: &AgentName) -> RegistryStoreResult<Option<AgentCard>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.cards.get(name).cloned())
    }

    async fn list(&self) -> RegistryStoreResult<Vec<AgentCard>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .order
            .iter()
            .filter_map(|name| state.cards.get(name))
            .cloned()
            .collect())
    }
}
