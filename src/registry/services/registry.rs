//! Service layer for agent card registration and discovery.

use crate::registry::{
    domain::{AgentCard, AgentName, MethodDescriptor, RegistryDomainError},
    ports::{AgentCardRepository, RegistryStoreError},
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Service-level errors for registry operations.
#[derive(Debug, Error)]
pub enum RegistryServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] RegistryDomainError),

    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] RegistryStoreError),

    /// No card is registered under the name.
    #[error("agent not found: {0}")]
    NotFound(AgentName),

    /// The agent exists but does not declare the method.
    #[error("agent '{agent}' does not declare method '{method}'")]
    MethodNotDeclared {
        /// Agent looked up.
        agent: AgentName,
        /// Method requested.
        method: String,
    },
}

/// Result type for registry service operations.
pub type RegistryServiceResult<T> = Result<T, RegistryServiceError>;

/// Outcome of seeding the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    /// Cards newly stored.
    pub inserted: usize,
    /// Cards skipped because the name already existed.
    pub skipped: usize,
}

/// Agent card registration and discovery service.
pub struct RegistryService<R>
where
    R: AgentCardRepository,
{
    repository: Arc<R>,
}

impl<R> Clone for RegistryService<R>
where
    R: AgentCardRepository,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R> RegistryService<R>
where
    R: AgentCardRepository,
{
    /// Creates a new registry service.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Stores every card whose name is not yet registered.
    ///
    /// Existing cards are left untouched, so seeding on every start is safe.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Store`] on any failure other than a
    /// duplicate name.
    pub async fn seed(
        &self,
        cards: Vec<AgentCard>,
    ) -> RegistryServiceResult<SeedSummary> {
        let mut summary = SeedSummary::default();
        for card in cards {
            match self.repository.register(&card).await {
                Ok(()) => summary.inserted += 1,
                Err(RegistryStoreError::DuplicateName(name)) => {
                    debug!(agent = %name, "seed card already registered");
                    summary.skipped += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
        info!(
            inserted = summary.inserted,
            skipped = summary.skipped,
            "registry seeded"
        );
        Ok(summary)
    }

    /// Registers a new card.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Store`] wrapping
    /// [`RegistryStoreError::DuplicateName`] when the name is taken.
    pub async fn register(&self, card: AgentCard) -> RegistryServiceResult<AgentCard> {
        self.repository.register(&card).await?;
        info!(agent = %card.name(), endpoint = %card.endpoint(), "agent registered");
        Ok(card)
    }

    /// Returns the card registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Domain`] when the name is invalid or
    /// [`RegistryServiceError::NotFound`] when nothing is registered under it.
    pub async fn get(&self, name: &str) -> RegistryServiceResult<AgentCard> {
        let agent = AgentName::new(name)?;
        self.repository
            .find_by_name(&agent)
            .await?
            .ok_or(RegistryServiceError::NotFound(agent))
    }

    /// Returns every card in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Store`] when the lookup fails.
    pub async fn list(&self) -> RegistryServiceResult<Vec<AgentCard>> {
        Ok(self.repository.list().await?)
    }

    /// Returns the descriptor of `method_name` on `agent_name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::NotFound`] when the agent is unknown
    /// or [`RegistryServiceError::MethodNotDeclared`] when it does not
    /// declare the method.
    pub async fn method_details(
        &self,
        agent_name: &str,
        method_name: &str,
    ) -> RegistryServiceResult<MethodDescriptor> {
        let card = self.get(agent_name).await?;
        card.method(method_name)
            .cloned()
            .ok_or_else(|| RegistryServiceError::MethodNotDeclared {
                agent: card.name().clone(),
                method: method_name.to_owned(),
            })
    }
}
