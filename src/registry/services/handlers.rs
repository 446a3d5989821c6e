//! RPC method bindings for the registry agent.

use super::{RegistryService, RegistryServiceError};
use crate::registry::{
    domain::{AgentCard, AgentName},
    ports::{AgentCardRepository, RegistryStoreError},
};
use crate::rpc::{
    dispatcher::{DispatcherBuilder, HandlerError, NoParams, typed},
    domain::ErrorCode,
};
use serde::{Deserialize, Serialize};

/// Params of `get_agent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetAgentParams {
    /// Agent to look up.
    pub name: String,
}

/// Params of `get_method_details`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDetailsParams {
    /// Agent to look up.
    pub agent_name: String,
    /// Method to describe.
    pub method_name: String,
}

/// Result of `list_agents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListAgentsResult {
    /// Cards in registration order.
    pub agents: Vec<AgentCard>,
}

/// Result of `register_agent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterAgentResult {
    /// Always `registered`.
    pub status: String,
    /// Name the card was stored under.
    pub name: AgentName,
}

/// Binds `get_agent`, `list_agents`, `get_method_details` and
/// `register_agent` to the registry service.
#[must_use]
pub fn bind_registry_methods<R>(
    builder: DispatcherBuilder,
    service: &RegistryService<R>,
) -> DispatcherBuilder
where
    R: AgentCardRepository + 'static,
{
    let get = service.clone();
    let list = service.clone();
    let details = service.clone();
    let register = service.clone();

    builder
        .bind(
            "get_agent",
            typed(move |params: GetAgentParams| {
                let registry = get.clone();
                async move { registry.get(&params.name).await.map_err(to_handler_error) }
            }),
        )
        .bind(
            "list_agents",
            typed(move |_: NoParams| {
                let registry = list.clone();
                async move {
                    let agents = registry.list().await.map_err(to_handler_error)?;
                    Ok(ListAgentsResult { agents })
                }
            }),
        )
        .bind(
            "get_method_details",
            typed(move |params: MethodDetailsParams| {
                let registry = details.clone();
                async move {
                    registry
                        .method_details(&params.agent_name, &params.method_name)
                        .await
                        .map_err(to_handler_error)
                }
            }),
        )
        .bind(
            "register_agent",
            typed(move |card: AgentCard| {
                let registry = register.clone();
                async move {
                    let stored = registry.register(card).await.map_err(to_handler_error)?;
                    Ok(RegisterAgentResult {
                        status: "registered".to_owned(),
                        name: stored.name().clone(),
                    })
                }
            }),
        )
}

fn to_handler_error(err: RegistryServiceError) -> HandlerError {
    match err {
        RegistryServiceError::Domain(domain) => HandlerError::InvalidParams(domain.to_string()),
        RegistryServiceError::NotFound(name) => {
            HandlerError::application(ErrorCode::NotFound, format!("Agent '{name}' not found"))
        }
        RegistryServiceError::MethodNotDeclared { agent, method } => HandlerError::application(
            ErrorCode::NotFound,
            format!("Method '{method}' not found for agent '{agent}'"),
        ),
        RegistryServiceError::Store(RegistryStoreError::DuplicateName(name)) => {
            HandlerError::application(
                ErrorCode::Conflict,
                format!("Agent '{name}' is already registered"),
            )
        }
        RegistryServiceError::Store(other) => HandlerError::internal(other),
    }
}
