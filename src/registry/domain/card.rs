//! Agent card aggregate.

use super::{AgentName, Endpoint, MethodDescriptor, RegistryDomainError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Published description of an agent: who it is, where it listens and what
/// it can do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AgentCardData")]
pub struct AgentCard {
    name: AgentName,
    description: String,
    endpoint: Endpoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    endpoint_external: Option<Endpoint>,
    methods: Vec<MethodDescriptor>,
}

#[derive(Deserialize)]
struct AgentCardData {
    name: AgentName,
    #[serde(default)]
    description: String,
    endpoint: Endpoint,
    #[serde(default)]
    endpoint_external: Option<Endpoint>,
    #[serde(default)]
    methods: Vec<MethodDescriptor>,
}

impl TryFrom<AgentCardData> for AgentCard {
    type Error = RegistryDomainError;

    fn try_from(data: AgentCardData) -> Result<Self, Self::Error> {
        let card = Self::new(data.name, data.description, data.endpoint, data.methods)?;
        Ok(match data.endpoint_external {
            Some(external) => card.with_external_endpoint(external),
            None => card,
        })
    }
}

impl AgentCard {
    /// Creates a card.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::DuplicateMethod`] when two methods share
    /// a name.
    pub fn new(
        name: AgentName,
        description: impl Into<String>,
        endpoint: Endpoint,
        methods: impl IntoIterator<Item = MethodDescriptor>,
    ) -> Result<Self, RegistryDomainError> {
        let methods: Vec<MethodDescriptor> = methods.into_iter().collect();
        let mut seen = HashSet::with_capacity(methods.len());
        if let Some(repeated) = methods.iter().find(|method| !seen.insert(method.name())) {
            return Err(RegistryDomainError::DuplicateMethod {
                agent: name.to_string(),
                method: repeated.name().to_owned(),
            });
        }

        Ok(Self {
            name,
            description: description.into(),
            endpoint,
            endpoint_external: None,
            methods,
        })
    }

    /// Sets the host-accessible endpoint.
    #[must_use]
    pub fn with_external_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint_external = Some(endpoint);
        self
    }

    /// Returns the agent name.
    #[must_use]
    pub const fn name(&self) -> &AgentName {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the endpoint other agents call.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the host-accessible endpoint, if declared.
    #[must_use]
    pub const fn endpoint_external(&self) -> Option<&Endpoint> {
        self.endpoint_external.as_ref()
    }

    /// Returns the declared methods in declaration order.
    #[must_use]
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Returns the descriptor for a declared method.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|method| method.name() == name)
    }

    /// Returns `true` when the card declares the method.
    #[must_use]
    pub fn supports(&self, method: &str) -> bool {
        self.method(method).is_some()
    }
}
