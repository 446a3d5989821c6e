//! Error types for agent card validation.

use crate::rpc::domain::RpcDomainError;
use thiserror::Error;

/// Errors returned while constructing agent card values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryDomainError {
    /// The agent name is empty after trimming.
    #[error("agent name must not be empty")]
    EmptyAgentName,

    /// The agent name contains characters outside `[a-z0-9_-]`.
    #[error(
        "agent name '{0}' contains invalid characters (only lowercase alphanumeric, hyphens and underscores allowed)"
    )]
    InvalidAgentName(String),

    /// The agent name exceeds the 100-character storage limit.
    #[error("agent name exceeds 100 character limit: {0}")]
    AgentNameTooLong(String),

    /// A method or parameter descriptor has an empty name.
    #[error("{0} name must not be empty")]
    EmptyDescriptorName(&'static str),

    /// The same method is declared twice on one card.
    #[error("method '{method}' is declared more than once by agent '{agent}'")]
    DuplicateMethod {
        /// Agent declaring the method.
        agent: String,
        /// Repeated method name.
        method: String,
    },

    /// The endpoint is invalid.
    #[error(transparent)]
    Endpoint(#[from] RpcDomainError),
}
