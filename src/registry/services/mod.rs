//! Registry service and its RPC method bindings.

mod handlers;
mod registry;

pub use handlers::{
    GetAgentParams, ListAgentsResult, MethodDetailsParams, RegisterAgentResult,
    bind_registry_methods,
};
pub use registry::{RegistryService, RegistryServiceError, RegistryServiceResult, SeedSummary};
