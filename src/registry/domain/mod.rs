//! Domain model for agent cards.
//!
//! Cards are immutable once built. Validation happens at construction and
//! again whenever a card is deserialised, so a card read from the wire or
//! from storage upholds the same invariants as one built in code.

mod card;
mod error;
mod method;
mod name;
mod seed;

pub use crate::rpc::domain::Endpoint;
pub use card::AgentCard;
pub use error::RegistryDomainError;
pub use method::{MethodDescriptor, ParamDescriptor};
pub use name::AgentName;
pub use seed::{REGISTRY_AGENT, seed_cards};
