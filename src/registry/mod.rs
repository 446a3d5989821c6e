//! Discovery registry for the agent fleet.
//!
//! Agents resolve each other's network location and capabilities through
//! agent cards held by the registry agent. The module follows the crate's
//! hexagonal layout:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The registry service and its RPC bindings in [`services`]
//! - The caching lookup used by other agents in [`client`]

pub mod adapters;
pub mod client;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
