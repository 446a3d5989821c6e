//! Remote-call envelope, codec, and dispatch contract shared by all agents.
//!
//! Agents speak JSON-RPC 2.0 over HTTP `POST /a2a`. This module follows the
//! crate's hexagonal layout:
//!
//! - Envelope types in [`domain`]
//! - Wire encoding in [`codec`]
//! - Per-agent method tables in [`dispatcher`]
//! - The outbound transport contract in [`ports`]
//! - HTTP and in-process transports in [`adapters`]

pub mod adapters;
pub mod client;
pub mod codec;
pub mod dispatcher;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
