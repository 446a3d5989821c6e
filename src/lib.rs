//! A2A mesh: a small fleet of cooperating agents speaking JSON-RPC 2.0.
//!
//! Agents find each other through a discovery registry of agent cards and
//! move structured log records through an ingest, route and sink pipeline
//! with at-least-once delivery.
//!
//! # Architecture
//!
//! Each module follows hexagonal architecture principles:
//!
//! - **Domain**: Pure types and validation with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage, queues and transports
//! - **Adapters**: In-memory, `PostgreSQL` and HTTP implementations of ports
//!
//! # Modules
//!
//! - [`rpc`]: Envelope, codec, dispatcher and transports
//! - [`registry`]: Agent cards, the registry service and the caching client
//! - [`pipeline`]: Queue, consumer, router and sink
//! - [`agent`]: Per-role wiring used by the `a2a-agent` binary

pub mod agent;
pub mod config;
pub mod pipeline;
pub mod postgres;
pub mod registry;
pub mod rpc;
pub mod telemetry;
