//! Ingest, route and sink pipeline for log records.
//!
//! Records are published to a queue, pulled by the ingest consumer, handed
//! to the router agent with `route_log`, and stored by the sink agent. The
//! queue owns retries: a unit that fails is simply not acknowledged and
//! comes back after its visibility timeout. Delivery is at-least-once; the
//! sink is idempotent by record id.
//!
//! - Domain types in [`domain`]
//! - Queue, sink and dead-letter contracts in [`ports`]
//! - In-memory, `PostgreSQL` and tracing adapters in [`adapters`]
//! - Consumer, router, sink forwarder and publisher in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
