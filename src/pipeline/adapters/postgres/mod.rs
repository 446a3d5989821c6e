//! `PostgreSQL` adapters for the queue and the warehouse.

mod models;
mod queue;
mod schema;
mod sink;

pub use queue::PostgresLogQueue;
pub use sink::PostgresLogSink;
