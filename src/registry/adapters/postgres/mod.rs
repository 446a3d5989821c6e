//! `PostgreSQL` adapter for agent card persistence.

mod models;
mod repository;
mod schema;

pub use repository::PostgresCardStore;
