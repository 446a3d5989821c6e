//! Shared `PostgreSQL` plumbing for the registry and pipeline adapters.

use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use thiserror::Error;

/// `PostgreSQL` connection pool type used by all adapters.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Registry schema.
const CREATE_AGENT_CARDS_SQL: &str =
    include_str!("../migrations/2026-10-01-000000_create_agent_cards/up.sql");

/// Queue and warehouse schema.
const CREATE_LOG_PIPELINE_SQL: &str =
    include_str!("../migrations/2026-10-01-000001_create_log_pipeline/up.sql");

/// Errors raised while preparing the database.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The pool could not be built or a connection checked out.
    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),

    /// A migration statement failed.
    #[error("migration failed: {0}")]
    Migration(#[from] diesel::result::Error),

    /// The blocking setup task panicked or was cancelled.
    #[error("setup task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Builds a pool for the database at `url`.
///
/// # Errors
///
/// Returns [`SetupError::Pool`] when no connection can be established.
pub fn connect(url: &str, max_size: u32) -> Result<PgPool, SetupError> {
    let manager = ConnectionManager::<PgConnection>::new(url);
    Ok(Pool::builder().max_size(max_size).build(manager)?)
}

/// Applies the schema. Every statement is idempotent, so this runs on each
/// start.
///
/// # Errors
///
/// Returns [`SetupError`] when a connection cannot be obtained or a
/// statement fails.
pub async fn apply_migrations(pool: &PgPool) -> Result<(), SetupError> {
    let shared = pool.clone();
    tokio::task::spawn_blocking(move || -> Result<(), SetupError> {
        let mut connection = shared.get()?;
        connection.batch_execute(CREATE_AGENT_CARDS_SQL)?;
        connection.batch_execute(CREATE_LOG_PIPELINE_SQL)?;
        Ok(())
    })
    .await?
}
