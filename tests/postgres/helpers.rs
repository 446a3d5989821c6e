//! Shared helpers for the `PostgreSQL` adapter tests.

use a2a_mesh::pipeline::domain::{LogRecord, RecordId};
use a2a_mesh::postgres::{self, PgPool};
use chrono::Utc;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use pg_embedded_setup_unpriv::TestCluster;
use serde_json::{Map, json};
use tokio::runtime::Runtime;

/// Registry schema.
const CREATE_AGENT_CARDS_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_agent_cards/up.sql");

/// Queue and warehouse schema.
const CREATE_LOG_PIPELINE_SQL: &str =
    include_str!("../../migrations/2026-10-01-000001_create_log_pipeline/up.sql");

/// Template database carrying the migrated schema.
pub const TEMPLATE_DB: &str = "a2a_mesh_test_template";

/// Creates a runtime whose blocking pool can serve several pool checkouts
/// at once.
pub fn test_runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .expect("failed to create test runtime")
}

/// Ensures the template database exists with the schema applied.
pub fn ensure_template(cluster: &TestCluster) -> eyre::Result<()> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            conn.batch_execute(CREATE_AGENT_CARDS_SQL)
                .map_err(|e| eyre::eyre!("agent card schema: {e}"))?;
            conn.batch_execute(CREATE_LOG_PIPELINE_SQL)
                .map_err(|e| eyre::eyre!("log pipeline schema: {e}"))?;
            Ok(())
        })
        .map_err(|e| eyre::eyre!("{e}"))
}

/// Database cloned from the template for one test, dropped with the guard.
///
/// Declare it before anything holding its pool, so the adapters release
/// their connections first.
pub struct TestDatabase<'a> {
    cluster: &'a TestCluster,
    name: String,
    url: String,
}

impl<'a> TestDatabase<'a> {
    /// Creates `<prefix>_<uuid>` from the template.
    pub fn create(cluster: &'a TestCluster, prefix: &str) -> eyre::Result<Self> {
        ensure_template(cluster)?;
        let name = format!("{prefix}_{}", uuid::Uuid::new_v4().simple());
        cluster
            .create_database_from_template(name.as_str(), TEMPLATE_DB)
            .map_err(|e| eyre::eyre!("{e}"))?;
        let url = cluster.connection().database_url(&name);
        Ok(Self { cluster, name, url })
    }

    /// Opens a pool the same way the agents do.
    pub fn pool(&self, max_size: u32) -> eyre::Result<PgPool> {
        postgres::connect(&self.url, max_size).map_err(|e| eyre::eyre!("{e}"))
    }

    /// Counts rows of `table` carrying `record_id`.
    pub fn count_rows(&self, table: &str, record_id: &RecordId) -> eyre::Result<i64> {
        #[derive(diesel::QueryableByName)]
        struct CountRow {
            #[diesel(sql_type = diesel::sql_types::BigInt)]
            total: i64,
        }

        let mut conn = PgConnection::establish(&self.url).map_err(|e| eyre::eyre!("{e}"))?;
        let found = diesel::sql_query(format!(
            "SELECT COUNT(*) AS total FROM {table} WHERE record_id = $1"
        ))
        .bind::<diesel::sql_types::Text, _>(record_id.as_str())
        .get_result::<CountRow>(&mut conn)
        .map_err(|e| eyre::eyre!("{e}"))?;
        Ok(found.total)
    }
}

impl Drop for TestDatabase<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.cluster.drop_database(self.name.as_str()) {
            tracing::warn!(database = %self.name, error = %err, "failed to drop test database");
        }
    }
}

/// Builds a record with a fixed id.
pub fn record(id: &str) -> LogRecord {
    let mut payload = Map::new();
    payload.insert("msg".to_owned(), json!(format!("entry {id}")));
    LogRecord::new(
        RecordId::new(id).expect("record id"),
        payload,
        "test",
        Utc::now(),
    )
}
