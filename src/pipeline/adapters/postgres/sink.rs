//! `PostgreSQL` warehouse, idempotent by record id.

use super::{models::NewStoredRow, schema::log_records};
use crate::pipeline::{
    domain::LogRecord,
    ports::{BatchOutcome, InsertOutcome, LogSink, SinkError, SinkResult},
};
use crate::postgres::PgPool;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;

/// `PostgreSQL`-backed sink.
#[derive(Debug, Clone)]
pub struct PostgresLogSink {
    pool: PgPool,
}

impl PostgresLogSink {
    /// Creates a sink over a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> SinkResult<T>
    where
        F: FnOnce(&mut PgConnection) -> SinkResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(SinkError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(SinkError::persistence)?
    }
}

fn insert_row(connection: &mut PgConnection, row: &NewStoredRow) -> QueryResult<InsertOutcome> {
    let inserted = diesel::insert_into(log_records::table)
        .values(row)
        .on_conflict(log_records::record_id)
        .do_nothing()
        .execute(connection)?;
    Ok(if inserted == 0 {
        InsertOutcome::Duplicate
    } else {
        InsertOutcome::Inserted
    })
}

#[async_trait]
impl LogSink for PostgresLogSink {
    async fn insert(&self, record: &LogRecord) -> SinkResult<InsertOutcome> {
        let row = NewStoredRow::from(record);
        self.run_blocking(move |connection| {
            insert_row(connection, &row).map_err(SinkError::persistence)
        })
        .await
    }

    async fn insert_batch(&self, records: &[LogRecord]) -> SinkResult<BatchOutcome> {
        let rows: Vec<NewStoredRow> = records.iter().map(NewStoredRow::from).collect();
        self.run_blocking(move |connection| {
            connection
                .transaction::<_, diesel::result::Error, _>(|tx| {
                    let mut outcome = BatchOutcome::default();
                    for row in &rows {
                        outcome.record(insert_row(tx, row)?);
                    }
                    Ok(outcome)
                })
                .map_err(SinkError::persistence)
        })
        .await
    }
}
