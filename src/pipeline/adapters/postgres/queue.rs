//! `PostgreSQL` pull/ack queue.

use super::{
    models::{LeasedRow, NewQueuedRow, to_record},
    schema::log_queue,
};
use crate::pipeline::{
    domain::{AckId, Delivery, LogRecord, RedeliveryPolicy},
    ports::{LogQueue, QueueError, QueueResult},
};
use crate::postgres::PgPool;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::BigInt;

/// Leases the oldest visible rows. `SKIP LOCKED` keeps concurrent consumers
/// from pulling the same row; the visibility timeout for delivery *n* is
/// `base × 2^(n-1)` milliseconds capped at `max`.
const PULL_SQL: &str = "\
WITH next AS (
    SELECT record_id FROM log_queue
    WHERE visible_at <= NOW()
    ORDER BY enqueued_seq
    LIMIT $1
    FOR UPDATE SKIP LOCKED
)
UPDATE log_queue q
SET attempts = q.attempts + 1,
    ack_id = gen_random_uuid(),
    visible_at = NOW() + LEAST($2 * POWER(2, q.attempts), $3) * INTERVAL '1 millisecond'
FROM next
WHERE q.record_id = next.record_id
RETURNING q.record_id, q.payload, q.source, q.published_at, q.attempts, q.ack_id, q.enqueued_seq";

/// `PostgreSQL`-backed queue.
#[derive(Debug, Clone)]
pub struct PostgresLogQueue {
    pool: PgPool,
    policy: RedeliveryPolicy,
}

impl PostgresLogQueue {
    /// Creates a queue over a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool, policy: RedeliveryPolicy) -> Self {
        Self { pool, policy }
    }

    async fn run_blocking<F, T>(&self, f: F) -> QueueResult<T>
    where
        F: FnOnce(&mut PgConnection) -> QueueResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(QueueError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(QueueError::persistence)?
    }

    async fn remove(&self, ack_id: &AckId) -> QueueResult<()> {
        let ack = *ack_id;
        self.run_blocking(move |connection| {
            let removed =
                diesel::delete(log_queue::table.filter(log_queue::ack_id.eq(ack.into_inner())))
                    .execute(connection)
                    .map_err(QueueError::persistence)?;
            if removed == 0 {
                return Err(QueueError::StaleAck(ack));
            }
            Ok(())
        })
        .await
    }
}

fn millis(duration: std::time::Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

#[async_trait]
impl LogQueue for PostgresLogQueue {
    async fn publish(&self, record: &LogRecord) -> QueueResult<()> {
        let record_id = record.record_id().clone();
        let row = NewQueuedRow::from(record);
        self.run_blocking(move |connection| {
            diesel::insert_into(log_queue::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        QueueError::DuplicateRecord(record_id.clone())
                    }
                    _ => QueueError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn pull(&self, max: usize) -> QueueResult<Vec<Delivery>> {
        let limit = i64::try_from(max).unwrap_or(i64::MAX);
        let base = millis(self.policy.base_visibility());
        let cap = millis(self.policy.max_visibility());

        self.run_blocking(move |connection| {
            let mut rows = diesel::sql_query(PULL_SQL)
                .bind::<BigInt, _>(limit)
                .bind::<BigInt, _>(base)
                .bind::<BigInt, _>(cap)
                .load::<LeasedRow>(connection)
                .map_err(QueueError::persistence)?;
            rows.sort_by_key(|row| row.enqueued_seq);
            rows.into_iter().map(row_to_delivery).collect()
        })
        .await
    }

    async fn ack(&self, ack_id: &AckId) -> QueueResult<()> {
        self.remove(ack_id).await
    }

    async fn dead_letter(&self, ack_id: &AckId) -> QueueResult<()> {
        self.remove(ack_id).await
    }
}

fn row_to_delivery(row: LeasedRow) -> QueueResult<Delivery> {
    let LeasedRow {
        record_id,
        payload,
        source,
        published_at,
        attempts,
        ack_id,
        ..
    } = row;
    let record = to_record(record_id, payload, source, published_at)
        .map_err(|msg| QueueError::invalid_persisted_data(std::io::Error::other(msg)))?;
    let attempt = u32::try_from(attempts).map_err(QueueError::invalid_persisted_data)?;
    Ok(Delivery {
        ack_id: AckId::from_uuid(ack_id),
        record,
        attempt,
    })
}
