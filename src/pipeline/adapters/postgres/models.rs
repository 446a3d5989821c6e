//! Diesel row models for the log queue and warehouse.

use super::schema::{log_queue, log_records};
use crate::pipeline::domain::{LogRecord, RecordId};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Row returned when a pull leases a record.
#[derive(Debug, Clone, QueryableByName)]
pub struct LeasedRow {
    /// Record identifier.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub record_id: String,
    /// Structured payload.
    #[diesel(sql_type = diesel::sql_types::Jsonb)]
    pub payload: Value,
    /// Publishing source.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub source: String,
    /// Publish timestamp.
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub published_at: DateTime<Utc>,
    /// Deliveries including this one.
    #[diesel(sql_type = diesel::sql_types::Int4)]
    pub attempts: i32,
    /// Lease handle.
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub ack_id: uuid::Uuid,
    /// Publish order, used to sort the batch.
    #[diesel(sql_type = diesel::sql_types::Int8)]
    pub enqueued_seq: i64,
}

/// Insert model for queued records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = log_queue)]
pub struct NewQueuedRow {
    /// Record identifier.
    pub record_id: String,
    /// Structured payload.
    pub payload: Value,
    /// Publishing source.
    pub source: String,
    /// Publish timestamp.
    pub published_at: DateTime<Utc>,
}

/// Insert model for stored records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = log_records)]
pub struct NewStoredRow {
    /// Record identifier.
    pub record_id: String,
    /// Structured payload.
    pub payload: Value,
    /// Publishing source.
    pub source: String,
    /// Publish timestamp.
    pub published_at: DateTime<Utc>,
}

impl From<&LogRecord> for NewQueuedRow {
    fn from(record: &LogRecord) -> Self {
        Self {
            record_id: record.record_id().as_str().to_owned(),
            payload: Value::Object(record.payload().clone()),
            source: record.source().to_owned(),
            published_at: record.published_at(),
        }
    }
}

impl From<&LogRecord> for NewStoredRow {
    fn from(record: &LogRecord) -> Self {
        Self {
            record_id: record.record_id().as_str().to_owned(),
            payload: Value::Object(record.payload().clone()),
            source: record.source().to_owned(),
            published_at: record.published_at(),
        }
    }
}

/// Rebuilds a record from persisted columns.
pub fn to_record(
    record_id: String,
    payload: Value,
    source: String,
    published_at: DateTime<Utc>,
) -> Result<LogRecord, String> {
    let record_id = RecordId::new(record_id).map_err(|err| err.to_string())?;
    let Value::Object(payload) = payload else {
        return Err(format!("payload of record {record_id} is not an object"));
    };
    Ok(LogRecord::new(record_id, payload, source, published_at))
}
