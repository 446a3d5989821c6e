//! Sink agent: stores routed records, idempotently by record id.

use crate::pipeline::{
    domain::LogRecord,
    ports::{BatchOutcome, InsertOutcome, LogSink, SinkError},
};
use crate::rpc::dispatcher::{DispatcherBuilder, HandlerError, typed};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Params of `insert_log`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertLogParams {
    /// Record to store.
    pub record: LogRecord,
}

/// Result of `insert_log`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertLogResult {
    /// Whether the record was new.
    pub status: InsertOutcome,
}

/// Params of `insert_logs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertLogsParams {
    /// Records to store.
    pub records: Vec<LogRecord>,
}

/// Writes records to the warehouse.
pub struct SinkForwarder<S: LogSink> {
    sink: Arc<S>,
}

impl<S: LogSink> Clone for SinkForwarder<S> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<S: LogSink> SinkForwarder<S> {
    /// Creates a forwarder over `sink`.
    #[must_use]
    pub const fn new(sink: Arc<S>) -> Self {
        Self { sink }
    }

    /// Stores one record.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the warehouse rejects the write.
    pub async fn store(&self, record: &LogRecord) -> Result<InsertOutcome, SinkError> {
        let outcome = self.sink.insert(record).await?;
        match outcome {
            InsertOutcome::Inserted => info!(record_id = %record.record_id(), "record stored"),
            InsertOutcome::Duplicate => {
                debug!(record_id = %record.record_id(), "record already stored");
            }
        }
        Ok(outcome)
    }

    /// Stores a batch.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the warehouse rejects the write.
    pub async fn store_batch(&self, records: &[LogRecord]) -> Result<BatchOutcome, SinkError> {
        let outcome = self.sink.insert_batch(records).await?;
        info!(
            inserted = outcome.inserted,
            duplicates = outcome.duplicates,
            "record batch stored"
        );
        Ok(outcome)
    }
}

/// Binds `insert_log` and `insert_logs` to the forwarder.
#[must_use]
pub fn bind_sink_methods<S>(
    builder: DispatcherBuilder,
    forwarder: &SinkForwarder<S>,
) -> DispatcherBuilder
where
    S: LogSink + 'static,
{
    let single = forwarder.clone();
    let batch = forwarder.clone();

    builder
        .bind(
            "insert_log",
            typed(move |params: InsertLogParams| {
                let sink = single.clone();
                async move {
                    let status = sink
                        .store(&params.record)
                        .await
                        .map_err(HandlerError::internal)?;
                    Ok(InsertLogResult { status })
                }
            }),
        )
        .bind(
            "insert_logs",
            typed(move |params: InsertLogsParams| {
                let sink = batch.clone();
                async move {
                    sink
                        .store_batch(&params.records)
                        .await
                        .map_err(HandlerError::internal)
                }
            }),
        )
}
