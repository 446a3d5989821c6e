//! Ingest agent: publishes records and exposes queue draining over RPC.

use crate::pipeline::{
    domain::{LogRecord, RecordId},
    ports::{DeadLetterReporter, LogQueue, QueueError},
    services::consumer::{IngestConsumer, PollSummary},
};
use crate::rpc::{
    dispatcher::{DispatcherBuilder, HandlerError, typed},
    ports::RpcTransport,
};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

fn default_source() -> String {
    "unknown".to_owned()
}

/// Params of `publish_log`, and one entry of `publish_logs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishLogParams {
    /// Structured payload.
    pub payload: Map<String, Value>,
    /// Publishing source.
    #[serde(default = "default_source")]
    pub source: String,
}

/// Result of `publish_log`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishLogResult {
    /// Id assigned to the record.
    pub record_id: RecordId,
}

/// Params of `publish_logs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishLogsParams {
    /// Entries to publish, in order.
    pub entries: Vec<PublishLogParams>,
}

/// Result of `publish_logs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishLogsResult {
    /// Ids assigned, in entry order.
    pub published: Vec<RecordId>,
}

/// Params of `drain_once`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DrainParams {
    /// Upper bound on records pulled; the consumer's batch size when absent.
    #[serde(default)]
    pub max_messages: Option<usize>,
}

/// Assigns ids and timestamps to new records and enqueues them.
pub struct LogPublisher<Q, C>
where
    Q: LogQueue,
    C: Clock + Send + Sync,
{
    queue: Arc<Q>,
    clock: Arc<C>,
}

impl<Q, C> Clone for LogPublisher<Q, C>
where
    Q: LogQueue,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<Q, C> LogPublisher<Q, C>
where
    Q: LogQueue,
    C: Clock + Send + Sync,
{
    /// Creates a publisher.
    #[must_use]
    pub const fn new(queue: Arc<Q>, clock: Arc<C>) -> Self {
        Self { queue, clock }
    }

    /// Publishes one payload under a fresh record id.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] when the queue rejects the record.
    pub async fn publish(
        &self,
        payload: Map<String, Value>,
        source: impl Into<String>,
    ) -> Result<RecordId, QueueError> {
        let record = LogRecord::publish(payload, source, &*self.clock);
        self.queue.publish(&record).await?;
        info!(record_id = %record.record_id(), source = record.source(), "record published");
        Ok(record.record_id().clone())
    }

    /// Publishes entries in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] when the queue rejects a record. Entries before
    /// it stay published.
    pub async fn publish_all(
        &self,
        entries: Vec<PublishLogParams>,
    ) -> Result<Vec<RecordId>, QueueError> {
        let mut published = Vec::with_capacity(entries.len());
        for entry in entries {
            published.push(self.publish(entry.payload, entry.source).await?);
        }
        Ok(published)
    }
}

/// Binds `publish_log`, `publish_logs` and `drain_once`.
#[must_use]
pub fn bind_ingest_methods<Q, C, T, D>(
    builder: DispatcherBuilder,
    publisher: &LogPublisher<Q, C>,
    consumer: &IngestConsumer<Q, T, D>,
) -> DispatcherBuilder
where
    Q: LogQueue + 'static,
    C: Clock + Send + Sync + 'static,
    T: RpcTransport + 'static,
    D: DeadLetterReporter + 'static,
{
    let single = publisher.clone();
    let batch = publisher.clone();
    let drain = consumer.clone();

    builder
        .bind(
            "publish_log",
            typed(move |params: PublishLogParams| {
                let ingest = single.clone();
                async move {
                    let record_id = ingest
                        .publish(params.payload, params.source)
                        .await
                        .map_err(HandlerError::internal)?;
                    Ok(PublishLogResult { record_id })
                }
            }),
        )
        .bind(
            "publish_logs",
            typed(move |params: PublishLogsParams| {
                let ingest = batch.clone();
                async move {
                    let published = ingest
                        .publish_all(params.entries)
                        .await
                        .map_err(HandlerError::internal)?;
                    Ok(PublishLogsResult { published })
                }
            }),
        )
        .bind(
            "drain_once",
            typed(move |params: DrainParams| {
                let drainer = drain.clone();
                async move {
                    let limit = params
                        .max_messages
                        .unwrap_or(drainer.config().batch_size);
                    let summary: PollSummary =
                        drainer.poll(limit).await.map_err(HandlerError::internal)?;
                    Ok(summary)
                }
            }),
        )
}
