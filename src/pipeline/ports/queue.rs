//! Pull/ack queue port with visibility-timeout redelivery.

use crate::pipeline::domain::{AckId, Delivery, LogRecord, RecordId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// Queue holding published records until a consumer acknowledges them.
///
/// A pulled record is invisible to other pulls until its visibility timeout
/// elapses. If it is not acknowledged by then, a later pull delivers it
/// again under a new [`AckId`] with the attempt count increased.
#[async_trait]
pub trait LogQueue: Send + Sync {
    /// Enqueues a record.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::DuplicateRecord`] when the record id is already
    /// queued.
    async fn publish(&self, record: &LogRecord) -> QueueResult<()>;

    /// Pulls up to `max` visible records in publish order.
    async fn pull(&self, max: usize) -> QueueResult<Vec<Delivery>>;

    /// Acknowledges a delivery, removing its record from the queue.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::StaleAck`] when the handle does not belong to
    /// the record's latest delivery.
    async fn ack(&self, ack_id: &AckId) -> QueueResult<()>;

    /// Removes a record that will not be delivered again.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::StaleAck`] when the handle does not belong to
    /// the record's latest delivery.
    async fn dead_letter(&self, ack_id: &AckId) -> QueueResult<()>;
}

/// Errors returned by queue implementations.
#[derive(Debug, Clone, Error)]
pub enum QueueError {
    /// A record with the same id is already queued.
    #[error("record already queued: {0}")]
    DuplicateRecord(RecordId),

    /// The ack id is unknown or superseded by a later delivery.
    #[error("stale or unknown ack id: {0}")]
    StaleAck(AckId),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl QueueError {
    /// Wraps a data-quality or deserialization error from persisted rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
