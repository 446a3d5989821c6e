//! Warehouse port, idempotent by record id.

use crate::pipeline::domain::LogRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Outcome of storing one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertOutcome {
    /// The record was stored.
    Inserted,
    /// A record with the same id was already stored; nothing changed.
    Duplicate,
}

impl InsertOutcome {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inserted => "inserted",
            Self::Duplicate => "duplicate",
        }
    }
}

/// Outcome of storing a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Records newly stored.
    pub inserted: usize,
    /// Records already present.
    pub duplicates: usize,
}

impl BatchOutcome {
    /// Counts one insert outcome.
    pub const fn record(&mut self, outcome: InsertOutcome) {
        match outcome {
            InsertOutcome::Inserted => self.inserted += 1,
            InsertOutcome::Duplicate => self.duplicates += 1,
        }
    }
}

/// Durable store for log records.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Stores a record. Storing an id that is already present is a no-op
    /// success reported as [`InsertOutcome::Duplicate`].
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the record could not be stored.
    async fn insert(&self, record: &LogRecord) -> SinkResult<InsertOutcome>;

    /// Stores a batch atomically.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the batch could not be stored; nothing from
    /// the batch is kept in that case.
    async fn insert_batch(&self, records: &[LogRecord]) -> SinkResult<BatchOutcome>;
}

/// Errors returned by sink implementations.
#[derive(Debug, Clone, Error)]
pub enum SinkError {
    /// The warehouse is temporarily unable to accept writes.
    #[error("sink unavailable: {0}")]
    Unavailable(String),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl SinkError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
