//! In-memory warehouse with failure injection.

use crate::pipeline::{
    domain::{LogRecord, RecordId},
    ports::{BatchOutcome, InsertOutcome, LogSink, SinkError, SinkResult},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory sink keyed by record id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLogSink {
    state: Arc<RwLock<SinkState>>,
}

#[derive(Debug, Default)]
struct SinkState {
    rows: HashMap<RecordId, LogRecord>,
    order: Vec<RecordId>,
    failures_remaining: usize,
}

fn lock_error(err: impl std::fmt::Display) -> SinkError {
    SinkError::persistence(std::io::Error::other(err.to_string()))
}

impl InMemoryLogSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` insert calls fail with
    /// [`SinkError::Unavailable`].
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Persistence`] when lock acquisition fails.
    pub fn fail_next(&self, count: usize) -> SinkResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.failures_remaining = count;
        Ok(())
    }

    /// Returns stored records in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Persistence`] when lock acquisition fails.
    pub fn stored(&self) -> SinkResult<Vec<LogRecord>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.rows.get(id))
            .cloned()
            .collect())
    }

    /// Returns the number of rows stored under `record_id`.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Persistence`] when lock acquisition fails.
    pub fn rows_for(&self, record_id: &RecordId) -> SinkResult<usize> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.order.iter().filter(|id| *id == record_id).count())
    }
}

impl SinkState {
    fn take_injected_failure(&mut self) -> SinkResult<()> {
        if self.failures_remaining > 0 {
            self.failures_remaining -= 1;
            return Err(SinkError::Unavailable("injected failure".to_owned()));
        }
        Ok(())
    }

    fn store(&mut self, record: &LogRecord) -> InsertOutcome {
        let record_id = record.record_id();
        if self.rows.contains_key(record_id) {
            return InsertOutcome::Duplicate;
        }
        self.rows.insert(record_id.clone(), record.clone());
        self.order.push(record_id.clone());
        InsertOutcome::Inserted
    }
}

#[async_trait]
impl LogSink for InMemoryLogSink {
    async fn insert(&self, record: &LogRecord) -> SinkResult<InsertOutcome> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.take_injected_failure()?;
        Ok(state.store(record))
    }

    async fn insert_batch(&self, records: &[LogRecord]) -> SinkResult<BatchOutcome> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.take_injected_failure()?;
        let mut outcome = BatchOutcome::default();
        for record in records {
            outcome.record(state.store(record));
        }
        Ok(outcome)
    }
}
