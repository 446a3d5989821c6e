//! Dead-letter reporter collecting reports in memory.

use crate::pipeline::{domain::DroppedRecord, ports::DeadLetterReporter};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

/// Collects dropped records for inspection.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDeadLetters {
    reports: Arc<Mutex<Vec<DroppedRecord>>>,
}

impl InMemoryDeadLetters {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every report received so far.
    #[must_use]
    pub fn reports(&self) -> Vec<DroppedRecord> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl DeadLetterReporter for InMemoryDeadLetters {
    async fn report(&self, dropped: &DroppedRecord) {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(dropped.clone());
    }
}
