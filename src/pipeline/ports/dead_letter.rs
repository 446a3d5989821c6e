//! Operational channel for dropped records.

use crate::pipeline::domain::DroppedRecord;
use async_trait::async_trait;

/// Receives records the pipeline has given up on.
///
/// Reporting cannot fail: implementations log their own problems.
#[async_trait]
pub trait DeadLetterReporter: Send + Sync {
    /// Reports a dropped record.
    async fn report(&self, dropped: &DroppedRecord);
}
