//! Dead-letter reporter emitting structured log events.

use crate::pipeline::{domain::DroppedRecord, ports::DeadLetterReporter};
use async_trait::async_trait;
use tracing::error;

/// Reports dropped records as `error` events on the `a2a_mesh::dead_letter`
/// target so operators can route them separately.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDeadLetterReporter;

#[async_trait]
impl DeadLetterReporter for TracingDeadLetterReporter {
    async fn report(&self, dropped: &DroppedRecord) {
        error!(
            target: "a2a_mesh::dead_letter",
            record_id = %dropped.record.record_id(),
            source = dropped.record.source(),
            attempts = dropped.attempts,
            reason = %dropped.reason,
            "log record dropped"
        );
    }
}
