//! Port contracts for the delivery pipeline.

pub mod dead_letter;
pub mod queue;
pub mod sink;

pub use dead_letter::DeadLetterReporter;
pub use queue::{LogQueue, QueueError, QueueResult};
pub use sink::{BatchOutcome, InsertOutcome, LogSink, SinkError, SinkResult};
