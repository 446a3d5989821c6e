//! In-memory pipeline adapters for tests and single-process runs.

mod dead_letter;
mod queue;
mod sink;

pub use dead_letter::InMemoryDeadLetters;
pub use queue::InMemoryLogQueue;
pub use sink::InMemoryLogSink;
