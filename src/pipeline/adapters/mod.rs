//! Adapter implementations for the delivery pipeline.

pub mod memory;
pub mod postgres;
pub mod tracing_reporter;

pub use tracing_reporter::TracingDeadLetterReporter;
