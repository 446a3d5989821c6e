//! Error types for log delivery domain values.

use super::DeliveryState;
use thiserror::Error;

/// Errors returned while constructing or advancing delivery values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineDomainError {
    /// The record identifier is empty after trimming.
    #[error("record id must not be empty")]
    EmptyRecordId,

    /// The record identifier exceeds the 100-character storage limit.
    #[error("record id exceeds 100 character limit: {0}")]
    RecordIdTooLong(String),

    /// The requested state change is not part of the delivery lifecycle.
    #[error("cannot move a delivery from {from} to {to}")]
    IllegalTransition {
        /// Current state.
        from: DeliveryState,
        /// Requested state.
        to: DeliveryState,
    },
}

/// Error returned while parsing a delivery state from storage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown delivery state: {0}")]
pub struct ParseDeliveryStateError(pub String);
