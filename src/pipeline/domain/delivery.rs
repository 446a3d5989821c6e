//! A pulled record and its acknowledgement handle.

use super::LogRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lease handle for one delivery. Each pull issues a new one, so a handle
/// from an earlier delivery cannot acknowledge a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AckId(Uuid);

impl AckId {
    /// Creates a new random ack id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an ack id from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for AckId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A record handed to a consumer by the queue.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// Handle used to acknowledge or dead-letter this delivery.
    pub ack_id: AckId,
    /// The record itself.
    pub record: LogRecord,
    /// 1-based delivery count, including this one.
    pub attempt: u32,
}

/// A record abandoned after exhausting its deliveries.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedRecord {
    /// The abandoned record.
    pub record: LogRecord,
    /// Deliveries made, including the one that triggered the drop.
    pub attempts: u32,
    /// Why the record was dropped.
    pub reason: String,
}
