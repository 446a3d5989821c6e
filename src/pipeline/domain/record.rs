//! Log record and its identifier.

use super::PipelineDomainError;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Maximum length for a record id, matching the `VARCHAR(100)` column.
const MAX_RECORD_ID_LENGTH: usize = 100;

/// Globally unique record identifier, assigned once at publish time and kept
/// across redeliveries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Creates a record id from an existing value.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::EmptyRecordId`] when the value is blank
    /// or [`PipelineDomainError::RecordIdTooLong`] when it exceeds 100
    /// characters.
    pub fn new(value: impl Into<String>) -> Result<Self, PipelineDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PipelineDomainError::EmptyRecordId);
        }
        if trimmed.len() > MAX_RECORD_ID_LENGTH {
            return Err(PipelineDomainError::RecordIdTooLong(raw));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Generates a fresh random (v4 UUID) record id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RecordId {
    type Error = PipelineDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RecordId> for String {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One structured log entry travelling through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    record_id: RecordId,
    payload: Map<String, Value>,
    source: String,
    published_at: DateTime<Utc>,
}

impl LogRecord {
    /// Creates a record with an existing id and timestamp.
    #[must_use]
    pub fn new(
        record_id: RecordId,
        payload: Map<String, Value>,
        source: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            record_id,
            payload,
            source: source.into(),
            published_at,
        }
    }

    /// Creates a record for publishing, assigning a fresh id and the current
    /// time.
    #[must_use]
    pub fn publish(
        payload: Map<String, Value>,
        source: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        Self::new(RecordId::generate(), payload, source, clock.utc())
    }

    /// Returns the record id.
    #[must_use]
    pub const fn record_id(&self) -> &RecordId {
        &self.record_id
    }

    /// Returns the structured payload.
    #[must_use]
    pub const fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Returns the name of the publishing source.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the publish timestamp.
    #[must_use]
    pub const fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }
}
