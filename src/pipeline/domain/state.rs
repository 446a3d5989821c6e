//! Delivery lifecycle of a log record.

use super::{ParseDeliveryStateError, PipelineDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a record is in its delivery lifecycle.
///
/// ```text
/// PUBLISHED -> IN_FLIGHT -> ROUTED -> STORED
///                 |   ^
///                 v   |
///             REDELIVERED
///
/// IN_FLIGHT | REDELIVERED -> DROPPED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    /// Enqueued and not yet pulled.
    Published,
    /// Pulled by a consumer and awaiting acknowledgement.
    InFlight,
    /// Visibility expired without acknowledgement; eligible for another pull.
    Redelivered,
    /// Accepted by the router.
    Routed,
    /// Persisted by the sink.
    Stored,
    /// Abandoned after exhausting its deliveries.
    Dropped,
}

impl DeliveryState {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::InFlight => "in_flight",
            Self::Redelivered => "redelivered",
            Self::Routed => "routed",
            Self::Stored => "stored",
            Self::Dropped => "dropped",
        }
    }

    /// Returns `true` when the lifecycle permits moving to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Published | Self::Redelivered, Self::InFlight)
                | (
                    Self::InFlight,
                    Self::Routed | Self::Redelivered | Self::Dropped
                )
                | (Self::Redelivered, Self::Dropped)
                | (Self::Routed, Self::Stored)
        )
    }

    /// Returns `true` for states no record leaves.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Stored | Self::Dropped)
    }

    /// Moves to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::IllegalTransition`] when the lifecycle
    /// does not permit the move.
    pub fn transition_to(self, next: Self) -> Result<Self, PipelineDomainError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(PipelineDomainError::IllegalTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl TryFrom<&str> for DeliveryState {
    type Error = ParseDeliveryStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "published" => Ok(Self::Published),
            "in_flight" => Ok(Self::InFlight),
            "redelivered" => Ok(Self::Redelivered),
            "routed" => Ok(Self::Routed),
            "stored" => Ok(Self::Stored),
            "dropped" => Ok(Self::Dropped),
            _ => Err(ParseDeliveryStateError(value.to_owned())),
        }
    }
}

impl fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
