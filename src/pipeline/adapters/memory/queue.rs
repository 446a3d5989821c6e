//! In-memory pull/ack queue with visibility timeouts.

use crate::pipeline::{
    domain::{AckId, Delivery, DeliveryState, LogRecord, RecordId, RedeliveryPolicy},
    ports::{LogQueue, QueueError, QueueResult},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tracing::debug;

/// Thread-safe in-memory queue.
///
/// Besides the queued records it keeps a ledger of every record ever
/// published, so tests can inspect lifecycle state and acknowledgement
/// counts after a record has left the queue.
#[derive(Debug, Clone)]
pub struct InMemoryLogQueue {
    state: Arc<RwLock<QueueState>>,
    policy: RedeliveryPolicy,
}

#[derive(Debug, Default)]
struct QueueState {
    pending: Vec<QueuedRecord>,
    ledger: HashMap<RecordId, LedgerEntry>,
}

#[derive(Debug)]
struct QueuedRecord {
    record: LogRecord,
    attempts: u32,
    lease: Option<Lease>,
}

#[derive(Debug, Clone, Copy)]
struct Lease {
    ack_id: AckId,
    visible_at: Instant,
}

#[derive(Debug, Clone, Copy)]
struct LedgerEntry {
    state: DeliveryState,
    acks: usize,
    deliveries: u32,
}

fn lock_error(err: impl std::fmt::Display) -> QueueError {
    QueueError::persistence(std::io::Error::other(err.to_string()))
}

fn advance(entry: &mut LedgerEntry, next: DeliveryState) -> QueueResult<()> {
    entry.state = entry
        .state
        .transition_to(next)
        .map_err(QueueError::invalid_persisted_data)?;
    Ok(())
}

impl InMemoryLogQueue {
    /// Creates an empty queue using `policy` for visibility timeouts.
    #[must_use]
    pub fn new(policy: RedeliveryPolicy) -> Self {
        Self {
            state: Arc::new(RwLock::new(QueueState::default())),
            policy,
        }
    }

    /// Returns the lifecycle state of a record, if it was ever published.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Persistence`] when lock acquisition fails.
    pub fn state_of(&self, record_id: &RecordId) -> QueueResult<Option<DeliveryState>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.ledger.get(record_id).map(|entry| entry.state))
    }

    /// Returns how many times a record was acknowledged.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Persistence`] when lock acquisition fails.
    pub fn ack_count(&self, record_id: &RecordId) -> QueueResult<usize> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.ledger.get(record_id).map_or(0, |entry| entry.acks))
    }

    /// Returns how many times a record was delivered.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Persistence`] when lock acquisition fails.
    pub fn delivery_count(&self, record_id: &RecordId) -> QueueResult<u32> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.ledger.get(record_id).map_or(0, |entry| entry.deliveries))
    }

    /// Returns the number of records still queued, visible or not.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Persistence`] when lock acquisition fails.
    pub fn pending_len(&self) -> QueueResult<usize> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.pending.len())
    }

    fn settle(&self, ack_id: &AckId, outcome: &[DeliveryState]) -> QueueResult<RecordId> {
        let mut state = self.state.write().map_err(lock_error)?;
        let position = state
            .pending
            .iter()
            .position(|queued| queued.lease.is_some_and(|lease| lease.ack_id == *ack_id))
            .ok_or(QueueError::StaleAck(*ack_id))?;
        let queued = state.pending.remove(position);
        let record_id = queued.record.record_id().clone();
        if let Some(entry) = state.ledger.get_mut(&record_id) {
            for next in outcome {
                advance(entry, *next)?;
            }
            if outcome.last() == Some(&DeliveryState::Stored) {
                entry.acks += 1;
            }
        }
        Ok(record_id)
    }
}

impl Default for InMemoryLogQueue {
    fn default() -> Self {
        Self::new(RedeliveryPolicy::default())
    }
}

#[async_trait]
impl LogQueue for InMemoryLogQueue {
    async fn publish(&self, record: &LogRecord) -> QueueResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let record_id = record.record_id();
        if state.ledger.contains_key(record_id) {
            return Err(QueueError::DuplicateRecord(record_id.clone()));
        }
        state.ledger.insert(
            record_id.clone(),
            LedgerEntry {
                state: DeliveryState::Published,
                acks: 0,
                deliveries: 0,
            },
        );
        state.pending.push(QueuedRecord {
            record: record.clone(),
            attempts: 0,
            lease: None,
        });
        Ok(())
    }

    async fn pull(&self, max: usize) -> QueueResult<Vec<Delivery>> {
        let now = Instant::now();
        let mut guard = self.state.write().map_err(lock_error)?;
        let QueueState { pending, ledger } = &mut *guard;
        let mut deliveries = Vec::new();

        for queued in pending.iter_mut() {
            if deliveries.len() >= max {
                break;
            }
            let redelivery = match queued.lease {
                Some(lease) if lease.visible_at > now => continue,
                Some(_) => true,
                None => false,
            };

            queued.attempts += 1;
            let lease = Lease {
                ack_id: AckId::new(),
                visible_at: now + self.policy.visibility_timeout(queued.attempts),
            };
            queued.lease = Some(lease);

            if let Some(entry) = ledger.get_mut(queued.record.record_id()) {
                if redelivery {
                    advance(entry, DeliveryState::Redelivered)?;
                    debug!(
                        record_id = %queued.record.record_id(),
                        attempt = queued.attempts,
                        "redelivering record"
                    );
                }
                advance(entry, DeliveryState::InFlight)?;
                entry.deliveries = queued.attempts;
            }

            deliveries.push(Delivery {
                ack_id: lease.ack_id,
                record: queued.record.clone(),
                attempt: queued.attempts,
            });
        }
        Ok(deliveries)
    }

    async fn ack(&self, ack_id: &AckId) -> QueueResult<()> {
        self.settle(ack_id, &[DeliveryState::Routed, DeliveryState::Stored])?;
        Ok(())
    }

    async fn dead_letter(&self, ack_id: &AckId) -> QueueResult<()> {
        self.settle(ack_id, &[DeliveryState::Dropped])?;
        Ok(())
    }
}
