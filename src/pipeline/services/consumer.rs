//! Ingest consumer: drains the queue towards the router.

use crate::pipeline::{
    domain::{Delivery, DroppedRecord},
    ports::{DeadLetterReporter, LogQueue, QueueError},
    services::router::RouteLogParams,
};
use crate::registry::{
    client::{RegistryClient, RegistryClientError},
    domain::AgentName,
};
use crate::rpc::{
    client::{CallError, RpcClient},
    domain::ErrorCode,
    ports::RpcTransport,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Consumer tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerConfig {
    /// Agent records are handed to.
    pub router_agent: AgentName,
    /// Records pulled per poll.
    pub batch_size: usize,
    /// Units in flight at once.
    pub concurrency: usize,
    /// Deadline for one unit, covering resolution and the routing call.
    pub call_timeout: Duration,
    /// Deliveries allowed before a record is dropped.
    pub max_deliveries: u32,
    /// Pause between polls that found nothing.
    pub idle_backoff: Duration,
}

impl ConsumerConfig {
    /// Creates a configuration with default tuning.
    #[must_use]
    pub const fn new(router_agent: AgentName) -> Self {
        Self {
            router_agent,
            batch_size: 50,
            concurrency: 8,
            call_timeout: Duration::from_secs(10),
            max_deliveries: 5,
            idle_backoff: Duration::from_millis(500),
        }
    }
}

/// Counts from one poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSummary {
    /// Records pulled.
    pub pulled: usize,
    /// Records routed and acknowledged.
    pub acked: usize,
    /// Records left for redelivery.
    pub failed: usize,
    /// Records dropped after exhausting their deliveries or hitting a
    /// configuration fault.
    pub dropped: usize,
}

/// Log target for faults an operator must fix before records can flow.
pub const CONFIG_FAULT_TARGET: &str = "a2a_mesh::config_fault";

#[derive(Debug, Error)]
enum UnitError {
    #[error(transparent)]
    Resolve(#[from] RegistryClientError),
    #[error(transparent)]
    Route(#[from] CallError),
    #[error("encoding record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl UnitError {
    /// Faults that redelivery cannot cure: the router is not registered,
    /// or the router reports that its own destination is not.
    fn is_configuration_fault(&self) -> bool {
        match self {
            Self::Resolve(err) => !err.is_retryable(),
            Self::Route(CallError::Remote(err)) => err.is(ErrorCode::AgentNotRegistered),
            Self::Route(_) | Self::Encode(_) | Self::Timeout(_) => false,
        }
    }
}

enum UnitOutcome {
    Acked,
    Failed,
    Dropped,
}

/// Pulls records and hands each to the router as an independent unit.
///
/// A unit that fails is not acknowledged and nothing is retried in
/// process; the queue redelivers after the visibility timeout. A
/// configuration fault is not transient, so the record is dead-lettered at
/// once and reported on [`CONFIG_FAULT_TARGET`].
pub struct IngestConsumer<Q, T, D>
where
    Q: LogQueue,
    T: RpcTransport,
    D: DeadLetterReporter,
{
    queue: Arc<Q>,
    registry: Arc<RegistryClient<T>>,
    rpc: Arc<RpcClient<T>>,
    dead_letters: Arc<D>,
    config: ConsumerConfig,
}

impl<Q, T, D> Clone for IngestConsumer<Q, T, D>
where
    Q: LogQueue,
    T: RpcTransport,
    D: DeadLetterReporter,
{
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
            registry: Arc::clone(&self.registry),
            rpc: Arc::clone(&self.rpc),
            dead_letters: Arc::clone(&self.dead_letters),
            config: self.config.clone(),
        }
    }
}

impl<Q, T, D> IngestConsumer<Q, T, D>
where
    Q: LogQueue + 'static,
    T: RpcTransport + 'static,
    D: DeadLetterReporter + 'static,
{
    /// Creates a consumer.
    #[must_use]
    pub const fn new(
        queue: Arc<Q>,
        registry: Arc<RegistryClient<T>>,
        rpc: Arc<RpcClient<T>>,
        dead_letters: Arc<D>,
        config: ConsumerConfig,
    ) -> Self {
        Self {
            queue,
            registry,
            rpc,
            dead_letters,
            config,
        }
    }

    /// Returns the consumer configuration.
    #[must_use]
    pub const fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    /// Pulls and processes one batch of the configured size.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] when the pull itself fails.
    pub async fn poll_once(&self) -> Result<PollSummary, QueueError> {
        self.poll(self.config.batch_size).await
    }

    /// Pulls and processes up to `max_messages` records.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] when the pull itself fails. Failures of
    /// individual units are counted, not returned.
    pub async fn poll(&self, max_messages: usize) -> Result<PollSummary, QueueError> {
        let deliveries = self.queue.pull(max_messages).await?;
        let mut summary = PollSummary {
            pulled: deliveries.len(),
            ..PollSummary::default()
        };
        if deliveries.is_empty() {
            return Ok(summary);
        }

        let slots = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut units = JoinSet::new();

        for delivery in deliveries {
            if delivery.attempt > self.config.max_deliveries {
                let reason = format!(
                    "not acknowledged within {} deliveries",
                    self.config.max_deliveries
                );
                self.drop_record(delivery, reason).await;
                summary.dropped += 1;
                continue;
            }

            let Ok(permit) = Arc::clone(&slots).acquire_owned().await else {
                break;
            };
            let consumer = self.clone();
            units.spawn(async move {
                let outcome = consumer.process(delivery).await;
                drop(permit);
                outcome
            });
        }

        while let Some(joined) = units.join_next().await {
            match joined {
                Ok(UnitOutcome::Acked) => summary.acked += 1,
                Ok(UnitOutcome::Failed) => summary.failed += 1,
                Ok(UnitOutcome::Dropped) => summary.dropped += 1,
                Err(err) => {
                    error!(error = %err, "delivery unit aborted");
                    summary.failed += 1;
                }
            }
        }

        info!(
            pulled = summary.pulled,
            acked = summary.acked,
            failed = summary.failed,
            dropped = summary.dropped,
            "poll complete"
        );
        Ok(summary)
    }

    /// Polls until `shutdown` flips to `true`, pausing after empty polls.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(router = %self.config.router_agent, "ingest consumer started");
        loop {
            let stopping = *shutdown.borrow_and_update();
            if stopping {
                break;
            }
            let idle = match self.poll_once().await {
                Ok(summary) => summary.pulled == 0,
                Err(err) => {
                    warn!(error = %err, "queue pull failed");
                    true
                }
            };
            if idle {
                tokio::select! {
                    () = tokio::time::sleep(self.config.idle_backoff) => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        }
        info!("ingest consumer stopped");
    }

    async fn process(&self, delivery: Delivery) -> UnitOutcome {
        let record_id = delivery.record.record_id().clone();
        let attempt = delivery.attempt;
        let result = tokio::time::timeout(self.config.call_timeout, self.deliver(&delivery))
            .await
            .unwrap_or_else(|_| Err(UnitError::Timeout(self.config.call_timeout)));

        match result {
            Ok(()) => match self.queue.ack(&delivery.ack_id).await {
                Ok(()) => {
                    debug!(%record_id, attempt, "record acknowledged");
                    UnitOutcome::Acked
                }
                Err(err) => {
                    warn!(%record_id, attempt, error = %err, "ack rejected");
                    UnitOutcome::Failed
                }
            },
            Err(err) if err.is_configuration_fault() => {
                error!(
                    target: CONFIG_FAULT_TARGET,
                    %record_id,
                    attempt,
                    router = %self.config.router_agent,
                    error = %err,
                    "configuration fault, dead-lettering record"
                );
                self.drop_record(delivery, format!("configuration fault: {err}"))
                    .await;
                UnitOutcome::Dropped
            }
            Err(err) => {
                warn!(%record_id, attempt, error = %err, "delivery failed, leaving for redelivery");
                UnitOutcome::Failed
            }
        }
    }

    async fn deliver(&self, delivery: &Delivery) -> Result<(), UnitError> {
        let router = self.registry.resolve(&self.config.router_agent).await?;
        let params = serde_json::to_value(RouteLogParams {
            record: delivery.record.clone(),
        })?;
        if let Err(err) = self.rpc.call(router.endpoint(), "route_log", params).await {
            if matches!(err, CallError::Transport(_)) {
                self.registry.invalidate(&self.config.router_agent);
            }
            return Err(err.into());
        }
        Ok(())
    }

    async fn drop_record(&self, delivery: Delivery, reason: String) {
        let dropped = DroppedRecord {
            attempts: delivery.attempt,
            reason,
            record: delivery.record,
        };
        self.dead_letters.report(&dropped).await;
        if let Err(err) = self.queue.dead_letter(&delivery.ack_id).await {
            warn!(
                record_id = %dropped.record.record_id(),
                error = %err,
                "failed to remove dropped record"
            );
        }
    }
}
