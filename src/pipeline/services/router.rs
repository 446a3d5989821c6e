//! Router agent: forwards records to the sink resolved through the registry.

use crate::pipeline::{domain::LogRecord, ports::InsertOutcome};
use crate::pipeline::services::consumer::CONFIG_FAULT_TARGET;
use crate::pipeline::services::sink_forwarder::{InsertLogParams, InsertLogResult};
use crate::registry::{
    client::{RegistryClient, RegistryClientError},
    domain::AgentName,
};
use crate::rpc::{
    client::{CallError, RpcClient},
    dispatcher::{DispatcherBuilder, HandlerError, typed},
    domain::ErrorCode,
    ports::RpcTransport,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Agent records are forwarded to when no other destination is configured.
pub const DEFAULT_SINK_AGENT: &str = "log_sink_agent";

/// Params of `route_log`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteLogParams {
    /// Record to deliver.
    pub record: LogRecord,
}

/// Result of `route_log`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteLogResult {
    /// What the sink did with the record.
    pub status: InsertOutcome,
}

/// Failures forwarding a record.
#[derive(Debug, Clone, Error)]
pub enum RouteError {
    /// The destination could not be resolved.
    #[error(transparent)]
    Resolve(#[from] RegistryClientError),

    /// The destination did not confirm storage.
    #[error("sink call failed: {0}")]
    Sink(#[source] CallError),

    /// The destination answered with something other than an insert result.
    #[error("unexpected sink reply: {0}")]
    UnexpectedReply(Arc<serde_json::Error>),
}

/// Stateless forwarder to a single configured destination.
pub struct LogRouter<T: RpcTransport> {
    registry: Arc<RegistryClient<T>>,
    rpc: Arc<RpcClient<T>>,
    destination: AgentName,
}

impl<T: RpcTransport> Clone for LogRouter<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            rpc: Arc::clone(&self.rpc),
            destination: self.destination.clone(),
        }
    }
}

impl<T: RpcTransport> LogRouter<T> {
    /// Creates a router forwarding to `destination`.
    #[must_use]
    pub const fn new(
        registry: Arc<RegistryClient<T>>,
        rpc: Arc<RpcClient<T>>,
        destination: AgentName,
    ) -> Self {
        Self {
            registry,
            rpc,
            destination,
        }
    }

    /// Returns the destination agent.
    #[must_use]
    pub const fn destination(&self) -> &AgentName {
        &self.destination
    }

    /// Forwards `record` and returns once the destination has stored it.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] when the destination cannot be resolved, does
    /// not answer, or reports a failure.
    pub async fn route(&self, record: LogRecord) -> Result<InsertOutcome, RouteError> {
        let record_id = record.record_id().clone();
        let card = self.registry.resolve(&self.destination).await?;
        let params = serde_json::to_value(InsertLogParams { record })
            .map_err(|err| RouteError::UnexpectedReply(Arc::new(err)))?;

        let reply = match self.rpc.call(card.endpoint(), "insert_log", params).await {
            Ok(reply) => reply,
            Err(err) => {
                if matches!(err, CallError::Transport(_)) {
                    self.registry.invalidate(&self.destination);
                }
                return Err(RouteError::Sink(err));
            }
        };
        let result: InsertLogResult = serde_json::from_value(reply)
            .map_err(|err| RouteError::UnexpectedReply(Arc::new(err)))?;

        info!(
            %record_id,
            destination = %self.destination,
            status = result.status.as_str(),
            "record routed"
        );
        Ok(result.status)
    }
}

impl RouteError {
    /// Returns the wire code reported to the caller.
    ///
    /// A destination missing from the registry is
    /// [`ErrorCode::AgentNotRegistered`]; every other failure is
    /// [`ErrorCode::UpstreamFailure`] and leaves the record for redelivery.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Resolve(err) if !err.is_retryable() => ErrorCode::AgentNotRegistered,
            Self::Resolve(_) | Self::Sink(_) | Self::UnexpectedReply(_) => {
                ErrorCode::UpstreamFailure
            }
        }
    }
}

/// Binds `route_log` to the router.
#[must_use]
pub fn bind_router_methods<T>(
    builder: DispatcherBuilder,
    router: &LogRouter<T>,
) -> DispatcherBuilder
where
    T: RpcTransport + 'static,
{
    let shared = router.clone();
    builder.bind(
        "route_log",
        typed(move |params: RouteLogParams| {
            let forwarder = shared.clone();
            async move {
                let record_id = params.record.record_id().clone();
                let status = forwarder.route(params.record).await.map_err(|err| {
                    let code = err.error_code();
                    if code == ErrorCode::AgentNotRegistered {
                        error!(
                            target: CONFIG_FAULT_TARGET,
                            %record_id,
                            destination = %forwarder.destination(),
                            error = %err,
                            "destination is not registered"
                        );
                        HandlerError::application(
                            code,
                            format!(
                                "Record '{record_id}' was not stored: {err}"
                            ),
                        )
                    } else {
                        warn!(%record_id, error = %err, "routing failed");
                        HandlerError::application(
                            code,
                            format!("Record '{record_id}' was not stored"),
                        )
                    }
                })?;
                Ok(RouteLogResult { status })
            }
        }),
    )
}
