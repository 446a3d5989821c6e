//! Command-line and environment configuration for the agent binary.
//!
//! Every flag has an environment fallback so agents can be configured the
//! same way in containers and on the command line. Settings are converted
//! into the plain config types library code consumes.

use crate::pipeline::domain::RedeliveryPolicy;
use crate::pipeline::services::{ConsumerConfig, DEFAULT_SINK_AGENT};
use crate::registry::domain::{AgentName, Endpoint, RegistryDomainError};
use crate::rpc::adapters::HttpTransportConfig;
use crate::rpc::domain::RpcDomainError;
use crate::telemetry::DEFAULT_FILTER;
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Errors converting raw settings into typed configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An agent name setting is invalid.
    #[error("invalid agent name: {0}")]
    AgentName(#[from] RegistryDomainError),

    /// An endpoint setting is invalid.
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] RpcDomainError),
}

/// Runs one agent of the fleet.
#[derive(Debug, Parser)]
#[command(name = "a2a-agent", version, about = "Run one agent of the a2a mesh")]
pub struct Cli {
    /// Tracing filter directive, overridden by `RUST_LOG`.
    #[arg(long, env = "A2A_LOG", default_value = DEFAULT_FILTER, global = true)]
    pub log_filter: String,

    /// Agent role to run.
    #[command(subcommand)]
    pub role: Role,
}

/// Agent roles.
#[derive(Debug, Subcommand)]
pub enum Role {
    /// Directory of agent cards.
    Registry(RegistryArgs),
    /// Forwards records to the sink.
    Router(RouterArgs),
    /// Stores records in the warehouse.
    Sink(SinkArgs),
    /// Publishes records and drains the queue towards the router.
    Ingest(IngestArgs),
}

/// Settings shared by every role.
#[derive(Debug, Clone, Args)]
pub struct ServerArgs {
    /// Address the `/a2a` endpoint listens on.
    #[arg(long, env = "A2A_BIND", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// Deadline for outbound calls, in milliseconds.
    #[arg(long, env = "A2A_CALL_TIMEOUT_MS", default_value_t = 10_000)]
    pub call_timeout_ms: u64,

    /// Deadline for establishing outbound connections, in milliseconds.
    #[arg(long, env = "A2A_CONNECT_TIMEOUT_MS", default_value_t = 3_000)]
    pub connect_timeout_ms: u64,
}

impl ServerArgs {
    /// Returns the outbound call deadline.
    #[must_use]
    pub const fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Converts into the HTTP transport configuration.
    #[must_use]
    pub const fn transport_config(&self) -> HttpTransportConfig {
        HttpTransportConfig {
            call_timeout: Duration::from_millis(self.call_timeout_ms),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
        }
    }
}

/// Storage settings shared by the roles that persist data.
#[derive(Debug, Clone, Args)]
pub struct StorageArgs {
    /// `PostgreSQL` URL. In-memory storage is used when absent.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum pooled connections.
    #[arg(long, env = "A2A_DB_POOL_SIZE", default_value_t = 8)]
    pub pool_size: u32,
}

/// Settings for agents that resolve others through the registry.
#[derive(Debug, Clone, Args)]
pub struct DiscoveryArgs {
    /// Registry agent endpoint.
    #[arg(
        long,
        env = "A2A_REGISTRY_URL",
        default_value = "http://a2a_registry:8000/a2a"
    )]
    pub registry_url: String,
}

impl DiscoveryArgs {
    /// Returns the registry endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Endpoint`] when the URL is blank.
    pub fn registry_endpoint(&self) -> Result<Endpoint, ConfigError> {
        Ok(Endpoint::new(self.registry_url.as_str())?)
    }
}

/// Registry role settings.
#[derive(Debug, Clone, Args)]
pub struct RegistryArgs {
    /// Shared server settings.
    #[command(flatten)]
    pub server: ServerArgs,

    /// Storage settings.
    #[command(flatten)]
    pub storage: StorageArgs,

    /// Skip loading the seed cards at start-up.
    #[arg(long, env = "A2A_SKIP_SEED")]
    pub skip_seed: bool,
}

/// Router role settings.
#[derive(Debug, Clone, Args)]
pub struct RouterArgs {
    /// Shared server settings.
    #[command(flatten)]
    pub server: ServerArgs,

    /// Discovery settings.
    #[command(flatten)]
    pub discovery: DiscoveryArgs,

    /// Agent records are forwarded to.
    #[arg(long, env = "A2A_SINK_AGENT", default_value = DEFAULT_SINK_AGENT)]
    pub sink_agent: String,
}

impl RouterArgs {
    /// Returns the destination agent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AgentName`] when the name is invalid.
    pub fn destination(&self) -> Result<AgentName, ConfigError> {
        Ok(AgentName::new(self.sink_agent.as_str())?)
    }
}

/// Sink role settings.
#[derive(Debug, Clone, Args)]
pub struct SinkArgs {
    /// Shared server settings.
    #[command(flatten)]
    pub server: ServerArgs,

    /// Storage settings.
    #[command(flatten)]
    pub storage: StorageArgs,
}

/// Ingest role settings.
#[derive(Debug, Clone, Args)]
pub struct IngestArgs {
    /// Shared server settings.
    #[command(flatten)]
    pub server: ServerArgs,

    /// Storage settings for the queue.
    #[command(flatten)]
    pub storage: StorageArgs,

    /// Discovery settings.
    #[command(flatten)]
    pub discovery: DiscoveryArgs,

    /// Agent records are handed to.
    #[arg(long, env = "A2A_ROUTER_AGENT", default_value = "log_router_agent")]
    pub router_agent: String,

    /// Records pulled per poll.
    #[arg(long, env = "A2A_BATCH_SIZE", default_value_t = 50)]
    pub batch_size: usize,

    /// Units in flight at once.
    #[arg(long, env = "A2A_CONCURRENCY", default_value_t = 8)]
    pub concurrency: usize,

    /// Deliveries allowed before a record is dropped.
    #[arg(long, env = "A2A_MAX_DELIVERIES", default_value_t = 5)]
    pub max_deliveries: u32,

    /// Visibility timeout of the first delivery, in milliseconds.
    #[arg(long, env = "A2A_VISIBILITY_BASE_MS", default_value_t = 10_000)]
    pub visibility_base_ms: u64,

    /// Visibility timeout cap, in milliseconds.
    #[arg(long, env = "A2A_VISIBILITY_MAX_MS", default_value_t = 300_000)]
    pub visibility_max_ms: u64,

    /// Pause after an empty poll, in milliseconds.
    #[arg(long, env = "A2A_IDLE_BACKOFF_MS", default_value_t = 500)]
    pub idle_backoff_ms: u64,

    /// Do not start the background consumer; records are drained only
    /// through `drain_once`.
    #[arg(long, env = "A2A_MANUAL_DRAIN")]
    pub manual_drain: bool,
}

impl IngestArgs {
    /// Returns the queue redelivery policy.
    #[must_use]
    pub fn redelivery_policy(&self) -> RedeliveryPolicy {
        RedeliveryPolicy::new(
            self.max_deliveries,
            Duration::from_millis(self.visibility_base_ms),
            Duration::from_millis(self.visibility_max_ms),
        )
    }

    /// Returns the consumer configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AgentName`] when the router name is invalid.
    pub fn consumer_config(&self) -> Result<ConsumerConfig, ConfigError> {
        let policy = self.redelivery_policy();
        Ok(ConsumerConfig {
            batch_size: self.batch_size.max(1),
            concurrency: self.concurrency.max(1),
            call_timeout: self.server.call_timeout(),
            max_deliveries: policy.max_deliveries(),
            idle_backoff: Duration::from_millis(self.idle_backoff_ms),
            ..ConsumerConfig::new(AgentName::new(self.router_agent.as_str())?)
        })
    }
}
