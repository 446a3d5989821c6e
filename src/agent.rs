//! Wiring for the agent roles the binary can run.
//!
//! Each role builds its dispatcher from the same bindings the tests use,
//! picks `PostgreSQL` or in-memory storage, and serves `/a2a` until the
//! process is interrupted.

use crate::config::{
    Cli, ConfigError, IngestArgs, RegistryArgs, Role, RouterArgs, ServerArgs, SinkArgs, StorageArgs,
};
use crate::pipeline::{
    adapters::{
        TracingDeadLetterReporter,
        memory::{InMemoryLogQueue, InMemoryLogSink},
        postgres::{PostgresLogQueue, PostgresLogSink},
    },
    ports::{DeadLetterReporter, LogQueue, LogSink},
    services::{
        IngestConsumer, LogPublisher, LogRouter, SinkForwarder, bind_ingest_methods,
        bind_router_methods, bind_sink_methods,
    },
};
use crate::postgres::{self, PgPool, SetupError};
use crate::registry::{
    adapters::{memory::InMemoryCardStore, postgres::PostgresCardStore},
    client::RegistryClient,
    domain::{REGISTRY_AGENT, RegistryDomainError, seed_cards},
    ports::AgentCardRepository,
    services::{RegistryService, RegistryServiceError, bind_registry_methods},
};
use crate::rpc::{
    adapters::{HttpTransport, server},
    client::RpcClient,
    dispatcher::Dispatcher,
    ports::RpcTransport,
};
use mockable::{Clock, DefaultClock};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Name the router agent publishes itself under.
pub const ROUTER_AGENT: &str = "log_router_agent";

/// Name the sink agent publishes itself under.
pub const SINK_AGENT: &str = "log_sink_agent";

/// Name the ingest agent publishes itself under.
pub const INGEST_AGENT: &str = "log_ingest_agent";

/// Failures starting or running an agent.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Settings were invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database setup failed.
    #[error("database setup failed: {0}")]
    Database(#[from] SetupError),

    /// The outbound HTTP client could not be built.
    #[error("http client setup failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The seed cards were invalid.
    #[error("invalid seed card: {0}")]
    Seed(#[from] RegistryDomainError),

    /// Seeding the registry failed.
    #[error("seeding failed: {0}")]
    Registry(#[from] RegistryServiceError),

    /// Binding or serving failed.
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds the registry agent's dispatcher.
#[must_use]
pub fn registry_agent<R>(service: &RegistryService<R>) -> Dispatcher
where
    R: AgentCardRepository + 'static,
{
    bind_registry_methods(Dispatcher::builder(REGISTRY_AGENT), service).build()
}

/// Builds the router agent's dispatcher.
#[must_use]
pub fn router_agent<T>(router: &LogRouter<T>) -> Dispatcher
where
    T: RpcTransport + 'static,
{
    bind_router_methods(Dispatcher::builder(ROUTER_AGENT), router).build()
}

/// Builds the sink agent's dispatcher.
#[must_use]
pub fn sink_agent<S>(forwarder: &SinkForwarder<S>) -> Dispatcher
where
    S: LogSink + 'static,
{
    bind_sink_methods(Dispatcher::builder(SINK_AGENT), forwarder).build()
}

/// Builds the ingest agent's dispatcher.
#[must_use]
pub fn ingest_agent<Q, C, T, D>(
    publisher: &LogPublisher<Q, C>,
    consumer: &IngestConsumer<Q, T, D>,
) -> Dispatcher
where
    Q: LogQueue + 'static,
    C: Clock + Send + Sync + 'static,
    T: RpcTransport + 'static,
    D: DeadLetterReporter + 'static,
{
    bind_ingest_methods(Dispatcher::builder(INGEST_AGENT), publisher, consumer).build()
}

/// Runs the role selected on the command line until interrupted.
///
/// # Errors
///
/// Returns [`AgentError`] when start-up fails or the server stops with an
/// I/O error.
pub async fn run(cli: &Cli) -> Result<(), AgentError> {
    match &cli.role {
        Role::Registry(args) => run_registry(args).await,
        Role::Router(args) => run_router(args).await,
        Role::Sink(args) => run_sink(args).await,
        Role::Ingest(args) => run_ingest(args).await,
    }
}

async fn open_pool(storage: &StorageArgs) -> Result<Option<PgPool>, AgentError> {
    let Some(url) = storage.database_url.as_deref() else {
        warn!("DATABASE_URL not set, using in-memory storage");
        return Ok(None);
    };
    let pool = postgres::connect(url, storage.pool_size)?;
    postgres::apply_migrations(&pool).await?;
    info!("database ready");
    Ok(Some(pool))
}

fn rpc_client(server: &ServerArgs) -> Result<Arc<RpcClient<HttpTransport>>, AgentError> {
    let transport = HttpTransport::new(server.transport_config())?;
    Ok(Arc::new(RpcClient::new(Arc::new(transport))))
}

async fn run_registry(args: &RegistryArgs) -> Result<(), AgentError> {
    match open_pool(&args.storage).await? {
        Some(pool) => serve_registry(args, PostgresCardStore::new(pool)).await,
        None => serve_registry(args, InMemoryCardStore::new()).await,
    }
}

async fn serve_registry<R>(args: &RegistryArgs, store: R) -> Result<(), AgentError>
where
    R: AgentCardRepository + 'static,
{
    let service = RegistryService::new(Arc::new(store));
    if !args.skip_seed {
        service.seed(seed_cards()?).await?;
    }
    serve(args.server.bind, registry_agent(&service), shutdown_signal()).await
}

async fn run_router(args: &RouterArgs) -> Result<(), AgentError> {
    let rpc = rpc_client(&args.server)?;
    let registry = Arc::new(RegistryClient::new(
        Arc::clone(&rpc),
        args.discovery.registry_endpoint()?,
    ));
    let router = LogRouter::new(registry, rpc, args.destination()?);
    serve(args.server.bind, router_agent(&router), shutdown_signal()).await
}

async fn run_sink(args: &SinkArgs) -> Result<(), AgentError> {
    match open_pool(&args.storage).await? {
        Some(pool) => serve_sink(args, PostgresLogSink::new(pool)).await,
        None => serve_sink(args, InMemoryLogSink::new()).await,
    }
}

async fn serve_sink<S>(args: &SinkArgs, sink: S) -> Result<(), AgentError>
where
    S: LogSink + 'static,
{
    let forwarder = SinkForwarder::new(Arc::new(sink));
    serve(args.server.bind, sink_agent(&forwarder), shutdown_signal()).await
}

async fn run_ingest(args: &IngestArgs) -> Result<(), AgentError> {
    let policy = args.redelivery_policy();
    match open_pool(&args.storage).await? {
        Some(pool) => serve_ingest(args, PostgresLogQueue::new(pool, policy)).await,
        None => serve_ingest(args, InMemoryLogQueue::new(policy)).await,
    }
}

async fn serve_ingest<Q>(args: &IngestArgs, store: Q) -> Result<(), AgentError>
where
    Q: LogQueue + 'static,
{
    let queue = Arc::new(store);
    let rpc = rpc_client(&args.server)?;
    let registry = Arc::new(RegistryClient::new(
        Arc::clone(&rpc),
        args.discovery.registry_endpoint()?,
    ));
    let consumer = IngestConsumer::new(
        Arc::clone(&queue),
        registry,
        rpc,
        Arc::new(TracingDeadLetterReporter),
        args.consumer_config()?,
    );
    let publisher = LogPublisher::new(queue, Arc::new(DefaultClock));
    let dispatcher = ingest_agent(&publisher, &consumer);

    let (stop, stopped) = watch::channel(false);
    let background = if args.manual_drain {
        None
    } else {
        let worker = consumer.clone();
        Some(tokio::spawn(async move { worker.run(stopped).await }))
    };

    let result = serve(args.server.bind, dispatcher, shutdown_signal()).await;

    if stop.send(true).is_err() {
        debug!("consumer already stopped");
    }
    if let Some(handle) = background
        && let Err(err) = handle.await
    {
        warn!(error = %err, "consumer task ended abnormally");
    }
    result
}

async fn serve(
    bind: SocketAddr,
    dispatcher: Dispatcher,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), AgentError> {
    let listener = TcpListener::bind(bind).await?;
    server::serve(listener, Arc::new(dispatcher), shutdown).await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(err) => {
            warn!(error = %err, "cannot listen for ctrl-c, running until killed");
            std::future::pending::<()>().await;
        }
    }
}
