//! In-process fleet wired through the public API over a loopback transport.

use a2a_mesh::agent::{ROUTER_AGENT, SINK_AGENT, registry_agent, router_agent, sink_agent};
use a2a_mesh::pipeline::{
    adapters::memory::{InMemoryDeadLetters, InMemoryLogQueue, InMemoryLogSink},
    domain::RedeliveryPolicy,
    services::{ConsumerConfig, IngestConsumer, LogRouter, SinkForwarder},
};
use a2a_mesh::registry::{
    adapters::memory::InMemoryCardStore,
    client::RegistryClient,
    domain::{AgentName, Endpoint, REGISTRY_AGENT, seed_cards},
    services::RegistryService,
};
use a2a_mesh::rpc::{adapters::LoopbackTransport, client::RpcClient};
use eyre::WrapErr;
use std::sync::Arc;
use std::time::Duration;

/// Consumer type driven by the fleet.
pub type FleetConsumer = IngestConsumer<InMemoryLogQueue, LoopbackTransport, InMemoryDeadLetters>;

/// Registry, router and sink agents plus an ingest consumer.
pub struct Fleet {
    pub queue: InMemoryLogQueue,
    pub sink: InMemoryLogSink,
    pub dead_letters: InMemoryDeadLetters,
    pub transport: Arc<LoopbackTransport>,
    pub registry: RegistryService<InMemoryCardStore>,
    pub consumer: FleetConsumer,
}

impl Fleet {
    /// Seeds the registry, mounts every agent and builds the consumer.
    ///
    /// # Errors
    ///
    /// Returns an error when seeding or mounting fails.
    pub async fn start(policy: RedeliveryPolicy) -> Result<Self, eyre::Report> {
        let queue = InMemoryLogQueue::new(policy);
        let sink = InMemoryLogSink::new();
        let dead_letters = InMemoryDeadLetters::new();
        let transport = Arc::new(LoopbackTransport::new());
        let rpc = Arc::new(RpcClient::new(Arc::clone(&transport)));

        let registry = RegistryService::new(Arc::new(InMemoryCardStore::new()));
        registry
            .seed(seed_cards().wrap_err("build seed cards")?)
            .await
            .wrap_err("seed registry")?;

        let registry_endpoint = endpoint_of(&registry, REGISTRY_AGENT).await?;
        transport
            .mount(registry_endpoint.clone(), Arc::new(registry_agent(&registry)))
            .wrap_err("mount registry")?;

        let discovery = Arc::new(RegistryClient::new(Arc::clone(&rpc), registry_endpoint));
        let router = LogRouter::new(
            Arc::clone(&discovery),
            Arc::clone(&rpc),
            AgentName::new(SINK_AGENT).wrap_err("sink name")?,
        );
        transport
            .mount(
                endpoint_of(&registry, ROUTER_AGENT).await?,
                Arc::new(router_agent(&router)),
            )
            .wrap_err("mount router")?;

        let forwarder = SinkForwarder::new(Arc::new(sink.clone()));
        transport
            .mount(
                endpoint_of(&registry, SINK_AGENT).await?,
                Arc::new(sink_agent(&forwarder)),
            )
            .wrap_err("mount sink")?;

        let config = ConsumerConfig {
            call_timeout: Duration::from_secs(2),
            max_deliveries: policy.max_deliveries(),
            ..ConsumerConfig::new(AgentName::new(ROUTER_AGENT).wrap_err("router name")?)
        };
        let consumer = IngestConsumer::new(
            Arc::new(queue.clone()),
            discovery,
            rpc,
            Arc::new(dead_letters.clone()),
            config,
        );

        Ok(Self {
            queue,
            sink,
            dead_letters,
            transport,
            registry,
            consumer,
        })
    }

    /// Returns the endpoint an agent is registered at.
    ///
    /// # Errors
    ///
    /// Returns an error when the agent has no card.
    pub async fn endpoint(&self, name: &str) -> Result<Endpoint, eyre::Report> {
        endpoint_of(&self.registry, name).await
    }
}

async fn endpoint_of(
    registry: &RegistryService<InMemoryCardStore>,
    name: &str,
) -> Result<Endpoint, eyre::Report> {
    let card = registry
        .get(name)
        .await
        .wrap_err_with(|| format!("look up {name}"))?;
    Ok(card.endpoint().clone())
}
