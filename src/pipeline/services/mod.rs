//! Pipeline services and their RPC method bindings.

mod consumer;
mod publisher;
mod router;
mod sink_forwarder;

pub use consumer::{CONFIG_FAULT_TARGET, ConsumerConfig, IngestConsumer, PollSummary};
pub use publisher::{
    DrainParams, LogPublisher, PublishLogParams, PublishLogResult, PublishLogsParams,
    PublishLogsResult, bind_ingest_methods,
};
pub use router::{
    DEFAULT_SINK_AGENT, LogRouter, RouteError, RouteLogParams, RouteLogResult, bind_router_methods,
};
pub use sink_forwarder::{
    InsertLogParams, InsertLogResult, InsertLogsParams, SinkForwarder, bind_sink_methods,
};
