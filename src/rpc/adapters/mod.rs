//! Transport adapters: HTTP client and server, plus an in-process loopback.

pub mod http;
pub mod loopback;
pub mod server;

pub use http::{HttpTransport, HttpTransportConfig};
pub use loopback::LoopbackTransport;
