//! Port contracts for outbound remote calls.

pub mod transport;

#[cfg(test)]
pub use transport::MockRpcTransport;
pub use transport::{RpcTransport, TransportError, TransportResult};
