//! Envelope types shared by every agent.

mod endpoint;
mod envelope;
mod error_code;

pub use endpoint::Endpoint;
pub use envelope::{
    JSONRPC_VERSION, RequestId, RpcError, RpcOutcome, RpcRequest, RpcResponse, empty_params,
};
pub use error_code::ErrorCode;

use thiserror::Error;

/// Errors returned while constructing RPC domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RpcDomainError {
    /// The endpoint address is empty after trimming.
    #[error("endpoint must not be empty")]
    EmptyEndpoint,
}
