//! Envelope codec for the JSON-RPC 2.0 wire format.
//!
//! Decoding checks the envelope shape only. Whether a method exists, and
//! whether its params are acceptable, is left to the dispatcher and the
//! handler.

use crate::rpc::domain::{
    ErrorCode, JSONRPC_VERSION, RequestId, RpcError, RpcRequest, RpcResponse, empty_params,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned when a payload is not a valid envelope.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// The payload is not well-formed JSON.
    #[error("payload is not well-formed JSON: {0}")]
    Malformed(Arc<serde_json::Error>),

    /// The payload is JSON but not an object of the expected shape.
    #[error("payload is not a valid envelope: {0}")]
    InvalidShape(String),

    /// The `jsonrpc` tag is missing.
    #[error("missing protocol-version tag")]
    MissingVersion,

    /// The `jsonrpc` tag names an unsupported protocol version.
    #[error("unsupported protocol version '{0}'")]
    UnsupportedVersion(String),

    /// The `method` field is missing or empty.
    #[error("missing method")]
    MissingMethod,

    /// A response carries both, or neither, of `result` and `error`.
    #[error("response must carry exactly one of result or error")]
    AmbiguousOutcome,
}

impl ParseError {
    /// Returns the wire code used when answering this failure.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Malformed(_) => ErrorCode::ParseError,
            Self::InvalidShape(_)
            | Self::MissingVersion
            | Self::UnsupportedVersion(_)
            | Self::MissingMethod
            | Self::AmbiguousOutcome => ErrorCode::InvalidRequest,
        }
    }

    /// Builds the error response sent back for an undecodable request.
    ///
    /// The id is always `null`, since it could not be trusted.
    #[must_use]
    pub fn to_response(&self) -> RpcResponse {
        let message = match self.error_code() {
            ErrorCode::ParseError => "Parse error".to_owned(),
            _ => format!("Invalid Request: {self}"),
        };
        RpcResponse::failure(RpcError::new(self.error_code(), message), None)
    }
}

#[derive(Debug, Deserialize)]
struct RawRequest {
    #[serde(default)]
    jsonrpc: Option<String>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Option<Value>,
    #[serde(default)]
    id: Option<RequestId>,
}

/// Decodes raw bytes into a request envelope.
///
/// Missing or `null` params decode to an empty object.
///
/// # Errors
///
/// Returns [`ParseError`] when the payload is not JSON, lacks the
/// protocol-version tag or the method, or names another protocol version.
pub fn decode(raw: &[u8]) -> Result<RpcRequest, ParseError> {
    let value: Value =
        serde_json::from_slice(raw).map_err(|err| ParseError::Malformed(Arc::new(err)))?;
    if !value.is_object() {
        return Err(ParseError::InvalidShape(
            "expected a JSON object".to_owned(),
        ));
    }

    let request: RawRequest =
        serde_json::from_value(value).map_err(|err| ParseError::InvalidShape(err.to_string()))?;

    let jsonrpc = request.jsonrpc.ok_or(ParseError::MissingVersion)?;
    if jsonrpc != JSONRPC_VERSION {
        return Err(ParseError::UnsupportedVersion(jsonrpc));
    }

    let method = request
        .method
        .filter(|method| !method.trim().is_empty())
        .ok_or(ParseError::MissingMethod)?;

    Ok(RpcRequest {
        jsonrpc,
        method,
        params: request
            .params
            .filter(|params| !params.is_null())
            .unwrap_or_else(empty_params),
        id: request.id,
    })
}

/// Encodes a response envelope.
#[must_use]
pub fn encode(response: &RpcResponse) -> Vec<u8> {
    serde_json::to_vec(response).unwrap_or_else(|err| {
        tracing::error!(error = %err, "failed to encode response envelope");
        br#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Internal error"},"id":null}"#
            .to_vec()
    })
}

/// Encodes a request envelope for sending to a remote agent.
#[must_use]
pub fn encode_request(request: &RpcRequest) -> Vec<u8> {
    serde_json::to_vec(request).unwrap_or_else(|err| {
        tracing::error!(error = %err, method = %request.method, "failed to encode request");
        Vec::new()
    })
}

/// Decodes a response envelope received from a remote agent.
///
/// # Errors
///
/// Returns [`ParseError`] when the payload is not JSON, lacks the
/// protocol-version tag, or does not carry exactly one of `result` and
/// `error`.
pub fn decode_response(raw: &[u8]) -> Result<RpcResponse, ParseError> {
    let value: Value =
        serde_json::from_slice(raw).map_err(|err| ParseError::Malformed(Arc::new(err)))?;
    let Some(object) = value.as_object() else {
        return Err(ParseError::InvalidShape(
            "expected a JSON object".to_owned(),
        ));
    };

    match object.get("jsonrpc").and_then(Value::as_str) {
        None => return Err(ParseError::MissingVersion),
        Some(JSONRPC_VERSION) => {}
        Some(other) => return Err(ParseError::UnsupportedVersion(other.to_owned())),
    }
    if object.contains_key("result") == object.contains_key("error") {
        return Err(ParseError::AmbiguousOutcome);
    }

    serde_json::from_value(value).map_err(|err| ParseError::InvalidShape(err.to_string()))
}
