//! JSON-RPC 2.0 request and response envelopes.

use super::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Protocol-version tag carried by every envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// Correlation token echoed from a request into its response.
///
/// A request without an id (or with a `null` id) is a notification and is
/// modelled as `Option<RequestId>::None`. Numeric ids keep their JSON form,
/// so `7.0` and ids beyond `i64` are echoed exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric correlation token.
    Number(Number),
    /// String correlation token.
    String(String),
}

impl From<i64> for RequestId {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
        }
    }
}

/// Decoded remote-call request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Protocol-version tag, always `"2.0"` once decoded.
    pub jsonrpc: String,
    /// Name of the method to invoke.
    pub method: String,
    /// Method-specific parameters; an empty object when omitted.
    pub params: Value,
    /// Correlation token, `None` for notifications.
    pub id: Option<RequestId>,
}

impl RpcRequest {
    /// Creates a request expecting a response.
    #[must_use]
    pub fn new(method: impl Into<String>, params: Value, id: RequestId) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            method: method.into(),
            params,
            id: Some(id),
        }
    }

    /// Creates a notification, for which no response is transmitted.
    #[must_use]
    pub fn notification(method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            method: method.into(),
            params,
            id: None,
        }
    }

    /// Returns `true` when the request carries no correlation token.
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Error object carried in a failed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    /// Wire error code.
    pub code: i64,
    /// Caller-facing description.
    pub message: String,
    /// Optional structured detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    /// Creates an error object for a known code.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: None,
        }
    }

    /// Attaches structured detail to the error.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Builds the standard error for an unknown method.
    #[must_use]
    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            ErrorCode::MethodNotFound,
            format!("Method '{method}' not found"),
        )
    }

    /// Returns the known error code, if the wire code is recognised.
    #[must_use]
    pub fn error_code(&self) -> Option<ErrorCode> {
        ErrorCode::from_code(self.code)
    }

    /// Returns `true` when the error carries the given code.
    #[must_use]
    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == code.code()
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

impl std::error::Error for RpcError {}

/// Outcome half of a response: exactly one of `result` or `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcOutcome {
    /// Successful invocation carrying the handler's value.
    Result(Value),
    /// Failed invocation.
    Error(RpcError),
}

/// Remote-call response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    /// Protocol-version tag.
    pub jsonrpc: String,
    /// Result or error payload.
    #[serde(flatten)]
    pub outcome: RpcOutcome,
    /// Echoed correlation token; `null` when the request id was unknown.
    pub id: Option<RequestId>,
}

impl RpcResponse {
    /// Creates a successful response.
    #[must_use]
    pub fn success(result: Value, id: Option<RequestId>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            outcome: RpcOutcome::Result(result),
            id,
        }
    }

    /// Creates an error response.
    #[must_use]
    pub fn failure(error: RpcError, id: Option<RequestId>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            outcome: RpcOutcome::Error(error),
            id,
        }
    }

    /// Creates a response from a handler outcome.
    #[must_use]
    pub fn from_result(outcome: Result<Value, RpcError>, id: Option<RequestId>) -> Self {
        match outcome {
            Ok(result) => Self::success(result, id),
            Err(error) => Self::failure(error, id),
        }
    }

    /// Returns the error object, if the call failed.
    #[must_use]
    pub const fn error(&self) -> Option<&RpcError> {
        match &self.outcome {
            RpcOutcome::Error(error) => Some(error),
            RpcOutcome::Result(_) => None,
        }
    }

    /// Converts the response into a standard `Result`.
    ///
    /// # Errors
    ///
    /// Returns the carried [`RpcError`] when the call failed.
    pub fn into_result(self) -> Result<Value, RpcError> {
        match self.outcome {
            RpcOutcome::Result(value) => Ok(value),
            RpcOutcome::Error(error) => Err(error),
        }
    }
}

/// Returns an empty params object.
#[must_use]
pub fn empty_params() -> Value {
    Value::Object(Map::new())
}
