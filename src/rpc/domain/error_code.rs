//! Wire error codes.

use std::fmt;

/// Error codes used on the wire.
///
/// The first five are the JSON-RPC 2.0 standard codes. The remaining codes
/// sit in the implementation-defined server range and carry application
/// faults that callers need to tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The payload was not well-formed JSON.
    ParseError,
    /// The payload was JSON but not a valid request envelope.
    InvalidRequest,
    /// The named method is not in the dispatch table.
    MethodNotFound,
    /// The handler rejected its parameters.
    InvalidParams,
    /// The handler failed for another reason.
    InternalError,
    /// A uniquely named resource already exists.
    Conflict,
    /// A named resource does not exist.
    NotFound,
    /// A downstream agent did not confirm the operation.
    UpstreamFailure,
    /// A downstream agent named in configuration is not registered.
    AgentNotRegistered,
}

impl ErrorCode {
    /// Returns the wire representation.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::Conflict => -32001,
            Self::NotFound => -32004,
            Self::UpstreamFailure => -32010,
            Self::AgentNotRegistered => -32011,
        }
    }

    /// Maps a wire code back to a known error code.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            -32700 => Some(Self::ParseError),
            -32600 => Some(Self::InvalidRequest),
            -32601 => Some(Self::MethodNotFound),
            -32602 => Some(Self::InvalidParams),
            -32603 => Some(Self::InternalError),
            -32001 => Some(Self::Conflict),
            -32004 => Some(Self::NotFound),
            -32010 => Some(Self::UpstreamFailure),
            -32011 => Some(Self::AgentNotRegistered),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
