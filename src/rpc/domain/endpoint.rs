//! Network location of an agent's RPC endpoint.

use super::RpcDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Address an agent's `/a2a` endpoint is reachable at.
///
/// Only emptiness is checked. Reachability is discovered at call time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Endpoint(String);

impl Endpoint {
    /// Creates an endpoint from its address.
    ///
    /// # Errors
    ///
    /// Returns [`RpcDomainError::EmptyEndpoint`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, RpcDomainError> {
        let trimmed = value.into().trim().to_owned();
        if trimmed.is_empty() {
            return Err(RpcDomainError::EmptyEndpoint);
        }
        Ok(Self(trimmed))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Endpoint {
    type Error = RpcDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Endpoint> for String {
    fn from(value: Endpoint) -> Self {
        value.0
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
