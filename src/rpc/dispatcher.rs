//! Method dispatch shared by every agent.
//!
//! Each agent builds one [`Dispatcher`] at startup from an explicit set of
//! method bindings. The table is immutable once built; only the bindings
//! differ between agents.

use crate::rpc::domain::{ErrorCode, RpcError, RpcRequest, RpcResponse};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Result type returned by method handlers.
pub type HandlerResult = Result<Value, HandlerError>;

/// Failures a handler can report to the dispatcher.
#[derive(Debug, Clone, Error)]
pub enum HandlerError {
    /// The params did not satisfy the method's contract.
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// An expected, caller-facing failure with its own wire code.
    #[error("{message}")]
    Application {
        /// Wire code to report.
        code: ErrorCode,
        /// Caller-facing message.
        message: String,
    },

    /// Any other failure. The cause is logged and never sent to the caller.
    #[error("internal handler failure: {0}")]
    Internal(Arc<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    /// Creates a caller-facing application failure.
    #[must_use]
    pub fn application(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Application {
            code,
            message: message.into(),
        }
    }

    /// Wraps an internal failure.
    #[must_use]
    pub fn internal(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Internal(Arc::new(err))
    }
}

/// Handler bound to a method name.
#[async_trait]
pub trait MethodHandler: Send + Sync {
    /// Invokes the method with the request params.
    async fn call(&self, params: Value) -> HandlerResult;
}

/// Deserialises params into the method's typed contract.
///
/// # Errors
///
/// Returns [`HandlerError::InvalidParams`] when the params do not match `P`.
pub fn parse_params<P: DeserializeOwned>(params: Value) -> Result<P, HandlerError> {
    serde_json::from_value(params).map_err(|err| HandlerError::InvalidParams(err.to_string()))
}

/// Handler adapting an async function over typed params.
pub struct TypedHandler<P, F> {
    function: F,
    params: PhantomData<fn(P)>,
}

/// Wraps an async function over typed params as a [`MethodHandler`].
///
/// Params failing to deserialise into `P` are reported as
/// [`HandlerError::InvalidParams`] without calling `function`.
#[must_use]
pub fn typed<P, O, F, Fut>(function: F) -> Arc<dyn MethodHandler>
where
    P: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
    F: Fn(P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, HandlerError>> + Send + 'static,
{
    Arc::new(TypedHandler {
        function,
        params: PhantomData,
    })
}

#[async_trait]
impl<P, O, F, Fut> MethodHandler for TypedHandler<P, F>
where
    P: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
    F: Fn(P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, HandlerError>> + Send + 'static,
{
    async fn call(&self, params: Value) -> HandlerResult {
        let parsed = parse_params::<P>(params)?;
        let output = (self.function)(parsed).await?;
        serde_json::to_value(output).map_err(HandlerError::internal)
    }
}

/// Params for methods that take none.
#[derive(Debug, Clone, Copy, Default, serde::Deserialize)]
pub struct NoParams {}

/// Builder collecting method bindings before the table is frozen.
#[derive(Default)]
pub struct DispatcherBuilder {
    agent: String,
    handlers: BTreeMap<String, Arc<dyn MethodHandler>>,
}

impl DispatcherBuilder {
    /// Binds a handler to a method name, replacing any earlier binding.
    #[must_use]
    pub fn bind(mut self, method: impl Into<String>, handler: Arc<dyn MethodHandler>) -> Self {
        self.handlers.insert(method.into(), handler);
        self
    }

    /// Freezes the table.
    #[must_use]
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            agent: self.agent,
            handlers: self.handlers,
        }
    }
}

/// Immutable method table for one agent.
pub struct Dispatcher {
    agent: String,
    handlers: BTreeMap<String, Arc<dyn MethodHandler>>,
}

impl Dispatcher {
    /// Starts a builder for the named agent.
    #[must_use]
    pub fn builder(agent: impl Into<String>) -> DispatcherBuilder {
        DispatcherBuilder {
            agent: agent.into(),
            handlers: BTreeMap::new(),
        }
    }

    /// Returns the agent name used in log events.
    #[must_use]
    pub fn agent(&self) -> &str {
        &self.agent
    }

    /// Returns the bound method names in sorted order.
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Returns `true` when the method is bound.
    #[must_use]
    pub fn handles(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Dispatches a decoded request.
    ///
    /// Returns `None` for notifications; their failures are still logged.
    pub async fn dispatch(&self, request: RpcRequest) -> Option<RpcResponse> {
        let RpcRequest {
            method, params, id, ..
        } = request;

        let outcome = match self.handlers.get(&method) {
            None => {
                warn!(agent = %self.agent, %method, "method not found");
                Err(RpcError::method_not_found(&method))
            }
            Some(handler) => handler
                .call(params)
                .await
                .map_err(|err| self.to_rpc_error(&method, err)),
        };

        let Some(request_id) = id else {
            if let Err(err) = &outcome {
                debug!(agent = %self.agent, %method, code = err.code, "notification failed");
            }
            return None;
        };
        Some(RpcResponse::from_result(outcome, Some(request_id)))
    }

    fn to_rpc_error(&self, method: &str, err: HandlerError) -> RpcError {
        match err {
            HandlerError::InvalidParams(reason) => {
                warn!(agent = %self.agent, %method, %reason, "invalid params");
                RpcError::new(ErrorCode::InvalidParams, format!("Invalid params: {reason}"))
            }
            HandlerError::Application { code, message } => {
                warn!(agent = %self.agent, %method, %code, %message, "method failed");
                RpcError::new(code, message)
            }
            HandlerError::Internal(cause) => {
                error!(agent = %self.agent, %method, error = %cause, "handler failed");
                RpcError::new(ErrorCode::InternalError, "Internal error")
            }
        }
    }
}
