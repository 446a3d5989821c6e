//! HTTP server adapter exposing a dispatcher at `POST /a2a`.
//!
//! Every agent also answers `GET /health` with a shallow liveness check that
//! never consults the registry or the pipeline.

use crate::rpc::{codec, dispatcher::Dispatcher};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Path every agent serves remote calls on.
pub const RPC_PATH: &str = "/a2a";

/// Path of the liveness check.
pub const HEALTH_PATH: &str = "/health";

#[derive(Clone)]
struct AgentState {
    dispatcher: Arc<Dispatcher>,
}

/// Builds the HTTP router for an agent.
#[must_use]
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route(RPC_PATH, post(handle_rpc))
        .route(HEALTH_PATH, get(handle_health))
        .with_state(AgentState { dispatcher })
}

/// Serves an agent until `shutdown` resolves.
///
/// # Errors
///
/// Returns the I/O error that stopped the server.
pub async fn serve(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let agent = dispatcher.agent().to_owned();
    let address = listener.local_addr()?;
    info!(%agent, %address, "agent listening");
    axum::serve(listener, router(dispatcher))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!(%agent, "agent stopped");
    Ok(())
}

async fn handle_rpc(State(state): State<AgentState>, body: Bytes) -> Response {
    let request = match codec::decode(&body) {
        Ok(request) => request,
        Err(err) => {
            warn!(agent = %state.dispatcher.agent(), error = %err, "rejected envelope");
            return json_bytes(StatusCode::BAD_REQUEST, codec::encode(&err.to_response()));
        }
    };

    state.dispatcher.dispatch(request).await.map_or_else(
        || StatusCode::NO_CONTENT.into_response(),
        |response| json_bytes(StatusCode::OK, codec::encode(&response)),
    )
}

async fn handle_health(State(state): State<AgentState>) -> Json<Value> {
    Json(json!({ "status": "ok", "service": state.dispatcher.agent() }))
}

fn json_bytes(status: StatusCode, body: Vec<u8>) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}
