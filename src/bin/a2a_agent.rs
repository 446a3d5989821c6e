//! Runs one agent of the mesh.
//!
//! ```text
//! a2a-agent registry --bind 0.0.0.0:8000
//! a2a-agent ingest --registry-url http://a2a_registry:8000/a2a
//! ```

use a2a_mesh::{agent, config::Cli, telemetry};
use clap::Parser;
use std::process::ExitCode;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    telemetry::init(&cli.log_filter);

    match agent::run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "agent failed");
            ExitCode::FAILURE
        }
    }
}
