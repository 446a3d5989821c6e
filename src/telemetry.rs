//! Structured logging setup.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor `--log-filter` is set.
pub const DEFAULT_FILTER: &str = "a2a_mesh=info";

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `filter` when set. Calling this more than once is
/// harmless; later calls leave the first subscriber in place.
pub fn init(filter: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if let Err(err) = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .try_init()
    {
        tracing::debug!(error = %err, "keeping the existing subscriber");
    }
}
