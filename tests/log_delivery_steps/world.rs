//! Shared world state for log delivery scenarios.

use crate::test_helpers::fleet::Fleet;
use a2a_mesh::pipeline::services::PollSummary;
use rstest::fixture;

/// Scenario world for log delivery behaviour tests.
#[derive(Default)]
pub struct DeliveryWorld {
    pub fleet: Option<Fleet>,
    pub last_poll: Option<PollSummary>,
}

impl DeliveryWorld {
    /// Returns the running fleet.
    ///
    /// # Errors
    ///
    /// Returns an error when no mesh was started in the scenario.
    pub fn fleet(&self) -> Result<&Fleet, eyre::Report> {
        self.fleet
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing mesh in scenario world"))
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> DeliveryWorld {
    DeliveryWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
