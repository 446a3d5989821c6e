//! Given steps for log delivery scenarios.

use super::world::{DeliveryWorld, run_async};
use crate::test_helpers::fleet::Fleet;
use a2a_mesh::pipeline::{
    domain::{LogRecord, RecordId, RedeliveryPolicy},
    ports::LogQueue,
};
use chrono::Utc;
use eyre::WrapErr;
use rstest_bdd_macros::given;
use serde_json::{Map, json};

#[given("a mesh allowing {max:u32} deliveries")]
fn mesh_allowing(world: &mut DeliveryWorld, max: u32) -> Result<(), eyre::Report> {
    let fleet = run_async(Fleet::start(RedeliveryPolicy::immediate(max)))?;
    world.fleet = Some(fleet);
    Ok(())
}

#[given("the sink fails the next {count:usize} inserts")]
fn sink_fails(world: &mut DeliveryWorld, count: usize) -> Result<(), eyre::Report> {
    world
        .fleet()?
        .sink
        .fail_next(count)
        .wrap_err("inject sink failures")
}

#[given(r#"record "{id}" is published"#)]
fn record_published(world: &mut DeliveryWorld, id: String) -> Result<(), eyre::Report> {
    let mut payload = Map::new();
    payload.insert("msg".to_owned(), json!(format!("scenario record {id}")));
    let record = LogRecord::new(
        RecordId::new(id).wrap_err("record id")?,
        payload,
        "scenario",
        Utc::now(),
    );
    run_async(world.fleet()?.queue.publish(&record)).wrap_err("publish record")
}

#[given(r#"the "{agent}" agent is unreachable"#)]
fn agent_unreachable(world: &mut DeliveryWorld, agent: String) -> Result<(), eyre::Report> {
    let fleet = world.fleet()?;
    let endpoint = run_async(fleet.endpoint(&agent))?;
    fleet
        .transport
        .set_unreachable(&endpoint, true)
        .wrap_err("mark agent unreachable")
}
