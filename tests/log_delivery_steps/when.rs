//! When steps for log delivery scenarios.

use super::world::{DeliveryWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;

#[when("the consumer polls once")]
fn consumer_polls_once(world: &mut DeliveryWorld) -> Result<(), eyre::Report> {
    let summary = run_async(world.fleet()?.consumer.poll_once()).wrap_err("poll")?;
    world.last_poll = Some(summary);
    Ok(())
}

#[when("the consumer polls {count:usize} times")]
fn consumer_polls_repeatedly(world: &mut DeliveryWorld, count: usize) -> Result<(), eyre::Report> {
    for _ in 0..count {
        let summary = run_async(world.fleet()?.consumer.poll_once()).wrap_err("poll")?;
        world.last_poll = Some(summary);
    }
    Ok(())
}
