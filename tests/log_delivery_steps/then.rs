//! Then steps for log delivery scenarios.

use super::world::DeliveryWorld;
use a2a_mesh::pipeline::domain::{DeliveryState, RecordId};
use eyre::{WrapErr, eyre};
use rstest_bdd_macros::then;

fn record_id(raw: &str) -> Result<RecordId, eyre::Report> {
    RecordId::new(raw).wrap_err("record id in scenario")
}

#[then(r#"record "{id}" has {count:usize} stored rows"#)]
fn stored_rows(world: &DeliveryWorld, id: String, count: usize) -> Result<(), eyre::Report> {
    let rows = world.fleet()?.sink.rows_for(&record_id(&id)?)?;
    if rows != count {
        return Err(eyre!("expected {count} rows for {id}, found {rows}"));
    }
    Ok(())
}

#[then(r#"record "{id}" has {count:usize} acknowledgements"#)]
fn acknowledgements(world: &DeliveryWorld, id: String, count: usize) -> Result<(), eyre::Report> {
    let acks = world.fleet()?.queue.ack_count(&record_id(&id)?)?;
    if acks != count {
        return Err(eyre!("expected {count} acks for {id}, found {acks}"));
    }
    Ok(())
}

#[then(r#"record "{id}" is in state "{state}""#)]
fn record_state(world: &DeliveryWorld, id: String, state: String) -> Result<(), eyre::Report> {
    let expected = DeliveryState::try_from(state.as_str())
        .map_err(|err| eyre!("invalid expected state in scenario: {err}"))?;
    let actual = world.fleet()?.queue.state_of(&record_id(&id)?)?;
    if actual != Some(expected) {
        return Err(eyre!("expected {id} to be {expected}, found {actual:?}"));
    }
    Ok(())
}

#[then("the last poll left {count:usize} records for redelivery")]
fn left_for_redelivery(world: &DeliveryWorld, count: usize) -> Result<(), eyre::Report> {
    let summary = world
        .last_poll
        .ok_or_else(|| eyre!("missing poll summary"))?;
    if summary.failed != count {
        return Err(eyre!("expected {count} failed units, got {summary:?}"));
    }
    Ok(())
}

#[then("{count:usize} dropped records were reported")]
fn dropped_reported(world: &DeliveryWorld, count: usize) -> Result<(), eyre::Report> {
    let reports = world.fleet()?.dead_letters.reports();
    if reports.len() != count {
        return Err(eyre!("expected {count} dead-letter reports, found {}", reports.len()));
    }
    Ok(())
}
