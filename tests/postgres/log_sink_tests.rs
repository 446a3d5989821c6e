//! Durable warehouse: inserts are idempotent by record id.

use super::helpers::{TestDatabase, record, test_runtime};
use a2a_mesh::pipeline::{
    adapters::postgres::PostgresLogSink,
    ports::{BatchOutcome, InsertOutcome, LogSink},
};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;

#[rstest]
fn second_insert_is_a_duplicate(shared_test_cluster: &'static TestCluster) {
    let db = TestDatabase::create(shared_test_cluster, "sink_dup").expect("database");
    let sink = PostgresLogSink::new(db.pool(1).expect("pool"));
    let rt = test_runtime();
    let r1 = record("r1");

    let first = rt.block_on(sink.insert(&r1)).expect("first insert");
    let second = rt.block_on(sink.insert(&r1)).expect("second insert");

    assert_eq!(first, InsertOutcome::Inserted);
    assert_eq!(second, InsertOutcome::Duplicate);
    assert_eq!(db.count_rows("log_records", r1.record_id()).expect("count"), 1);
}

#[rstest]
fn batch_counts_repeats_as_duplicates(shared_test_cluster: &'static TestCluster) {
    let db = TestDatabase::create(shared_test_cluster, "sink_batch").expect("database");
    let sink = PostgresLogSink::new(db.pool(1).expect("pool"));
    let rt = test_runtime();
    rt.block_on(sink.insert(&record("r1"))).expect("seed row");

    let outcome = rt
        .block_on(sink.insert_batch(&[record("r1"), record("r2"), record("r2"), record("r3")]))
        .expect("batch");

    assert_eq!(
        outcome,
        BatchOutcome {
            inserted: 2,
            duplicates: 2,
        }
    );
    assert_eq!(db.count_rows("log_records", record("r2").record_id()).expect("count"), 1);
}
