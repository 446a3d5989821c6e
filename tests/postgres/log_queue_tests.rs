//! Durable queue: leasing, acknowledgement and redelivery.

use super::helpers::{TestDatabase, record, test_runtime};
use a2a_mesh::pipeline::{
    adapters::postgres::PostgresLogQueue,
    domain::{Delivery, RedeliveryPolicy},
    ports::{LogQueue, QueueError},
};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn ids(deliveries: &[Delivery]) -> Vec<String> {
    deliveries
        .iter()
        .map(|delivery| delivery.record.record_id().to_string())
        .collect()
}

#[rstest]
fn pull_leases_in_publish_order(shared_test_cluster: &'static TestCluster) {
    let db = TestDatabase::create(shared_test_cluster, "queue_order").expect("database");
    let queue = PostgresLogQueue::new(db.pool(1).expect("pool"), RedeliveryPolicy::default());
    let rt = test_runtime();
    for id in ["r1", "r2", "r3"] {
        rt.block_on(queue.publish(&record(id))).expect("publish");
    }

    let leased = rt.block_on(queue.pull(2)).expect("pull");
    assert_eq!(ids(&leased), vec!["r1", "r2"]);
    assert!(leased.iter().all(|delivery| delivery.attempt == 1));

    let rest = rt.block_on(queue.pull(10)).expect("pull");
    assert_eq!(ids(&rest), vec!["r3"]);
    assert!(rt.block_on(queue.pull(10)).expect("pull").is_empty());
}

#[rstest]
fn ack_removes_the_record_and_cannot_repeat(shared_test_cluster: &'static TestCluster) {
    let db = TestDatabase::create(shared_test_cluster, "queue_ack").expect("database");
    let queue = PostgresLogQueue::new(db.pool(1).expect("pool"), RedeliveryPolicy::immediate(5));
    let rt = test_runtime();
    let r1 = record("r1");
    rt.block_on(queue.publish(&r1)).expect("publish");
    let delivery = rt
        .block_on(queue.pull(1))
        .expect("pull")
        .into_iter()
        .next()
        .expect("one delivery");

    rt.block_on(queue.ack(&delivery.ack_id)).expect("ack");
    let again = rt.block_on(queue.ack(&delivery.ack_id));

    assert!(matches!(again, Err(QueueError::StaleAck(_))));
    assert!(rt.block_on(queue.pull(10)).expect("pull").is_empty());
    assert_eq!(db.count_rows("log_queue", r1.record_id()).expect("count"), 0);
}

#[rstest]
fn superseded_lease_cannot_ack(shared_test_cluster: &'static TestCluster) {
    let db = TestDatabase::create(shared_test_cluster, "queue_stale").expect("database");
    let queue = PostgresLogQueue::new(db.pool(1).expect("pool"), RedeliveryPolicy::immediate(5));
    let rt = test_runtime();
    rt.block_on(queue.publish(&record("r1"))).expect("publish");

    let first = rt.block_on(queue.pull(1)).expect("pull").into_iter().next().expect("first");
    let second = rt.block_on(queue.pull(1)).expect("pull").into_iter().next().expect("second");

    assert_eq!(second.attempt, 2);
    assert_ne!(first.ack_id, second.ack_id);
    assert!(matches!(
        rt.block_on(queue.ack(&first.ack_id)),
        Err(QueueError::StaleAck(_))
    ));
    rt.block_on(queue.ack(&second.ack_id)).expect("current lease acks");
}

#[rstest]
fn unacknowledged_record_returns_after_visibility_expires(
    shared_test_cluster: &'static TestCluster,
) {
    let db = TestDatabase::create(shared_test_cluster, "queue_visibility").expect("database");
    let policy = RedeliveryPolicy::new(5, Duration::from_millis(300), Duration::from_secs(5));
    let queue = PostgresLogQueue::new(db.pool(1).expect("pool"), policy);
    let rt = test_runtime();
    rt.block_on(queue.publish(&record("r1"))).expect("publish");

    assert_eq!(rt.block_on(queue.pull(1)).expect("pull").len(), 1);
    assert!(rt.block_on(queue.pull(1)).expect("pull").is_empty());

    std::thread::sleep(Duration::from_millis(600));
    let redelivered = rt.block_on(queue.pull(1)).expect("pull");

    assert_eq!(ids(&redelivered), vec!["r1"]);
    assert_eq!(redelivered.first().map(|delivery| delivery.attempt), Some(2));
}

#[rstest]
fn dead_lettered_record_is_gone(shared_test_cluster: &'static TestCluster) {
    let db = TestDatabase::create(shared_test_cluster, "queue_dead").expect("database");
    let queue = PostgresLogQueue::new(db.pool(1).expect("pool"), RedeliveryPolicy::immediate(1));
    let rt = test_runtime();
    rt.block_on(queue.publish(&record("r1"))).expect("publish");
    let delivery = rt.block_on(queue.pull(1)).expect("pull").into_iter().next().expect("one");

    rt.block_on(queue.dead_letter(&delivery.ack_id)).expect("dead letter");

    assert!(rt.block_on(queue.pull(10)).expect("pull").is_empty());
}

#[rstest]
fn republishing_a_record_id_is_rejected(shared_test_cluster: &'static TestCluster) {
    let db = TestDatabase::create(shared_test_cluster, "queue_dup").expect("database");
    let queue = PostgresLogQueue::new(db.pool(1).expect("pool"), RedeliveryPolicy::default());
    let rt = test_runtime();
    rt.block_on(queue.publish(&record("r1"))).expect("first");

    let second = rt.block_on(queue.publish(&record("r1")));

    assert!(matches!(
        second,
        Err(QueueError::DuplicateRecord(ref id)) if id.as_str() == "r1"
    ));
}

#[rstest]
fn concurrent_pulls_never_share_a_record(shared_test_cluster: &'static TestCluster) {
    let db = TestDatabase::create(shared_test_cluster, "queue_skip_locked").expect("database");
    let queue = Arc::new(PostgresLogQueue::new(
        db.pool(4).expect("pool"),
        RedeliveryPolicy::default(),
    ));
    let rt = test_runtime();
    for index in 0..20 {
        rt.block_on(queue.publish(&record(&format!("r{index}"))))
            .expect("publish");
    }

    let leased = rt.block_on(async {
        let mut pulls = tokio::task::JoinSet::new();
        for _ in 0..4 {
            let consumer = Arc::clone(&queue);
            pulls.spawn(async move { consumer.pull(10).await });
        }
        let mut leased = Vec::new();
        while let Some(joined) = pulls.join_next().await {
            leased.extend(ids(&joined.expect("task").expect("pull")));
        }
        leased
    });

    let unique: HashSet<&String> = leased.iter().collect();
    assert_eq!(leased.len(), 20);
    assert_eq!(unique.len(), 20);
}
