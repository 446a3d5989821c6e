//! Durable card store: registration, duplicates and ordering.

use super::helpers::{TestDatabase, test_runtime};
use a2a_mesh::registry::{
    adapters::postgres::PostgresCardStore,
    domain::{AgentCard, AgentName, Endpoint, MethodDescriptor},
    ports::{AgentCardRepository, RegistryStoreError},
};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use std::sync::Arc;

fn card(name: &str, endpoint: &str) -> AgentCard {
    AgentCard::new(
        AgentName::new(name).expect("valid name"),
        "",
        Endpoint::new(endpoint).expect("valid endpoint"),
        vec![MethodDescriptor::new("login").expect("method")],
    )
    .expect("valid card")
}

#[rstest]
fn registered_card_survives_a_fresh_pool(shared_test_cluster: &'static TestCluster) {
    let db = TestDatabase::create(shared_test_cluster, "cards_durable").expect("database");
    let rt = test_runtime();
    let auth = card("auth", "http://auth:8000/a2a");

    let first = PostgresCardStore::new(db.pool(1).expect("pool"));
    rt.block_on(first.register(&auth)).expect("register");
    drop(first);

    let reopened = PostgresCardStore::new(db.pool(1).expect("pool"));
    let found = rt
        .block_on(reopened.find_by_name(auth.name()))
        .expect("lookup");

    assert_eq!(found, Some(auth));
}

#[rstest]
fn missing_card_is_none(shared_test_cluster: &'static TestCluster) {
    let db = TestDatabase::create(shared_test_cluster, "cards_missing").expect("database");
    let store = PostgresCardStore::new(db.pool(1).expect("pool"));

    let found = test_runtime()
        .block_on(store.find_by_name(&AgentName::new("missing").expect("valid")))
        .expect("lookup");

    assert!(found.is_none());
}

#[rstest]
fn duplicate_name_is_rejected_and_original_kept(shared_test_cluster: &'static TestCluster) {
    let db = TestDatabase::create(shared_test_cluster, "cards_duplicate").expect("database");
    let store = PostgresCardStore::new(db.pool(1).expect("pool"));
    let rt = test_runtime();
    rt.block_on(store.register(&card("auth", "X"))).expect("first");

    let second = rt.block_on(store.register(&card("auth", "Y")));

    assert!(matches!(
        second,
        Err(RegistryStoreError::DuplicateName(ref name)) if name.as_str() == "auth"
    ));
    let kept = rt
        .block_on(store.find_by_name(&AgentName::new("auth").expect("valid")))
        .expect("lookup")
        .expect("present");
    assert_eq!(kept.endpoint().as_str(), "X");
}

#[rstest]
fn concurrent_registration_admits_exactly_one(shared_test_cluster: &'static TestCluster) {
    let db = TestDatabase::create(shared_test_cluster, "cards_race").expect("database");
    let store = Arc::new(PostgresCardStore::new(db.pool(4).expect("pool")));
    let rt = test_runtime();

    let outcomes = rt.block_on(async {
        let mut tasks = tokio::task::JoinSet::new();
        for n in 0..8 {
            let racer = Arc::clone(&store);
            tasks.spawn(async move { racer.register(&card("auth", &format!("http://auth-{n}"))).await });
        }
        let mut outcomes = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            outcomes.push(joined.expect("task completes"));
        }
        outcomes
    });

    let successes = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    let duplicates = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, Err(RegistryStoreError::DuplicateName(_))))
        .count();
    assert_eq!(successes, 1);
    assert_eq!(duplicates, 7);
    assert_eq!(rt.block_on(store.list()).expect("list").len(), 1);
}

#[rstest]
fn list_follows_registration_order(shared_test_cluster: &'static TestCluster) {
    let db = TestDatabase::create(shared_test_cluster, "cards_order").expect("database");
    let store = PostgresCardStore::new(db.pool(1).expect("pool"));
    let rt = test_runtime();
    for name in ["zeta", "alpha", "mid"] {
        rt.block_on(store.register(&card(name, "X"))).expect("register");
    }

    let names: Vec<String> = rt
        .block_on(store.list())
        .expect("list")
        .iter()
        .map(|listed| listed.name().to_string())
        .collect();

    assert_eq!(names, vec!["zeta", "alpha", "mid"]);
}
