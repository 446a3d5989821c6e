//! Unit tests for agent card domain types.

use crate::registry::domain::{
    AgentCard, AgentName, Endpoint, MethodDescriptor, ParamDescriptor, REGISTRY_AGENT,
    RegistryDomainError, seed_cards,
};
use rstest::rstest;
use serde_json::json;
use std::collections::HashSet;

// ── AgentName validation ───────────────────────────────────────────

#[rstest]
#[case("auth")]
#[case("log_router_agent")]
#[case("fake-auth-service")]
#[case("agent2")]
fn valid_agent_names_are_accepted(#[case] input: &str) {
    let name = AgentName::new(input).expect("valid name");
    assert_eq!(name.as_str(), input);
}

#[rstest]
fn agent_name_is_trimmed_and_lowercased() {
    let name = AgentName::new("  Auth_Agent ").expect("valid after normalisation");
    assert_eq!(name.as_str(), "auth_agent");
}

#[rstest]
#[case("")]
#[case("   ")]
fn empty_agent_name_is_rejected(#[case] input: &str) {
    assert!(matches!(
        AgentName::new(input),
        Err(RegistryDomainError::EmptyAgentName)
    ));
}

#[rstest]
#[case("auth agent")]
#[case("auth.agent")]
#[case("auth/agent")]
#[case("auth:agent")]
fn invalid_characters_in_agent_name_are_rejected(#[case] input: &str) {
    assert!(matches!(
        AgentName::new(input),
        Err(RegistryDomainError::InvalidAgentName(_))
    ));
}

#[rstest]
#[case(100, true)]
#[case(101, false)]
fn agent_name_length_boundary(#[case] length: usize, #[case] expected_ok: bool) {
    let result = AgentName::new("a".repeat(length));
    assert_eq!(result.is_ok(), expected_ok);
}

// ── MethodDescriptor ───────────────────────────────────────────────

#[rstest]
fn method_descriptor_accepts_bare_names() {
    let methods: Vec<MethodDescriptor> =
        serde_json::from_value(json!(["login", "logout"])).expect("bare names");

    assert_eq!(methods.len(), 2);
    let login = methods.first().expect("login");
    assert_eq!(login.name(), "login");
    assert!(login.params().is_empty());
}

#[rstest]
fn method_descriptor_accepts_detailed_objects() {
    let method: MethodDescriptor = serde_json::from_value(json!({
        "name": "login",
        "description": "Authenticates a user.",
        "params": [{"name": "username", "type": "string", "required": true}],
        "returns": [{"name": "success", "type": "boolean"}]
    }))
    .expect("detailed descriptor");

    assert_eq!(method.description(), "Authenticates a user.");
    let username = method.params().first().expect("username param");
    assert_eq!(username.kind(), "string");
    assert!(username.is_required());
    assert!(!method.returns().first().expect("success field").is_required());
}

#[rstest]
#[case(json!(""))]
#[case(json!({"name": "  "}))]
#[case(json!({"name": "login", "params": [{"name": "", "type": "string"}]}))]
fn method_descriptor_rejects_blank_names(#[case] raw: serde_json::Value) {
    assert!(serde_json::from_value::<MethodDescriptor>(raw).is_err());
}

#[rstest]
fn method_descriptor_serialises_without_empty_sections() {
    let method = MethodDescriptor::new("ping").expect("valid");
    assert_eq!(serde_json::to_value(&method).expect("json"), json!({"name": "ping"}));
}

// ── AgentCard ──────────────────────────────────────────────────────

#[rstest]
fn card_deserialises_minimal_registration() {
    let card: AgentCard =
        serde_json::from_value(json!({"name": "auth", "endpoint": "X", "methods": ["login"]}))
            .expect("minimal card");

    assert_eq!(card.name().as_str(), "auth");
    assert_eq!(card.endpoint().as_str(), "X");
    assert!(card.supports("login"));
    assert!(!card.supports("logout"));
    assert!(card.endpoint_external().is_none());
}

#[rstest]
#[case(json!({"endpoint": "X"}))]
#[case(json!({"name": "auth"}))]
#[case(json!({"name": "auth", "endpoint": "  "}))]
#[case(json!({"name": "Bad Name", "endpoint": "X"}))]
#[case(json!({"name": "auth", "endpoint": "X", "methods": ["login", "login"]}))]
fn card_rejects_invalid_registrations(#[case] raw: serde_json::Value) {
    assert!(serde_json::from_value::<AgentCard>(raw).is_err());
}

#[rstest]
fn card_constructor_rejects_duplicate_methods() {
    let name = AgentName::new("auth").expect("valid");
    let endpoint = Endpoint::new("http://auth:8000/a2a").expect("valid");
    let login = MethodDescriptor::new("login").expect("valid");

    let result = AgentCard::new(name, "", endpoint, vec![login.clone(), login]);

    assert!(matches!(
        result,
        Err(RegistryDomainError::DuplicateMethod { ref method, .. }) if method == "login"
    ));
}

#[rstest]
fn card_survives_serialisation() {
    let card = AgentCard::new(
        AgentName::new("auth").expect("valid"),
        "Auth agent",
        Endpoint::new("http://auth:8000/a2a").expect("valid"),
        vec![
            MethodDescriptor::new("login")
                .expect("valid")
                .with_params(vec![ParamDescriptor::new("username", "string").required()]),
        ],
    )
    .expect("valid card")
    .with_external_endpoint(Endpoint::new("http://localhost:8100/a2a").expect("valid"));

    let restored: AgentCard =
        serde_json::from_value(serde_json::to_value(&card).expect("json")).expect("card");

    assert_eq!(restored, card);
}

// ── Seed set ───────────────────────────────────────────────────────

#[rstest]
fn seed_set_is_valid_and_unique() {
    let cards = seed_cards().expect("seed cards are valid");
    let names: HashSet<&str> = cards.iter().map(|card| card.name().as_str()).collect();

    assert_eq!(names.len(), cards.len());
    for expected in [REGISTRY_AGENT, "log_router_agent", "log_sink_agent"] {
        assert!(names.contains(expected), "missing seed card {expected}");
    }
    assert!(cards.iter().all(|card| card.endpoint_external().is_some()));
}

#[rstest]
#[case("log_router_agent", "route_log")]
#[case("log_sink_agent", "insert_log")]
#[case("log_sink_agent", "insert_logs")]
#[case("log_ingest_agent", "publish_log")]
#[case(REGISTRY_AGENT, "get_agent")]
fn seed_cards_declare_pipeline_methods(#[case] agent: &str, #[case] method: &str) {
    let cards = seed_cards().expect("seed cards are valid");
    let card = cards
        .iter()
        .find(|card| card.name().as_str() == agent)
        .expect("seed card present");
    assert!(card.supports(method));
}
