//! Cards the registry is initialised with.

use super::{AgentCard, AgentName, Endpoint, MethodDescriptor, ParamDescriptor, RegistryDomainError};

/// Name the registry agent publishes itself under.
pub const REGISTRY_AGENT: &str = "a2a_registry";

/// Port every agent listens on inside the fleet network.
const INTERNAL_PORT: u16 = 8000;

fn card(
    name: &str,
    description: &str,
    external_port: u16,
    methods: Vec<MethodDescriptor>,
) -> Result<AgentCard, RegistryDomainError> {
    let endpoint = Endpoint::new(format!("http://{name}:{INTERNAL_PORT}/a2a"))?;
    let external = Endpoint::new(format!("http://localhost:{external_port}/a2a"))?;
    Ok(AgentCard::new(AgentName::new(name)?, description, endpoint, methods)?
        .with_external_endpoint(external))
}

fn method(
    name: &str,
    description: &str,
    params: Vec<ParamDescriptor>,
    returns: Vec<ParamDescriptor>,
) -> Result<MethodDescriptor, RegistryDomainError> {
    Ok(MethodDescriptor::new(name)?
        .with_description(description)
        .with_params(params)
        .with_returns(returns))
}

fn field(name: &str, kind: &str) -> ParamDescriptor {
    ParamDescriptor::new(name, kind)
}

/// Builds the seed set in registration order.
///
/// # Errors
///
/// Returns [`RegistryDomainError`] if a seed card fails validation.
pub fn seed_cards() -> Result<Vec<AgentCard>, RegistryDomainError> {
    let credentials = || {
        vec![
            field("username", "string").required(),
            field("password", "string").required(),
        ]
    };

    Ok(vec![
        card(
            "auth_agent",
            "Checks user credentials against the auth service.",
            8100,
            vec![method(
                "authenticate_user",
                "Validates a username and password pair.",
                credentials(),
                vec![field("authenticated", "boolean"), field("user_id", "string")],
            )?],
        )?,
        card(
            "webservice_agent",
            "Front door for browser logins.",
            8101,
            vec![method(
                "login",
                "Authenticates a user and returns the session outcome.",
                credentials(),
                vec![field("success", "boolean"), field("message", "string")],
            )?],
        )?,
        card(
            "dbservice_agent",
            "Looks up stored user records.",
            8102,
            vec![method(
                "filter_candidates",
                "Returns stored users matching a username.",
                vec![field("username", "string").required()],
                vec![field("candidates", "array")],
            )?],
        )?,
        card(
            "fake_auth_service",
            "Stand-in credential matcher used by the auth agent.",
            8103,
            vec![method(
                "verify_credentials",
                "Compares credentials with candidate records.",
                vec![
                    field("username", "string").required(),
                    field("password", "string").required(),
                    field("candidates", "array").required(),
                ],
                vec![field("valid", "boolean")],
            )?],
        )?,
        card(
            REGISTRY_AGENT,
            "Directory of agent cards.",
            8104,
            vec![
                method(
                    "get_agent",
                    "Returns the card registered under a name.",
                    vec![field("name", "string").required()],
                    vec![
                        field("name", "string"),
                        field("endpoint", "string"),
                        field("methods", "array"),
                    ],
                )?,
                method(
                    "list_agents",
                    "Returns every card in registration order.",
                    Vec::new(),
                    vec![field("agents", "array")],
                )?,
                method(
                    "get_method_details",
                    "Returns the descriptor of one method of one agent.",
                    vec![
                        field("agent_name", "string").required(),
                        field("method_name", "string").required(),
                    ],
                    vec![
                        field("name", "string"),
                        field("params", "array"),
                        field("returns", "array"),
                    ],
                )?,
                method(
                    "register_agent",
                    "Adds a new card. Existing names are rejected.",
                    vec![
                        field("name", "string").required(),
                        field("endpoint", "string").required(),
                        field("description", "string"),
                        field("endpoint_external", "string"),
                        field("methods", "array"),
                    ],
                    vec![field("status", "string"), field("name", "string")],
                )?,
            ],
        )?,
        card(
            "log_ingest_agent",
            "Publishes log records and drains the queue towards the router.",
            8107,
            vec![
                method(
                    "publish_log",
                    "Enqueues one log payload under a fresh record id.",
                    vec![
                        field("payload", "object").required(),
                        field("source", "string"),
                    ],
                    vec![field("record_id", "string")],
                )?,
                method(
                    "publish_logs",
                    "Enqueues several log payloads.",
                    vec![field("entries", "array").required()],
                    vec![field("published", "array")],
                )?,
                method(
                    "drain_once",
                    "Pulls one batch from the queue and delivers it.",
                    vec![field("max_messages", "integer")],
                    vec![
                        field("pulled", "integer"),
                        field("acked", "integer"),
                        field("failed", "integer"),
                        field("dropped", "integer"),
                    ],
                )?,
            ],
        )?,
        card(
            "log_router_agent",
            "Forwards log records to their sink.",
            8108,
            vec![method(
                "route_log",
                "Delivers one record and returns once the sink has stored it.",
                vec![field("record", "object").required()],
                vec![field("status", "string")],
            )?],
        )?,
        card(
            "log_sink_agent",
            "Stores log records in the warehouse, idempotently by record id.",
            8113,
            vec![
                method(
                    "insert_log",
                    "Stores one record. Repeats of a stored id succeed as duplicates.",
                    vec![field("record", "object").required()],
                    vec![field("status", "string")],
                )?,
                method(
                    "insert_logs",
                    "Stores a batch of records.",
                    vec![field("records", "array").required()],
                    vec![field("inserted", "integer"), field("duplicates", "integer")],
                )?,
            ],
        )?,
    ])
}
