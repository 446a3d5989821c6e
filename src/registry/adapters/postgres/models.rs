//! Diesel row models for agent card persistence.

use super::schema::agent_cards;
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for agent cards.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = agent_cards)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AgentCardRow {
    /// Unique agent name.
    pub name: String,
    /// Card JSON payload.
    pub card: Value,
}

/// Insert model for agent cards.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = agent_cards)]
pub struct NewAgentCardRow {
    /// Unique agent name.
    pub name: String,
    /// Card JSON payload.
    pub card: Value,
}
