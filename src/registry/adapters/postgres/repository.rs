//! `PostgreSQL` repository implementation for agent cards.

use super::{
    models::{AgentCardRow, NewAgentCardRow},
    schema::agent_cards,
};
use crate::postgres::PgPool;
use crate::registry::{
    domain::{AgentCard, AgentName},
    ports::{AgentCardRepository, RegistryStoreError, RegistryStoreResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed card store.
///
/// The unique index on `name` makes the duplicate check atomic across
/// processes.
#[derive(Debug, Clone)]
pub struct PostgresCardStore {
    pool: PgPool,
}

impl PostgresCardStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> RegistryStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> RegistryStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(RegistryStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(RegistryStoreError::persistence)?
    }
}

#[async_trait]
impl AgentCardRepository for PostgresCardStore {
    async fn register(&self, card: &AgentCard) -> RegistryStoreResult<()> {
        let name = card.name().clone();
        let new_row = NewAgentCardRow {
            name: name.as_str().to_owned(),
            card: serde_json::to_value(card).map_err(RegistryStoreError::persistence)?,
        };

        self.run_blocking(move |connection| {
            diesel::insert_into(agent_cards::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        RegistryStoreError::DuplicateName(name.clone())
                    }
                    _ => RegistryStoreError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_name(&self, name: &AgentName) -> RegistryStoreResult<Option<AgentCard>> {
        let name_str = name.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = agent_cards::table
                .filter(agent_cards::name.eq(&name_str))
                .select(AgentCardRow::as_select())
                .first::<AgentCardRow>(connection)
                .optional()
                .map_err(RegistryStoreError::persistence)?;
            row.map(row_to_card).transpose()
        })
        .await
    }

    async fn list(&self) -> RegistryStoreResult<Vec<AgentCard>> {
        self.run_blocking(move |connection| {
            let rows = agent_cards::table
                .order(agent_cards::seq.asc())
                .select(AgentCardRow::as_select())
                .load::<AgentCardRow>(connection)
                .map_err(RegistryStoreError::persistence)?;
            rows.into_iter().map(row_to_card).collect()
        })
        .await
    }
}

fn row_to_card(row: AgentCardRow) -> RegistryStoreResult<AgentCard> {
    let card: AgentCard =
        serde_json::from_value(row.card).map_err(RegistryStoreError::invalid_persisted_data)?;
    if card.name().as_str() != row.name {
        return Err(RegistryStoreError::invalid_persisted_data(
            std::io::Error::other(format!(
                "card stored under '{}' is named '{}'",
                row.name,
                card.name()
            )),
        ));
    }
    Ok(card)
}
