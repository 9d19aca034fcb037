//! Postgres-backed store
//!
//! Definitions persist with the state, alphabet, and final-state sets as
//! comma-joined text columns (sorted set iteration keeps them canonical)
//! and the transition map as a JSONB column. History rows carry a
//! server-side timestamp and a bigserial id.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use statebench_common::RepositoryError;

use crate::domain::entities::{
    AutomatonDefinition, HistoryRecord, TestOutcome, TransitionMap,
};
use crate::domain::parser::parse_token_set;
use crate::repository::AutomataStore;

#[derive(Clone)]
pub struct PgAutomataStore {
    pool: PgPool,
}

impl PgAutomataStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn join_set(set: &std::collections::BTreeSet<String>) -> String {
        set.iter().cloned().collect::<Vec<_>>().join(",")
    }
}

#[async_trait]
impl AutomataStore for PgAutomataStore {
    async fn create_tables(&self) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS automatons (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                states TEXT NOT NULL,
                alphabet TEXT NOT NULL,
                initial_state TEXT NOT NULL,
                final_states TEXT NOT NULL,
                transitions JSONB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS test_history (
                id BIGSERIAL PRIMARY KEY,
                automaton_name TEXT NOT NULL,
                input_word TEXT NOT NULL,
                outcome TEXT NOT NULL,
                timestamp TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn load_definitions(&self) -> Result<Vec<AutomatonDefinition>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT name, states, alphabet, initial_state, final_states, transitions
            FROM automatons
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut definitions = Vec::with_capacity(rows.len());
        for row in rows {
            let transitions_value: serde_json::Value = row.try_get("transitions")?;
            let transitions: TransitionMap =
                serde_json::from_value(transitions_value).map_err(|e| {
                    RepositoryError::InvalidData(format!(
                        "failed to decode transitions column: {}",
                        e
                    ))
                })?;

            definitions.push(AutomatonDefinition {
                name: row.try_get("name")?,
                states: parse_token_set(row.try_get::<String, _>("states")?.as_str()),
                alphabet: parse_token_set(row.try_get::<String, _>("alphabet")?.as_str()),
                initial_state: row.try_get("initial_state")?,
                final_states: parse_token_set(row.try_get::<String, _>("final_states")?.as_str()),
                transitions,
            });
        }

        Ok(definitions)
    }

    async fn save_definition(
        &self,
        definition: &AutomatonDefinition,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO automatons (name, states, alphabet, initial_state, final_states, transitions)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&definition.name)
        .bind(Self::join_set(&definition.states))
        .bind(Self::join_set(&definition.alphabet))
        .bind(&definition.initial_state)
        .bind(Self::join_set(&definition.final_states))
        .bind(sqlx::types::Json(&definition.transitions))
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)?;

        Ok(())
    }

    async fn append_history(
        &self,
        automaton_name: &str,
        input_word: &str,
        outcome: TestOutcome,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO test_history (automaton_name, input_word, outcome)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(automaton_name)
        .bind(input_word)
        .bind(outcome.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn load_history(&self) -> Result<Vec<HistoryRecord>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, timestamp, automaton_name, input_word, outcome
            FROM test_history
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut history = Vec::with_capacity(rows.len());
        for row in rows {
            let label: String = row.try_get("outcome")?;
            let outcome = TestOutcome::parse(&label).ok_or_else(|| {
                RepositoryError::InvalidData(format!("unknown outcome label: '{}'", label))
            })?;

            history.push(HistoryRecord {
                id: row.try_get("id")?,
                timestamp: row.try_get("timestamp")?,
                automaton_name: row.try_get("automaton_name")?,
                input_word: row.try_get("input_word")?,
                outcome,
            });
        }

        Ok(history)
    }

    async fn clear_history(&self) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM test_history")
            .execute(&self.pool)
            .await?;

        // Restart the id sequence so a cleared history reads from 1 again.
        sqlx::query("ALTER SEQUENCE test_history_id_seq RESTART WITH 1")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
