//! Postgres store round-trip tests
//!
//! These run only when `TEST_DATABASE_URL` (or `DATABASE_URL`) points at a
//! reachable PostgreSQL instance; otherwise each test skips cleanly so the
//! suite stays green on machines without a database.

use std::sync::Arc;

use serial_test::serial;
use sqlx::PgPool;

use statebench_automata::domain::parser::parse_fields;
use statebench_automata::{
    AutomataStore, AutomatonRegistry, DefinitionFields, PgAutomataStore, TestOutcome,
};
use statebench_common::RepositoryError;

async fn test_pool() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let url = std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()?;
    match PgPool::connect(&url).await {
        Ok(pool) => Some(pool),
        Err(err) => {
            eprintln!("skipping postgres test, connection failed: {err}");
            None
        }
    }
}

async fn test_store(pool: &PgPool) -> PgAutomataStore {
    let store = PgAutomataStore::new(pool.clone());
    store
        .create_tables()
        .await
        .expect("schema bootstrap succeeds");
    store
}

/// The store has no delete operation by design; tests clean up their
/// fixtures directly.
async fn remove_definition(pool: &PgPool, name: &str) {
    sqlx::query("DELETE FROM automatons WHERE name = $1")
        .bind(name)
        .execute(pool)
        .await
        .expect("cleanup succeeds");
}

fn fixture(name: &str) -> DefinitionFields {
    DefinitionFields {
        name: name.to_string(),
        states: "q0,q1".to_string(),
        alphabet: "0,1".to_string(),
        initial: "q0".to_string(),
        finals: "q1".to_string(),
        transitions: "q0,0->q1\nq0,1->q0\nq1,0->q1\nq1,1->q0".to_string(),
    }
}

#[tokio::test]
#[serial]
async fn definition_round_trips_through_postgres() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = Arc::new(test_store(&pool).await);
    let name = "it-pg-round-trip";
    remove_definition(&pool, name).await;

    let mut registry = AutomatonRegistry::load(store.clone())
        .await
        .expect("registry should load");
    registry
        .create_from_fields(&fixture(name))
        .await
        .expect("create succeeds");

    // A fresh registry over the same database sees the same definition.
    let mut fresh = AutomatonRegistry::load(store)
        .await
        .expect("registry should load");
    assert!(fresh.list_names().contains(&name.to_string()));
    let definition = fresh.definition(name).expect("definition present").clone();
    assert_eq!(definition.initial_state, "q0");
    assert_eq!(definition.transition_count(), 4);
    assert_eq!(
        definition.states,
        ["q0", "q1"].iter().map(|s| s.to_string()).collect()
    );

    let run = fresh.run_test(name, "0").await.expect("run succeeds");
    assert!(run.accepted);
    assert!(run.history_recorded);

    remove_definition(&pool, name).await;
}

#[tokio::test]
#[serial]
async fn duplicate_insert_surfaces_already_exists() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = test_store(&pool).await;
    let name = "it-pg-duplicate";
    remove_definition(&pool, name).await;

    let definition = parse_fields(&fixture(name)).expect("fixture parses");
    store
        .save_definition(&definition)
        .await
        .expect("first save succeeds");
    let err = store.save_definition(&definition).await.unwrap_err();
    assert!(matches!(err, RepositoryError::AlreadyExists));

    remove_definition(&pool, name).await;
}

#[tokio::test]
#[serial]
async fn history_appends_load_newest_first_and_clear() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = test_store(&pool).await;

    store.clear_history().await.expect("clear succeeds");
    store
        .append_history("it-pg-history", "01", TestOutcome::Rejected)
        .await
        .expect("append succeeds");
    store
        .append_history("it-pg-history", "0", TestOutcome::Accepted)
        .await
        .expect("append succeeds");

    let history = store.load_history().await.expect("load succeeds");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].input_word, "0");
    assert_eq!(history[0].outcome, TestOutcome::Accepted);
    assert_eq!(history[1].input_word, "01");
    assert!(history[0].id > history[1].id);

    store.clear_history().await.expect("clear succeeds");
    assert!(store.load_history().await.expect("load succeeds").is_empty());
}
