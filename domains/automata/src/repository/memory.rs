//! In-Memory Store Implementation
//!
//! Backs the registry in tests and ephemeral sessions. Mirrors the
//! Postgres store's observable behavior: name uniqueness, monotonically
//! increasing record ids, newest-first history.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use statebench_common::RepositoryError;

use crate::domain::entities::{AutomatonDefinition, HistoryRecord, TestOutcome};
use crate::repository::AutomataStore;

#[derive(Debug, Default)]
struct Inner {
    definitions: BTreeMap<String, AutomatonDefinition>,
    history: Vec<HistoryRecord>,
    next_id: i64,
}

/// In-memory store for testing and development
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_history_appends: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `append_history` calls fail, so tests can exercise
    /// the registry's verdict-survives-history-failure policy.
    pub fn set_fail_history_appends(&self, fail: bool) {
        self.fail_history_appends.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock means a panic mid-test; propagating the panic
        // is the right outcome there.
        self.inner.lock().expect("memory store lock poisoned")
    }
}

#[async_trait]
impl AutomataStore for MemoryStore {
    async fn create_tables(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn load_definitions(&self) -> Result<Vec<AutomatonDefinition>, RepositoryError> {
        Ok(self.lock().definitions.values().cloned().collect())
    }

    async fn save_definition(
        &self,
        definition: &AutomatonDefinition,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.lock();
        if inner.definitions.contains_key(&definition.name) {
            return Err(RepositoryError::AlreadyExists);
        }
        inner
            .definitions
            .insert(definition.name.clone(), definition.clone());
        Ok(())
    }

    async fn append_history(
        &self,
        automaton_name: &str,
        input_word: &str,
        outcome: TestOutcome,
    ) -> Result<(), RepositoryError> {
        if self.fail_history_appends.load(Ordering::SeqCst) {
            return Err(RepositoryError::InvalidData(
                "history appends disabled".to_string(),
            ));
        }
        let mut inner = self.lock();
        inner.next_id += 1;
        let record = HistoryRecord {
            id: inner.next_id,
            timestamp: Utc::now(),
            automaton_name: automaton_name.to_string(),
            input_word: input_word.to_string(),
            outcome,
        };
        inner.history.push(record);
        Ok(())
    }

    async fn load_history(&self) -> Result<Vec<HistoryRecord>, RepositoryError> {
        // Appends are id-ordered, so newest-first is the reverse.
        let mut history = self.lock().history.clone();
        history.reverse();
        Ok(history)
    }

    async fn clear_history(&self) -> Result<(), RepositoryError> {
        let mut inner = self.lock();
        inner.history.clear();
        inner.next_id = 0;
        Ok(())
    }
}
