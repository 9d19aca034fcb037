//! Storage for automaton definitions and test history
//!
//! The registry consumes storage exclusively through [`AutomataStore`];
//! backends are swappable behind the trait (Postgres for the application,
//! in-memory for tests and ephemeral sessions).

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgAutomataStore;

use async_trait::async_trait;
use statebench_common::RepositoryError;

use crate::domain::entities::{AutomatonDefinition, HistoryRecord, TestOutcome};

/// Persistence contract consumed by the registry.
#[async_trait]
pub trait AutomataStore: Send + Sync {
    /// Idempotent schema bootstrap; called once at registry startup.
    async fn create_tables(&self) -> Result<(), RepositoryError>;

    /// All stored definitions, in no particular order.
    async fn load_definitions(&self) -> Result<Vec<AutomatonDefinition>, RepositoryError>;

    /// Persist one definition. The backend enforces name uniqueness even
    /// when the caller has already checked; `AlreadyExists` on conflict.
    async fn save_definition(&self, definition: &AutomatonDefinition)
        -> Result<(), RepositoryError>;

    /// Append one test result to the history.
    async fn append_history(
        &self,
        automaton_name: &str,
        input_word: &str,
        outcome: TestOutcome,
    ) -> Result<(), RepositoryError>;

    /// Full history, newest first.
    async fn load_history(&self) -> Result<Vec<HistoryRecord>, RepositoryError>;

    /// Delete every history record.
    async fn clear_history(&self) -> Result<(), RepositoryError>;
}
