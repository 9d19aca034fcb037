//! Automaton registry: the orchestration layer
//!
//! Bridges raw definitions in storage and ready-to-run [`Dfa`] engines,
//! and coordinates the define -> validate -> persist and run -> record
//! workflows. The store is the source of truth; the registry's two maps
//! are a read-through projection of it, rebuilt wholesale after every
//! successful write.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use statebench_common::RepositoryError;

use crate::domain::dfa::{Dfa, ValidationError};
use crate::domain::entities::{AutomatonDefinition, HistoryRecord, TestOutcome, TestRun};
use crate::domain::parser::{self, DefinitionFields, ParseError};
use crate::repository::AutomataStore;

/// Failures surfaced by registry operations.
///
/// Parse, validation, and storage failures keep their own types so
/// callers can match on the failure class instead of inspecting strings.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("automaton name must not be empty")]
    EmptyName,

    #[error("an automaton named '{0}' already exists")]
    DuplicateName(String),

    #[error("no automaton named '{0}' is defined")]
    UnknownAutomaton(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Named automaton definitions plus lazily-built, memoized engines.
///
/// Mutating operations take `&mut self`; one registry instance is not
/// meant to be shared without external serialization (a single
/// `tokio::sync::Mutex` around the registry is sufficient). Constructed
/// [`Dfa`] values themselves are immutable and freely shareable.
pub struct AutomatonRegistry {
    store: Arc<dyn AutomataStore>,
    definitions: HashMap<String, AutomatonDefinition>,
    engines: HashMap<String, Dfa>,
}

impl AutomatonRegistry {
    /// Bootstrap the schema and populate the registry from storage.
    pub async fn load(store: Arc<dyn AutomataStore>) -> Result<Self, RegistryError> {
        store.create_tables().await?;
        let mut registry = Self {
            store,
            definitions: HashMap::new(),
            engines: HashMap::new(),
        };
        registry.reload().await?;
        Ok(registry)
    }

    /// Rebuild both maps from storage, dropping every cached engine.
    pub async fn reload(&mut self) -> Result<(), RegistryError> {
        let definitions = self.store.load_definitions().await?;
        self.definitions = definitions
            .into_iter()
            .map(|definition| (definition.name.clone(), definition))
            .collect();
        self.engines.clear();
        info!(count = self.definitions.len(), "loaded automaton definitions");
        Ok(())
    }

    /// All known automaton names, sorted lexicographically.
    pub fn list_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.definitions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Look up a stored definition by name.
    pub fn definition(&self, name: &str) -> Option<&AutomatonDefinition> {
        self.definitions.get(name)
    }

    /// Parse, validate, and persist a new automaton from raw field values.
    ///
    /// On any failure nothing is persisted and both maps stay untouched;
    /// on success the registry reloads from storage so the caches remain
    /// a projection of it.
    pub async fn create_from_fields(
        &mut self,
        fields: &DefinitionFields,
    ) -> Result<(), RegistryError> {
        let name = fields.name.trim();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.definitions.contains_key(name) {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }

        let definition = parser::parse_fields(fields)?;
        // Construction is the validation step; the instance is discarded
        // and rebuilt lazily on first run.
        Dfa::new(&definition)?;

        self.store.save_definition(&definition).await?;
        self.reload().await?;
        info!(name, "automaton validated and saved");
        Ok(())
    }

    /// Parse an import file and persist the automaton it defines.
    /// Returns the automaton's name on success.
    pub async fn create_from_file(&mut self, content: &str) -> Result<String, RegistryError> {
        let fields = parser::parse_file(content)?;
        let name = fields.name.trim().to_string();
        self.create_from_fields(&fields).await?;
        Ok(name)
    }

    fn engine(&mut self, name: &str) -> Result<&Dfa, RegistryError> {
        match self.engines.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(slot) => {
                let definition = self
                    .definitions
                    .get(name)
                    .ok_or_else(|| RegistryError::UnknownAutomaton(name.to_string()))?;
                let engine = Dfa::new(definition)?;
                Ok(slot.insert(engine))
            }
        }
    }

    /// Run one word against a named automaton and record the outcome.
    ///
    /// A failed history append does not discard the computed verdict: the
    /// failure is logged and reported through `TestRun::history_recorded`.
    pub async fn run_test(&mut self, name: &str, word: &str) -> Result<TestRun, RegistryError> {
        let result = self.engine(name)?.run(word);
        let outcome = TestOutcome::from_accepted(result.accepted);

        let history_recorded = match self.store.append_history(name, word, outcome).await {
            Ok(()) => true,
            Err(err) => {
                warn!(automaton = name, error = %err, "failed to record test history");
                false
            }
        };

        Ok(TestRun {
            automaton_name: name.to_string(),
            input_word: word.to_string(),
            accepted: result.accepted,
            path: result.path,
            history_recorded,
        })
    }

    /// Full test history, newest first.
    pub async fn history(&self) -> Result<Vec<HistoryRecord>, RegistryError> {
        Ok(self.store.load_history().await?)
    }

    /// Delete all test history records.
    pub async fn clear_history(&self) -> Result<(), RegistryError> {
        self.store.clear_history().await?;
        info!("test history cleared");
        Ok(())
    }
}
