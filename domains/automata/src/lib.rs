//! Automata domain: DFA definitions, execution engine, registry, test history

pub mod domain;
pub mod repository;
pub mod service;

// Re-export domain types at the crate root for convenience
pub use domain::dfa::{Dfa, ValidationError};
pub use domain::entities::{
    AutomatonDefinition, HistoryRecord, RunResult, TestOutcome, TestRun, TransitionMap,
};
pub use domain::parser::{DefinitionFields, ParseError};

// Re-export repository types
pub use repository::{AutomataStore, MemoryStore, PgAutomataStore};

// Re-export the registry
pub use service::{AutomatonRegistry, RegistryError};
