//! Domain entities for the automata domain
//!
//! An automaton definition is a value object: created once from parsed
//! input, validated by DFA construction, and never mutated afterwards.
//! Redefinition under an existing name is a duplicate, not an update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Transition function as a nested map: source state -> symbol -> destination.
///
/// Keying by state and symbol makes "at most one destination per pair"
/// unrepresentable as a violation once a definition exists; duplicate
/// rules are only expressible in raw text, where the parser rejects them.
pub type TransitionMap = BTreeMap<String, BTreeMap<String, String>>;

/// Structural definition of a deterministic finite automaton.
///
/// Cross-field validity (declared states, declared symbols) is owned by
/// [`crate::domain::dfa::Dfa`] construction, not by this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatonDefinition {
    pub name: String,
    pub states: BTreeSet<String>,
    pub alphabet: BTreeSet<String>,
    pub initial_state: String,
    pub final_states: BTreeSet<String>,
    pub transitions: TransitionMap,
}

impl AutomatonDefinition {
    /// Number of individual transition rules in the definition.
    pub fn transition_count(&self) -> usize {
        self.transitions.values().map(|row| row.len()).sum()
    }
}

/// Verdict label persisted with each history record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestOutcome {
    Accepted,
    Rejected,
}

impl TestOutcome {
    pub fn from_accepted(accepted: bool) -> Self {
        if accepted {
            TestOutcome::Accepted
        } else {
            TestOutcome::Rejected
        }
    }

    /// Fixed tag stored in the history table.
    pub fn as_str(&self) -> &'static str {
        match self {
            TestOutcome::Accepted => "Accepted",
            TestOutcome::Rejected => "Rejected",
        }
    }

    /// Decode a stored tag; anything but the two fixed labels is invalid.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "Accepted" => Some(TestOutcome::Accepted),
            "Rejected" => Some(TestOutcome::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of one simulation pass over an input word.
///
/// `path` always starts with the initial state and gains one entry per
/// consumed symbol; a rejected run may stop short.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub accepted: bool,
    pub path: Vec<String>,
}

/// One completed test, as returned by the registry.
///
/// `history_recorded` is false when the verdict was computed but the
/// history append failed; the verdict itself is still authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRun {
    pub automaton_name: String,
    pub input_word: String,
    pub accepted: bool,
    pub path: Vec<String>,
    pub history_recorded: bool,
}

/// Persisted record of one test run, newest first on retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub automaton_name: String,
    pub input_word: String,
    pub outcome: TestOutcome,
}
