//! End-to-end registry workflow tests over the in-memory store
//!
//! These exercise the full define -> validate -> persist -> run -> record
//! loop the way the CLI drives it, without touching a database.

use std::sync::Arc;

use statebench_automata::{
    AutomataStore, AutomatonRegistry, DefinitionFields, MemoryStore, ParseError, RegistryError,
    TestOutcome,
};

fn ends_in_zero(name: &str) -> DefinitionFields {
    DefinitionFields {
        name: name.to_string(),
        states: "q0,q1".to_string(),
        alphabet: "0,1".to_string(),
        initial: "q0".to_string(),
        finals: "q1".to_string(),
        transitions: "q0,0->q1\nq0,1->q0\nq1,0->q1\nq1,1->q0".to_string(),
    }
}

const IMPORT_FILE: &str = "\
nome: contem-um
alfabeto: 0, 1
estados: q0, q1
inicial: q0
finais: q1
transicoes:
q0, 0 -> q0
q0, 1 -> q1
q1, 0 -> q1
q1, 1 -> q1
";

#[test_log::test(tokio::test)]
async fn define_run_and_audit_workflow() {
    let store = Arc::new(MemoryStore::new());
    let mut registry = AutomatonRegistry::load(store)
        .await
        .expect("registry should load");

    // Define by fields and by file import.
    registry
        .create_from_fields(&ends_in_zero("ends-in-zero"))
        .await
        .expect("field create succeeds");
    let imported = registry
        .create_from_file(IMPORT_FILE)
        .await
        .expect("file import succeeds");
    assert_eq!(imported, "contem-um");
    assert_eq!(
        registry.list_names(),
        vec!["contem-um".to_string(), "ends-in-zero".to_string()]
    );

    // Run words against both machines.
    let accepted = registry
        .run_test("ends-in-zero", "10")
        .await
        .expect("run succeeds");
    assert!(accepted.accepted);
    assert_eq!(
        accepted.path,
        vec!["q0".to_string(), "q0".to_string(), "q1".to_string()]
    );

    let rejected = registry
        .run_test("contem-um", "000")
        .await
        .expect("run succeeds");
    assert!(!rejected.accepted);

    // History is newest first and carries only the outcome label.
    let history = registry.history().await.expect("history loads");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].automaton_name, "contem-um");
    assert_eq!(history[0].outcome, TestOutcome::Rejected);
    assert_eq!(history[1].automaton_name, "ends-in-zero");
    assert_eq!(history[1].outcome, TestOutcome::Accepted);
    assert!(history[0].timestamp >= history[1].timestamp);

    // Clearing leaves an empty log but keeps the definitions.
    registry.clear_history().await.expect("clear succeeds");
    assert!(registry.history().await.expect("history loads").is_empty());
    assert_eq!(registry.list_names().len(), 2);
}

#[test_log::test(tokio::test)]
async fn validation_failures_leave_registry_untouched() {
    let store = Arc::new(MemoryStore::new());
    let mut registry = AutomatonRegistry::load(store.clone())
        .await
        .expect("registry should load");
    registry
        .create_from_fields(&ends_in_zero("keeper"))
        .await
        .expect("create succeeds");

    // Grammar error.
    let mut bad_grammar = ends_in_zero("bad-grammar");
    bad_grammar.transitions = "q0 -> q1".to_string();
    assert!(matches!(
        registry.create_from_fields(&bad_grammar).await.unwrap_err(),
        RegistryError::Parse(ParseError::MissingComma { .. })
    ));

    // Non-determinism.
    let mut nondet = ends_in_zero("nondet");
    nondet.transitions = "q0,0->q1\nq0,0->q0".to_string();
    assert!(matches!(
        registry.create_from_fields(&nondet).await.unwrap_err(),
        RegistryError::Parse(ParseError::Nondeterministic { line: 2, .. })
    ));

    // Structural hole.
    let mut dangling = ends_in_zero("dangling");
    dangling.finals = "q1,q9".to_string();
    assert!(matches!(
        registry.create_from_fields(&dangling).await.unwrap_err(),
        RegistryError::Validation(_)
    ));

    // Duplicate of the surviving machine.
    assert!(matches!(
        registry
            .create_from_fields(&ends_in_zero("keeper"))
            .await
            .unwrap_err(),
        RegistryError::DuplicateName(_)
    ));

    // Only the keeper exists, in memory and in storage.
    assert_eq!(registry.list_names(), vec!["keeper".to_string()]);
    assert_eq!(
        store
            .load_definitions()
            .await
            .expect("load succeeds")
            .len(),
        1
    );
}

#[test_log::test(tokio::test)]
async fn history_write_failure_keeps_the_verdict() {
    let store = Arc::new(MemoryStore::new());
    let mut registry = AutomatonRegistry::load(store.clone())
        .await
        .expect("registry should load");
    registry
        .create_from_fields(&ends_in_zero("m1"))
        .await
        .expect("create succeeds");

    store.set_fail_history_appends(true);
    let run = registry.run_test("m1", "0").await.expect("run succeeds");
    assert!(run.accepted);
    assert!(!run.history_recorded);

    store.set_fail_history_appends(false);
    let run = registry.run_test("m1", "0").await.expect("run succeeds");
    assert!(run.history_recorded);
    assert_eq!(registry.history().await.expect("history loads").len(), 1);
}

#[test_log::test(tokio::test)]
async fn import_file_missing_keys_names_them_all() {
    let mut registry = AutomatonRegistry::load(Arc::new(MemoryStore::new()))
        .await
        .expect("registry should load");

    let err = registry
        .create_from_file("nome: only-a-name\ntransicoes:\nq0,0->q1\n")
        .await
        .unwrap_err();
    match err {
        RegistryError::Parse(ParseError::MissingKeys { missing }) => {
            assert_eq!(missing, vec!["alfabeto", "estados", "inicial", "finais"]);
        }
        other => panic!("expected MissingKeys, got {other:?}"),
    }
}
