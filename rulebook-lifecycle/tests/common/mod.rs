//! Shared test helpers for lifecycle tests.

#![allow(dead_code)]

use rulebook_lifecycle::Rulebook;
use rulebook_model::{
    Condition, Field, FieldType, FunctionSpec, FunctionType, Logic, Namespace, Operator, RuleSpec,
    Terminal,
};
use rulebook_storage::{SqliteStore, StoreConfig};
use rulebook_types::{ArtifactId, NamespaceId};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Installs a fmt subscriber honouring `RUST_LOG`. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn ns(s: &str) -> NamespaceId {
    NamespaceId::parse(s).unwrap()
}

pub fn id(s: &str) -> ArtifactId {
    ArtifactId::parse(s).unwrap()
}

/// An in-memory store shared by the returned book.
pub fn store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::open(&StoreConfig::in_memory()).unwrap())
}

/// A book over a fresh in-memory store with namespace `acme` created.
pub fn book() -> Rulebook {
    init_tracing();
    let book = Rulebook::new(store());
    book.namespaces()
        .create(Namespace::new(ns("acme"), "test tenant", "alice"))
        .unwrap();
    book
}

pub fn add_field(book: &Rulebook, name: &str, field_type: FieldType) {
    book.fields()
        .create(Field::new(ns("acme"), id(name), field_type, "", "alice"))
        .unwrap();
}

pub fn add_terminal(book: &Rulebook, name: &str) {
    book.terminals()
        .create(Terminal::new(ns("acme"), id(name), "alice"))
        .unwrap();
}

/// `age >= 18`
pub fn adult_spec() -> RuleSpec {
    RuleSpec::new(
        Logic::And,
        vec![Condition::field(id("age"), Operator::Ge, 18)],
    )
}

/// A rule whose only condition references another rule.
pub fn rule_ref_spec(target: &str) -> RuleSpec {
    RuleSpec::new(Logic::And, vec![Condition::rule(id(target))])
}

/// A rule whose only condition compares a function result.
pub fn function_ref_spec(function: &str) -> RuleSpec {
    RuleSpec::new(
        Logic::And,
        vec![Condition::function(id(function), Operator::Gt, 100)],
    )
}

/// `sum(amount)`
pub fn total_spend_spec() -> FunctionSpec {
    FunctionSpec::aggregate(FunctionType::Sum, vec![id("amount")])
}
