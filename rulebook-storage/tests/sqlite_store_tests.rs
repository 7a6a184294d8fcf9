use pretty_assertions::assert_eq;
use rulebook_model::{
    Artifact, Condition, Field, FieldType, FunctionSpec, FunctionType, Logic, Namespace, Operator,
    Rule, RuleSpec, Terminal,
};
use rulebook_storage::{
    ActiveSetDigest, ChangeSignalStore, FieldStore, NamespaceStore, SqliteStore, StoreConfig,
    StoreError, TerminalStore, VersionedStore,
};
use rulebook_types::{ArtifactId, NamespaceId, Status, Version};
use serde_json::json;

fn ns(s: &str) -> NamespaceId {
    NamespaceId::parse(s).unwrap()
}

fn id(s: &str) -> ArtifactId {
    ArtifactId::parse(s).unwrap()
}

fn store_with(namespaces: &[&str]) -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    for n in namespaces {
        store
            .create_namespace(&Namespace::new(ns(n), "", "alice"))
            .unwrap();
    }
    store
}

fn rules(store: &SqliteStore) -> &dyn VersionedStore<RuleSpec> {
    store
}

fn functions(store: &SqliteStore) -> &dyn VersionedStore<FunctionSpec> {
    store
}

fn age_rule(namespace: &str, version: u32) -> Rule {
    Artifact::draft(
        ns(namespace),
        id("adult"),
        Version::new(version),
        RuleSpec::new(
            Logic::And,
            vec![Condition::field(id("age"), Operator::Ge, 18)],
        ),
        "alice",
    )
}

// ── Namespaces ───────────────────────────────────────────────────

#[test]
fn namespace_create_get_list() {
    let store = store_with(&["beta", "acme"]);
    let acme = store.get_namespace(&ns("acme")).unwrap().unwrap();
    assert_eq!(acme.created_by, "alice");
    let ids: Vec<String> = store
        .list_namespaces()
        .unwrap()
        .into_iter()
        .map(|n| n.id.to_string())
        .collect();
    assert_eq!(ids, vec!["acme", "beta"]);
    assert!(store.get_namespace(&ns("nope")).unwrap().is_none());
}

#[test]
fn duplicate_namespace_is_conflict() {
    let store = store_with(&["acme"]);
    let err = store
        .create_namespace(&Namespace::new(ns("acme"), "", "bob"))
        .unwrap_err();
    assert!(err.is_conflict(), "got {err:?}");
}

#[test]
fn artifacts_require_existing_namespace() {
    let store = store_with(&[]);
    let err = rules(&store).create(&age_rule("ghost", 1)).unwrap_err();
    assert!(matches!(err, StoreError::Constraint(_)), "got {err:?}");
}

#[test]
fn deleting_namespace_removes_everything_scoped_to_it() {
    let store = store_with(&["acme", "other"]);
    store
        .create_field(&Field::new(ns("acme"), id("age"), FieldType::Number, "", "alice"))
        .unwrap();
    store
        .create_terminal(&Terminal::new(ns("acme"), id("approve"), "alice"))
        .unwrap();
    rules(&store).create(&age_rule("acme", 1)).unwrap();
    rules(&store).create(&age_rule("other", 1)).unwrap();
    store.upsert_signal(&ns("acme"), "abc").unwrap();

    assert!(store.delete_namespace(&ns("acme")).unwrap());
    assert!(!store.delete_namespace(&ns("acme")).unwrap());

    assert_eq!(store.count_fields(&ns("acme")).unwrap(), 0);
    assert_eq!(store.count_terminals(&ns("acme")).unwrap(), 0);
    assert!(rules(&store).list(&ns("acme")).unwrap().is_empty());
    assert!(store.get_signal(&ns("acme")).unwrap().is_none());
    assert_eq!(rules(&store).list(&ns("other")).unwrap().len(), 1);
}

// ── Fields and terminals ─────────────────────────────────────────

#[test]
fn field_crud() {
    let store = store_with(&["acme"]);
    let mut field = Field::new(ns("acme"), id("age"), FieldType::Number, "age", "alice");
    store.create_field(&field).unwrap();

    assert!(store.field_exists(&ns("acme"), &id("age")).unwrap());
    assert!(!store.field_exists(&ns("acme"), &id("income")).unwrap());
    assert!(store.create_field(&field).unwrap_err().is_conflict());

    field.field_type = FieldType::String;
    field.description = "age as text".into();
    assert!(store.update_field(&field).unwrap());
    let loaded = store.get_field(&ns("acme"), &id("age")).unwrap().unwrap();
    assert_eq!(loaded.field_type, FieldType::String);
    assert_eq!(loaded.description, "age as text");
    assert_eq!(loaded.created_at, field.created_at);

    assert_eq!(store.list_fields(&ns("acme")).unwrap().len(), 1);
    assert!(store.delete_field(&ns("acme"), &id("age")).unwrap());
    assert!(!store.delete_field(&ns("acme"), &id("age")).unwrap());
    assert!(!store.update_field(&field).unwrap());
}

#[test]
fn terminal_crud() {
    let store = store_with(&["acme"]);
    store
        .create_terminal(&Terminal::new(ns("acme"), id("reject"), "alice"))
        .unwrap();
    store
        .create_terminal(&Terminal::new(ns("acme"), id("approve"), "alice"))
        .unwrap();

    let ids: Vec<String> = store
        .list_terminals(&ns("acme"))
        .unwrap()
        .into_iter()
        .map(|t| t.terminal_id.to_string())
        .collect();
    assert_eq!(ids, vec!["approve", "reject"]);
    assert_eq!(store.count_terminals(&ns("acme")).unwrap(), 2);
    assert!(store.terminal_exists(&ns("acme"), &id("approve")).unwrap());
    assert!(store.get_terminal(&ns("acme"), &id("nope")).unwrap().is_none());
    assert!(store.delete_terminal(&ns("acme"), &id("approve")).unwrap());
    assert!(!store.terminal_exists(&ns("acme"), &id("approve")).unwrap());
}

// ── Versioned rows ───────────────────────────────────────────────

#[test]
fn versioned_row_round_trips() {
    let store = store_with(&["acme"]);
    let rule = age_rule("acme", 1);
    rules(&store).create(&rule).unwrap();

    let loaded = rules(&store)
        .get_by_id(&ns("acme"), &id("adult"), Version::FIRST)
        .unwrap()
        .unwrap();
    assert_eq!(loaded, rule);
    assert_eq!(
        rules(&store)
            .get_draft_version(&ns("acme"), &id("adult"))
            .unwrap(),
        Some(rule)
    );
    assert!(rules(&store)
        .get_active_version(&ns("acme"), &id("adult"))
        .unwrap()
        .is_none());
}

#[test]
fn max_version_starts_at_zero() {
    let store = store_with(&["acme"]);
    assert_eq!(
        rules(&store).get_max_version(&ns("acme"), &id("adult")).unwrap(),
        Version::ZERO
    );
    rules(&store).create(&age_rule("acme", 1)).unwrap();
    rules(&store)
        .publish(&ns("acme"), &id("adult"), Version::FIRST, "alice")
        .unwrap();
    rules(&store).create(&age_rule("acme", 2)).unwrap();
    assert_eq!(
        rules(&store).get_max_version(&ns("acme"), &id("adult")).unwrap(),
        Version::new(2)
    );
}

#[test]
fn duplicate_version_is_conflict() {
    let store = store_with(&["acme"]);
    rules(&store).create(&age_rule("acme", 1)).unwrap();
    let mut again = age_rule("acme", 1);
    again.status = Status::Inactive;
    assert!(rules(&store).create(&again).unwrap_err().is_conflict());
}

#[test]
fn publish_stamps_publisher() {
    let store = store_with(&["acme"]);
    rules(&store).create(&age_rule("acme", 1)).unwrap();
    assert!(rules(&store)
        .publish(&ns("acme"), &id("adult"), Version::FIRST, "alice")
        .unwrap());

    let active = rules(&store)
        .get_active_version(&ns("acme"), &id("adult"))
        .unwrap()
        .unwrap();
    assert_eq!(active.status, Status::Active);
    assert_eq!(active.published_by.as_deref(), Some("alice"));
    assert!(active.published_at.is_some());

    // Only drafts can be published.
    assert!(!rules(&store)
        .publish(&ns("acme"), &id("adult"), Version::FIRST, "alice")
        .unwrap());
}

#[test]
fn second_active_version_is_rejected_by_the_index() {
    let store = store_with(&["acme"]);
    rules(&store).create(&age_rule("acme", 1)).unwrap();
    rules(&store)
        .publish(&ns("acme"), &id("adult"), Version::FIRST, "alice")
        .unwrap();
    rules(&store).create(&age_rule("acme", 2)).unwrap();

    let err = rules(&store)
        .publish(&ns("acme"), &id("adult"), Version::new(2), "alice")
        .unwrap_err();
    assert!(err.is_conflict(), "got {err:?}");

    let active = rules(&store).list_active(&ns("acme")).unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].version, Version::FIRST);
}

#[test]
fn deactivate_then_publish_has_a_zero_active_window() {
    let store = store_with(&["acme"]);
    rules(&store).create(&age_rule("acme", 1)).unwrap();
    rules(&store)
        .publish(&ns("acme"), &id("adult"), Version::FIRST, "alice")
        .unwrap();
    rules(&store).create(&age_rule("acme", 2)).unwrap();

    assert_eq!(rules(&store).deactivate(&ns("acme"), &id("adult")).unwrap(), 1);
    // Between the two steps nothing is active; readers see "not published".
    assert!(rules(&store)
        .get_active_version(&ns("acme"), &id("adult"))
        .unwrap()
        .is_none());

    assert!(rules(&store)
        .publish(&ns("acme"), &id("adult"), Version::new(2), "bob")
        .unwrap());
    let statuses: Vec<(u32, Status)> = rules(&store)
        .list_versions(&ns("acme"), &id("adult"))
        .unwrap()
        .into_iter()
        .map(|r| (r.version.get(), r.status))
        .collect();
    assert_eq!(statuses, vec![(2, Status::Active), (1, Status::Inactive)]);
}

#[test]
fn deactivate_without_active_is_noop() {
    let store = store_with(&["acme"]);
    rules(&store).create(&age_rule("acme", 1)).unwrap();
    assert_eq!(rules(&store).deactivate(&ns("acme"), &id("adult")).unwrap(), 0);
}

#[test]
fn deactivate_version_only_retires_that_version() {
    let store = store_with(&["acme"]);
    rules(&store).create(&age_rule("acme", 1)).unwrap();
    rules(&store)
        .publish(&ns("acme"), &id("adult"), Version::FIRST, "alice")
        .unwrap();

    // v2 is not active, so nothing moves.
    assert!(!rules(&store)
        .deactivate_version(&ns("acme"), &id("adult"), Version::new(2))
        .unwrap());
    assert!(rules(&store)
        .get_active_version(&ns("acme"), &id("adult"))
        .unwrap()
        .is_some());

    assert!(rules(&store)
        .deactivate_version(&ns("acme"), &id("adult"), Version::FIRST)
        .unwrap());
    assert!(!rules(&store)
        .deactivate_version(&ns("acme"), &id("adult"), Version::FIRST)
        .unwrap());
    let row = rules(&store)
        .get_by_id(&ns("acme"), &id("adult"), Version::FIRST)
        .unwrap()
        .unwrap();
    assert_eq!(row.status, Status::Inactive);
}

#[test]
fn update_only_touches_drafts() {
    let store = store_with(&["acme"]);
    let mut rule = age_rule("acme", 1);
    rules(&store).create(&rule).unwrap();

    rule.spec.logic = Logic::Or;
    assert!(rules(&store).update(&rule).unwrap());
    let loaded = rules(&store)
        .get_by_id(&ns("acme"), &id("adult"), Version::FIRST)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.spec.logic, Logic::Or);

    rules(&store)
        .publish(&ns("acme"), &id("adult"), Version::FIRST, "alice")
        .unwrap();
    rule.spec.logic = Logic::And;
    assert!(!rules(&store).update(&rule).unwrap());
}

#[test]
fn delete_is_version_scoped() {
    let store = store_with(&["acme"]);
    rules(&store).create(&age_rule("acme", 1)).unwrap();
    rules(&store)
        .publish(&ns("acme"), &id("adult"), Version::FIRST, "alice")
        .unwrap();
    rules(&store).create(&age_rule("acme", 2)).unwrap();

    assert!(rules(&store)
        .delete(&ns("acme"), &id("adult"), Version::new(2))
        .unwrap());
    assert!(!rules(&store)
        .delete(&ns("acme"), &id("adult"), Version::new(2))
        .unwrap());
    assert!(rules(&store)
        .exists(&ns("acme"), &id("adult"), Version::FIRST)
        .unwrap());
    assert!(!rules(&store)
        .exists(&ns("acme"), &id("adult"), Version::new(2))
        .unwrap());
}

#[test]
fn list_orders_by_id_then_version() {
    let store = store_with(&["acme"]);
    let spend = |v| {
        Artifact::draft(
            ns("acme"),
            id("total_spend"),
            Version::new(v),
            FunctionSpec::aggregate(FunctionType::Sum, vec![id("amount")]),
            "alice",
        )
    };
    let top = Artifact::draft(
        ns("acme"),
        id("max_spend"),
        Version::FIRST,
        FunctionSpec::aggregate(FunctionType::Max, vec![id("amount")]),
        "alice",
    );
    functions(&store).create(&spend(1)).unwrap();
    functions(&store)
        .publish(&ns("acme"), &id("total_spend"), Version::FIRST, "alice")
        .unwrap();
    functions(&store).create(&spend(2)).unwrap();
    functions(&store).create(&top).unwrap();

    let listed: Vec<(String, u32)> = functions(&store)
        .list(&ns("acme"))
        .unwrap()
        .into_iter()
        .map(|f| (f.artifact_id.to_string(), f.version.get()))
        .collect();
    assert_eq!(
        listed,
        vec![
            ("max_spend".to_string(), 1),
            ("total_spend".to_string(), 1),
            ("total_spend".to_string(), 2),
        ]
    );
    assert_eq!(functions(&store).list_active(&ns("acme")).unwrap().len(), 1);
}

#[test]
fn conditions_persist_as_tagged_objects() {
    let store = store_with(&["acme"]);
    let rule = Artifact::draft(
        ns("acme"),
        id("big_adult"),
        Version::FIRST,
        RuleSpec::new(
            Logic::And,
            vec![
                Condition::rule(id("adult")),
                Condition::function(id("total_spend"), Operator::Gt, 100),
            ],
        ),
        "alice",
    );
    rules(&store).create(&rule).unwrap();
    let loaded = rules(&store)
        .get_by_id(&ns("acme"), &id("big_adult"), Version::FIRST)
        .unwrap()
        .unwrap();
    assert_eq!(
        serde_json::to_value(&loaded.spec.conditions).unwrap(),
        json!([
            {"type": "rule", "ruleId": "adult"},
            {"type": "function", "functionId": "total_spend", "operator": ">", "value": 100}
        ])
    );
}

// ── Change signal and digest ────────────────────────────────────

#[test]
fn signal_upsert_get_list_delete() {
    let store = store_with(&["acme", "beta"]);
    assert!(store.get_signal(&ns("acme")).unwrap().is_none());

    let first = store.upsert_signal(&ns("acme"), "one").unwrap();
    let second = store.upsert_signal(&ns("acme"), "two").unwrap();
    assert!(second.updated_at >= first.updated_at);
    store.upsert_signal(&ns("beta"), "three").unwrap();

    let loaded = store.get_signal(&ns("acme")).unwrap().unwrap();
    assert_eq!(loaded.checksum, "two");

    let all: Vec<String> = store
        .list_signals()
        .unwrap()
        .into_iter()
        .map(|m| m.checksum)
        .collect();
    assert_eq!(all, vec!["two", "three"]);

    assert!(store.delete_signal(&ns("acme")).unwrap());
    assert!(!store.delete_signal(&ns("acme")).unwrap());
}

#[test]
fn digest_tracks_the_active_set_only() {
    let store = store_with(&["acme"]);
    let empty = store.active_set_digest(&ns("acme")).unwrap();
    assert_eq!(empty.len(), 64);

    rules(&store).create(&age_rule("acme", 1)).unwrap();
    assert_eq!(store.active_set_digest(&ns("acme")).unwrap(), empty);

    rules(&store)
        .publish(&ns("acme"), &id("adult"), Version::FIRST, "alice")
        .unwrap();
    let v1 = store.active_set_digest(&ns("acme")).unwrap();
    assert_ne!(v1, empty);
    assert_eq!(store.active_set_digest(&ns("acme")).unwrap(), v1);

    rules(&store).create(&age_rule("acme", 2)).unwrap();
    rules(&store).deactivate(&ns("acme"), &id("adult")).unwrap();
    rules(&store)
        .publish(&ns("acme"), &id("adult"), Version::new(2), "alice")
        .unwrap();
    assert_ne!(store.active_set_digest(&ns("acme")).unwrap(), v1);
}

#[test]
fn digest_is_scoped_to_namespace() {
    let store = store_with(&["acme", "beta"]);
    let before = store.active_set_digest(&ns("beta")).unwrap();
    rules(&store).create(&age_rule("acme", 1)).unwrap();
    rules(&store)
        .publish(&ns("acme"), &id("adult"), Version::FIRST, "alice")
        .unwrap();
    assert_eq!(store.active_set_digest(&ns("beta")).unwrap(), before);
}

// ── File-backed store ───────────────────────────────────────────

#[test]
fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rulebook.db");
    {
        let store = SqliteStore::open(&StoreConfig::at(&path)).unwrap();
        store
            .create_namespace(&Namespace::new(ns("acme"), "persisted", "alice"))
            .unwrap();
        rules(&store).create(&age_rule("acme", 1)).unwrap();
    }
    let store = SqliteStore::open_path(&path).unwrap();
    assert_eq!(
        store.get_namespace(&ns("acme")).unwrap().unwrap().description,
        "persisted"
    );
    assert_eq!(
        rules(&store).get_max_version(&ns("acme"), &id("adult")).unwrap(),
        Version::FIRST
    );
}
