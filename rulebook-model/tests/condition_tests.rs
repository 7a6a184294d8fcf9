use pretty_assertions::assert_eq;
use rulebook_model::{
    parse_conditions, ArtifactSpec, Condition, ConditionError, Logic, Operator, RuleSpec,
    ValidationError,
};
use rulebook_types::ArtifactId;
use serde_json::json;

fn id(s: &str) -> ArtifactId {
    ArtifactId::parse(s).unwrap()
}

// ── Parsing ──────────────────────────────────────────────────────

#[test]
fn parses_all_three_variants_in_order() {
    let raw = json!([
        {"type": "field", "fieldId": "age", "operator": ">=", "value": 18},
        {"type": "function", "functionId": "total_spend", "operator": ">", "value": 100},
        {"type": "rule", "ruleId": "adult"}
    ]);

    let parsed = parse_conditions(&raw).unwrap();
    assert_eq!(
        parsed,
        vec![
            Condition::field(id("age"), Operator::Ge, 18),
            Condition::function(id("total_spend"), Operator::Gt, 100),
            Condition::rule(id("adult")),
        ]
    );
}

#[test]
fn null_value_is_accepted_when_present() {
    let raw = json!([{"type": "field", "fieldId": "name", "operator": "==", "value": null}]);
    let parsed = parse_conditions(&raw).unwrap();
    assert_eq!(
        parsed,
        vec![Condition::field(id("name"), Operator::Eq, serde_json::Value::Null)]
    );
}

#[test]
fn rejects_non_list() {
    assert_eq!(
        parse_conditions(&json!({"type": "rule"})),
        Err(ConditionError::NotAList)
    );
}

#[test]
fn rejects_empty_list() {
    assert_eq!(parse_conditions(&json!([])), Err(ConditionError::Empty));
}

#[test]
fn rejects_non_object_element() {
    let raw = json!([{"type": "rule", "ruleId": "a"}, "rule"]);
    assert_eq!(
        parse_conditions(&raw),
        Err(ConditionError::NotAnObject { index: 1 })
    );
}

#[test]
fn rejects_missing_type() {
    let raw = json!([{"fieldId": "age", "operator": "==", "value": 1}]);
    assert_eq!(
        parse_conditions(&raw),
        Err(ConditionError::MissingType { index: 0 })
    );
}

#[test]
fn rejects_unknown_type() {
    let raw = json!([{"type": "lookup", "table": "x"}]);
    assert_eq!(
        parse_conditions(&raw),
        Err(ConditionError::UnknownType {
            index: 0,
            found: "lookup".into()
        })
    );
}

#[test]
fn rejects_missing_required_fields() {
    let cases = [
        (json!({"type": "field", "operator": "==", "value": 1}), "fieldId"),
        (json!({"type": "field", "fieldId": "age", "value": 1}), "operator"),
        (json!({"type": "field", "fieldId": "age", "operator": "=="}), "value"),
        (json!({"type": "function", "operator": "==", "value": 1}), "functionId"),
        (json!({"type": "rule"}), "ruleId"),
        (json!({"type": "rule", "ruleId": "  "}), "ruleId"),
    ];
    for (cond, field) in cases {
        assert_eq!(
            parse_conditions(&json!([cond])),
            Err(ConditionError::MissingField { index: 0, field }),
            "expected missing {field}"
        );
    }
}

#[test]
fn rejects_operators_outside_the_comparison_set() {
    for op in ["=", "===", "<>", "in", "contains", ""] {
        let raw = json!([{"type": "field", "fieldId": "age", "operator": op, "value": 1}]);
        assert_eq!(
            parse_conditions(&raw),
            Err(ConditionError::InvalidOperator {
                index: 0,
                operator: op.to_string()
            })
        );
    }
}

// ── Persisted shape ─────────────────────────────────────────────

#[test]
fn serializes_to_tagged_objects() {
    let conditions = vec![
        Condition::field(id("age"), Operator::Ge, 18),
        Condition::function(id("total_spend"), Operator::Le, 9.5),
        Condition::rule(id("adult")),
    ];
    assert_eq!(
        serde_json::to_value(&conditions).unwrap(),
        json!([
            {"type": "field", "fieldId": "age", "operator": ">=", "value": 18},
            {"type": "function", "functionId": "total_spend", "operator": "<=", "value": 9.5},
            {"type": "rule", "ruleId": "adult"}
        ])
    );
}

#[test]
fn stored_json_reads_back_identically() {
    let raw = json!([
        {"type": "field", "fieldId": "country", "operator": "!=", "value": "NL"},
        {"type": "rule", "ruleId": "adult"}
    ]);
    let parsed: Vec<Condition> = serde_json::from_value(raw.clone()).unwrap();
    assert_eq!(serde_json::to_value(&parsed).unwrap(), raw);
}

// ── RuleSpec ─────────────────────────────────────────────────────

#[test]
fn rule_spec_from_value() {
    let spec = RuleSpec::from_value(&json!({
        "logic": "OR",
        "conditions": [{"type": "rule", "ruleId": "vip"}]
    }))
    .unwrap();
    assert_eq!(spec.logic, Logic::Or);
    assert_eq!(spec.rule_refs().collect::<Vec<_>>(), vec![&id("vip")]);
}

#[test]
fn rule_spec_rejects_bad_logic() {
    let err = RuleSpec::from_value(&json!({
        "logic": "XOR",
        "conditions": [{"type": "rule", "ruleId": "vip"}]
    }))
    .unwrap_err();
    assert_eq!(err, ValidationError::InvalidLogic("XOR".into()));
}

#[test]
fn rule_spec_requires_conditions() {
    let err = RuleSpec::from_value(&json!({"logic": "AND"})).unwrap_err();
    assert_eq!(err, ValidationError::Conditions(ConditionError::NotAList));

    let empty = RuleSpec::new(Logic::And, Vec::new());
    assert_eq!(
        empty.validate(),
        Err(ValidationError::Conditions(ConditionError::Empty))
    );
}

#[test]
fn rule_spec_splits_references_by_variant() {
    let spec = RuleSpec::new(
        Logic::And,
        vec![
            Condition::field(id("age"), Operator::Ge, 18),
            Condition::function(id("total_spend"), Operator::Gt, 100),
            Condition::rule(id("adult")),
            Condition::field(id("country"), Operator::Eq, "NL"),
        ],
    );
    assert_eq!(
        spec.field_refs().map(ArtifactId::as_str).collect::<Vec<_>>(),
        vec!["age", "country"]
    );
    assert_eq!(
        spec.function_refs().map(ArtifactId::as_str).collect::<Vec<_>>(),
        vec!["total_spend"]
    );
    assert_eq!(
        spec.rule_refs().map(ArtifactId::as_str).collect::<Vec<_>>(),
        vec!["adult"]
    );
}
