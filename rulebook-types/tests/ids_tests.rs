use proptest::prelude::*;
use rulebook_types::{ArtifactId, Error, NamespaceId, Version};
use std::collections::HashSet;
use std::str::FromStr;

// ── NamespaceId ───────────────────────────────────────────────────

#[test]
fn namespace_id_accepts_simple_names() {
    for ok in ["acme", "acme-prod", "acme_prod", "A1", "x"] {
        assert!(NamespaceId::parse(ok).is_ok(), "{ok} should be valid");
    }
}

#[test]
fn namespace_id_rejects_empty() {
    assert!(matches!(
        NamespaceId::parse(""),
        Err(Error::InvalidNamespaceId { .. })
    ));
}

#[test]
fn namespace_id_rejects_too_long() {
    let fifty = "a".repeat(50);
    let fifty_one = "a".repeat(51);
    assert!(NamespaceId::parse(&fifty).is_ok());
    assert!(NamespaceId::parse(&fifty_one).is_err());
}

#[test]
fn namespace_id_rejects_leading_or_trailing_separators() {
    for bad in ["-acme", "_acme", "acme-", "acme_", "-", "_"] {
        assert!(NamespaceId::parse(bad).is_err(), "{bad} should be invalid");
    }
}

#[test]
fn namespace_id_rejects_other_characters() {
    for bad in ["ac me", "acme!", "acme.prod", "acmé", "a/b"] {
        assert!(NamespaceId::parse(bad).is_err(), "{bad} should be invalid");
    }
}

#[test]
fn namespace_id_error_names_the_value() {
    let err = NamespaceId::parse("bad id").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("bad id"));
    assert!(msg.contains("alphanumeric"));
}

#[test]
fn namespace_id_display_and_from_str() {
    let id = NamespaceId::from_str("acme").unwrap();
    assert_eq!(id.to_string(), "acme");
    assert_eq!(id.as_str(), "acme");
}

#[test]
fn namespace_id_serializes_as_plain_string() {
    let id = NamespaceId::parse("acme").unwrap();
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"acme\"");
}

#[test]
fn namespace_id_deserialization_validates() {
    assert!(serde_json::from_str::<NamespaceId>("\"acme\"").is_ok());
    assert!(serde_json::from_str::<NamespaceId>("\"-acme\"").is_err());
}

#[test]
fn namespace_id_hash_and_eq() {
    let mut set = HashSet::new();
    set.insert(NamespaceId::parse("acme").unwrap());
    set.insert(NamespaceId::parse("acme").unwrap());
    assert_eq!(set.len(), 1);
}

// ── ArtifactId ────────────────────────────────────────────────────

#[test]
fn artifact_id_rejects_blank() {
    assert!(ArtifactId::parse("").is_err());
    assert!(ArtifactId::parse("   ").is_err());
}

#[test]
fn artifact_id_accepts_free_form_names() {
    let id = ArtifactId::parse("total_spend").unwrap();
    assert_eq!(id.as_str(), "total_spend");
    assert!(ArtifactId::parse("is adult?").is_ok());
}

#[test]
fn artifact_id_deserialization_validates() {
    assert!(serde_json::from_str::<ArtifactId>("\"age\"").is_ok());
    assert!(matches!(
        ArtifactId::from_str(" "),
        Err(Error::InvalidArtifactId(_))
    ));
    assert!(serde_json::from_str::<ArtifactId>("\"\"").is_err());
}

// ── Version ───────────────────────────────────────────────────────

#[test]
fn version_zero_is_followed_by_first() {
    assert_eq!(Version::ZERO.next(), Version::FIRST);
    assert_eq!(Version::FIRST.get(), 1);
}

#[test]
fn version_orders_numerically() {
    assert!(Version::new(2) > Version::new(1));
    assert_eq!(Version::new(9).to_string(), "9");
}

#[test]
fn version_serializes_as_number() {
    assert_eq!(serde_json::to_string(&Version::new(3)).unwrap(), "3");
}

// ── Properties ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn well_formed_namespace_ids_parse(
        id in "[a-zA-Z0-9]([a-zA-Z0-9_-]{0,48}[a-zA-Z0-9])?"
    ) {
        prop_assert!(NamespaceId::parse(&id).is_ok());
    }

    #[test]
    fn parsed_namespace_ids_satisfy_the_rules(id in "\\PC{0,60}") {
        if let Ok(parsed) = NamespaceId::parse(&id) {
            let s = parsed.as_str();
            prop_assert!(!s.is_empty() && s.len() <= 50);
            prop_assert!(s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
            prop_assert!(!s.starts_with(['-', '_']) && !s.ends_with(['-', '_']));
        }
    }

    #[test]
    fn version_next_is_strictly_greater(n in 0u32..u32::MAX) {
        prop_assert!(Version::new(n).next() > Version::new(n));
    }
}
