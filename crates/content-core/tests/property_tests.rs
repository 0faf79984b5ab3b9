use content_core::{
    DocumentId, ReleaseId, ReleaseTarget, published_id_of, resolve, version_id_of,
};
use proptest::prelude::*;

fn base_id() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{1,24}"
}

fn release_id() -> impl Strategy<Value = ReleaseId> {
    "[a-zA-Z0-9_-]{1,12}".prop_map(|r| ReleaseId::new(r).unwrap())
}

/// Any well-formed id in one of the three namespaces
fn any_id() -> impl Strategy<Value = String> {
    prop_oneof![
        base_id(),
        base_id().prop_map(|b| format!("drafts.{b}")),
        (base_id(), release_id()).prop_map(|(b, r)| version_id_of(&b, &r)),
    ]
}

proptest! {
    #[test]
    fn test_published_only_matches_published_id_of(raw in any_id()) {
        let resolved = resolve(&raw, &ReleaseTarget::PublishedOnly).unwrap();
        prop_assert_eq!(resolved.to_string(), published_id_of(&raw).unwrap());
    }

    #[test]
    fn test_version_id_strips_back_to_published(p in base_id(), r in release_id()) {
        prop_assert_eq!(published_id_of(&version_id_of(&p, &r)).unwrap(), p);
    }

    #[test]
    fn test_embedded_release_wins(p in base_id(), r in release_id(), r2 in release_id()) {
        let version = version_id_of(&p, &r);
        let resolved = resolve(&version, &ReleaseTarget::Release(r2)).unwrap();
        prop_assert_eq!(resolved.to_string(), version);
    }

    #[test]
    fn test_parse_display_is_stable(raw in any_id()) {
        let parsed = DocumentId::parse(&raw).unwrap();
        prop_assert_eq!(parsed.to_string(), raw);
    }

    #[test]
    fn test_published_id_is_shared_by_every_form(p in base_id(), r in release_id()) {
        let published = DocumentId::Published(p.clone());
        let draft = published.to_draft();
        let version = published.to_version(&r);
        prop_assert_eq!(draft.published_id(), p.as_str());
        prop_assert_eq!(version.published_id(), p.as_str());
    }
}
