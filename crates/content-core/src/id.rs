//! Document identity resolution
//!
//! Every document lives in exactly one of three id namespaces:
//!
//! | Namespace | Form |
//! |-----------|------|
//! | Published | `<id>` |
//! | Draft     | `drafts.<id>` |
//! | Version   | `versions.<release>.<id>` |
//!
//! The bare published id is the stable identity of a document across all of
//! its states and can always be recovered by stripping the namespace prefix.
//! All functions here are pure.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Prefix of ids in the Draft namespace
pub const DRAFTS_PREFIX: &str = "drafts.";

/// Prefix of ids in the Version namespace
pub const VERSIONS_PREFIX: &str = "versions.";

/// Characters that cannot appear in an id; ids are used verbatim as URL path segments.
pub const RESERVED_ID_CHARS: &[char] = &['/', '?', '#'];

/// Identifier of a release: a named set of pending version documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReleaseId(String);

impl ReleaseId {
    /// Create a release id. Release ids are embedded in version ids, so they
    /// must be non-empty and cannot contain `.`.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::invalid_id(&id, "release id is empty"));
        }
        if id.contains('.') {
            return Err(Error::invalid_id(&id, "release id cannot contain '.'"));
        }
        if id.contains(RESERVED_ID_CHARS) {
            return Err(Error::invalid_id(&id, "release id contains a reserved character"));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ReleaseId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ReleaseId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ReleaseId> for String {
    fn from(value: ReleaseId) -> Self {
        value.0
    }
}

/// A document id, tagged with the namespace it lives in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DocumentId {
    /// Live document, addressed by its bare id
    Published(String),
    /// Editable draft: `drafts.<published>`
    Draft(String),
    /// Release-scoped content: `versions.<release>.<published>`
    Version {
        release: ReleaseId,
        published: String,
    },
}

impl DocumentId {
    /// Parse a raw id into its namespace.
    ///
    /// Fails with [`Error::InvalidIdKind`] when the base id is empty, when a
    /// version id has no release segment, or when namespaces are nested.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::invalid_id(raw, "id is empty"));
        }

        if let Some(base) = raw.strip_prefix(DRAFTS_PREFIX) {
            check_base(raw, base)?;
            return Ok(DocumentId::Draft(base.to_string()));
        }

        if let Some(rest) = raw.strip_prefix(VERSIONS_PREFIX) {
            let (release, base) = rest
                .split_once('.')
                .ok_or_else(|| Error::invalid_id(raw, "version id has no base id"))?;
            if release.is_empty() {
                return Err(Error::invalid_id(raw, "version id has an empty release"));
            }
            let release = ReleaseId::new(release)?;
            check_base(raw, base)?;
            return Ok(DocumentId::Version {
                release,
                published: base.to_string(),
            });
        }

        check_base(raw, raw)?;
        Ok(DocumentId::Published(raw.to_string()))
    }

    /// The bare published id shared by every form of this document.
    pub fn published_id(&self) -> &str {
        match self {
            DocumentId::Published(id) | DocumentId::Draft(id) => id,
            DocumentId::Version { published, .. } => published,
        }
    }

    /// The release this id is scoped to, if it is a version id.
    pub fn release(&self) -> Option<&ReleaseId> {
        match self {
            DocumentId::Version { release, .. } => Some(release),
            _ => None,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, DocumentId::Published(_))
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, DocumentId::Draft(_))
    }

    pub fn is_version(&self) -> bool {
        matches!(self, DocumentId::Version { .. })
    }

    pub fn to_published(&self) -> DocumentId {
        DocumentId::Published(self.published_id().to_string())
    }

    pub fn to_draft(&self) -> DocumentId {
        DocumentId::Draft(self.published_id().to_string())
    }

    pub fn to_version(&self, release: &ReleaseId) -> DocumentId {
        DocumentId::Version {
            release: release.clone(),
            published: self.published_id().to_string(),
        }
    }
}

fn check_base(raw: &str, base: &str) -> Result<()> {
    if base.is_empty() {
        return Err(Error::invalid_id(raw, "base id is empty"));
    }
    if base.starts_with(DRAFTS_PREFIX) || base.starts_with(VERSIONS_PREFIX) {
        return Err(Error::invalid_id(raw, "nested namespace prefix"));
    }
    if base.contains(RESERVED_ID_CHARS) {
        return Err(Error::invalid_id(raw, "id contains a reserved character"));
    }
    Ok(())
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentId::Published(id) => f.write_str(id),
            DocumentId::Draft(id) => write!(f, "{}{}", DRAFTS_PREFIX, id),
            DocumentId::Version { release, published } => {
                write!(f, "{}{}.{}", VERSIONS_PREFIX, release, published)
            }
        }
    }
}

impl FromStr for DocumentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DocumentId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<DocumentId> for String {
    fn from(value: DocumentId) -> Self {
        value.to_string()
    }
}

/// Strip a recognized `drafts.` or `versions.<release>.` prefix.
pub fn published_id_of(id: &str) -> Result<String> {
    DocumentId::parse(id).map(|parsed| parsed.published_id().to_string())
}

/// `drafts.<published_id>`
pub fn draft_id_of(published_id: &str) -> String {
    format!("{}{}", DRAFTS_PREFIX, published_id)
}

/// `versions.<release>.<published_id>`
pub fn version_id_of(published_id: &str, release: &ReleaseId) -> String {
    format!("{}{}.{}", VERSIONS_PREFIX, release, published_id)
}

/// Release qualifier accompanying a raw id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReleaseTarget {
    /// Bypass any embedded draft/version information and target the published form
    PublishedOnly,
    /// Target the version of the document in this release
    Release(ReleaseId),
    /// No qualifier supplied
    #[default]
    Unspecified,
}

impl From<Option<ReleaseId>> for ReleaseTarget {
    fn from(value: Option<ReleaseId>) -> Self {
        match value {
            Some(release) => ReleaseTarget::Release(release),
            None => ReleaseTarget::Unspecified,
        }
    }
}

/// What an unqualified draft id resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftHandling {
    /// `drafts.abc` resolves to `abc`
    #[default]
    Published,
    /// `drafts.abc` stays `drafts.abc`
    Preserve,
}

impl FromStr for DraftHandling {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "published" | "normalize" => Ok(DraftHandling::Published),
            "preserve" | "draft" => Ok(DraftHandling::Preserve),
            _ => Err(Error::Config {
                message: format!("unknown draft handling: {}", s),
            }),
        }
    }
}

/// Resolve a raw id to its canonical form using [`DraftHandling::Published`].
pub fn resolve(raw: &str, target: &ReleaseTarget) -> Result<DocumentId> {
    resolve_with(raw, target, DraftHandling::Published)
}

/// Resolve a raw id to its canonical form.
///
/// Precedence, first match wins:
/// 1. [`ReleaseTarget::PublishedOnly`] yields the published id.
/// 2. A raw version id keeps its own release, whatever the target says.
/// 3. [`ReleaseTarget::Release`] yields the version id in that release.
/// 4. Otherwise the published id, or the draft id when `drafts` is
///    [`DraftHandling::Preserve`] and the raw id is a draft.
pub fn resolve_with(
    raw: &str,
    target: &ReleaseTarget,
    drafts: DraftHandling,
) -> Result<DocumentId> {
    let parsed = DocumentId::parse(raw)?;

    if matches!(target, ReleaseTarget::PublishedOnly) {
        return Ok(parsed.to_published());
    }

    if parsed.is_version() {
        return Ok(parsed);
    }

    if let ReleaseTarget::Release(release) = target {
        return Ok(parsed.to_version(release));
    }

    match (drafts, &parsed) {
        (DraftHandling::Preserve, DocumentId::Draft(_)) => Ok(parsed),
        _ => Ok(parsed.to_published()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn release(id: &str) -> ReleaseId {
        ReleaseId::new(id).unwrap()
    }

    #[rstest]
    #[case("abc", "abc")]
    #[case("drafts.abc", "abc")]
    #[case("versions.r1.abc", "abc")]
    #[case("versions.r1.abc.def", "abc.def")]
    #[case("drafts", "drafts")]
    fn published_id_strips_known_prefix(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(published_id_of(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("drafts.")]
    #[case("versions.")]
    #[case("versions.r1")]
    #[case("versions.r1.")]
    #[case("versions..abc")]
    #[case("drafts.drafts.abc")]
    #[case("drafts.versions.r1.abc")]
    #[case("a/b")]
    #[case("drafts.abc?x=1")]
    #[case("versions.r1.abc#frag")]
    #[case("versions.r/1.abc")]
    fn malformed_ids_are_rejected(#[case] raw: &str) {
        let err = published_id_of(raw).unwrap_err();
        assert!(matches!(err, Error::InvalidIdKind { .. }), "got {err:?}");
    }

    #[rstest]
    #[case("")]
    #[case("r.1")]
    #[case("r/1")]
    #[case("r?1")]
    fn invalid_release_ids_are_rejected(#[case] raw: &str) {
        assert!(matches!(ReleaseId::new(raw), Err(Error::InvalidIdKind { .. })));
    }

    #[test]
    fn namespace_builders() {
        assert_eq!(draft_id_of("abc"), "drafts.abc");
        assert_eq!(version_id_of("abc", &release("r1")), "versions.r1.abc");
    }

    #[test]
    fn display_matches_parse_input() {
        for raw in ["abc", "drafts.abc", "versions.r1.abc"] {
            assert_eq!(DocumentId::parse(raw).unwrap().to_string(), raw);
        }
    }

    #[test]
    fn release_id_rejects_dots_and_empty() {
        assert!(ReleaseId::new("").is_err());
        assert!(ReleaseId::new("a.b").is_err());
        assert_eq!(release("rSpring").as_str(), "rSpring");
    }

    #[rstest]
    #[case("drafts.abc", ReleaseTarget::PublishedOnly, "abc")]
    #[case("versions.r1.abc", ReleaseTarget::PublishedOnly, "abc")]
    #[case("versions.r1.abc", ReleaseTarget::Release(release("r2")), "versions.r1.abc")]
    #[case("versions.r1.abc", ReleaseTarget::Unspecified, "versions.r1.abc")]
    #[case("abc", ReleaseTarget::Release(release("r2")), "versions.r2.abc")]
    #[case("drafts.abc", ReleaseTarget::Release(release("r2")), "versions.r2.abc")]
    #[case("abc", ReleaseTarget::Unspecified, "abc")]
    #[case("drafts.abc", ReleaseTarget::Unspecified, "abc")]
    fn resolve_precedence(
        #[case] raw: &str,
        #[case] target: ReleaseTarget,
        #[case] expected: &str,
    ) {
        assert_eq!(resolve(raw, &target).unwrap().to_string(), expected);
    }

    #[test]
    fn preserve_keeps_unqualified_drafts() {
        let id = resolve_with("drafts.abc", &ReleaseTarget::Unspecified, DraftHandling::Preserve)
            .unwrap();
        assert_eq!(id, DocumentId::Draft("abc".into()));

        // Explicit qualifiers still win over preservation
        let id = resolve_with("drafts.abc", &ReleaseTarget::PublishedOnly, DraftHandling::Preserve)
            .unwrap();
        assert_eq!(id, DocumentId::Published("abc".into()));
    }

    #[test]
    fn document_id_serializes_as_string() {
        let id = DocumentId::parse("versions.r1.abc").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"versions.r1.abc\"");
        let back: DocumentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn draft_handling_parses() {
        assert_eq!("preserve".parse::<DraftHandling>().unwrap(), DraftHandling::Preserve);
        assert_eq!("Published".parse::<DraftHandling>().unwrap(), DraftHandling::Published);
        assert!("other".parse::<DraftHandling>().is_err());
    }
}
