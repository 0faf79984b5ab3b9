//! State-transition actions and their dispatch
//!
//! Each [`Action`] is sent to the store as one atomic request. Legality of a
//! transition (e.g. publishing a draft that does not exist) is enforced by the
//! store, not here; store errors are passed through unchanged.
//!
//! | Action | Effect |
//! |--------|--------|
//! | `publish` | draft promoted to published, draft removed |
//! | `unpublish` | published demoted to draft, published removed |
//! | `delete` | published and draft removed together |
//! | `version.replace` | version content overwritten, id unchanged |
//! | `version.discard` | version removed from its release |
//! | `version.unpublish` | version marked to unpublish when its release is published |

use std::fmt;

use serde::Serialize;

use crate::id::DocumentId;
use crate::store::{ActionResult, ContentStore, Document};
use crate::{Error, Result};

/// Name of an action, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Publish,
    Unpublish,
    Delete,
    VersionReplace,
    VersionDiscard,
    VersionUnpublish,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Publish => "publish",
            ActionKind::Unpublish => "unpublish",
            ActionKind::Delete => "delete",
            ActionKind::VersionReplace => "version.replace",
            ActionKind::VersionDiscard => "version.discard",
            ActionKind::VersionUnpublish => "version.unpublish",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An atomic state-transition request, serialized in the store's wire format.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "actionType")]
pub enum Action {
    #[serde(rename = "sanity.action.document.publish", rename_all = "camelCase")]
    Publish {
        draft_id: DocumentId,
        published_id: DocumentId,
    },

    #[serde(rename = "sanity.action.document.unpublish", rename_all = "camelCase")]
    Unpublish {
        draft_id: DocumentId,
        published_id: DocumentId,
    },

    #[serde(rename = "sanity.action.document.delete", rename_all = "camelCase")]
    Delete {
        published_id: DocumentId,
        include_drafts: Vec<DocumentId>,
    },

    #[serde(rename = "sanity.action.document.version.replace")]
    VersionReplace { document: Document },

    #[serde(rename = "sanity.action.document.version.discard", rename_all = "camelCase")]
    VersionDiscard { version_id: DocumentId },

    #[serde(
        rename = "sanity.action.document.version.unpublish",
        rename_all = "camelCase"
    )]
    VersionUnpublish {
        version_id: DocumentId,
        published_id: DocumentId,
    },
}

impl Action {
    /// Promote the draft of `id` to published.
    pub fn publish(id: &DocumentId) -> Self {
        Action::Publish {
            draft_id: id.to_draft(),
            published_id: id.to_published(),
        }
    }

    /// Demote the published form of `id` to a draft.
    pub fn unpublish(id: &DocumentId) -> Self {
        Action::Unpublish {
            draft_id: id.to_draft(),
            published_id: id.to_published(),
        }
    }

    /// Remove the published form of `id` along with its draft.
    pub fn delete(id: &DocumentId) -> Self {
        Action::Delete {
            published_id: id.to_published(),
            include_drafts: vec![id.to_draft()],
        }
    }

    /// Overwrite a version with `source`'s content. `version` must be a version id.
    pub fn version_replace(version: &DocumentId, source: &Document) -> Result<Self> {
        require_version(version)?;
        Ok(Action::VersionReplace {
            document: source.with_id(version.to_string()),
        })
    }

    pub fn version_discard(version: &DocumentId) -> Result<Self> {
        require_version(version)?;
        Ok(Action::VersionDiscard {
            version_id: version.clone(),
        })
    }

    pub fn version_unpublish(version: &DocumentId) -> Result<Self> {
        require_version(version)?;
        Ok(Action::VersionUnpublish {
            version_id: version.clone(),
            published_id: version.to_published(),
        })
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Publish { .. } => ActionKind::Publish,
            Action::Unpublish { .. } => ActionKind::Unpublish,
            Action::Delete { .. } => ActionKind::Delete,
            Action::VersionReplace { .. } => ActionKind::VersionReplace,
            Action::VersionDiscard { .. } => ActionKind::VersionDiscard,
            Action::VersionUnpublish { .. } => ActionKind::VersionUnpublish,
        }
    }

    /// The id whose state the action transitions.
    pub fn target(&self) -> String {
        match self {
            Action::Publish { draft_id, .. } => draft_id.to_string(),
            Action::Unpublish { published_id, .. } | Action::Delete { published_id, .. } => {
                published_id.to_string()
            }
            Action::VersionReplace { document } => document.id.clone(),
            Action::VersionDiscard { version_id } | Action::VersionUnpublish { version_id, .. } => {
                version_id.to_string()
            }
        }
    }
}

fn require_version(id: &DocumentId) -> Result<()> {
    if id.is_version() {
        Ok(())
    } else {
        Err(Error::InvalidIdKind {
            id: id.to_string(),
            reason: "expected a version id".to_string(),
        })
    }
}

/// Issue one action against the store.
///
/// No retries and no interpretation of store errors: a failure surfaces as
/// [`Error::ExternalActionFailure`] carrying the store's error unchanged.
pub async fn dispatch<S>(store: &S, action: &Action) -> Result<ActionResult>
where
    S: ContentStore + ?Sized,
{
    let kind = action.kind();
    let target = action.target();
    tracing::debug!(action = %kind, target = %target, "Dispatching action");

    let result = store.perform_action(action).await.map_err(|e| {
        tracing::debug!(action = %kind, target = %target, error = %e, "Action failed");
        Error::ExternalActionFailure(e)
    })?;

    tracing::info!(
        action = %kind,
        target = %target,
        transaction = %result.transaction_id,
        "Action applied"
    );
    Ok(result)
}
