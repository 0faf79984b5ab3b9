//! Pre-mutation checkpoints
//!
//! A checkpoint records where a document stood right before this core touched
//! it, so callers can detect drift or audit afterwards. Checkpoints are
//! returned alongside operation results and never stored here.

use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::id::DocumentId;
use crate::store::DocumentSource;
use crate::{Error, Result};

/// Immutable snapshot taken for one operation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Checkpoint {
    /// Document is about to be created; no prior revision exists
    #[serde(rename_all = "camelCase")]
    Create {
        project_id: String,
        dataset: String,
        #[serde(rename = "_id")]
        id: String,
    },
    /// Document is about to be mutated at this revision
    #[serde(rename_all = "camelCase")]
    Mutate {
        project_id: String,
        dataset: String,
        #[serde(rename = "_id")]
        id: String,
        #[serde(rename = "_rev")]
        rev: String,
    },
}

impl Checkpoint {
    /// Id the checkpoint was taken for.
    pub fn document_id(&self) -> &str {
        match self {
            Checkpoint::Create { id, .. } | Checkpoint::Mutate { id, .. } => id,
        }
    }

    /// Revision observed before mutation; `None` for creations.
    pub fn revision(&self) -> Option<&str> {
        match self {
            Checkpoint::Create { .. } => None,
            Checkpoint::Mutate { rev, .. } => Some(rev),
        }
    }
}

/// Checkpoint for a document about to be created.
///
/// New content always starts as a draft or a version, so `id` is expected to
/// be resolved to one of those forms already. It is recorded verbatim.
pub fn creation_checkpoint(config: &ClientConfig, id: &DocumentId) -> Checkpoint {
    Checkpoint::Create {
        project_id: config.project_id.clone(),
        dataset: config.dataset.clone(),
        id: id.to_string(),
    }
}

/// Fetch the current state of `id` and record its revision.
///
/// Fails with [`Error::NotFound`] when nothing exists at `id`, which lets
/// callers stop before mutating a missing target. The recorded id is the one
/// the store returned, which may differ from the requested one.
pub async fn mutation_checkpoint<S>(
    config: &ClientConfig,
    id: &DocumentId,
    source: &S,
) -> Result<Checkpoint>
where
    S: DocumentSource + ?Sized,
{
    let document = source
        .fetch_document(id)
        .await?
        .ok_or_else(|| Error::not_found(id))?;

    tracing::debug!(id = %document.id, rev = %document.rev, "Captured mutation checkpoint");

    Ok(Checkpoint::Mutate {
        project_id: config.project_id.clone(),
        dataset: config.dataset.clone(),
        id: document.id,
        rev: document.rev,
    })
}
