//! Document operations
//!
//! [`DocumentService`] is the single set of entry points over the pipeline:
//! resolve the id, capture a checkpoint, then dispatch the transition. Batch
//! entry points run that pipeline per item through [`process_batch`].

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::action::{Action, ActionKind, dispatch};
use crate::bulk::{BulkResult, ensure_batch_size, process_batch};
use crate::checkpoint::{Checkpoint, creation_checkpoint, mutation_checkpoint};
use crate::config::ClientConfig;
use crate::id::{DocumentId, ReleaseId, ReleaseTarget, resolve, resolve_with};
use crate::store::{ContentStore, Document, Mutation};
use crate::{Error, Result};

/// Success payload handed to the response layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationPayload {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checkpoints: Vec<Checkpoint>,
}

/// Result of one dispatched transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionOutcome {
    pub document_id: String,
    pub action: &'static str,
    pub transaction_id: String,
    pub checkpoint: Checkpoint,
}

/// Entry points for reading, editing, and transitioning documents.
#[derive(Clone)]
pub struct DocumentService {
    store: Arc<dyn ContentStore>,
    config: Arc<ClientConfig>,
}

impl DocumentService {
    pub fn new(store: Arc<dyn ContentStore>, config: ClientConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    /// Fetch a document, resolving `id` against an optional release.
    pub async fn get_document(&self, id: &str, release: Option<&str>) -> Result<OperationPayload> {
        let target = release_target(release)?;
        let id = resolve_with(id, &target, self.config.draft_handling)?;

        let document = self
            .store
            .fetch_document(&id)
            .await?
            .ok_or_else(|| Error::not_found(&id))?;

        Ok(OperationPayload {
            message: format!("Found document {}", document.id),
            data: Some(serde_json::to_value(&document)?),
            checkpoints: Vec::new(),
        })
    }

    /// Create a new document of `doc_type` as a draft, or as a version when
    /// `release` is given.
    pub async fn create_document(
        &self,
        doc_type: &str,
        mut fields: Map<String, Value>,
        release: Option<&str>,
    ) -> Result<OperationPayload> {
        ensure_user_fields(fields.keys())?;
        let base = Uuid::new_v4().to_string();
        let id = match release {
            Some(release) => DocumentId::Version {
                release: ReleaseId::new(release)?,
                published: base,
            },
            None => DocumentId::Draft(base),
        };

        let checkpoint = creation_checkpoint(&self.config, &id);
        fields.insert("_type".to_string(), Value::String(doc_type.to_string()));
        let document = Document::new(id.to_string(), fields);

        let result = self.store.mutate(&Mutation::Create { document }).await?;
        tracing::info!(id = %id, doc_type, "Created document");

        Ok(OperationPayload {
            message: format!("Created document {}", id),
            data: Some(json!({ "documentId": id, "transactionId": result.transaction_id })),
            checkpoints: vec![checkpoint],
        })
    }

    /// Copy a document's current content into `release`.
    ///
    /// The draft is the source when one exists, otherwise the published
    /// document.
    pub async fn create_version(&self, id: &str, release: &str) -> Result<OperationPayload> {
        let release = ReleaseId::new(release)?;
        let base = resolve(id, &ReleaseTarget::PublishedOnly)?;
        let version = base.to_version(&release);

        let source = match self.store.fetch_document(&base.to_draft()).await? {
            Some(draft) => draft,
            None => self
                .store
                .fetch_document(&base)
                .await?
                .ok_or_else(|| Error::not_found(&base))?,
        };

        let checkpoint = creation_checkpoint(&self.config, &version);
        let document = source.with_id(version.to_string());
        let result = self.store.mutate(&Mutation::Create { document }).await?;
        tracing::info!(id = %version, source = %source.id, "Created version");

        Ok(OperationPayload {
            message: format!("Created version {} from {}", version, source.id),
            data: Some(json!({ "documentId": version, "transactionId": result.transaction_id })),
            checkpoints: vec![checkpoint],
        })
    }

    /// Set and unset fields on a document.
    ///
    /// Edits never land on published content: a published resolution is
    /// redirected to the draft. The write is conditional on the revision
    /// captured in the checkpoint.
    pub async fn patch_document(
        &self,
        id: &str,
        release: Option<&str>,
        set: Map<String, Value>,
        unset: Vec<String>,
    ) -> Result<OperationPayload> {
        if set.is_empty() && unset.is_empty() {
            return Err(Error::NoChangesRequested);
        }
        ensure_user_fields(set.keys().chain(unset.iter()))?;

        let target = release_target(release)?;
        let resolved = resolve_with(id, &target, self.config.draft_handling)?;
        let id = if resolved.is_published() {
            resolved.to_draft()
        } else {
            resolved
        };

        let checkpoint = mutation_checkpoint(&self.config, &id, self.store.as_ref()).await?;
        let patch = Mutation::Patch {
            id: DocumentId::parse(checkpoint.document_id())?,
            if_revision_id: checkpoint.revision().map(str::to_string),
            set,
            unset,
        };

        let result = self.store.mutate(&patch).await?;
        tracing::info!(id = %id, transaction = %result.transaction_id, "Patched document");

        Ok(OperationPayload {
            message: format!("Updated document {}", checkpoint.document_id()),
            data: Some(json!({
                "documentId": checkpoint.document_id(),
                "transactionId": result.transaction_id,
            })),
            checkpoints: vec![checkpoint],
        })
    }

    /// Promote drafts to published.
    pub async fn publish(&self, ids: &[String]) -> Result<OperationPayload> {
        self.run_bulk(ActionKind::Publish, ids, |raw| self.publish_one(raw))
            .await
    }

    /// Demote published documents to drafts.
    pub async fn unpublish(&self, ids: &[String]) -> Result<OperationPayload> {
        self.run_bulk(ActionKind::Unpublish, ids, |raw| self.unpublish_one(raw))
            .await
    }

    /// Remove published documents together with their drafts.
    pub async fn delete(&self, ids: &[String]) -> Result<OperationPayload> {
        self.run_bulk(ActionKind::Delete, ids, |raw| self.delete_one(raw))
            .await
    }

    /// Overwrite the version of `id` in `release` with the content of `source_id`.
    pub async fn replace_version(
        &self,
        id: &str,
        release: &str,
        source_id: &str,
    ) -> Result<OperationPayload> {
        let release = ReleaseId::new(release)?;
        let version = resolve(id, &ReleaseTarget::Release(release))?;
        let source_id = DocumentId::parse(source_id)?;

        let source = self
            .store
            .fetch_document(&source_id)
            .await?
            .ok_or_else(|| Error::not_found(&source_id))?;

        let checkpoint = mutation_checkpoint(&self.config, &version, self.store.as_ref()).await?;
        let action = Action::version_replace(&version, &source)?;
        let outcome = self.transition(&version, checkpoint, action).await?;

        Ok(OperationPayload {
            message: format!("Replaced version {} with content from {}", version, source_id),
            checkpoints: vec![outcome.checkpoint.clone()],
            data: Some(serde_json::to_value(&outcome)?),
        })
    }

    /// Remove versions from `release`.
    pub async fn discard_versions(&self, ids: &[String], release: &str) -> Result<OperationPayload> {
        let release = ReleaseId::new(release)?;
        self.run_bulk(ActionKind::VersionDiscard, ids, |raw| {
            self.version_transition(raw, &release, Action::version_discard)
        })
        .await
    }

    /// Mark versions in `release` to unpublish their document once the
    /// release is published.
    pub async fn unpublish_versions(
        &self,
        ids: &[String],
        release: &str,
    ) -> Result<OperationPayload> {
        let release = ReleaseId::new(release)?;
        self.run_bulk(ActionKind::VersionUnpublish, ids, |raw| {
            self.version_transition(raw, &release, Action::version_unpublish)
        })
        .await
    }

    async fn publish_one(&self, raw: String) -> Result<TransitionOutcome> {
        let id = resolve(&raw, &ReleaseTarget::PublishedOnly)?;
        let checkpoint =
            mutation_checkpoint(&self.config, &id.to_draft(), self.store.as_ref()).await?;
        self.transition(&id, checkpoint, Action::publish(&id)).await
    }

    async fn unpublish_one(&self, raw: String) -> Result<TransitionOutcome> {
        let id = resolve(&raw, &ReleaseTarget::PublishedOnly)?;
        let checkpoint = mutation_checkpoint(&self.config, &id, self.store.as_ref()).await?;
        self.transition(&id, checkpoint, Action::unpublish(&id)).await
    }

    async fn delete_one(&self, raw: String) -> Result<TransitionOutcome> {
        let id = resolve(&raw, &ReleaseTarget::PublishedOnly)?;
        // Either form is enough to delete; prefer the published one
        let checkpoint = match mutation_checkpoint(&self.config, &id, self.store.as_ref()).await {
            Err(Error::NotFound { .. }) => {
                mutation_checkpoint(&self.config, &id.to_draft(), self.store.as_ref()).await?
            }
            other => other?,
        };
        self.transition(&id, checkpoint, Action::delete(&id)).await
    }

    async fn version_transition(
        &self,
        raw: String,
        release: &ReleaseId,
        build: fn(&DocumentId) -> Result<Action>,
    ) -> Result<TransitionOutcome> {
        let version = resolve(&raw, &ReleaseTarget::Release(release.clone()))?;
        let checkpoint = mutation_checkpoint(&self.config, &version, self.store.as_ref()).await?;
        let action = build(&version)?;
        self.transition(&version, checkpoint, action).await
    }

    async fn transition(
        &self,
        id: &DocumentId,
        checkpoint: Checkpoint,
        action: Action,
    ) -> Result<TransitionOutcome> {
        let result = dispatch(self.store.as_ref(), &action).await?;
        Ok(TransitionOutcome {
            document_id: id.to_string(),
            action: action.kind().as_str(),
            transaction_id: result.transaction_id,
            checkpoint,
        })
    }

    async fn run_bulk<F, Fut>(
        &self,
        kind: ActionKind,
        ids: &[String],
        operation: F,
    ) -> Result<OperationPayload>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<TransitionOutcome>>,
    {
        ensure_batch_size(ids.len(), self.config.max_batch_size)?;

        let result: BulkResult<TransitionOutcome> = process_batch(ids.to_vec(), operation).await;
        let summary = result.summary;
        tracing::info!(
            action = %kind,
            total = summary.total,
            successful = summary.successful,
            failed = summary.failed,
            "Batch completed"
        );

        let checkpoints = result.payloads().map(|o| o.checkpoint.clone()).collect();
        Ok(OperationPayload {
            message: format!(
                "{}: {} of {} document(s) succeeded",
                kind, summary.successful, summary.total
            ),
            data: Some(serde_json::to_value(&result)?),
            checkpoints,
        })
    }
}

/// Reject system fields: flattened into the stored document, they would
/// shadow its real `_id` and `_rev`.
fn ensure_user_fields<'a>(mut fields: impl Iterator<Item = &'a String>) -> Result<()> {
    match fields.find(|field| field.starts_with('_')) {
        Some(field) => Err(Error::ReservedField {
            field: field.clone(),
        }),
        None => Ok(()),
    }
}

fn release_target(release: Option<&str>) -> Result<ReleaseTarget> {
    Ok(release.map(ReleaseId::new).transpose()?.into())
}
