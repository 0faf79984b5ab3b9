//! In-process content store
//!
//! [`MemoryStore`] applies actions and mutations to a map of documents with
//! the same transition rules the remote store enforces. It backs the test
//! suites and the server's offline mode.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::action::Action;
use crate::id::{DocumentId, ReleaseId};
use crate::store::{ActionResult, ContentStore, Document, DocumentSource, Mutation, StoreError};

/// Field set on a version by `version.unpublish`
pub const SYSTEM_FIELD: &str = "_system";

/// Thread-safe in-memory document store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<BTreeMap<String, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `documents`, each given a fresh revision.
    pub fn with_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        let store = Self::new();
        for document in documents {
            store.insert(document);
        }
        store
    }

    /// Insert or replace a document, returning its new revision.
    pub fn insert(&self, mut document: Document) -> String {
        let rev = new_revision();
        document.rev = rev.clone();
        self.documents.lock().insert(document.id.clone(), document);
        rev
    }

    pub fn get(&self, id: &str) -> Option<Document> {
        self.documents.lock().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.documents.lock().contains_key(id)
    }

    /// All stored ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        self.documents.lock().keys().cloned().collect()
    }

    /// Apply every version in `release` to its published document.
    ///
    /// Versions marked by `version.unpublish` remove the published document
    /// instead of updating it. Returns the ids of the affected published
    /// documents.
    pub fn publish_release(&self, release: &ReleaseId) -> Vec<String> {
        let mut documents = self.documents.lock();

        let versions: Vec<(DocumentId, Document)> = documents
            .values()
            .filter_map(|doc| match DocumentId::parse(&doc.id) {
                Ok(id) if id.release() == Some(release) => Some((id, doc.clone())),
                _ => None,
            })
            .collect();

        let mut affected = Vec::with_capacity(versions.len());
        for (id, version) in versions {
            let published = id.to_published().to_string();
            documents.remove(&version.id);

            if is_marked_for_unpublish(&version) {
                documents.remove(&published);
            } else {
                let mut next = version.with_id(published.clone());
                next.rev = new_revision();
                documents.insert(published.clone(), next);
            }
            affected.push(published);
        }

        tracing::debug!(release = %release, count = affected.len(), "Published release");
        affected
    }

    fn apply_action(&self, action: &Action) -> Result<(), StoreError> {
        let mut documents = self.documents.lock();

        match action {
            Action::Publish {
                draft_id,
                published_id,
            } => {
                let draft = documents
                    .remove(&draft_id.to_string())
                    .ok_or_else(|| conflict(format!("draft {} does not exist", draft_id)))?;
                let mut published = draft.with_id(published_id.to_string());
                published.rev = new_revision();
                documents.insert(published.id.clone(), published);
            }

            Action::Unpublish {
                draft_id,
                published_id,
            } => {
                let published = documents
                    .remove(&published_id.to_string())
                    .ok_or_else(|| conflict(format!("document {} is not published", published_id)))?;
                let draft_key = draft_id.to_string();
                if !documents.contains_key(&draft_key) {
                    let mut draft = published.with_id(draft_key.clone());
                    draft.rev = new_revision();
                    documents.insert(draft_key, draft);
                }
            }

            Action::Delete {
                published_id,
                include_drafts,
            } => {
                let mut removed = documents.remove(&published_id.to_string()).is_some();
                for draft in include_drafts {
                    removed |= documents.remove(&draft.to_string()).is_some();
                }
                if !removed {
                    return Err(conflict(format!("document {} does not exist", published_id)));
                }
            }

            Action::VersionReplace { document } => {
                if !documents.contains_key(&document.id) {
                    return Err(conflict(format!("version {} does not exist", document.id)));
                }
                let mut next = document.clone();
                next.rev = new_revision();
                documents.insert(next.id.clone(), next);
            }

            Action::VersionDiscard { version_id } => {
                documents
                    .remove(&version_id.to_string())
                    .ok_or_else(|| conflict(format!("version {} does not exist", version_id)))?;
            }

            Action::VersionUnpublish { version_id, .. } => {
                let version = documents
                    .get_mut(&version_id.to_string())
                    .ok_or_else(|| conflict(format!("version {} does not exist", version_id)))?;
                version
                    .fields
                    .insert(SYSTEM_FIELD.to_string(), json!({ "delete": true }));
                version.rev = new_revision();
            }
        }

        Ok(())
    }

    fn apply_mutation(&self, mutation: &Mutation) -> Result<(), StoreError> {
        let mut documents = self.documents.lock();

        match mutation {
            Mutation::Create { document } => {
                if documents.contains_key(&document.id) {
                    return Err(conflict(format!("document {} already exists", document.id)));
                }
                let mut next = document.clone();
                next.rev = new_revision();
                documents.insert(next.id.clone(), next);
            }

            Mutation::Patch {
                id,
                if_revision_id,
                set,
                unset,
            } => {
                let document = documents
                    .get_mut(&id.to_string())
                    .ok_or_else(|| not_found(format!("document {} does not exist", id)))?;
                if let Some(expected) = if_revision_id {
                    if &document.rev != expected {
                        return Err(conflict(format!(
                            "revision mismatch for {}: expected {}, found {}",
                            id, expected, document.rev
                        )));
                    }
                }
                for (key, value) in set {
                    document.fields.insert(key.clone(), value.clone());
                }
                for key in unset {
                    document.fields.remove(key);
                }
                document.rev = new_revision();
            }
        }

        Ok(())
    }
}

/// Whether `version.unpublish` has been applied to this version.
pub fn is_marked_for_unpublish(document: &Document) -> bool {
    document
        .get(SYSTEM_FIELD)
        .and_then(|system| system.get("delete"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn new_revision() -> String {
    Uuid::new_v4().simple().to_string()
}

fn new_transaction() -> ActionResult {
    ActionResult {
        transaction_id: Uuid::new_v4().to_string(),
    }
}

fn conflict(message: String) -> StoreError {
    StoreError::Rejected {
        status: 409,
        message,
    }
}

fn not_found(message: String) -> StoreError {
    StoreError::Rejected {
        status: 404,
        message,
    }
}

#[async_trait]
impl DocumentSource for MemoryStore {
    async fn fetch_document(&self, id: &DocumentId) -> Result<Option<Document>, StoreError> {
        Ok(self.get(&id.to_string()))
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn perform_action(&self, action: &Action) -> Result<ActionResult, StoreError> {
        self.apply_action(action)?;
        Ok(new_transaction())
    }

    async fn mutate(&self, mutation: &Mutation) -> Result<ActionResult, StoreError> {
        self.apply_mutation(mutation)?;
        Ok(new_transaction())
    }
}
