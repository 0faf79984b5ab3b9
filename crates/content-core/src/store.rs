//! Backing content-store collaborator
//!
//! The core never talks to the remote system of record directly; it goes
//! through these traits. [`crate::MemoryStore`] implements them in-process,
//! and the `content-http` crate implements them over HTTP.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::action::Action;
use crate::id::DocumentId;

/// Errors reported by a store implementation. Opaque to the core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Request never produced a response (connection, timeout, ...)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Store refused the request
    #[error("Store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Response could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

/// A stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", default, skip_serializing_if = "String::is_empty")]
    pub rev: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            rev: String::new(),
            fields,
        }
    }

    /// Copy of this document's content under a different id, without a revision.
    pub fn with_id(&self, id: impl Into<String>) -> Self {
        Self::new(id, self.fields.clone())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// Outcome of a successful action or mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub transaction_id: String,
}

/// Direct document writes, as opposed to state-transition [`Action`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Create a document; fails if the id is taken
    Create { document: Document },
    /// Set and unset top-level fields, conditional on the current revision
    Patch {
        id: DocumentId,
        if_revision_id: Option<String>,
        set: Map<String, Value>,
        unset: Vec<String>,
    },
}

impl Mutation {
    /// Wire representation inside a `mutations` array
    pub fn to_json(&self) -> Value {
        match self {
            Mutation::Create { document } => serde_json::json!({ "create": document }),
            Mutation::Patch {
                id,
                if_revision_id,
                set,
                unset,
            } => {
                let mut patch = Map::new();
                patch.insert("id".into(), Value::String(id.to_string()));
                if let Some(rev) = if_revision_id {
                    patch.insert("ifRevisionID".into(), Value::String(rev.clone()));
                }
                if !set.is_empty() {
                    patch.insert("set".into(), Value::Object(set.clone()));
                }
                if !unset.is_empty() {
                    patch.insert("unset".into(), serde_json::json!(unset));
                }
                serde_json::json!({ "patch": patch })
            }
        }
    }
}

/// Fetch capability used to capture checkpoints.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// `Ok(None)` when no document exists at `id`.
    async fn fetch_document(&self, id: &DocumentId) -> Result<Option<Document>, StoreError>;
}

/// Full store collaborator.
#[async_trait]
pub trait ContentStore: DocumentSource {
    /// Send one atomic state-transition request.
    async fn perform_action(&self, action: &Action) -> Result<ActionResult, StoreError>;

    /// Apply one document mutation.
    async fn mutate(&self, mutation: &Mutation) -> Result<ActionResult, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_flattens_fields() {
        let doc: Document = serde_json::from_value(json!({
            "_id": "drafts.abc",
            "_rev": "r1",
            "_type": "post",
            "title": "Hello"
        }))
        .unwrap();

        assert_eq!(doc.id, "drafts.abc");
        assert_eq!(doc.rev, "r1");
        assert_eq!(doc.get("title"), Some(&json!("Hello")));
        assert_eq!(doc.get("_type"), Some(&json!("post")));
    }

    #[test]
    fn patch_wire_format_omits_empty_parts() {
        let mut set = Map::new();
        set.insert("title".into(), json!("New"));
        let mutation = Mutation::Patch {
            id: DocumentId::parse("drafts.abc").unwrap(),
            if_revision_id: Some("r1".into()),
            set,
            unset: vec![],
        };

        assert_eq!(
            mutation.to_json(),
            json!({ "patch": { "id": "drafts.abc", "ifRevisionID": "r1", "set": { "title": "New" } } })
        );
    }
}
