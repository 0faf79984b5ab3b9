//! Document identity and release-versioning transactions
//!
//! This crate is the transaction layer between a tool surface and a remote,
//! versioned content store. It implements:
//!
//! - **ID resolution**: mapping raw ids to their published, draft, or
//!   release-scoped version form
//! - **Checkpoints**: snapshots captured right before a mutation
//! - **Action dispatch**: the six state-transition requests a store accepts
//! - **Bulk coordination**: bounded batches with independent per-item failure
//!
//! # Architecture
//!
//! ```text
//!            DocumentService
//!                  |
//!        +---------+---------+
//!        |                   |
//!   bulk coordinator    (single item)
//!        |                   |
//!        +---> id resolver --+--> checkpoint --> action dispatch
//!                                     |               |
//!                                     +--> ContentStore (HTTP / memory)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use content_core::{ClientConfig, DocumentService, MemoryStore};
//!
//! async fn example() -> content_core::Result<()> {
//!     let service = DocumentService::new(
//!         Arc::new(MemoryStore::new()),
//!         ClientConfig::new("project", "production"),
//!     );
//!     let payload = service.publish(&["drafts.abc".to_string()]).await?;
//!     println!("{}", payload.message);
//!     Ok(())
//! }
//! ```

pub mod action;
pub mod bulk;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod id;
pub mod memory;
pub mod service;
pub mod store;

pub use action::{Action, ActionKind, dispatch};
pub use bulk::{
    BatchSummary, BulkResult, DEFAULT_MAX_BATCH_SIZE, ItemOutcome, ensure_batch_size,
    process_batch,
};
pub use checkpoint::{Checkpoint, creation_checkpoint, mutation_checkpoint};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use id::{
    DocumentId, DraftHandling, ReleaseId, ReleaseTarget, draft_id_of, published_id_of, resolve,
    resolve_with, version_id_of,
};
pub use memory::MemoryStore;
pub use service::{DocumentService, OperationPayload, TransitionOutcome};
pub use store::{ActionResult, ContentStore, Document, DocumentSource, Mutation, StoreError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_pass_through_unchanged() {
        let store_error = StoreError::Rejected {
            status: 409,
            message: "Document has been modified".to_string(),
        };
        let error: Error = store_error.clone().into();

        assert_eq!(error.to_string(), store_error.to_string());
        assert!(matches!(error, Error::ExternalActionFailure(inner) if inner == store_error));
    }
}
