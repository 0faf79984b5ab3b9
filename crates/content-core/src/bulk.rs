//! Bulk operation coordination
//!
//! Applies one per-item operation to a bounded list of inputs. Items run
//! concurrently and fail independently; outcomes come back in input order.

use std::future::Future;

use futures_util::future::join_all;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::{Error, Result};

/// Default cap on items per batch, bounding concurrent fan-out against the store.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 10;

/// Outcome of one item in a batch.
///
/// Serializes as `{"success": true, "payload": ...}` or
/// `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome<T> {
    Success(T),
    Failure(String),
}

impl<T> ItemOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ItemOutcome::Success(_))
    }

    pub fn payload(&self) -> Option<&T> {
        match self {
            ItemOutcome::Success(payload) => Some(payload),
            ItemOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ItemOutcome::Success(_) => None,
            ItemOutcome::Failure(message) => Some(message),
        }
    }
}

impl<T: Serialize> Serialize for ItemOutcome<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("ItemOutcome", 2)?;
        match self {
            ItemOutcome::Success(payload) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("payload", payload)?;
            }
            ItemOutcome::Failure(error) => {
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
            }
        }
        state.end()
    }
}

/// Aggregate counts for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

/// Result of a batch: per-item outcomes at their input index, plus counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkResult<T> {
    pub results: Vec<ItemOutcome<T>>,
    pub summary: BatchSummary,
}

impl<T> BulkResult<T> {
    pub fn from_outcomes(results: Vec<ItemOutcome<T>>) -> Self {
        let total = results.len();
        let successful = results.iter().filter(|r| r.is_success()).count();
        Self {
            results,
            summary: BatchSummary {
                total,
                successful,
                failed: total - successful,
            },
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.summary.failed == 0
    }

    /// Successful payloads, in input order.
    pub fn payloads(&self) -> impl Iterator<Item = &T> {
        self.results.iter().filter_map(ItemOutcome::payload)
    }

    /// Failed items as [`Error::BatchItemFailure`], in input order.
    pub fn failures(&self) -> impl Iterator<Item = Error> + '_ {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(index, outcome)| {
                outcome.error().map(|message| Error::BatchItemFailure {
                    index,
                    message: message.to_string(),
                })
            })
    }
}

/// Reject batches above `max` before any item runs.
pub fn ensure_batch_size(size: usize, max: usize) -> Result<()> {
    if size > max {
        return Err(Error::BatchTooLarge { size, max });
    }
    Ok(())
}

/// Run `operation` for every item and collect the outcomes.
///
/// A single item is awaited directly; larger batches run concurrently. Either
/// way, an item's error is caught at the item boundary and recorded as its
/// outcome, so it never affects sibling items.
pub async fn process_batch<I, T, F, Fut>(items: Vec<I>, operation: F) -> BulkResult<T>
where
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let settled = if items.len() == 1 {
        let mut direct = Vec::with_capacity(1);
        for item in items {
            direct.push(operation(item).await);
        }
        direct
    } else {
        join_all(items.into_iter().map(&operation)).await
    };

    let outcomes = settled
        .into_iter()
        .enumerate()
        .map(|(index, result)| match result {
            Ok(payload) => ItemOutcome::Success(payload),
            Err(e) => {
                tracing::warn!(index, error = %e, "Batch item failed");
                ItemOutcome::Failure(e.to_string())
            }
        })
        .collect();

    BulkResult::from_outcomes(outcomes)
}
