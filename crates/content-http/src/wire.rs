//! Endpoint URLs and response decoding
//!
//! Pure helpers shared by the blocking request path, kept apart so they can
//! be tested without a network.

use content_core::{ActionResult, ClientConfig, Document, StoreError};
use serde::Deserialize;
use serde_json::Value;

/// Longest raw body echoed back in an error message
const MAX_ERROR_BODY: usize = 300;

/// Versioned API endpoints for one project and dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
    dataset: String,
}

impl Endpoints {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base: format!("{}/v{}", config.api_base_url(), config.api_version),
            dataset: config.dataset.clone(),
        }
    }

    pub fn document(&self, id: &str) -> String {
        format!("{}/data/doc/{}/{}", self.base, self.dataset, id)
    }

    pub fn actions(&self) -> String {
        format!("{}/data/actions/{}", self.base, self.dataset)
    }

    pub fn mutate(&self) -> String {
        format!("{}/data/mutate/{}", self.base, self.dataset)
    }
}

#[derive(Deserialize)]
struct DocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
}

/// First document of a `data/doc` response, if any.
pub fn decode_document(body: &str) -> Result<Option<Document>, StoreError> {
    let response: DocumentsResponse =
        serde_json::from_str(body).map_err(|e| StoreError::Decode(e.to_string()))?;
    Ok(response.documents.into_iter().next())
}

pub fn decode_transaction(body: &str) -> Result<ActionResult, StoreError> {
    serde_json::from_str(body).map_err(|e| StoreError::Decode(e.to_string()))
}

/// Human-readable message from an error response body.
///
/// Prefers `error.description`, then `message`, then `error` as a string,
/// and finally the (truncated) raw body.
pub fn error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        let candidates = [
            json.pointer("/error/description"),
            json.get("message"),
            json.get("error"),
        ];
        if let Some(message) = candidates.into_iter().flatten().find_map(Value::as_str) {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn endpoints_from_config() {
        let endpoints = Endpoints::new(&ClientConfig::new("p1", "production"));

        assert_eq!(
            endpoints.document("drafts.abc"),
            "https://p1.api.sanity.io/v2025-02-19/data/doc/production/drafts.abc"
        );
        assert_eq!(
            endpoints.actions(),
            "https://p1.api.sanity.io/v2025-02-19/data/actions/production"
        );
        assert_eq!(
            endpoints.mutate(),
            "https://p1.api.sanity.io/v2025-02-19/data/mutate/production"
        );
    }

    #[test]
    fn decode_empty_documents_is_not_found() {
        assert_eq!(decode_document(r#"{"documents": []}"#).unwrap(), None);
        assert_eq!(decode_document(r#"{}"#).unwrap(), None);
    }

    #[test]
    fn decode_first_document() {
        let doc = decode_document(r#"{"documents": [{"_id": "abc", "_rev": "r1", "title": "T"}]}"#)
            .unwrap()
            .unwrap();
        assert_eq!(doc.id, "abc");
        assert_eq!(doc.rev, "r1");
    }

    #[test]
    fn decode_transaction_id() {
        let result = decode_transaction(r#"{"transactionId": "tx-1"}"#).unwrap();
        assert_eq!(result.transaction_id, "tx-1");
        assert!(matches!(decode_transaction("not json"), Err(StoreError::Decode(_))));
    }

    #[rstest]
    #[case(r#"{"error": {"description": "Document not found"}}"#, "Document not found")]
    #[case(r#"{"message": "Unauthorized"}"#, "Unauthorized")]
    #[case(r#"{"error": "Bad request"}"#, "Bad request")]
    #[case("  plain text  ", "plain text")]
    fn error_messages(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(error_message(body), expected);
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "x".repeat(1000);
        let message = error_message(&body);
        assert_eq!(message.len(), MAX_ERROR_BODY + 3);
        assert!(message.ends_with("..."));
    }
}
