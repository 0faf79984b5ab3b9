//! MCP tool definitions
//!
//! # Tool Categories
//!
//! ## Documents
//! - `get_document` - Fetch a document, optionally from a release
//! - `create_document` - Create a draft, or a version inside a release
//! - `patch_document` - Set and unset fields on a draft or version
//!
//! ## Publishing
//! - `publish_documents` - Promote drafts to published
//! - `unpublish_documents` - Demote published documents to drafts
//! - `delete_documents` - Remove documents and their drafts
//!
//! ## Release Versions
//! - `create_version` - Copy a document into a release
//! - `replace_version` - Overwrite a version with another document's content
//! - `discard_versions` - Remove versions from a release
//! - `unpublish_versions` - Unpublish documents when their release is published

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Tool definition for MCP protocol
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Result from a tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

/// Content types for tool results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolResult {
    /// Create a successful text result
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: content.into(),
            }],
            is_error: None,
        }
    }

    /// Create an error result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: Some(true),
        }
    }
}

fn tool(name: &str, description: &str, input_schema: Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

fn ids_schema(description: &str) -> Value {
    json!({
        "type": "array",
        "items": { "type": "string" },
        "minItems": 1,
        "maxItems": 10,
        "description": description
    })
}

/// Get all available tool definitions
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        // Documents
        tool(
            "get_document",
            "Fetch a document by id. Draft and version ids resolve to the published form unless a release is given",
            json!({
                "type": "object",
                "properties": {
                    "id": { "type": "string", "description": "Document id in any form" },
                    "release_id": { "type": "string", "description": "Release to read the version from" }
                },
                "required": ["id"]
            }),
        ),
        tool(
            "create_document",
            "Create a new document as a draft, or as a version inside a release",
            json!({
                "type": "object",
                "properties": {
                    "type": { "type": "string", "description": "Document type" },
                    "fields": { "type": "object", "description": "Initial field values" },
                    "release_id": { "type": "string", "description": "Release to create the version in" }
                },
                "required": ["type"]
            }),
        ),
        tool(
            "patch_document",
            "Set and unset fields. Published targets are redirected to their draft",
            json!({
                "type": "object",
                "properties": {
                    "id": { "type": "string", "description": "Document id in any form" },
                    "release_id": { "type": "string", "description": "Release holding the version to edit" },
                    "set": { "type": "object", "description": "Field values to set" },
                    "unset": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Field paths to remove"
                    }
                },
                "required": ["id"]
            }),
        ),
        // Publishing
        tool(
            "publish_documents",
            "Publish the drafts of the given documents",
            json!({
                "type": "object",
                "properties": { "ids": ids_schema("Document ids in any form") },
                "required": ["ids"]
            }),
        ),
        tool(
            "unpublish_documents",
            "Unpublish documents, keeping their content as drafts",
            json!({
                "type": "object",
                "properties": { "ids": ids_schema("Document ids in any form") },
                "required": ["ids"]
            }),
        ),
        tool(
            "delete_documents",
            "Delete documents together with their drafts",
            json!({
                "type": "object",
                "properties": { "ids": ids_schema("Document ids in any form") },
                "required": ["ids"]
            }),
        ),
        // Release Versions
        tool(
            "create_version",
            "Copy a document into a release, from its draft when one exists",
            json!({
                "type": "object",
                "properties": {
                    "id": { "type": "string", "description": "Document id in any form" },
                    "release_id": { "type": "string", "description": "Target release" }
                },
                "required": ["id", "release_id"]
            }),
        ),
        tool(
            "replace_version",
            "Overwrite a release version with the content of another document",
            json!({
                "type": "object",
                "properties": {
                    "id": { "type": "string", "description": "Document id in any form" },
                    "release_id": { "type": "string", "description": "Release holding the version" },
                    "source_id": { "type": "string", "description": "Exact id of the document to copy from" }
                },
                "required": ["id", "release_id", "source_id"]
            }),
        ),
        tool(
            "discard_versions",
            "Remove versions from a release",
            json!({
                "type": "object",
                "properties": {
                    "ids": ids_schema("Document ids in any form"),
                    "release_id": { "type": "string", "description": "Release holding the versions" }
                },
                "required": ["ids", "release_id"]
            }),
        ),
        tool(
            "unpublish_versions",
            "Mark documents to be unpublished when the release is published",
            json!({
                "type": "object",
                "properties": {
                    "ids": ids_schema("Document ids in any form"),
                    "release_id": { "type": "string", "description": "Release holding the versions" }
                },
                "required": ["ids", "release_id"]
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tool_names_are_unique() {
        let tools = get_tool_definitions();
        let names: HashSet<_> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names.len(), tools.len());
        assert_eq!(tools.len(), 10);
    }

    #[test]
    fn every_schema_is_an_object_with_required_fields() {
        for tool in get_tool_definitions() {
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
            assert!(
                tool.input_schema["required"].is_array(),
                "{} has no required list",
                tool.name
            );
        }
    }

    #[test]
    fn error_result_sets_flag() {
        let json = serde_json::to_value(ToolResult::error("boom")).unwrap();
        assert_eq!(json["isError"], true);
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][0]["text"], "boom");
    }

    #[test]
    fn text_result_omits_flag() {
        let json = serde_json::to_value(ToolResult::text("ok")).unwrap();
        assert!(json.get("isError").is_none());
    }
}
