//! MCP tool handlers
//!
//! Each handler deserializes its arguments and delegates to
//! [`DocumentService`]. The returned value is the operation's payload.

use content_core::{DocumentService, OperationPayload};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Handle a tool call by dispatching to the appropriate handler
pub async fn handle_tool_call(
    service: &DocumentService,
    tool_name: &str,
    arguments: Value,
) -> Result<Value> {
    let payload = match tool_name {
        // Documents
        "get_document" => handle_get_document(service, arguments).await?,
        "create_document" => handle_create_document(service, arguments).await?,
        "patch_document" => handle_patch_document(service, arguments).await?,

        // Publishing
        "publish_documents" => {
            let args: IdsArgs = parse_args(arguments)?;
            service.publish(&args.ids).await?
        }
        "unpublish_documents" => {
            let args: IdsArgs = parse_args(arguments)?;
            service.unpublish(&args.ids).await?
        }
        "delete_documents" => {
            let args: IdsArgs = parse_args(arguments)?;
            service.delete(&args.ids).await?
        }

        // Release Versions
        "create_version" => handle_create_version(service, arguments).await?,
        "replace_version" => handle_replace_version(service, arguments).await?,
        "discard_versions" => {
            let args: VersionIdsArgs = parse_args(arguments)?;
            service.discard_versions(&args.ids, &args.release_id).await?
        }
        "unpublish_versions" => {
            let args: VersionIdsArgs = parse_args(arguments)?;
            service
                .unpublish_versions(&args.ids, &args.release_id)
                .await?
        }

        _ => return Err(Error::UnknownTool(tool_name.to_string())),
    };

    to_value(payload)
}

fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T> {
    // Tools without required fields may be called with no arguments at all
    let arguments = if arguments.is_null() {
        Value::Object(Map::new())
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| Error::InvalidArgument(e.to_string()))
}

fn to_value(payload: OperationPayload) -> Result<Value> {
    Ok(serde_json::to_value(payload)?)
}

// ============================================================================
// Document Handlers
// ============================================================================

#[derive(Debug, Deserialize)]
struct GetDocumentArgs {
    id: String,
    #[serde(default)]
    release_id: Option<String>,
}

async fn handle_get_document(
    service: &DocumentService,
    arguments: Value,
) -> Result<OperationPayload> {
    let args: GetDocumentArgs = parse_args(arguments)?;
    Ok(service
        .get_document(&args.id, args.release_id.as_deref())
        .await?)
}

#[derive(Debug, Deserialize)]
struct CreateDocumentArgs {
    #[serde(rename = "type")]
    doc_type: String,
    #[serde(default)]
    fields: Map<String, Value>,
    #[serde(default)]
    release_id: Option<String>,
}

async fn handle_create_document(
    service: &DocumentService,
    arguments: Value,
) -> Result<OperationPayload> {
    let args: CreateDocumentArgs = parse_args(arguments)?;
    Ok(service
        .create_document(&args.doc_type, args.fields, args.release_id.as_deref())
        .await?)
}

#[derive(Debug, Deserialize)]
struct PatchDocumentArgs {
    id: String,
    #[serde(default)]
    release_id: Option<String>,
    #[serde(default)]
    set: Map<String, Value>,
    #[serde(default)]
    unset: Vec<String>,
}

async fn handle_patch_document(
    service: &DocumentService,
    arguments: Value,
) -> Result<OperationPayload> {
    let args: PatchDocumentArgs = parse_args(arguments)?;
    Ok(service
        .patch_document(&args.id, args.release_id.as_deref(), args.set, args.unset)
        .await?)
}

// ============================================================================
// Publishing Handlers
// ============================================================================

#[derive(Debug, Deserialize)]
struct IdsArgs {
    ids: Vec<String>,
}

// ============================================================================
// Release Version Handlers
// ============================================================================

#[derive(Debug, Deserialize)]
struct CreateVersionArgs {
    id: String,
    release_id: String,
}

async fn handle_create_version(
    service: &DocumentService,
    arguments: Value,
) -> Result<OperationPayload> {
    let args: CreateVersionArgs = parse_args(arguments)?;
    Ok(service.create_version(&args.id, &args.release_id).await?)
}

#[derive(Debug, Deserialize)]
struct ReplaceVersionArgs {
    id: String,
    release_id: String,
    source_id: String,
}

async fn handle_replace_version(
    service: &DocumentService,
    arguments: Value,
) -> Result<OperationPayload> {
    let args: ReplaceVersionArgs = parse_args(arguments)?;
    Ok(service
        .replace_version(&args.id, &args.release_id, &args.source_id)
        .await?)
}

#[derive(Debug, Deserialize)]
struct VersionIdsArgs {
    ids: Vec<String>,
    release_id: String,
}
