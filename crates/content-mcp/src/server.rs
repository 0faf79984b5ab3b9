//! MCP Server implementation
//!
//! Coordinates MCP protocol handling with the document service.

use std::io::{BufRead, Write};

use content_core::DocumentService;
use serde_json::{Value, json};

use crate::handlers::handle_tool_call;
use crate::protocol::{
    INTERNAL_ERROR, INVALID_PARAMS, InitializeResult, JsonRpcRequest, JsonRpcResponse,
    METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION, ServerCapabilities, ServerInfo,
    ToolCallParams, ToolsCapability,
};
use crate::tools::{ToolDefinition, ToolResult, get_tool_definitions};
use crate::{Error, Result};

/// MCP server for document publishing and release versioning
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use content_core::{ClientConfig, DocumentService, MemoryStore};
/// use content_mcp::ContentMcpServer;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ClientConfig::new("p1", "production");
///     let service = DocumentService::new(Arc::new(MemoryStore::new()), config);
///     ContentMcpServer::new(service).run().await?;
///     Ok(())
/// }
/// ```
pub struct ContentMcpServer {
    service: DocumentService,

    /// Whether the server has been initialized
    initialized: bool,

    /// Available MCP tools
    tools: Vec<ToolDefinition>,
}

impl ContentMcpServer {
    pub fn new(service: DocumentService) -> Self {
        Self {
            service,
            initialized: false,
            tools: Vec::new(),
        }
    }

    /// Load tool definitions and mark the server ready.
    pub async fn initialize(&mut self) -> Result<()> {
        let config = self.service.config();
        tracing::info!(
            project = %config.project_id,
            dataset = %config.dataset,
            "Initializing MCP server"
        );

        self.tools = get_tool_definitions();
        self.initialized = true;
        Ok(())
    }

    /// Run the MCP server
    ///
    /// Processes JSON-RPC messages over stdin/stdout until stdin closes.
    pub async fn run(&mut self) -> Result<()> {
        self.initialize().await?;

        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();

        tracing::info!("MCP server ready, listening on stdio");

        for line in stdin.lock().lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            tracing::debug!(request = %line, "Received message");

            let response = match self.handle_message(&line).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to handle message");
                    serde_json::to_string(&JsonRpcResponse::error(
                        None,
                        INTERNAL_ERROR,
                        format!("Internal error: {}", e),
                    ))?
                }
            };

            // Notifications produce no response
            if !response.is_empty() {
                writeln!(stdout, "{}", response)?;
                stdout.flush()?;
            }
        }

        Ok(())
    }

    /// Handle a single JSON-RPC message
    ///
    /// Returns the serialized response, or an empty string for notifications.
    pub async fn handle_message(&self, message: &str) -> Result<String> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(request) => request,
            Err(e) => {
                let response =
                    JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {}", e));
                return serde_json::to_string(&response).map_err(Error::from);
            }
        };

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id)?,
            "initialized" | "notifications/initialized" => return Ok(String::new()),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await?,
            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };

        serde_json::to_string(&response).map_err(Error::from)
    }

    fn handle_initialize(&self, id: Option<Value>) -> Result<JsonRpcResponse> {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: "content-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        Ok(JsonRpcResponse::success(id, serde_json::to_value(result)?))
    }

    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let tools = if self.tools.is_empty() {
            get_tool_definitions()
        } else {
            self.tools.clone()
        };
        JsonRpcResponse::success(id, json!({ "tools": tools }))
    }

    /// Execute the requested tool.
    ///
    /// Tool failures are reported in-band as an error result carrying the
    /// failure payload, not as JSON-RPC errors.
    async fn handle_tools_call(&self, id: Option<Value>, params: Value) -> Result<JsonRpcResponse> {
        let tool_params: ToolCallParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(e) => {
                return Ok(JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    format!("Invalid params: {}", e),
                ));
            }
        };

        tracing::info!(tool = %tool_params.name, "Calling tool");

        let tool_result =
            match handle_tool_call(&self.service, &tool_params.name, tool_params.arguments).await {
                Ok(payload) => ToolResult::text(serde_json::to_string_pretty(&payload)?),
                Err(e) => {
                    tracing::warn!(tool = %tool_params.name, error = %e, "Tool failed");
                    ToolResult::error(json!({ "message": e.to_string() }).to_string())
                }
            };

        Ok(JsonRpcResponse::success(id, serde_json::to_value(tool_result)?))
    }

    pub fn service(&self) -> &DocumentService {
        &self.service
    }

    /// Check if the server is initialized
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Get available tools
    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use content_core::{ClientConfig, MemoryStore};

    fn server() -> ContentMcpServer {
        let service = DocumentService::new(
            Arc::new(MemoryStore::new()),
            ClientConfig::new("p1", "production"),
        );
        ContentMcpServer::new(service)
    }

    #[test]
    fn server_creation() {
        let server = server();
        assert!(!server.is_initialized());
        assert!(server.tools().is_empty());
        assert_eq!(server.service().config().dataset, "production");
    }

    #[tokio::test]
    async fn server_loads_tools_on_initialize() {
        let mut server = server();
        server.initialize().await.unwrap();
        assert!(server.is_initialized());
        assert_eq!(server.tools().len(), 10);
    }

    #[tokio::test]
    async fn notification_has_no_response() {
        let server = server();
        let response = server
            .handle_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await
            .unwrap();
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_parse_error() {
        let server = server();
        let response: Value =
            serde_json::from_str(&server.handle_message("{not json").await.unwrap()).unwrap();
        assert_eq!(response["error"]["code"], PARSE_ERROR);
    }
}
