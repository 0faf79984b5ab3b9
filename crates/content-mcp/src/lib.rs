//! MCP server for document publishing and release versioning
//!
//! Exposes [`content_core::DocumentService`] operations as Model Context
//! Protocol tools.
//!
//! # Architecture
//!
//! ```text
//! [ MCP Client ]
//!        | (JSON-RPC over stdio)
//!        v
//! [ content-mcp (tool server) ]
//!        | (Rust API)
//!        v
//! [ content-core (ids, checkpoints, actions, batches) ]
//!        |
//!        +--> [ content-http (remote data API) ]
//!        +--> [ MemoryStore (local, --memory) ]
//! ```
//!
//! Tool failures are returned as tool results with `isError: true` whose
//! text is the failure payload `{"message": ...}`.

pub mod error;
pub mod handlers;
pub mod protocol;
pub mod server;
pub mod tools;

pub use error::{Error, Result};
pub use handlers::handle_tool_call;
pub use server::ContentMcpServer;
pub use tools::{ToolContent, ToolDefinition, ToolResult, get_tool_definitions};
