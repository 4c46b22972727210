//! Model Context Protocol server exposing the `get_transcript` tool over
//! stateless streamable HTTP.

use std::sync::Arc;

use axum::Router;
use log::debug;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::resolver;
use crate::youtube::TranscriptBackend;

pub const SERVER_NAME: &str = "YouTube Transcript";
const INSTRUCTIONS: &str = "MCP server for fetching YouTube video transcripts";

const TOOL_NAME: &str = "get_transcript";
const TOOL_DESCRIPTION: &str = "Fetch the transcript (subtitles) of a YouTube video without watching it. \
Returns JSON with the full transcript text, the language used, the available subtitle tracks \
(and whether each is auto-generated) and the video ID.";

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetTranscriptInput {
    /// YouTube video ID or full URL (e.g. "dQw4w9WgXcQ" or "https://youtube.com/shorts/dQw4w9WgXcQ")
    pub video: String,
    /// Comma-separated language codes in priority order (default: "en,ru")
    #[serde(default)]
    pub languages: Option<String>,
    /// Prefix each line with [MM:SS]
    #[serde(default = "default_timestamps")]
    pub timestamps: bool,
}

fn default_timestamps() -> bool {
    true
}

#[derive(Clone)]
pub struct TranscriptServer {
    backend: Arc<dyn TranscriptBackend>,
    /// Used when a call omits `languages`
    default_languages: String,
}

impl TranscriptServer {
    pub fn new(backend: Arc<dyn TranscriptBackend>, default_languages: impl Into<String>) -> Self {
        Self {
            backend,
            default_languages: default_languages.into(),
        }
    }

    pub fn tools(&self) -> Vec<Tool> {
        let schema = match serde_json::to_value(schemars::schema_for!(GetTranscriptInput)) {
            Ok(Value::Object(map)) => map,
            _ => JsonObject::new(),
        };
        vec![Tool::new(TOOL_NAME, TOOL_DESCRIPTION, Arc::new(schema))]
    }

    /// Run a `tools/call` request. Backend failures come back as a tool
    /// result with `isError` set; only malformed calls are protocol errors.
    pub async fn call(&self, request: CallToolRequestParam) -> Result<CallToolResult, McpError> {
        if request.name != TOOL_NAME {
            return Err(McpError::invalid_params(format!("Unknown tool: {}", request.name), None));
        }

        let args = Value::Object(request.arguments.unwrap_or_default());
        let input: GetTranscriptInput = serde_json::from_value(args)
            .map_err(|e| McpError::invalid_params(format!("Invalid arguments for {TOOL_NAME}: {e}"), None))?;

        let languages = input.languages.as_deref().unwrap_or(self.default_languages.as_str());
        let result = resolver::get_transcript(self.backend.as_ref(), &input.video, languages, input.timestamps).await;
        let text = result
            .to_json()
            .map_err(|e| McpError::internal_error(format!("Encoding result failed: {e}"), None))?;

        let content = vec![Content::text(text)];
        Ok(if result.is_failure() {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        })
    }
}

impl ServerHandler for TranscriptServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                title: None,
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tools(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        debug!("Tool call: {}", request.name);
        self.call(request).await
    }
}

/// Axum router serving the MCP endpoint at `/mcp`. No sessions are kept.
pub fn router(server: TranscriptServer) -> Router {
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig {
            stateful_mode: false,
            ..Default::default()
        },
    );
    Router::new().nest_service("/mcp", service)
}

/// Bind the listen socket. `host` may be a hostname such as "localhost" as
/// well as an IP literal.
pub async fn bind(host: &str, port: u16) -> std::io::Result<tokio::net::TcpListener> {
    tokio::net::TcpListener::bind((host, port)).await
}
