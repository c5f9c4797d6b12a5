//! MCP (Model Context Protocol) server for AI assistant integration
//!
//! Exposes the topic store as three tools:
//! - `manage_memory`: create/update/delete topics and entries
//! - `query_memory`: list topics, view a topic, search, get an entry by ID
//! - `memory_stats`: usage counters and importance distribution
//!
//! The server communicates over stdio using newline-delimited JSON-RPC 2.0.
//! Requests are handled one at a time on a blocking thread.

mod handlers;
mod protocol;
pub(crate) mod types;

use crate::config::Config;
use crate::error::{CoreError, Result};
use crate::store::SharedStore;
use crate::Core;
use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use serde_json::Value;
use std::io::{BufRead, Write};

pub use handlers::{MANAGE_TOOL, QUERY_TOOL, STATS_TOOL};

/// State shared by every request of one server
pub struct McpState {
    pub(crate) store: SharedStore,
    pub(crate) config: Config,
}

impl McpState {
    pub fn new(store: SharedStore, config: Config) -> Self {
        Self { store, config }
    }
}

/// Run the MCP server over stdio
pub async fn run_mcp_server(core: Core) -> Result<()> {
    let state = McpState::new(core.store.clone(), core.config.clone());

    tracing::info!("Starting MCP server (stdio mode)");

    // Run the blocking stdio loop in a separate thread
    let result = tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        serve(stdin.lock(), stdout.lock(), &state)
    })
    .await;

    match result {
        Ok(Ok(())) => {
            tracing::info!("stdin closed, MCP server stopping");
            Ok(())
        }
        Ok(Err(e)) => {
            tracing::error!("MCP server error: {}", e);
            Err(e)
        }
        Err(e) => {
            tracing::error!("MCP server task panicked: {}", e);
            Err(CoreError::Transport(e.to_string()))
        }
    }
}

/// Event loop: read JSON-RPC requests line by line, write one response line
/// per request (none for notifications).
pub fn serve<R: BufRead, W: Write>(reader: R, mut writer: W, state: &McpState) -> Result<()> {
    for line in reader.lines() {
        let line = line.map_err(|e| CoreError::Transport(format!("Failed to read line: {}", e)))?;

        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
            Ok(request) => handle_request(request, state),
            Err(e) => Some(JsonRpcResponse::error(
                Value::Null,
                JsonRpcError::parse_error(format!("Invalid JSON: {}", e)),
            )),
        };

        let Some(response) = response else {
            continue;
        };

        let response_json = serde_json::to_string(&response)?;
        writeln!(writer, "{}", response_json)
            .map_err(|e| CoreError::Transport(format!("Failed to write: {}", e)))?;
        writer
            .flush()
            .map_err(|e| CoreError::Transport(format!("Failed to flush: {}", e)))?;
    }

    Ok(())
}

/// Handle a single JSON-RPC request; `None` for notifications
fn handle_request(request: JsonRpcRequest, state: &McpState) -> Option<JsonRpcResponse> {
    if request.is_notification() {
        tracing::debug!("Notification: {}", request.method);
        return None;
    }
    let id = request.id.unwrap_or(Value::Null);

    if request.jsonrpc != "2.0" {
        return Some(JsonRpcResponse::error(
            id,
            JsonRpcError::invalid_request(format!(
                "Unsupported jsonrpc version: {}",
                request.jsonrpc
            )),
        ));
    }

    let response = match request.method.as_str() {
        // MCP protocol methods
        "initialize" => handlers::handle_initialize(id, state),
        "initialized" | "notifications/initialized" => {
            JsonRpcResponse::success(id, serde_json::json!({}))
        }
        "tools/list" => handlers::handle_tools_list(id, state),
        "tools/call" => handlers::handle_tools_call(id, request.params, state),
        "resources/list" => handlers::handle_resources_list(id),
        "ping" => JsonRpcResponse::success(id, serde_json::json!({})),

        // Unknown method
        _ => JsonRpcResponse::error(
            id,
            JsonRpcError::method_not_found(format!("Unknown method: {}", request.method)),
        ),
    };
    Some(response)
}
