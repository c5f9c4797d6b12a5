//! MCP tool handlers
//! Implements the tools/list and tools/call methods

use serde_json::{json, Value};
use std::panic::{self, AssertUnwindSafe};

use super::protocol::{
    InitializeResult, JsonRpcError, JsonRpcResponse, ResourcesCapability, ServerCapabilities,
    ServerInfo, ToolCallResult, ToolDefinition, ToolsCapability,
};
use super::types::{ManageMemoryParams, QueryMemoryParams};
use super::McpState;
use crate::error::{CoreError, Result};
use crate::store::{
    lock_store, DeletePreview, Importance, MatchField, MemoryEntry, MemoryStore, SortBy,
    TopicSummary,
};

pub const MANAGE_TOOL: &str = "manage_memory";
pub const QUERY_TOOL: &str = "query_memory";
pub const STATS_TOOL: &str = "memory_stats";

/// Handle the initialize method
pub fn handle_initialize(id: Value, state: &McpState) -> JsonRpcResponse {
    let result = InitializeResult {
        protocol_version: state.config.server.protocol_version.clone(),
        capabilities: ServerCapabilities {
            tools: ToolsCapability {
                list_changed: Some(false),
            },
            resources: Some(ResourcesCapability {
                subscribe: false,
                list_changed: Some(false),
            }),
        },
        server_info: ServerInfo {
            name: state.config.server.name.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    };

    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string())),
    }
}

/// Handle the tools/list method
pub fn handle_tools_list(id: Value, state: &McpState) -> JsonRpcResponse {
    let default_limit = state.config.query.default_limit;
    let tools = vec![
        ToolDefinition {
            name: MANAGE_TOOL.to_string(),
            description: "Create, update or delete memory topics and the entries stored under them.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "action": {
                        "type": "string",
                        "enum": ["create_topic", "create_entry", "update_topic", "update_entry", "delete_topic", "delete_entry"],
                        "description": "Operation to perform"
                    },
                    "topic": {
                        "type": "string",
                        "minLength": 1,
                        "maxLength": 100,
                        "description": "Topic name"
                    },
                    "description": {
                        "type": "string",
                        "description": "Topic description (empty leaves it unchanged on update)"
                    },
                    "tags": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Topic tags (empty leaves them unchanged on update)"
                    },
                    "entry_id": {
                        "type": "string",
                        "description": "Entry ID for update_entry and delete_entry"
                    },
                    "content": {
                        "type": "string",
                        "description": "Entry content (required for create_entry)"
                    },
                    "importance": {
                        "type": "string",
                        "enum": ["low", "medium", "high"],
                        "default": "medium",
                        "description": "Entry importance"
                    },
                    "context": {
                        "type": "string",
                        "description": "Optional context for the entry"
                    },
                    "metadata": {
                        "type": "object",
                        "description": "Arbitrary key/value metadata; merged into existing metadata on update"
                    },
                    "confirm": {
                        "type": "boolean",
                        "default": false,
                        "description": "Must be true to actually delete a topic"
                    }
                },
                "required": ["action", "topic"]
            }),
        },
        ToolDefinition {
            name: QUERY_TOOL.to_string(),
            description: "List topics, view a topic's entries, search all entries, or fetch an entry by ID.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "action": {
                        "type": "string",
                        "enum": ["list_topics", "view_topic", "search", "get_entry"],
                        "description": "Query to run"
                    },
                    "topic": {
                        "type": "string",
                        "description": "Topic name for view_topic"
                    },
                    "sort_by": {
                        "type": "string",
                        "enum": ["time", "importance"],
                        "default": "time",
                        "description": "Ordering for view_topic"
                    },
                    "limit": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": 100,
                        "default": default_limit,
                        "description": "Maximum number of results"
                    },
                    "query": {
                        "type": "string",
                        "description": "Case-insensitive text to search for"
                    },
                    "importance": {
                        "type": "string",
                        "enum": ["all", "low", "medium", "high"],
                        "default": "all",
                        "description": "Importance filter for search"
                    },
                    "entry_id": {
                        "type": "string",
                        "description": "Entry ID for get_entry"
                    }
                },
                "required": ["action"]
            }),
        },
        ToolDefinition {
            name: STATS_TOOL.to_string(),
            description: "Show memory store statistics: counts, sizes, access tracking and importance distribution.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
    ];

    JsonRpcResponse::success(id, json!({ "tools": tools }))
}

/// Handle the tools/call method
pub fn handle_tools_call(id: Value, params: Option<Value>, state: &McpState) -> JsonRpcResponse {
    let params = match params {
        Some(p) => p,
        None => {
            return JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_params("Missing params".to_string()),
            );
        }
    };

    let tool_name = match params.get("name").and_then(|v| v.as_str()) {
        Some(name) => name,
        None => {
            return JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_params("Missing tool name".to_string()),
            );
        }
    };

    let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

    tracing::debug!("Tool call: {}", tool_name);

    // A fault inside a tool must not take the server down
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        call_tool(tool_name, arguments, state)
    }))
    .unwrap_or_else(|_| {
        tracing::error!("Tool {} panicked", tool_name);
        ToolCallResult::error(format!(
            "Internal error while running {}. The operation was aborted.",
            tool_name
        ))
    });

    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string())),
    }
}

/// Handle the resources/list method; the store exposes no resources
pub fn handle_resources_list(id: Value) -> JsonRpcResponse {
    JsonRpcResponse::success(id, json!({ "resources": [] }))
}

fn call_tool(tool_name: &str, arguments: Value, state: &McpState) -> ToolCallResult {
    let outcome = match tool_name {
        MANAGE_TOOL => handle_manage_memory(arguments, state),
        QUERY_TOOL => handle_query_memory(arguments, state),
        STATS_TOOL => Ok(handle_memory_stats(state)),
        _ => return ToolCallResult::error(format!("Unknown tool: {}", tool_name)),
    };

    match outcome {
        Ok(text) => ToolCallResult::text(text),
        Err(e) => {
            tracing::debug!("Tool {} failed: {}", tool_name, e);
            ToolCallResult::error(render_error(&e))
        }
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(arguments: Value) -> Result<T> {
    serde_json::from_value(arguments)
        .map_err(|e| CoreError::Validation(format!("Invalid parameters: {}", e)))
}

fn handle_manage_memory(arguments: Value, state: &McpState) -> Result<String> {
    let params: ManageMemoryParams = parse_params(arguments)?;
    let mut store = lock_store(&state.store);

    match params.action.as_str() {
        "create_topic" => create_topic(&params, &mut store),
        "create_entry" => create_entry(&params, &mut store),
        "update_topic" => update_topic(&params, &mut store),
        "update_entry" => update_entry(&params, &mut store),
        "delete_topic" => delete_topic(&params, &mut store),
        "delete_entry" => delete_entry(&params, &mut store),
        other => Err(CoreError::UnsupportedOperation(format!(
            "'{}' is not a {} action. Valid actions: create_topic, create_entry, update_topic, update_entry, delete_topic, delete_entry",
            other, MANAGE_TOOL
        ))),
    }
}

fn create_topic(params: &ManageMemoryParams, store: &mut MemoryStore) -> Result<String> {
    let summary = store.create_topic(
        &params.topic,
        params.description.as_deref().unwrap_or_default(),
        params.tags.as_deref().unwrap_or_default(),
    )?;

    Ok(format!(
        "Created topic '{}'.\n\n{}",
        summary.name,
        format_topic(&summary)
    ))
}

fn create_entry(params: &ManageMemoryParams, store: &mut MemoryStore) -> Result<String> {
    let importance = params.importance()?.unwrap_or_default();
    let entry = store.create_entry(
        &params.topic,
        params.content.as_deref().unwrap_or_default(),
        importance,
        params.context.as_deref(),
        params.metadata.clone().unwrap_or_default(),
    )?;

    Ok(format!(
        "Added entry to topic '{}'.\n\n{}",
        params.topic,
        format_entry(&entry, "")
    ))
}

fn update_topic(params: &ManageMemoryParams, store: &mut MemoryStore) -> Result<String> {
    let summary = store.update_topic(
        &params.topic,
        params.description.as_deref(),
        params.tags.as_deref(),
    )?;

    Ok(format!(
        "Updated topic '{}'.\n\n{}",
        summary.name,
        format_topic(&summary)
    ))
}

fn update_entry(params: &ManageMemoryParams, store: &mut MemoryStore) -> Result<String> {
    require_entry_id(&params.entry_id)?;
    let importance = params.importance()?;
    let entry = store.update_entry(
        &params.topic,
        &params.entry_id,
        params.content.as_deref(),
        importance,
        params.context.as_deref(),
        params.metadata.as_ref(),
    )?;

    Ok(format!(
        "Updated entry in topic '{}'.\n\n{}",
        params.topic,
        format_entry(&entry, "")
    ))
}

fn delete_topic(params: &ManageMemoryParams, store: &mut MemoryStore) -> Result<String> {
    let removed = store.delete_topic(&params.topic, params.confirm)?;

    Ok(format!(
        "Deleted topic '{}' and its {} entries.",
        removed.name, removed.entry_count
    ))
}

fn delete_entry(params: &ManageMemoryParams, store: &mut MemoryStore) -> Result<String> {
    require_entry_id(&params.entry_id)?;
    let removed = store.delete_entry(&params.topic, &params.entry_id)?;

    Ok(format!(
        "Deleted entry from topic '{}'.\n\n{}",
        params.topic,
        format_entry(&removed, "")
    ))
}

fn require_entry_id(entry_id: &str) -> Result<()> {
    if entry_id.trim().is_empty() {
        return Err(CoreError::Validation("entry_id is required".to_string()));
    }
    Ok(())
}

fn handle_query_memory(arguments: Value, state: &McpState) -> Result<String> {
    let params: QueryMemoryParams = parse_params(arguments)?;
    let limit = params.limit.unwrap_or(state.config.query.default_limit);
    let store = lock_store(&state.store);

    match params.action.as_str() {
        "list_topics" => Ok(list_topics(&store)),
        "view_topic" => view_topic(&params, limit, &store),
        "search" => search(&params, limit, &store),
        "get_entry" => get_entry(&params, &store),
        other => Err(CoreError::UnsupportedOperation(format!(
            "'{}' is not a {} action. Valid actions: list_topics, view_topic, search, get_entry",
            other, QUERY_TOOL
        ))),
    }
}

fn list_topics(store: &MemoryStore) -> String {
    let topics = store.list_topics();
    if topics.is_empty() {
        return "No topics stored yet.".to_string();
    }

    let mut output = format!("Found {} topics:\n\n", topics.len());
    for (i, topic) in topics.iter().enumerate() {
        output.push_str(&format!("{}. {}\n", i + 1, format_topic(topic)));
    }
    output
}

fn view_topic(params: &QueryMemoryParams, limit: usize, store: &MemoryStore) -> Result<String> {
    let sort_by = params.sort_by()?;
    let view = store.view_topic(&params.topic, sort_by, limit)?;

    if view.total == 0 {
        return Ok(format!(
            "Topic '{}' has no entries.\n\n{}",
            view.topic.name,
            format_topic(&view.topic)
        ));
    }

    let order = match sort_by {
        SortBy::Time => "newest first",
        SortBy::Importance => "by importance",
    };
    let mut output = format!(
        "Topic '{}' ({} entries, {}):\n",
        view.topic.name, view.total, order
    );
    if !view.topic.description.is_empty() {
        output.push_str(&format!("{}\n", view.topic.description));
    }
    output.push('\n');

    for (i, entry) in view.entries.iter().enumerate() {
        output.push_str(&format!("{}. {}\n", i + 1, format_entry(entry, "   ")));
    }

    let hidden = view.hidden();
    if hidden > 0 {
        output.push_str(&format!("... {} more entries not shown\n", hidden));
    }

    Ok(output)
}

fn search(params: &QueryMemoryParams, limit: usize, store: &MemoryStore) -> Result<String> {
    let filter = params.importance_filter()?;
    let hits = store.search(&params.query, filter, limit)?;

    if hits.is_empty() {
        return Ok(format!("No memories matching '{}'.", params.query));
    }

    let mut output = format!(
        "Found {} memories matching '{}':\n\n",
        hits.len(),
        params.query
    );
    for (i, hit) in hits.iter().enumerate() {
        output.push_str(&format!(
            "{}. [{}] relevance {} (matched {})\n   {}\n",
            i + 1,
            hit.topic,
            hit.relevance,
            match_label(hit.matched),
            format_entry(&hit.entry, "   ")
        ));
    }
    Ok(output)
}

fn get_entry(params: &QueryMemoryParams, store: &MemoryStore) -> Result<String> {
    require_entry_id(&params.entry_id)?;
    let located = store.get_entry(&params.entry_id)?;

    Ok(format!(
        "Entry in topic '{}':\n\n{}",
        located.topic,
        format_entry(&located.entry, "")
    ))
}

fn match_label(matched: MatchField) -> &'static str {
    match matched {
        MatchField::Content => "content",
        MatchField::Context => "context",
        MatchField::Metadata => "metadata",
    }
}

fn handle_memory_stats(state: &McpState) -> String {
    let stats = lock_store(&state.store).stats();
    let dist = stats.importance_distribution;

    let mut output = String::from("## Memory Statistics\n\n");
    output.push_str(&format!("Topics: {}\n", stats.topic_count));
    output.push_str(&format!("Entries: {}\n", stats.entry_count));
    output.push_str(&format!("Total size: {} chars\n", stats.total_size));
    output.push_str(&format!(
        "Average entry size: {:.1} chars\n",
        stats.average_entry_size
    ));
    output.push_str(&format!("Access count: {}\n", stats.access_count));
    output.push_str(&format!(
        "Last access: {}\n",
        stats.last_access.as_deref().unwrap_or("never")
    ));
    output.push_str("\n### Importance\n");
    output.push_str(&format!("- {}: {}\n", Importance::High.as_str(), dist.high));
    output.push_str(&format!("- {}: {}\n", Importance::Medium.as_str(), dist.medium));
    output.push_str(&format!("- {}: {}\n", Importance::Low.as_str(), dist.low));
    output
}

fn format_topic(topic: &TopicSummary) -> String {
    let mut output = format!("{} ({} entries)\n", topic.name, topic.entry_count);
    if !topic.description.is_empty() {
        output.push_str(&format!("   Description: {}\n", topic.description));
    }
    if !topic.tags.is_empty() {
        output.push_str(&format!("   Tags: {}\n", topic.tags.join(", ")));
    }
    output.push_str(&format!(
        "   Created: {} | Updated: {}\n",
        topic.created_at, topic.updated_at
    ));
    output
}

/// Entry block; continuation lines are prefixed with `indent`
fn format_entry(entry: &MemoryEntry, indent: &str) -> String {
    let mut output = format!("[{}] {}\n", entry.importance.as_str(), entry.content);
    output.push_str(&format!("{}   ID: {}\n", indent, entry.id));
    if let Some(ctx) = &entry.context {
        output.push_str(&format!("{}   Context: {}\n", indent, ctx));
    }
    if !entry.metadata.is_empty() {
        let metadata = Value::Object(entry.metadata.clone());
        output.push_str(&format!("{}   Metadata: {}\n", indent, metadata));
    }
    output.push_str(&format!(
        "{}   Created: {} | Updated: {}\n",
        indent, entry.created_at, entry.updated_at
    ));
    output
}

fn format_preview(preview: &DeletePreview) -> String {
    let mut output = format!(
        "Deleting topic '{}' requires confirmation.\n\n",
        preview.name
    );
    if !preview.description.is_empty() {
        output.push_str(&format!("Description: {}\n", preview.description));
    }
    if !preview.tags.is_empty() {
        output.push_str(&format!("Tags: {}\n", preview.tags.join(", ")));
    }
    output.push_str(&format!("Entries: {}\n", preview.entry_count));
    output.push_str(&format!("Created: {}\n", preview.created_at));
    output.push_str(
        "\nThis removes the topic and all of its entries. Repeat the call with confirm: true to proceed.",
    );
    output
}

/// Failure text shown to the caller
fn render_error(error: &CoreError) -> String {
    match error {
        CoreError::AlreadyExists(existing) => format!(
            "Topic '{}' already exists.\n\n{}",
            existing.name,
            format_topic(existing)
        ),
        CoreError::ConfirmationRequired(preview) => format_preview(preview),
        other => other.to_string(),
    }
}
