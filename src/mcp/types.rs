//! Tool parameter types for the MCP server

use crate::error::{CoreError, Result};
use crate::store::{Importance, ImportanceFilter, SortBy};
use serde::Deserialize;
use serde_json::{Map, Value};

/// `manage_memory` tool parameters
#[derive(Debug, Clone, Deserialize)]
pub struct ManageMemoryParams {
    pub action: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default, alias = "entryId")]
    pub entry_id: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub importance: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default)]
    pub confirm: bool,
}

impl ManageMemoryParams {
    /// Parsed importance, `None` when omitted
    pub fn importance(&self) -> Result<Option<Importance>> {
        self.importance
            .as_deref()
            .map(|raw| {
                Importance::from_str(raw).ok_or_else(|| {
                    CoreError::Validation(format!(
                        "invalid importance '{}'. Valid values: low, medium, high",
                        raw
                    ))
                })
            })
            .transpose()
    }
}

/// `query_memory` tool parameters
#[derive(Debug, Clone, Deserialize)]
pub struct QueryMemoryParams {
    pub action: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default = "default_sort_by", alias = "sortBy")]
    pub sort_by: String,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_importance_filter")]
    pub importance: String,
    #[serde(default, alias = "entryId")]
    pub entry_id: String,
}

fn default_sort_by() -> String {
    "time".to_string()
}

fn default_importance_filter() -> String {
    "all".to_string()
}

impl QueryMemoryParams {
    pub fn sort_by(&self) -> Result<SortBy> {
        SortBy::from_str(&self.sort_by).ok_or_else(|| {
            CoreError::Validation(format!(
                "invalid sort_by '{}'. Valid values: time, importance",
                self.sort_by
            ))
        })
    }

    pub fn importance_filter(&self) -> Result<ImportanceFilter> {
        ImportanceFilter::from_str(&self.importance).ok_or_else(|| {
            CoreError::Validation(format!(
                "invalid importance '{}'. Valid values: all, low, medium, high",
                self.importance
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_manage_defaults() {
        let params: ManageMemoryParams =
            serde_json::from_value(json!({"action": "create_topic", "topic": "T"})).unwrap();
        assert!(!params.confirm);
        assert!(params.importance().unwrap().is_none());
        assert!(params.entry_id.is_empty());
    }

    #[test]
    fn test_manage_importance_validation() {
        let params: ManageMemoryParams = serde_json::from_value(
            json!({"action": "create_entry", "importance": "critical", "entryId": "e1"}),
        )
        .unwrap();
        assert!(matches!(params.importance(), Err(CoreError::Validation(_))));
        assert_eq!(params.entry_id, "e1");
    }

    #[test]
    fn test_query_defaults() {
        let params: QueryMemoryParams =
            serde_json::from_value(json!({"action": "search", "query": "x"})).unwrap();
        assert_eq!(params.sort_by().unwrap(), SortBy::Time);
        assert_eq!(params.importance_filter().unwrap(), ImportanceFilter::All);
        assert!(params.limit.is_none());
    }

    #[test]
    fn test_query_rejects_bad_enums() {
        let params: QueryMemoryParams = serde_json::from_value(
            json!({"action": "view_topic", "sortBy": "size", "importance": "urgent"}),
        )
        .unwrap();
        assert!(params.sort_by().is_err());
        assert!(params.importance_filter().is_err());
    }
}
