//! Topic and entry types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordinal classification of an entry (low < medium < high)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    #[default]
    Medium,
    High,
}

impl Importance {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Importance::Low),
            "medium" => Some(Importance::Medium),
            "high" => Some(Importance::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::Low => "low",
            Importance::Medium => "medium",
            Importance::High => "high",
        }
    }

    /// Sort weight: high=3, medium=2, low=1
    pub fn weight(&self) -> u8 {
        match self {
            Importance::Low => 1,
            Importance::Medium => 2,
            Importance::High => 3,
        }
    }
}

/// Importance filter for search (`all` disables filtering)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportanceFilter {
    #[default]
    All,
    Only(Importance),
}

impl ImportanceFilter {
    pub fn from_str(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Some(ImportanceFilter::All);
        }
        Importance::from_str(s).map(ImportanceFilter::Only)
    }

    pub fn matches(&self, importance: Importance) -> bool {
        match self {
            ImportanceFilter::All => true,
            ImportanceFilter::Only(wanted) => *wanted == importance,
        }
    }
}

/// Ordering for `view_topic`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Creation time, most recent first
    #[default]
    Time,
    /// Importance, high first; ties keep insertion order
    Importance,
}

impl SortBy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "time" => Some(SortBy::Time),
            "importance" => Some(SortBy::Importance),
            _ => None,
        }
    }
}

/// A single stored piece of content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryEntry {
    pub id: String,
    pub content: String,
    pub importance: Importance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub created_at: String,
    pub updated_at: String,
}

/// Named container for a sequence of entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub entries: Vec<MemoryEntry>,
    pub created_at: String,
    pub updated_at: String,
}

impl Topic {
    pub fn summary(&self) -> TopicSummary {
        TopicSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            tags: self.tags.clone(),
            entry_count: self.entries.len(),
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }

    pub fn find_entry(&self, entry_id: &str) -> Option<&MemoryEntry> {
        self.entries.iter().find(|e| e.id == entry_id)
    }
}

/// Topic without its entries
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub entry_count: usize,
    pub created_at: String,
    pub updated_at: String,
}

/// What a confirmed delete would remove
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePreview {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub entry_count: usize,
    pub created_at: String,
}

/// Result of `view_topic`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicView {
    pub topic: TopicSummary,
    pub entries: Vec<MemoryEntry>,
    /// Entries in the topic before truncation
    pub total: usize,
}

impl TopicView {
    /// Number of entries cut off by the limit
    pub fn hidden(&self) -> usize {
        self.total.saturating_sub(self.entries.len())
    }
}

/// Which field a search query matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchField {
    Content,
    Context,
    Metadata,
}

impl MatchField {
    /// Relevance score: content 3, context 2, metadata 1
    pub fn relevance(&self) -> u8 {
        match self {
            MatchField::Content => 3,
            MatchField::Context => 2,
            MatchField::Metadata => 1,
        }
    }
}

/// One search result
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub topic: String,
    pub entry: MemoryEntry,
    pub matched: MatchField,
    pub relevance: u8,
}

/// An entry with the name of the topic owning it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocatedEntry {
    pub topic: String,
    pub entry: MemoryEntry,
}

/// Live per-importance entry counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportanceDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl ImportanceDistribution {
    pub fn add(&mut self, importance: Importance) {
        match importance {
            Importance::Low => self.low += 1,
            Importance::Medium => self.medium += 1,
            Importance::High => self.high += 1,
        }
    }
}

/// Result of `stats()`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub topic_count: u64,
    pub entry_count: u64,
    pub total_size: u64,
    pub last_access: Option<String>,
    pub access_count: u64,
    pub average_entry_size: f64,
    pub importance_distribution: ImportanceDistribution,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_importance_parse() {
        assert_eq!(Importance::from_str("HIGH"), Some(Importance::High));
        assert_eq!(Importance::from_str("low"), Some(Importance::Low));
        assert_eq!(Importance::from_str("urgent"), None);
        assert_eq!(Importance::default(), Importance::Medium);
    }

    #[test]
    fn test_importance_weights_are_ordered() {
        assert!(Importance::High.weight() > Importance::Medium.weight());
        assert!(Importance::Medium.weight() > Importance::Low.weight());
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!(ImportanceFilter::from_str("all"), Some(ImportanceFilter::All));
        assert_eq!(
            ImportanceFilter::from_str("low"),
            Some(ImportanceFilter::Only(Importance::Low))
        );
        assert!(ImportanceFilter::from_str("none").is_none());
        assert!(ImportanceFilter::All.matches(Importance::Low));
        assert!(!ImportanceFilter::Only(Importance::High).matches(Importance::Low));
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let entry = MemoryEntry {
            id: "e1".to_string(),
            content: "c".to_string(),
            importance: Importance::Low,
            context: None,
            metadata: Map::new(),
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
            updated_at: "2024-01-01T00:00:00.000Z".to_string(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["importance"], "low");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("context").is_none());
    }
}
