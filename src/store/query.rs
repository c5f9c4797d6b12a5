//! Read-only operations: list, view, search, get-by-id, stats

use super::types::{
    ImportanceDistribution, ImportanceFilter, LocatedEntry, MatchField, MemoryEntry, SearchHit,
    SortBy, StatsSnapshot, TopicSummary, TopicView,
};
use super::{validate_limit, MemoryStore};
use crate::error::{CoreError, Result};
use serde_json::Value;

impl MemoryStore {
    /// One summary per topic, in insertion order.
    pub fn list_topics(&self) -> Vec<TopicSummary> {
        self.topics.iter().map(|t| t.summary()).collect()
    }

    /// Entries of one topic, sorted and truncated to `limit`.
    pub fn view_topic(&self, name: &str, sort_by: SortBy, limit: usize) -> Result<TopicView> {
        let limit = validate_limit(limit)?;
        let topic = self.topic(name)?;

        let mut entries: Vec<MemoryEntry> = match sort_by {
            // Newest insertions first so equal timestamps still read most-recent-first
            SortBy::Time => topic.entries.iter().rev().cloned().collect(),
            SortBy::Importance => topic.entries.clone(),
        };
        match sort_by {
            SortBy::Time => entries.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortBy::Importance => {
                entries.sort_by(|a, b| b.importance.weight().cmp(&a.importance.weight()))
            }
        }

        let total = entries.len();
        entries.truncate(limit);

        Ok(TopicView {
            topic: topic.summary(),
            entries,
            total,
        })
    }

    /// Case-insensitive substring search over every entry of every topic.
    ///
    /// Hits are ranked by the best matching field (content 3, context 2,
    /// metadata 1); equal scores keep scan order.
    pub fn search(
        &self,
        query: &str,
        importance: ImportanceFilter,
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Err(CoreError::Validation("search query is required".to_string()));
        }
        let limit = validate_limit(limit)?;
        let needle = query.to_lowercase();

        let mut hits: Vec<SearchHit> = Vec::new();
        for topic in &self.topics {
            for entry in &topic.entries {
                if !importance.matches(entry.importance) {
                    continue;
                }
                if let Some(matched) = match_entry(entry, &needle) {
                    hits.push(SearchHit {
                        topic: topic.name.clone(),
                        entry: entry.clone(),
                        matched,
                        relevance: matched.relevance(),
                    });
                }
            }
        }

        hits.sort_by(|a, b| b.relevance.cmp(&a.relevance));
        hits.truncate(limit);
        Ok(hits)
    }

    /// First entry with this id, scanning topics in insertion order.
    pub fn get_entry(&self, entry_id: &str) -> Result<LocatedEntry> {
        self.topics
            .iter()
            .find_map(|topic| {
                topic.find_entry(entry_id).map(|entry| LocatedEntry {
                    topic: topic.name.clone(),
                    entry: entry.clone(),
                })
            })
            .ok_or_else(|| CoreError::NotFound("Entry", entry_id.to_string()))
    }

    /// Tracked counters plus derived values. The importance histogram is
    /// computed live from the store.
    pub fn stats(&self) -> StatsSnapshot {
        let mut distribution = ImportanceDistribution::default();
        for entry in self.topics.iter().flat_map(|t| t.entries.iter()) {
            distribution.add(entry.importance);
        }

        StatsSnapshot {
            topic_count: self.stats.topic_count,
            entry_count: self.stats.entry_count,
            total_size: self.stats.total_size,
            last_access: self.stats.last_access.clone(),
            access_count: self.stats.access_count,
            average_entry_size: self.stats.average_entry_size(),
            importance_distribution: distribution,
        }
    }
}

/// Best field of `entry` containing `needle` (already lowercased)
fn match_entry(entry: &MemoryEntry, needle: &str) -> Option<MatchField> {
    if entry.content.to_lowercase().contains(needle) {
        return Some(MatchField::Content);
    }
    if let Some(context) = &entry.context {
        if context.to_lowercase().contains(needle) {
            return Some(MatchField::Context);
        }
    }
    if entry
        .metadata
        .values()
        .any(|value| metadata_text(value).to_lowercase().contains(needle))
    {
        return Some(MatchField::Metadata);
    }
    None
}

/// Text form of a metadata value: strings as-is, everything else as JSON
fn metadata_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::Importance;
    use serde_json::{json, Map};

    fn notes_store() -> MemoryStore {
        let mut store = MemoryStore::new(true);
        store.create_topic("Notes", "", &[]).unwrap();
        store
            .create_entry("Notes", "hello world", Importance::High, None, Map::new())
            .unwrap();
        store
            .create_entry("Notes", "second", Importance::Low, None, Map::new())
            .unwrap();
        store
    }

    fn contents(entries: &[MemoryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.content.as_str()).collect()
    }

    #[test]
    fn test_list_topics_in_insertion_order() {
        let mut store = MemoryStore::new(true);
        assert!(store.list_topics().is_empty());
        for name in ["b", "a", "c"] {
            store.create_topic(name, "", &[]).unwrap();
        }
        let names: Vec<String> = store.list_topics().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_view_topic_by_importance_scenario() {
        let store = notes_store();
        let view = store.view_topic("Notes", SortBy::Importance, 10).unwrap();
        assert_eq!(contents(&view.entries), vec!["hello world", "second"]);
        assert_eq!(view.total, 2);
        assert_eq!(view.hidden(), 0);
    }

    #[test]
    fn test_view_topic_importance_is_stable() {
        let mut store = MemoryStore::new(true);
        store.create_topic("T", "", &[]).unwrap();
        let plan = [
            ("m1", Importance::Medium),
            ("l1", Importance::Low),
            ("h1", Importance::High),
            ("m2", Importance::Medium),
            ("h2", Importance::High),
            ("l2", Importance::Low),
        ];
        for (content, importance) in plan {
            store
                .create_entry("T", content, importance, None, Map::new())
                .unwrap();
        }
        let view = store.view_topic("T", SortBy::Importance, 100).unwrap();
        assert_eq!(
            contents(&view.entries),
            vec!["h1", "h2", "m1", "m2", "l1", "l2"]
        );
    }

    #[test]
    fn test_view_topic_by_time_newest_first() {
        let mut store = MemoryStore::new(true);
        store.create_topic("T", "", &[]).unwrap();
        for content in ["first", "second", "third"] {
            store
                .create_entry("T", content, Importance::Medium, None, Map::new())
                .unwrap();
        }
        let view = store.view_topic("T", SortBy::Time, 2).unwrap();
        assert_eq!(contents(&view.entries), vec!["third", "second"]);
        assert_eq!(view.total, 3);
        assert_eq!(view.hidden(), 1);
    }

    #[test]
    fn test_view_topic_errors() {
        let store = notes_store();
        assert!(matches!(
            store.view_topic("Missing", SortBy::Time, 10),
            Err(CoreError::NotFound("Topic", _))
        ));
        assert!(matches!(
            store.view_topic("Notes", SortBy::Time, 0),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_search_case_insensitive_content() {
        let mut store = MemoryStore::new(true);
        store.create_topic("T", "", &[]).unwrap();
        store
            .create_entry("T", "Big X marks it", Importance::Medium, None, Map::new())
            .unwrap();
        let hits = store.search("x", ImportanceFilter::All, 20).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].relevance, 3);
        assert_eq!(hits[0].matched, MatchField::Content);
    }

    #[test]
    fn test_search_scenario() {
        let store = notes_store();
        let hits = store.search("hello", ImportanceFilter::All, 20).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].topic, "Notes");
        assert_eq!(hits[0].entry.content, "hello world");
    }

    #[test]
    fn test_search_relevance_ordering() {
        let mut store = MemoryStore::new(true);
        store.create_topic("A", "", &[]).unwrap();
        store.create_topic("B", "", &[]).unwrap();

        let mut meta = Map::new();
        meta.insert("note".to_string(), json!("about rust"));
        store
            .create_entry("A", "metadata only", Importance::Low, None, meta)
            .unwrap();
        store
            .create_entry("A", "ctx only", Importance::Low, Some("Rust context"), Map::new())
            .unwrap();
        store
            .create_entry("B", "rust in content", Importance::High, None, Map::new())
            .unwrap();
        store
            .create_entry("B", "RUST again", Importance::Low, None, Map::new())
            .unwrap();

        let hits = store.search("rust", ImportanceFilter::All, 20).unwrap();
        let relevance: Vec<u8> = hits.iter().map(|h| h.relevance).collect();
        assert_eq!(relevance, vec![3, 3, 2, 1]);
        assert_eq!(hits[0].entry.content, "rust in content");
        assert_eq!(hits[1].entry.content, "RUST again");
        assert_eq!(hits[2].topic, "A");

        let high_only = store
            .search("rust", ImportanceFilter::Only(Importance::High), 20)
            .unwrap();
        assert_eq!(high_only.len(), 1);

        let limited = store.search("rust", ImportanceFilter::All, 1).unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].relevance, 3);
    }

    #[test]
    fn test_search_non_string_metadata() {
        let mut store = MemoryStore::new(true);
        store.create_topic("T", "", &[]).unwrap();
        let mut meta = Map::new();
        meta.insert("build".to_string(), json!(4242));
        meta.insert("flag".to_string(), json!(true));
        meta.insert("nested".to_string(), json!({"owner": "Alice"}));
        store
            .create_entry("T", "plain", Importance::Medium, None, meta)
            .unwrap();

        for query in ["4242", "TRUE", "alice"] {
            let hits = store.search(query, ImportanceFilter::All, 20).unwrap();
            assert_eq!(hits.len(), 1, "query {}", query);
            assert_eq!(hits[0].relevance, 1);
        }
    }

    #[test]
    fn test_search_empty_query() {
        let store = notes_store();
        assert!(matches!(
            store.search("", ImportanceFilter::All, 20),
            Err(CoreError::Validation(_))
        ));
        // Whitespace-only is rejected the same way as empty content
        assert!(matches!(
            store.search("   ", ImportanceFilter::All, 20),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_get_entry() {
        let store = notes_store();
        let first = store.list_topics();
        assert_eq!(first.len(), 1);
        let view = store.view_topic("Notes", SortBy::Importance, 10).unwrap();
        let id = &view.entries[0].id;

        let found = store.get_entry(id).unwrap();
        assert_eq!(found.topic, "Notes");
        assert_eq!(found.entry.content, "hello world");

        assert!(matches!(
            store.get_entry("never-issued"),
            Err(CoreError::NotFound("Entry", _))
        ));
    }

    #[test]
    fn test_stats_snapshot() {
        let mut store = notes_store();
        let stats = store.stats();
        assert_eq!(stats.topic_count, 1);
        assert_eq!(stats.entry_count, 2);
        assert_eq!(stats.access_count, 3);
        assert!(stats.average_entry_size > 0.0);
        assert_eq!(stats.importance_distribution.high, 1);
        assert_eq!(stats.importance_distribution.low, 1);
        assert_eq!(stats.importance_distribution.medium, 0);

        store.delete_topic("Notes", true).unwrap();
        let stats = store.stats();
        assert_eq!(stats.topic_count, 0);
        assert_eq!(stats.entry_count, 0);
        assert_eq!(stats.average_entry_size, 0.0);
        assert_eq!(stats.importance_distribution, ImportanceDistribution::default());
    }
}
