//! Create, update and delete operations
//!
//! Updates follow "empty means unchanged": an empty string, an empty list,
//! an empty metadata map, or importance `medium` leaves the field as it was.
//! This makes it impossible to clear a description or tag list, or to set an
//! entry back to `medium`, through an update.

use super::stats::StatsEvent;
use super::types::{DeletePreview, Importance, MemoryEntry, Topic, TopicSummary};
use super::{util, validate_topic_name, MemoryStore};
use crate::error::{CoreError, Result};
use serde_json::{Map, Value};

impl MemoryStore {
    /// Create an empty topic. Fails with `AlreadyExists` (store untouched) if
    /// the name is taken.
    pub fn create_topic(
        &mut self,
        name: &str,
        description: &str,
        tags: &[String],
    ) -> Result<TopicSummary> {
        validate_topic_name(name)?;

        if let Ok(existing) = self.topic(name) {
            return Err(CoreError::AlreadyExists(Box::new(existing.summary())));
        }

        let now = util::now();
        let topic = Topic {
            id: util::new_id(),
            name: name.to_string(),
            description: description.to_string(),
            tags: tags.to_vec(),
            entries: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        };
        let summary = topic.summary();
        self.topics.push(topic);
        self.stats.record(StatsEvent::AddTopic);

        tracing::debug!("Created topic '{}' ({})", summary.name, summary.id);
        Ok(summary)
    }

    /// Append a new entry to a topic.
    pub fn create_entry(
        &mut self,
        topic: &str,
        content: &str,
        importance: Importance,
        context: Option<&str>,
        metadata: Map<String, Value>,
    ) -> Result<MemoryEntry> {
        if content.trim().is_empty() {
            return Err(CoreError::Validation("entry content is required".to_string()));
        }
        validate_topic_name(topic)?;

        let now = util::now();
        let entry = MemoryEntry {
            id: util::new_id(),
            content: content.to_string(),
            importance,
            context: context.filter(|c| !c.is_empty()).map(str::to_string),
            metadata,
            created_at: now.clone(),
            updated_at: now,
        };

        let target = self.topic_mut(topic)?;
        target.entries.push(entry.clone());
        target.updated_at = util::touch(&target.updated_at);
        self.stats.record(StatsEvent::AddEntry(&entry));

        tracing::debug!("Added entry {} to topic '{}'", entry.id, topic);
        Ok(entry)
    }

    /// Update a topic's description and/or tags. Empty values are ignored.
    pub fn update_topic(
        &mut self,
        name: &str,
        description: Option<&str>,
        tags: Option<&[String]>,
    ) -> Result<TopicSummary> {
        validate_topic_name(name)?;
        let topic = self.topic_mut(name)?;

        if let Some(description) = description.filter(|d| !d.is_empty()) {
            topic.description = description.to_string();
        }
        if let Some(tags) = tags.filter(|t| !t.is_empty()) {
            topic.tags = tags.to_vec();
        }
        topic.updated_at = util::touch(&topic.updated_at);

        tracing::debug!("Updated topic '{}'", name);
        Ok(topic.summary())
    }

    /// Update an entry in place.
    ///
    /// `content` and `context` overwrite only when non-empty; `importance`
    /// only when it differs from `medium`; `metadata` is merged shallowly
    /// (supplied keys win) only when non-empty.
    pub fn update_entry(
        &mut self,
        topic: &str,
        entry_id: &str,
        content: Option<&str>,
        importance: Option<Importance>,
        context: Option<&str>,
        metadata: Option<&Map<String, Value>>,
    ) -> Result<MemoryEntry> {
        validate_topic_name(topic)?;
        let target = self.topic_mut(topic)?;
        let entry = target
            .entries
            .iter_mut()
            .find(|e| e.id == entry_id)
            .ok_or_else(|| CoreError::NotFound("Entry", entry_id.to_string()))?;

        if let Some(content) = content.filter(|c| !c.is_empty()) {
            entry.content = content.to_string();
        }
        if let Some(importance) = importance.filter(|i| *i != Importance::default()) {
            entry.importance = importance;
        }
        if let Some(context) = context.filter(|c| !c.is_empty()) {
            entry.context = Some(context.to_string());
        }
        if let Some(metadata) = metadata.filter(|m| !m.is_empty()) {
            for (key, value) in metadata {
                entry.metadata.insert(key.clone(), value.clone());
            }
        }
        entry.updated_at = util::touch(&entry.updated_at);
        let updated = entry.clone();
        target.updated_at = util::touch(&target.updated_at);

        tracing::debug!("Updated entry {} in topic '{}'", entry_id, topic);
        Ok(updated)
    }

    /// Delete a topic and all its entries.
    ///
    /// Without `confirm`, nothing is removed and `ConfirmationRequired`
    /// carries a preview of what would be deleted.
    pub fn delete_topic(&mut self, name: &str, confirm: bool) -> Result<TopicSummary> {
        validate_topic_name(name)?;
        let index = self
            .position(name)
            .ok_or_else(|| CoreError::NotFound("Topic", name.to_string()))?;

        if !confirm {
            let topic = &self.topics[index];
            return Err(CoreError::ConfirmationRequired(Box::new(DeletePreview {
                name: topic.name.clone(),
                description: topic.description.clone(),
                tags: topic.tags.clone(),
                entry_count: topic.entries.len(),
                created_at: topic.created_at.clone(),
            })));
        }

        let removed = self.topics.remove(index);
        self.stats.record(StatsEvent::RemoveTopic(&removed));

        tracing::debug!(
            "Deleted topic '{}' with {} entries",
            removed.name,
            removed.entries.len()
        );
        Ok(removed.summary())
    }

    /// Remove one entry from a topic and return it.
    pub fn delete_entry(&mut self, topic: &str, entry_id: &str) -> Result<MemoryEntry> {
        validate_topic_name(topic)?;
        let target = self.topic_mut(topic)?;
        let index = target
            .entries
            .iter()
            .position(|e| e.id == entry_id)
            .ok_or_else(|| CoreError::NotFound("Entry", entry_id.to_string()))?;

        let removed = target.entries.remove(index);
        target.updated_at = util::touch(&target.updated_at);
        self.stats.record(StatsEvent::RemoveEntry(&removed));

        tracing::debug!("Deleted entry {} from topic '{}'", entry_id, topic);
        Ok(removed)
    }
}
