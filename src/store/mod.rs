//! In-memory topic store
//!
//! Holds every topic (in insertion order) and the usage counters. Nothing is
//! persisted; all data is lost when the process exits.
//!
//! Operations are split by concern:
//! - `manage`: create/update/delete for topics and entries
//! - `query`: list, view, search, get-by-id, stats
//!
//! The store itself is not synchronized. Share it through [`SharedStore`],
//! which serializes every operation behind a single mutex.

mod manage;
mod query;
pub mod stats;
pub mod types;
pub mod util;

pub use stats::{StatsEvent, StatsTracker};
pub use types::{
    DeletePreview, Importance, ImportanceDistribution, ImportanceFilter, LocatedEntry,
    MatchField, MemoryEntry, SearchHit, SortBy, StatsSnapshot, Topic, TopicSummary, TopicView,
};

use crate::error::{CoreError, Result};
use std::sync::{Arc, Mutex, MutexGuard};

/// Longest allowed topic name, in characters
pub const MAX_TOPIC_NAME_LEN: usize = 100;

/// Bounds for `limit` on view and search
pub const MIN_LIMIT: usize = 1;
pub const MAX_LIMIT: usize = 100;

/// Default `limit` on view and search
pub const DEFAULT_LIMIT: usize = 20;

/// The single store instance of a process
pub type SharedStore = Arc<Mutex<MemoryStore>>;

/// Lock the shared store, recovering from a poisoned lock.
///
/// A panic mid-operation is caught at the tool boundary; the store stays usable.
pub fn lock_store(store: &SharedStore) -> MutexGuard<'_, MemoryStore> {
    store.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("Store lock was poisoned by an earlier panic, recovering");
        poisoned.into_inner()
    })
}

/// Ordered topic store plus usage counters
#[derive(Debug, Default)]
pub struct MemoryStore {
    topics: Vec<Topic>,
    stats: StatsTracker,
}

impl MemoryStore {
    /// Create an empty store. `clamp_negative` controls how counter
    /// underflows are reported (see [`StatsTracker`]).
    pub fn new(clamp_negative: bool) -> Self {
        MemoryStore {
            topics: Vec::new(),
            stats: StatsTracker::new(clamp_negative),
        }
    }

    /// Wrap into a [`SharedStore`]
    pub fn shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// Access the raw counters
    pub fn tracker(&self) -> &StatsTracker {
        &self.stats
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.topics.iter().position(|t| t.name == name)
    }

    fn topic(&self, name: &str) -> Result<&Topic> {
        self.topics
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| CoreError::NotFound("Topic", name.to_string()))
    }

    fn topic_mut(&mut self, name: &str) -> Result<&mut Topic> {
        self.topics
            .iter_mut()
            .find(|t| t.name == name)
            .ok_or_else(|| CoreError::NotFound("Topic", name.to_string()))
    }
}

/// Reject empty or over-long topic names
pub(crate) fn validate_topic_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("topic name is required".to_string()));
    }
    let len = name.chars().count();
    if len > MAX_TOPIC_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "topic name must be at most {} characters (got {})",
            MAX_TOPIC_NAME_LEN, len
        )));
    }
    Ok(())
}

/// Reject a `limit` outside 1..=100
pub fn validate_limit(limit: usize) -> Result<usize> {
    if (MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        Ok(limit)
    } else {
        Err(CoreError::Validation(format!(
            "limit must be between {} and {} (got {})",
            MIN_LIMIT, MAX_LIMIT, limit
        )))
    }
}
