//! Process-wide usage counters, updated after every successful mutation

use super::types::{MemoryEntry, Topic};
use super::util;

/// Mutation recorded by the tracker
#[derive(Debug, Clone, Copy)]
pub enum StatsEvent<'a> {
    AddTopic,
    AddEntry(&'a MemoryEntry),
    /// Also subtracts every entry the topic still held
    RemoveTopic(&'a Topic),
    RemoveEntry(&'a MemoryEntry),
}

/// Tracked counters
#[derive(Debug, Clone, Default)]
pub struct StatsTracker {
    pub topic_count: u64,
    pub entry_count: u64,
    pub total_size: u64,
    pub last_access: Option<String>,
    pub access_count: u64,
    /// Log underflows as warnings (true) or as consistency errors (false)
    clamp_negative: bool,
}

impl StatsTracker {
    pub fn new(clamp_negative: bool) -> Self {
        StatsTracker {
            clamp_negative,
            ..Default::default()
        }
    }

    /// Record one mutation.
    pub fn record(&mut self, event: StatsEvent<'_>) {
        self.access_count += 1;
        self.last_access = Some(util::now());

        match event {
            StatsEvent::AddTopic => self.topic_count += 1,
            StatsEvent::AddEntry(entry) => {
                self.entry_count += 1;
                self.total_size += util::size_of(entry) as u64;
            }
            StatsEvent::RemoveTopic(topic) => {
                self.topic_count = self.decrement("topic_count", self.topic_count, 1);
                let size: u64 = topic.entries.iter().map(|e| util::size_of(e) as u64).sum();
                self.entry_count =
                    self.decrement("entry_count", self.entry_count, topic.entries.len() as u64);
                self.total_size = self.decrement("total_size", self.total_size, size);
            }
            StatsEvent::RemoveEntry(entry) => {
                self.entry_count = self.decrement("entry_count", self.entry_count, 1);
                let size = util::size_of(entry) as u64;
                self.total_size = self.decrement("total_size", self.total_size, size);
            }
        }
    }

    /// Average serialized entry size, 0 with no entries
    pub fn average_entry_size(&self) -> f64 {
        if self.entry_count == 0 {
            0.0
        } else {
            self.total_size as f64 / self.entry_count as f64
        }
    }

    fn decrement(&self, counter: &'static str, current: u64, by: u64) -> u64 {
        match current.checked_sub(by) {
            Some(value) => value,
            None => {
                if self.clamp_negative {
                    tracing::warn!(
                        "Stats counter {} would drop below zero ({} - {}), clamping",
                        counter,
                        current,
                        by
                    );
                } else {
                    tracing::error!(
                        "Stats consistency failure: {} underflow ({} - {})",
                        counter,
                        current,
                        by
                    );
                }
                0
            }
        }
    }
}
