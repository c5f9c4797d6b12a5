//! Identifier and timestamp helpers

use super::types::MemoryEntry;
use chrono::{SecondsFormat, Utc};

/// Generate a new opaque identifier (random 128-bit UUID, hyphenated).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Current UTC time as ISO-8601 with millisecond precision, e.g.
/// `2024-05-01T12:00:00.123Z`.
///
/// The fixed width means timestamps order correctly as plain strings.
pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Timestamp for a refresh of `previous`: never earlier than `previous`.
pub fn touch(previous: &str) -> String {
    let current = now();
    if current.as_str() < previous {
        previous.to_string()
    } else {
        current
    }
}

/// Serialized character length of an entry (for the memory footprint statistic).
pub fn size_of(entry: &MemoryEntry) -> usize {
    serde_json::to_string(entry)
        .map(|s| s.chars().count())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::Importance;

    #[test]
    fn test_new_id_unique() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }

    #[test]
    fn test_now_format() {
        let ts = now();
        assert_eq!(ts.len(), "2024-05-01T12:00:00.123Z".len());
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn test_touch_never_goes_backwards() {
        let future = "2999-01-01T00:00:00.000Z";
        assert_eq!(touch(future), future);
        assert!(touch("2000-01-01T00:00:00.000Z").as_str() > "2000-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_size_of_is_deterministic() {
        let entry = MemoryEntry {
            id: "e1".to_string(),
            content: "hello".to_string(),
            importance: Importance::High,
            context: None,
            metadata: serde_json::Map::new(),
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
            updated_at: "2024-01-01T00:00:00.000Z".to_string(),
        };
        let size = size_of(&entry);
        assert!(size > 0);
        assert_eq!(size, size_of(&entry.clone()));
    }
}
