//! Topicmem - in-process topic/entry memory store for AI assistants
//!
//! This crate provides:
//! - An in-memory store of named topics, each holding ordered memory entries
//! - Management operations (create/update/delete) and queries (list, view,
//!   search, get-by-id, stats)
//! - An MCP server exposing those operations as tools over stdio
//!
//! Nothing is persisted: the store lives for the lifetime of the process.
//!
//! # Usage
//!
//! As a library:
//! ```
//! use topicmem::store::{Importance, MemoryStore, SortBy};
//!
//! let mut store = MemoryStore::new(true);
//! store.create_topic("Notes", "", &[]).unwrap();
//! store
//!     .create_entry("Notes", "hello world", Importance::High, None, Default::default())
//!     .unwrap();
//! let view = store.view_topic("Notes", SortBy::Importance, 10).unwrap();
//! assert_eq!(view.entries[0].content, "hello world");
//! ```
//!
//! As an MCP server (CLI):
//! ```text
//! topicmem --config ~/.topicmem/config.toml
//! ```

pub mod config;
pub mod error;
pub mod mcp;
pub mod store;

// Re-export main types for convenience
pub use config::Config;
pub use error::{CoreError, Result};
pub use store::{MemoryStore, SharedStore};

/// Core service: configuration plus the single store instance of the process
pub struct Core {
    /// Configuration
    pub config: Config,

    /// Shared store, one per process
    pub store: SharedStore,
}

impl Core {
    /// Create a new Core instance with an empty store
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let store = MemoryStore::new(config.stats.clamp_negative).shared();
        Ok(Core { config, store })
    }

    /// Create a Core instance around an existing store (for embedding)
    pub fn with_store(config: Config, store: SharedStore) -> Self {
        Core { config, store }
    }

    /// Run the MCP server over stdio until stdin closes
    pub async fn run_mcp(self) -> Result<()> {
        mcp::run_mcp_server(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_rejects_invalid_config() {
        let mut config = Config::default();
        config.query.default_limit = 0;
        assert!(Core::new(config).is_err());
    }

    #[test]
    fn test_with_store_shares_instance() {
        let store = MemoryStore::new(true).shared();
        let core = Core::with_store(Config::default(), store.clone());
        crate::store::lock_store(&store)
            .create_topic("Shared", "", &[])
            .unwrap();
        assert_eq!(crate::store::lock_store(&core.store).topic_count(), 1);
    }
}
