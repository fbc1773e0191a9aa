//! Caching layer for provider payloads.

pub mod provider;
pub mod sqlite;

pub use provider::CachedProvider;
pub use sqlite::{CacheStats, PayloadKind, SqliteCache};
