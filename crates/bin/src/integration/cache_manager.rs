//! Cache manager for provider payloads.
//!
//! Opens the SQLite cache at a platform-specific default location.

use chrono::NaiveDate;
use finratio_data::SqliteCache;
use finratio_data::error::DataError;
use std::path::PathBuf;
use tracing::info;

/// Maintenance run by `finratio cache`.
#[derive(Debug, Clone, Copy)]
pub(crate) enum CacheAction<'a> {
    /// Remove every payload, or only those of one symbol.
    Clear { symbol: Option<&'a str> },
    /// Remove payloads fetched before a date.
    Prune { before: NaiveDate },
}

/// Get the default cache directory path.
///
/// Uses platform-specific cache directories:
/// - Linux: `~/.cache/finratio/`
/// - macOS: `~/Library/Caches/finratio/`
/// - Windows: `%LOCALAPPDATA%\finratio\`
pub(crate) fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("finratio")
}

/// Get the cache database path.
pub(crate) fn cache_path() -> PathBuf {
    default_cache_dir().join("finratio.db")
}

/// Open the cache, creating the directory if needed.
pub(crate) fn open_cache() -> Result<SqliteCache, DataError> {
    let cache_path = cache_path();

    if let Some(parent) = cache_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    SqliteCache::new(&cache_path)
}

/// Print cache location and contents.
pub(crate) fn print_cache_info() {
    println!("  Cache location: {}", cache_path().display());
    if let Some(stats) = open_cache().ok().and_then(|cache| cache.get_stats().ok()) {
        println!(
            "  Cached payloads: {} for {} symbols",
            stats.total_payloads, stats.unique_symbols
        );
    }
}

/// Apply a maintenance action, returning the number of payloads removed.
pub(crate) fn apply_cache_action(
    cache: &SqliteCache,
    action: CacheAction<'_>,
) -> Result<usize, DataError> {
    let removed = match action {
        CacheAction::Clear { symbol } => {
            let before = cache.get_stats()?.total_payloads;
            match symbol {
                Some(symbol) => cache.clear_symbol(symbol)?,
                None => cache.clear_all()?,
            }
            before - cache.get_stats()?.total_payloads
        }
        CacheAction::Prune { before } => cache.prune_before(before)?,
    };
    info!(removed, "cache maintenance complete");
    Ok(removed)
}
