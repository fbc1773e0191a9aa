//! Read-through cache in front of any [`MarketDataProvider`].

use super::sqlite::SqliteCache;
use crate::error::{DataError, Result};
use crate::provider::MarketDataProvider;
use crate::snapshot::{PriceSeries, QuoteSnapshot, StatementSet};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// Wraps a provider with the SQLite payload cache.
///
/// Payloads are keyed by the `as_of` date so a run on a new day fetches fresh
/// data. With `force_refresh` the cache is written but never read. Cache
/// failures are logged and fall through to the wrapped provider.
#[derive(Debug)]
pub struct CachedProvider<P> {
    inner: P,
    cache: Mutex<SqliteCache>,
    as_of: NaiveDate,
    force_refresh: bool,
}

impl<P: MarketDataProvider> CachedProvider<P> {
    /// Wrap `inner`, keying cached payloads by `as_of`.
    pub const fn new(inner: P, cache: SqliteCache, as_of: NaiveDate) -> Self {
        Self {
            inner,
            cache: Mutex::new(cache),
            as_of,
            force_refresh: false,
        }
    }

    /// Ignore existing entries and overwrite them with fresh payloads.
    pub const fn with_force_refresh(mut self, force_refresh: bool) -> Self {
        self.force_refresh = force_refresh;
        self
    }

    /// The wrapped provider.
    pub const fn inner(&self) -> &P {
        &self.inner
    }

    fn cache(&self) -> Result<MutexGuard<'_, SqliteCache>> {
        self.cache
            .lock()
            .map_err(|_| DataError::Cache("cache lock poisoned".to_string()))
    }

    fn read<T>(
        &self,
        symbol: &str,
        what: &str,
        get: impl FnOnce(&SqliteCache) -> Result<Option<T>>,
    ) -> Option<T> {
        if self.force_refresh {
            return None;
        }

        match self.cache().and_then(|cache| get(&cache)) {
            Ok(Some(value)) => {
                debug!(symbol, what, "cache hit");
                Some(value)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(symbol, what, error = %e, "cache read failed");
                None
            }
        }
    }

    fn write(&self, symbol: &str, what: &str, put: impl FnOnce(&SqliteCache) -> Result<()>) {
        if let Err(e) = self.cache().and_then(|cache| put(&cache)) {
            warn!(symbol, what, error = %e, "cache write failed");
        }
    }
}

#[async_trait]
impl<P: MarketDataProvider> MarketDataProvider for CachedProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn statements(&self, symbol: &str) -> Result<StatementSet> {
        if let Some(set) =
            self.read(symbol, "statements", |c| c.get_statements(symbol, self.as_of))
        {
            return Ok(set);
        }

        let set = self.inner.statements(symbol).await?;
        self.write(symbol, "statements", |c| {
            c.put_statements(symbol, self.as_of, &set)
        });
        Ok(set)
    }

    async fn quote(&self, symbol: &str) -> Result<QuoteSnapshot> {
        if let Some(quote) = self.read(symbol, "quote", |c| c.get_quote(symbol, self.as_of)) {
            return Ok(quote);
        }

        let quote = self.inner.quote(symbol).await?;
        self.write(symbol, "quote", |c| c.put_quote(symbol, self.as_of, &quote));
        Ok(quote)
    }

    async fn price_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries> {
        if let Some(series) = self.read(symbol, "prices", |c| {
            c.get_prices(symbol, start, end, self.as_of)
        }) {
            return Ok(series);
        }

        let series = self.inner.price_history(symbol, start, end).await?;
        self.write(symbol, "prices", |c| {
            c.put_prices(symbol, start, end, self.as_of, &series)
        });
        Ok(series)
    }
}
