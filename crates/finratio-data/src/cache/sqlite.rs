//! SQLite caching layer for provider payloads.
//!
//! Payloads are stored as JSON keyed by `(symbol, kind, as_of)`, where
//! `as_of` is the date the payload was fetched for. Derived metrics are never
//! cached.

use crate::error::{DataError, Result};
use crate::snapshot::{PriceSeries, QuoteSnapshot, StatementSet};
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

/// SQLite cache for provider payloads.
#[derive(Debug)]
pub struct SqliteCache {
    conn: Connection,
}

/// What a cached payload holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// The four financial statements
    Statements,
    /// Quote valuation fields
    Quote,
    /// Price history over a date range
    Prices {
        /// First date of the range
        start: NaiveDate,
        /// Last date of the range
        end: NaiveDate,
    },
}

impl PayloadKind {
    /// Convert to database string representation.
    pub fn to_db_string(&self) -> String {
        match self {
            Self::Statements => "statements".to_string(),
            Self::Quote => "quote".to_string(),
            Self::Prices { start, end } => format!("prices:{start}:{end}"),
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self> {
        match s {
            "statements" => Ok(Self::Statements),
            "quote" => Ok(Self::Quote),
            _ => {
                let mut parts = s.split(':');
                match (parts.next(), parts.next(), parts.next(), parts.next()) {
                    (Some("prices"), Some(start), Some(end), None) => Ok(Self::Prices {
                        start: parse_date(start)?,
                        end: parse_date(end)?,
                    }),
                    _ => Err(DataError::Parse(format!("Invalid payload kind: {}", s))),
                }
            }
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DataError::Parse(format!("Invalid date '{}': {}", s, e)))
}

impl SqliteCache {
    /// Create a new SQLite cache.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory cache (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS payloads (
                symbol TEXT NOT NULL,
                kind TEXT NOT NULL,
                as_of TEXT NOT NULL,
                data TEXT NOT NULL,
                cached_at TEXT NOT NULL,
                PRIMARY KEY (symbol, kind, as_of)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_payloads_symbol ON payloads(symbol)",
            [],
        )?;

        Ok(())
    }

    /// Store a raw JSON payload, replacing any previous entry.
    pub fn put_payload(
        &self,
        symbol: &str,
        kind: PayloadKind,
        as_of: NaiveDate,
        data: &str,
    ) -> Result<()> {
        let cached_at = Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT OR REPLACE INTO payloads (symbol, kind, as_of, data, cached_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![symbol, kind.to_db_string(), as_of.to_string(), data, cached_at],
        )?;

        Ok(())
    }

    /// Get a raw JSON payload.
    pub fn get_payload(
        &self,
        symbol: &str,
        kind: PayloadKind,
        as_of: NaiveDate,
    ) -> Result<Option<String>> {
        let result = self
            .conn
            .query_row(
                "SELECT data FROM payloads WHERE symbol = ?1 AND kind = ?2 AND as_of = ?3",
                params![symbol, kind.to_db_string(), as_of.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        Ok(result)
    }

    fn put_json<T: Serialize>(
        &self,
        symbol: &str,
        kind: PayloadKind,
        as_of: NaiveDate,
        value: &T,
    ) -> Result<()> {
        let data = serde_json::to_string(value)?;
        self.put_payload(symbol, kind, as_of, &data)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        symbol: &str,
        kind: PayloadKind,
        as_of: NaiveDate,
    ) -> Result<Option<T>> {
        self.get_payload(symbol, kind, as_of)?
            .map(|data| serde_json::from_str(&data).map_err(DataError::from))
            .transpose()
    }

    /// Store the statements of a symbol.
    pub fn put_statements(&self, symbol: &str, as_of: NaiveDate, set: &StatementSet) -> Result<()> {
        self.put_json(symbol, PayloadKind::Statements, as_of, set)
    }

    /// Get the cached statements of a symbol.
    pub fn get_statements(&self, symbol: &str, as_of: NaiveDate) -> Result<Option<StatementSet>> {
        self.get_json(symbol, PayloadKind::Statements, as_of)
    }

    /// Store the quote fields of a symbol.
    pub fn put_quote(&self, symbol: &str, as_of: NaiveDate, quote: &QuoteSnapshot) -> Result<()> {
        self.put_json(symbol, PayloadKind::Quote, as_of, quote)
    }

    /// Get the cached quote fields of a symbol.
    pub fn get_quote(&self, symbol: &str, as_of: NaiveDate) -> Result<Option<QuoteSnapshot>> {
        self.get_json(symbol, PayloadKind::Quote, as_of)
    }

    /// Store a price history fetched for `[start, end]`.
    pub fn put_prices(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        as_of: NaiveDate,
        series: &PriceSeries,
    ) -> Result<()> {
        self.put_json(symbol, PayloadKind::Prices { start, end }, as_of, series)
    }

    /// Get a cached price history for exactly `[start, end]`.
    pub fn get_prices(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        as_of: NaiveDate,
    ) -> Result<Option<PriceSeries>> {
        self.get_json(symbol, PayloadKind::Prices { start, end }, as_of)
    }

    /// Clear all cached data.
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM payloads", [])?;
        Ok(())
    }

    /// Clear cached data for a specific symbol.
    pub fn clear_symbol(&self, symbol: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM payloads WHERE symbol = ?1", params![symbol])?;
        Ok(())
    }

    /// Delete payloads fetched before a date. Returns the number removed.
    pub fn prune_before(&self, as_of: NaiveDate) -> Result<usize> {
        let removed = self.conn.execute(
            "DELETE FROM payloads WHERE as_of < ?1",
            params![as_of.to_string()],
        )?;
        Ok(removed)
    }

    /// Get cache statistics.
    pub fn get_stats(&self) -> Result<CacheStats> {
        let total_payloads: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM payloads", [], |row| row.get(0))?;

        let unique_symbols: i64 =
            self.conn
                .query_row("SELECT COUNT(DISTINCT symbol) FROM payloads", [], |row| {
                    row.get(0)
                })?;

        let mut stmt = self
            .conn
            .prepare("SELECT kind FROM payloads")?;
        let kinds = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut statements = 0;
        let mut quotes = 0;
        let mut price_histories = 0;
        for kind in kinds {
            match PayloadKind::from_db_str(&kind?)? {
                PayloadKind::Statements => statements += 1,
                PayloadKind::Quote => quotes += 1,
                PayloadKind::Prices { .. } => price_histories += 1,
            }
        }

        Ok(CacheStats {
            total_payloads: total_payloads as usize,
            unique_symbols: unique_symbols as usize,
            statements,
            quotes,
            price_histories,
        })
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Total number of cached payloads
    pub total_payloads: usize,
    /// Number of unique symbols
    pub unique_symbols: usize,
    /// Number of statement payloads
    pub statements: usize,
    /// Number of quote payloads
    pub quotes: usize,
    /// Number of price history payloads
    pub price_histories: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{LineItemSnapshot, PricePoint, lines};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_cache_initialization() {
        let cache = SqliteCache::in_memory();
        assert!(cache.is_ok());
    }

    #[test]
    fn test_payload_kind_conversion() {
        let kinds = [
            PayloadKind::Statements,
            PayloadKind::Quote,
            PayloadKind::Prices {
                start: date(2023, 1, 1),
                end: date(2024, 1, 1),
            },
        ];
        for kind in kinds {
            assert_eq!(PayloadKind::from_db_str(&kind.to_db_string()).unwrap(), kind);
        }
        assert!(PayloadKind::from_db_str("prices:bad").is_err());
        assert!(PayloadKind::from_db_str("other").is_err());
    }

    #[test]
    fn test_statement_operations() {
        let cache = SqliteCache::in_memory().unwrap();
        let as_of = date(2024, 6, 1);

        let mut set = StatementSet::default();
        set.annual_income = LineItemSnapshot::new(vec![date(2024, 3, 31)])
            .with_item(lines::income_statement::TOTAL_REVENUE, vec![Some(1000.0)]);

        cache.put_statements("TCS.NS", as_of, &set).unwrap();

        assert_eq!(cache.get_statements("TCS.NS", as_of).unwrap(), Some(set));
        assert_eq!(cache.get_statements("TCS.NS", date(2024, 6, 2)).unwrap(), None);
        assert_eq!(cache.get_statements("INFY.NS", as_of).unwrap(), None);
    }

    #[test]
    fn test_quote_and_price_operations() {
        let cache = SqliteCache::in_memory().unwrap();
        let as_of = date(2024, 6, 1);
        let quote = QuoteSnapshot {
            trailing_pe: Some(25.0),
            price_to_book: None,
            dividend_yield: Some(0.01),
        };
        let series = PriceSeries::new(vec![PricePoint::new(date(2024, 5, 31), 101.5)]);

        cache.put_quote("TCS.NS", as_of, &quote).unwrap();
        cache
            .put_prices("TCS.NS", date(2023, 6, 1), as_of, as_of, &series)
            .unwrap();

        assert_eq!(cache.get_quote("TCS.NS", as_of).unwrap(), Some(quote));
        assert_eq!(
            cache
                .get_prices("TCS.NS", date(2023, 6, 1), as_of, as_of)
                .unwrap(),
            Some(series)
        );
        assert_eq!(
            cache
                .get_prices("TCS.NS", date(2023, 7, 1), as_of, as_of)
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_cache_stats_and_clear() {
        let cache = SqliteCache::in_memory().unwrap();
        let as_of = date(2024, 6, 1);

        let stats = cache.get_stats().unwrap();
        assert_eq!(stats, CacheStats::default());

        cache
            .put_quote("TCS.NS", as_of, &QuoteSnapshot::default())
            .unwrap();
        cache
            .put_statements("TCS.NS", as_of, &StatementSet::default())
            .unwrap();
        cache
            .put_quote("INFY.NS", as_of, &QuoteSnapshot::default())
            .unwrap();

        let stats = cache.get_stats().unwrap();
        assert_eq!(stats.total_payloads, 3);
        assert_eq!(stats.unique_symbols, 2);
        assert_eq!(stats.quotes, 2);
        assert_eq!(stats.statements, 1);

        cache.clear_symbol("TCS.NS").unwrap();
        assert_eq!(cache.get_stats().unwrap().total_payloads, 1);

        cache.clear_all().unwrap();
        assert_eq!(cache.get_stats().unwrap().total_payloads, 0);
    }

    #[test]
    fn test_prune_before() {
        let cache = SqliteCache::in_memory().unwrap();
        cache
            .put_quote("TCS.NS", date(2024, 5, 1), &QuoteSnapshot::default())
            .unwrap();
        cache
            .put_quote("TCS.NS", date(2024, 6, 1), &QuoteSnapshot::default())
            .unwrap();

        assert_eq!(cache.prune_before(date(2024, 6, 1)).unwrap(), 1);
        assert!(cache.get_quote("TCS.NS", date(2024, 6, 1)).unwrap().is_some());
    }

    #[test]
    fn test_file_backed_cache_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("finratio.db");
        let as_of = date(2024, 6, 1);

        {
            let cache = SqliteCache::new(&path).unwrap();
            cache
                .put_quote("TCS.NS", as_of, &QuoteSnapshot::default())
                .unwrap();
        }

        let cache = SqliteCache::new(&path).unwrap();
        assert!(cache.get_quote("TCS.NS", as_of).unwrap().is_some());
    }
}
