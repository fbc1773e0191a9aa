//! Yahoo Finance data provider.

mod auth;
pub mod fundamentals;
pub mod quotes;

pub use fundamentals::{YahooFundamentalsClient, parse_quote_summary, parse_timeseries};
pub use quotes::YahooQuoteClient;

use crate::error::{DataError, Result};
use crate::provider::MarketDataProvider;
use crate::snapshot::{PriceSeries, QuoteSnapshot, StatementSet};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};

/// Default delay between consecutive Yahoo requests.
pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(250);

const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko)";

/// Enforces a minimum interval between requests shared by all Yahoo clients.
#[derive(Debug)]
pub(crate) struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    pub(crate) fn new(min_interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            last_request: now.checked_sub(min_interval).unwrap_or(now),
            min_interval,
        }
    }

    pub(crate) async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

/// [`MarketDataProvider`] backed by Yahoo Finance.
#[derive(Debug)]
pub struct YahooProvider {
    fundamentals: YahooFundamentalsClient,
    quotes: YahooQuoteClient,
}

impl YahooProvider {
    /// Create a provider with the default rate limit.
    pub fn new() -> Result<Self> {
        Self::with_rate_limit(DEFAULT_RATE_LIMIT)
    }

    /// Create a provider with a custom minimum interval between requests.
    pub fn with_rate_limit(min_interval: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(DataError::Network)?;

        let rate_limiter = Arc::new(Mutex::new(RateLimiter::new(min_interval)));

        Ok(Self {
            fundamentals: YahooFundamentalsClient::new(client, Arc::clone(&rate_limiter)),
            quotes: YahooQuoteClient::new(rate_limiter)?,
        })
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn statements(&self, symbol: &str) -> Result<StatementSet> {
        self.fundamentals.fetch_statements(symbol).await
    }

    async fn quote(&self, symbol: &str) -> Result<QuoteSnapshot> {
        self.fundamentals.fetch_quote(symbol).await
    }

    async fn price_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries> {
        self.quotes.fetch_history(symbol, start, end).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rate_limiter_spaces_requests() {
        let mut limiter = RateLimiter::new(Duration::from_millis(20));
        limiter.wait().await;
        let started = Instant::now();
        limiter.wait().await;
        assert!(started.elapsed() >= Duration::from_millis(15));
    }

    #[test]
    fn test_provider_name() {
        let provider = YahooProvider::with_rate_limit(Duration::ZERO).unwrap();
        assert_eq!(provider.name(), "yahoo");
    }
}
