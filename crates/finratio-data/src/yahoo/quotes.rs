//! Daily price history from Yahoo Finance.

use super::RateLimiter;
use crate::error::{DataError, Result};
use crate::snapshot::{PricePoint, PriceSeries};
use chrono::{DateTime, NaiveDate};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use yahoo_finance_api as yahoo;

/// Yahoo Finance price history client.
pub struct YahooQuoteClient {
    provider: yahoo::YahooConnector,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl std::fmt::Debug for YahooQuoteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooQuoteClient").finish_non_exhaustive()
    }
}

impl YahooQuoteClient {
    pub(crate) fn new(rate_limiter: Arc<Mutex<RateLimiter>>) -> Result<Self> {
        Ok(Self {
            provider: yahoo::YahooConnector::new()?,
            rate_limiter,
        })
    }

    /// Fetch adjusted daily closes for `start <= date <= end`.
    pub async fn fetch_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries> {
        if start > end {
            return Err(DataError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        let start_time = to_offset_datetime(start)?;
        // Request through the following midnight so `end` itself is included.
        let end_time = to_offset_datetime(end.succ_opt().unwrap_or(end))?;

        self.rate_limiter.lock().await.wait().await;
        debug!(symbol, %start, %end, "fetching price history");

        let response = self
            .provider
            .get_quote_history(symbol, start_time, end_time)
            .await?;

        // A range without trading comes back as an empty chart, not a failure.
        let Ok(quotes) = response.quotes() else {
            return Ok(PriceSeries::default());
        };

        let mut points = Vec::with_capacity(quotes.len());
        for quote in &quotes {
            let date = DateTime::from_timestamp(quote.timestamp as i64, 0)
                .ok_or_else(|| {
                    DataError::TimeConversion(format!("invalid timestamp {}", quote.timestamp))
                })?
                .date_naive();
            if quote.adjclose.is_finite() && date >= start && date <= end {
                points.push(PricePoint::new(date, quote.adjclose));
            }
        }

        Ok(PriceSeries::new(points))
    }
}

fn to_offset_datetime(date: NaiveDate) -> Result<time::OffsetDateTime> {
    let timestamp = date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
    time::OffsetDateTime::from_unix_timestamp(timestamp)
        .map_err(|e| DataError::TimeConversion(e.to_string()))
}
