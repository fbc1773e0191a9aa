//! The market data provider interface consumed by the report pipeline.

use crate::error::Result;
use crate::snapshot::{PriceSeries, QuoteSnapshot, StatementSet};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

/// Source of statements, quotes and price history for a symbol.
///
/// Any error returned is a hard fault for that symbol. Missing line items or
/// quote fields are not errors and must be reported as absent values instead.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Short provider name, used in logs.
    fn name(&self) -> &str;

    /// Fetch the annual income, quarterly income, balance sheet and cash flow statements.
    async fn statements(&self, symbol: &str) -> Result<StatementSet>;

    /// Fetch the valuation fields of the current quote.
    async fn quote(&self, symbol: &str) -> Result<QuoteSnapshot>;

    /// Fetch daily closes for `start <= date <= end`, oldest first.
    ///
    /// A symbol with no trading in the range yields an empty series.
    async fn price_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries>;
}

#[async_trait]
impl<P: MarketDataProvider + ?Sized> MarketDataProvider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn statements(&self, symbol: &str) -> Result<StatementSet> {
        (**self).statements(symbol).await
    }

    async fn quote(&self, symbol: &str) -> Result<QuoteSnapshot> {
        (**self).quote(symbol).await
    }

    async fn price_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries> {
        (**self).price_history(symbol, start, end).await
    }
}
