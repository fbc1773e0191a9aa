//! Statements and quote fields from Yahoo Finance.
//!
//! Statements come from the fundamentals-timeseries endpoint, one request per
//! statement. Each requested series (e.g. `annualTotalRevenue`) arrives as a
//! separate entry holding `{asOfDate, reportedValue}` points; the points of
//! all series of one statement are aligned on the union of their dates.
//!
//! Valuation fields come from `quoteSummary`, which needs a crumb session.

use super::RateLimiter;
use super::auth::CrumbSession;
use crate::error::{DataError, Result};
use crate::snapshot::{LineItemSnapshot, QuoteSnapshot, StatementKind, StatementSet, lines};
use chrono::{NaiveDate, Utc};
use reqwest::Url;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

const TIMESERIES_URL: &str =
    "https://query2.finance.yahoo.com/ws/fundamentals-timeseries/v1/finance/timeseries";
const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";

/// Earliest period requested from the timeseries endpoint (1985-08-22).
const PERIOD_START: i64 = 493_590_046;

/// Timeseries keys (without the `annual`/`quarterly` prefix) and the line item
/// name each is stored under.
const INCOME_SERIES: &[(&str, &str)] = &[
    ("TotalRevenue", lines::income_statement::TOTAL_REVENUE),
    ("CostOfRevenue", lines::income_statement::COST_OF_REVENUE),
    ("GrossProfit", lines::income_statement::GROSS_PROFIT),
    ("OperatingIncome", lines::income_statement::OPERATING_INCOME),
    ("NetIncome", lines::income_statement::NET_INCOME),
];

const BALANCE_SERIES: &[(&str, &str)] = &[
    (
        "CashAndCashEquivalents",
        lines::balance_sheet::CASH_AND_EQUIVALENTS,
    ),
    ("AccountsReceivable", lines::balance_sheet::ACCOUNTS_RECEIVABLE),
    ("Inventory", lines::balance_sheet::INVENTORY),
    ("NetPPE", lines::balance_sheet::PROPERTY_PLANT_EQUIPMENT),
    ("Goodwill", lines::balance_sheet::GOODWILL),
    ("TotalAssets", lines::balance_sheet::TOTAL_ASSETS),
    (
        "TotalLiabilitiesNetMinorityInterest",
        lines::balance_sheet::TOTAL_LIABILITIES,
    ),
    (
        "TotalEquityGrossMinorityInterest",
        lines::balance_sheet::TOTAL_EQUITY,
    ),
    ("CurrentAssets", lines::balance_sheet::CURRENT_ASSETS),
    ("CurrentLiabilities", lines::balance_sheet::CURRENT_LIABILITIES),
];

const CASH_FLOW_SERIES: &[(&str, &str)] = &[
    ("OperatingCashFlow", lines::cash_flow::OPERATING_CASH_FLOW),
    ("CapitalExpenditure", lines::cash_flow::CAPITAL_EXPENDITURES),
];

const fn series_for(kind: StatementKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        StatementKind::AnnualIncome | StatementKind::QuarterlyIncome => INCOME_SERIES,
        StatementKind::BalanceSheet => BALANCE_SERIES,
        StatementKind::CashFlow => CASH_FLOW_SERIES,
    }
}

const fn series_prefix(kind: StatementKind) -> &'static str {
    match kind {
        StatementKind::QuarterlyIncome => "quarterly",
        _ => "annual",
    }
}

/// Client for Yahoo's statement and quote-summary endpoints.
#[derive(Debug)]
pub struct YahooFundamentalsClient {
    client: reqwest::Client,
    session: CrumbSession,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl YahooFundamentalsClient {
    pub(crate) fn new(client: reqwest::Client, rate_limiter: Arc<Mutex<RateLimiter>>) -> Self {
        Self {
            client,
            session: CrumbSession::new(),
            rate_limiter,
        }
    }

    /// Fetch all four statements for a symbol.
    pub async fn fetch_statements(&self, symbol: &str) -> Result<StatementSet> {
        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        let mut set = StatementSet::default();
        for kind in StatementKind::all() {
            *set.get_mut(kind) = self.fetch_statement(symbol, kind).await?;
        }

        if set.is_empty() {
            return Err(DataError::MissingData {
                symbol: symbol.to_string(),
                reason: "No financial statements returned from Yahoo Finance".to_string(),
            });
        }

        Ok(set)
    }

    /// Fetch one statement for a symbol.
    pub async fn fetch_statement(
        &self,
        symbol: &str,
        kind: StatementKind,
    ) -> Result<LineItemSnapshot> {
        let url = symbol_url(TIMESERIES_URL, symbol)?;
        let query = timeseries_query(symbol, kind, Utc::now().timestamp());

        self.rate_limiter.lock().await.wait().await;
        debug!(symbol, statement = %kind, "fetching statement");

        let response = self
            .client
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(DataError::Network)?;

        if !response.status().is_success() {
            return Err(DataError::Http(format!(
                "Failed to fetch {kind} for {symbol}: HTTP {}",
                response.status()
            )));
        }

        let body: Value = response.json().await.map_err(DataError::Network)?;
        parse_timeseries(kind, &body)
    }

    /// Fetch trailing P/E, price-to-book and dividend yield for a symbol.
    pub async fn fetch_quote(&self, symbol: &str) -> Result<QuoteSnapshot> {
        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        let crumb = self.session.crumb(&self.client).await?;
        let url = symbol_url(QUOTE_SUMMARY_URL, symbol)?;

        self.rate_limiter.lock().await.wait().await;
        debug!(symbol, "fetching quote summary");

        let response = self
            .client
            .get(url)
            .query(&[
                ("modules", "summaryDetail,defaultKeyStatistics"),
                ("crumb", crumb.as_str()),
            ])
            .send()
            .await
            .map_err(DataError::Network)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.session.invalidate().await;
            return Err(DataError::YahooApi(format!(
                "Quote summary for {symbol} rejected: crumb expired"
            )));
        }

        // Unknown symbols answer 404 with an error body, which the parser reports.
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::Http(format!(
                "Failed to fetch quote summary for {symbol}: HTTP {status}"
            )));
        }

        let body: Value = response.json().await.map_err(DataError::Network)?;
        parse_quote_summary(symbol, &body)
    }
}

/// Parse a fundamentals-timeseries response into one statement.
pub fn parse_timeseries(kind: StatementKind, body: &Value) -> Result<LineItemSnapshot> {
    let results = body
        .pointer("/timeseries/result")
        .and_then(Value::as_array)
        .ok_or_else(|| DataError::Parse("timeseries response has no result".to_string()))?;

    let prefix = series_prefix(kind);
    let series = series_for(kind);
    let mut columns: Vec<(&str, BTreeMap<NaiveDate, Option<f64>>)> = Vec::new();

    for entry in results {
        let Some(type_key) = entry.pointer("/meta/type/0").and_then(Value::as_str) else {
            continue;
        };
        let Some(label) = type_key
            .strip_prefix(prefix)
            .and_then(|key| series.iter().find(|(k, _)| *k == key))
            .map(|(_, label)| *label)
        else {
            continue;
        };
        let Some(points) = entry.get(type_key).and_then(Value::as_array) else {
            continue;
        };

        let mut values = BTreeMap::new();
        for point in points.iter().filter(|p| !p.is_null()) {
            let date = point
                .get("asOfDate")
                .and_then(Value::as_str)
                .ok_or_else(|| DataError::Parse(format!("{type_key} point has no asOfDate")))?;
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|e| DataError::Parse(format!("{type_key} asOfDate '{date}': {e}")))?;

            let mut value = point.pointer("/reportedValue/raw").and_then(Value::as_f64);
            if label == lines::cash_flow::CAPITAL_EXPENDITURES {
                value = value.map(f64::abs);
            }
            values.insert(date, value);
        }

        if !values.is_empty() {
            columns.push((label, values));
        }
    }

    let periods: BTreeSet<NaiveDate> = columns
        .iter()
        .flat_map(|(_, values)| values.keys().copied())
        .collect();
    let periods: Vec<NaiveDate> = periods.into_iter().rev().collect();

    let mut snapshot = LineItemSnapshot::new(periods.clone());
    for (label, values) in columns {
        let aligned = periods
            .iter()
            .map(|date| values.get(date).copied().flatten())
            .collect();
        snapshot.insert(label, aligned);
    }

    Ok(snapshot)
}

/// Parse a `quoteSummary` response into the quote fields.
pub fn parse_quote_summary(symbol: &str, body: &Value) -> Result<QuoteSnapshot> {
    if let Some(error) = body
        .pointer("/quoteSummary/error")
        .filter(|error| !error.is_null())
    {
        let reason = error
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("quote summary error")
            .to_string();
        return Err(DataError::MissingData {
            symbol: symbol.to_string(),
            reason,
        });
    }

    let result = body
        .pointer("/quoteSummary/result/0")
        .ok_or_else(|| DataError::MissingData {
            symbol: symbol.to_string(),
            reason: "Empty quote summary".to_string(),
        })?;

    let raw = |path: &str| {
        result
            .pointer(path)
            .and_then(|v| v.get("raw"))
            .and_then(Value::as_f64)
    };

    Ok(QuoteSnapshot {
        trailing_pe: raw("/summaryDetail/trailingPE"),
        price_to_book: raw("/defaultKeyStatistics/priceToBook"),
        dividend_yield: raw("/summaryDetail/dividendYield"),
    })
}

/// `base/<symbol>`, with the symbol as one encoded path segment.
fn symbol_url(base: &str, symbol: &str) -> Result<Url> {
    let mut url =
        Url::parse(base).map_err(|e| DataError::Http(format!("Invalid endpoint {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| DataError::InvalidSymbol(symbol.to_string()))?
        .push(symbol);
    Ok(url)
}

/// Query parameters of one fundamentals-timeseries request.
fn timeseries_query(
    symbol: &str,
    kind: StatementKind,
    period2: i64,
) -> [(&'static str, String); 4] {
    let prefix = series_prefix(kind);
    let types = series_for(kind)
        .iter()
        .map(|(key, _)| format!("{prefix}{key}"))
        .collect::<Vec<_>>()
        .join(",");

    [
        ("symbol", symbol.to_string()),
        ("type", types),
        ("period1", PERIOD_START.to_string()),
        ("period2", period2.to_string()),
    ]
}
