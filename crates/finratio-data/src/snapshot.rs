//! Provider snapshots: statement line items, quote fields and price history.
//!
//! A [`LineItemSnapshot`] is one financial statement laid out as a grid of
//! reporting periods (most recent first) by line item name. Values for a
//! single period may be missing; a whole line item may be absent. Neither is
//! an error. Only a grid whose rows don't line up with its periods is
//! malformed, see [`LineItemSnapshot::validate`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Statement line item names, as the data provider labels them.
pub mod lines {
    /// Income statement line items
    pub mod income_statement {
        /// Total Revenue
        pub const TOTAL_REVENUE: &str = "Total Revenue";

        /// Cost of Revenue (COGS)
        pub const COST_OF_REVENUE: &str = "Cost Of Revenue";

        /// Gross Profit
        pub const GROSS_PROFIT: &str = "Gross Profit";

        /// Operating Income
        pub const OPERATING_INCOME: &str = "Operating Income";

        /// Net Income
        pub const NET_INCOME: &str = "Net Income";
    }

    /// Balance sheet line items
    pub mod balance_sheet {
        /// Cash and Cash Equivalents
        pub const CASH_AND_EQUIVALENTS: &str = "Cash And Cash Equivalents";

        /// Accounts Receivable
        pub const ACCOUNTS_RECEIVABLE: &str = "Accounts Receivable";

        /// Inventory
        pub const INVENTORY: &str = "Inventory";

        /// Property, Plant and Equipment (net)
        pub const PROPERTY_PLANT_EQUIPMENT: &str = "Property, Plant and Equipment";

        /// Goodwill
        pub const GOODWILL: &str = "Goodwill";

        /// Total Assets
        pub const TOTAL_ASSETS: &str = "Total Assets";

        /// Total Liabilities (net of minority interest)
        pub const TOTAL_LIABILITIES: &str = "Total Liabilities Net Minority Interest";

        /// Total Equity (gross of minority interest)
        pub const TOTAL_EQUITY: &str = "Total Equity Gross Minority Interest";

        /// Current Assets
        pub const CURRENT_ASSETS: &str = "Current Assets";

        /// Current Liabilities
        pub const CURRENT_LIABILITIES: &str = "Current Liabilities";
    }

    /// Cash flow statement line items
    pub mod cash_flow {
        /// Operating Cash Flow
        pub const OPERATING_CASH_FLOW: &str = "Operating Cash Flow";

        /// Capital Expenditures, as a positive outflow
        pub const CAPITAL_EXPENDITURES: &str = "Capital Expenditures";
    }
}

/// The statements a provider returns for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatementKind {
    /// Annual income statement
    AnnualIncome,

    /// Quarterly income statement
    QuarterlyIncome,

    /// Annual balance sheet
    BalanceSheet,

    /// Annual cash flow statement
    CashFlow,
}

impl StatementKind {
    /// Returns all statement kinds.
    pub const fn all() -> [Self; 4] {
        [
            Self::AnnualIncome,
            Self::QuarterlyIncome,
            Self::BalanceSheet,
            Self::CashFlow,
        ]
    }

    /// Returns the statement name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AnnualIncome => "income statement",
            Self::QuarterlyIncome => "quarterly income statement",
            Self::BalanceSheet => "balance sheet",
            Self::CashFlow => "cash flow statement",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Ways a [`LineItemSnapshot`] can be malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// Period dates are not strictly most-recent-first
    #[error("periods are not in descending order at index {index}")]
    PeriodsNotDescending {
        /// Index of the first out-of-order period
        index: usize,
    },

    /// A line item does not carry one value per period
    #[error("line item '{line}' has {found} values for {expected} periods")]
    LengthMismatch {
        /// Line item name
        line: String,
        /// Number of declared periods
        expected: usize,
        /// Number of values found
        found: usize,
    },
}

/// One financial statement: line item name to per-period values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItemSnapshot {
    periods: Vec<NaiveDate>,
    items: BTreeMap<String, Vec<Option<f64>>>,
}

impl LineItemSnapshot {
    /// Create an empty snapshot over the given periods (most recent first).
    pub const fn new(periods: Vec<NaiveDate>) -> Self {
        Self {
            periods,
            items: BTreeMap::new(),
        }
    }

    /// Add a line item, consuming and returning the snapshot.
    pub fn with_item(mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        self.insert(name, values);
        self
    }

    /// Insert or replace a line item.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) {
        self.items.insert(name.into(), values);
    }

    /// Reporting period end dates, most recent first.
    pub fn periods(&self) -> &[NaiveDate] {
        &self.periods
    }

    /// Number of reporting periods.
    pub const fn period_count(&self) -> usize {
        self.periods.len()
    }

    /// Values of a line item, most recent first, or `None` if the line is absent.
    pub fn get(&self, name: &str) -> Option<&[Option<f64>]> {
        self.items.get(name).map(Vec::as_slice)
    }

    /// Names of all line items present.
    pub fn line_names(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    /// Whether the snapshot has no line items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check the grid shape: descending periods and one value per period.
    pub fn validate(&self) -> std::result::Result<(), ShapeError> {
        if let Some(index) = self
            .periods
            .windows(2)
            .position(|pair| pair[0] <= pair[1])
        {
            return Err(ShapeError::PeriodsNotDescending { index: index + 1 });
        }

        for (line, values) in &self.items {
            if values.len() != self.periods.len() {
                return Err(ShapeError::LengthMismatch {
                    line: line.clone(),
                    expected: self.periods.len(),
                    found: values.len(),
                });
            }
        }

        Ok(())
    }
}

/// The four statements fetched for one symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementSet {
    /// Annual income statement
    pub annual_income: LineItemSnapshot,
    /// Quarterly income statement
    pub quarterly_income: LineItemSnapshot,
    /// Annual balance sheet
    pub balance_sheet: LineItemSnapshot,
    /// Annual cash flow statement
    pub cash_flow: LineItemSnapshot,
}

impl StatementSet {
    /// Get a statement by kind.
    pub const fn get(&self, kind: StatementKind) -> &LineItemSnapshot {
        match kind {
            StatementKind::AnnualIncome => &self.annual_income,
            StatementKind::QuarterlyIncome => &self.quarterly_income,
            StatementKind::BalanceSheet => &self.balance_sheet,
            StatementKind::CashFlow => &self.cash_flow,
        }
    }

    /// Get a mutable statement by kind.
    pub const fn get_mut(&mut self, kind: StatementKind) -> &mut LineItemSnapshot {
        match kind {
            StatementKind::AnnualIncome => &mut self.annual_income,
            StatementKind::QuarterlyIncome => &mut self.quarterly_income,
            StatementKind::BalanceSheet => &mut self.balance_sheet,
            StatementKind::CashFlow => &mut self.cash_flow,
        }
    }

    /// Whether every statement is empty.
    pub fn is_empty(&self) -> bool {
        StatementKind::all()
            .iter()
            .all(|kind| self.get(*kind).is_empty())
    }
}

/// Valuation fields from a quote, supplied once per symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    /// Trailing P/E ratio
    pub trailing_pe: Option<f64>,
    /// Price to book ratio
    pub price_to_book: Option<f64>,
    /// Dividend yield, as reported by the provider
    pub dividend_yield: Option<f64>,
}

/// A single closing price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading date
    pub date: NaiveDate,
    /// Closing price
    pub close: f64,
}

impl PricePoint {
    /// Create a new price point.
    pub const fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Closing prices in ascending date order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Create a series, sorting the observations by date.
    pub fn new(mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        Self { points }
    }

    /// All observations, oldest first.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Oldest observation.
    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    /// Most recent observation.
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Number of observations.
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no observations.
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Observations with `start <= date <= end`.
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            points: self
                .points
                .iter()
                .filter(|p| p.date >= start && p.date <= end)
                .copied()
                .collect(),
        }
    }
}
