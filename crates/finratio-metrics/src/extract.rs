//! Metric extraction from provider snapshots.
//!
//! Looks up each canonical line item by its exact provider name. A missing
//! line item, a missing value for a period and a non-finite value all become
//! `None`; none of them is an error. Only a snapshot whose grid is malformed
//! fails extraction.

use crate::value::finite;
use finratio_data::lines::{balance_sheet, cash_flow, income_statement};
use finratio_data::{LineItemSnapshot, QuoteSnapshot, ShapeError, StatementKind, StatementSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Extraction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// A statement does not have one value per period, or its periods are out of order
    #[error("malformed {statement}: {reason}")]
    Malformed {
        /// Statement that failed validation
        statement: StatementKind,
        /// What is wrong with it
        #[source]
        reason: ShapeError,
    },
}

/// The two most recent values of a line item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LineHistory {
    /// Most recent period
    pub current: Option<f64>,
    /// Period before the most recent one
    pub prior: Option<f64>,
    /// Number of periods the line item was reported for
    pub periods: usize,
}

impl LineHistory {
    /// A line item that is not reported.
    pub const UNAVAILABLE: Self = Self {
        current: None,
        prior: None,
        periods: 0,
    };

    /// Build from a line item's values, most recent first.
    pub fn from_values(values: Option<&[Option<f64>]>) -> Self {
        let Some(values) = values else {
            return Self::UNAVAILABLE;
        };
        let at = |i: usize| values.get(i).copied().flatten().and_then(finite);

        Self {
            current: at(0),
            prior: at(1),
            periods: values.len(),
        }
    }

    /// Look up a line item in a snapshot.
    pub fn lookup(snapshot: &LineItemSnapshot, line: &str) -> Self {
        Self::from_values(snapshot.get(line))
    }

    /// Percentage change from the prior period to the current one.
    ///
    /// Unavailable with fewer than two periods, or when either value is
    /// missing or the prior value is zero.
    pub fn growth(&self) -> Option<f64> {
        if self.periods < 2 {
            return None;
        }
        crate::value::growth(self.current, self.prior)
    }
}

/// Canonical fields pulled out of one symbol's statements and quote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    // Annual income statement
    /// Total revenue
    pub revenue: LineHistory,
    /// Cost of revenue
    pub cost_of_revenue: LineHistory,
    /// Gross profit
    pub gross_profit: LineHistory,
    /// Operating income
    pub operating_income: LineHistory,
    /// Net income
    pub net_income: LineHistory,

    // Balance sheet
    /// Cash and cash equivalents
    pub cash_and_equivalents: LineHistory,
    /// Accounts receivable
    pub accounts_receivable: LineHistory,
    /// Inventory
    pub inventory: LineHistory,
    /// Net property, plant and equipment
    pub property_plant_equipment: LineHistory,
    /// Goodwill
    pub goodwill: LineHistory,
    /// Total assets
    pub total_assets: LineHistory,
    /// Total liabilities
    pub total_liabilities: LineHistory,
    /// Total equity
    pub total_equity: LineHistory,
    /// Current assets
    pub current_assets: LineHistory,
    /// Current liabilities
    pub current_liabilities: LineHistory,

    // Cash flow statement
    /// Operating cash flow
    pub operating_cash_flow: LineHistory,
    /// Capital expenditures, as a positive outflow
    pub capital_expenditures: LineHistory,

    // Quarterly income statement
    /// Quarterly total revenue
    pub quarterly_revenue: LineHistory,
    /// Quarterly net income
    pub quarterly_net_income: LineHistory,

    // Quote
    /// Trailing P/E
    pub trailing_pe: Option<f64>,
    /// Price to book
    pub price_to_book: Option<f64>,
    /// Dividend yield as reported
    pub dividend_yield: Option<f64>,
}

/// Extract the canonical fields from a symbol's statements and quote.
pub fn extract(
    statements: &StatementSet,
    quote: &QuoteSnapshot,
) -> Result<ExtractedFields, ExtractError> {
    for statement in StatementKind::all() {
        statements
            .get(statement)
            .validate()
            .map_err(|reason| ExtractError::Malformed { statement, reason })?;
    }

    let income = &statements.annual_income;
    let balance = &statements.balance_sheet;
    let cash = &statements.cash_flow;
    let quarterly = &statements.quarterly_income;

    Ok(ExtractedFields {
        revenue: LineHistory::lookup(income, income_statement::TOTAL_REVENUE),
        cost_of_revenue: LineHistory::lookup(income, income_statement::COST_OF_REVENUE),
        gross_profit: LineHistory::lookup(income, income_statement::GROSS_PROFIT),
        operating_income: LineHistory::lookup(income, income_statement::OPERATING_INCOME),
        net_income: LineHistory::lookup(income, income_statement::NET_INCOME),

        cash_and_equivalents: LineHistory::lookup(balance, balance_sheet::CASH_AND_EQUIVALENTS),
        accounts_receivable: LineHistory::lookup(balance, balance_sheet::ACCOUNTS_RECEIVABLE),
        inventory: LineHistory::lookup(balance, balance_sheet::INVENTORY),
        property_plant_equipment: LineHistory::lookup(
            balance,
            balance_sheet::PROPERTY_PLANT_EQUIPMENT,
        ),
        goodwill: LineHistory::lookup(balance, balance_sheet::GOODWILL),
        total_assets: LineHistory::lookup(balance, balance_sheet::TOTAL_ASSETS),
        total_liabilities: LineHistory::lookup(balance, balance_sheet::TOTAL_LIABILITIES),
        total_equity: LineHistory::lookup(balance, balance_sheet::TOTAL_EQUITY),
        current_assets: LineHistory::lookup(balance, balance_sheet::CURRENT_ASSETS),
        current_liabilities: LineHistory::lookup(balance, balance_sheet::CURRENT_LIABILITIES),

        operating_cash_flow: LineHistory::lookup(cash, cash_flow::OPERATING_CASH_FLOW),
        capital_expenditures: LineHistory::lookup(cash, cash_flow::CAPITAL_EXPENDITURES),

        quarterly_revenue: LineHistory::lookup(quarterly, income_statement::TOTAL_REVENUE),
        quarterly_net_income: LineHistory::lookup(quarterly, income_statement::NET_INCOME),

        trailing_pe: quote.trailing_pe.and_then(finite),
        price_to_book: quote.price_to_book.and_then(finite),
        dividend_yield: quote.dividend_yield.and_then(finite),
    })
}
