//! Metric Registry
//!
//! Catalog of every metric a [`FinancialRecord`](crate::FinancialRecord) can
//! carry, with its stable name, display label, unit and category. Metrics are
//! selected as output columns and sort keys by name.

use crate::performance::PriceWindow;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A metric name that is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown metric '{0}'")]
pub struct UnknownMetric(pub String);

/// A category name that is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown metric category '{0}'")]
pub struct UnknownCategory(pub String);

/// Identifies one column of a financial record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MetricId {
    /// Total revenue of the latest annual period
    Revenue,
    /// Annual revenue growth
    RevenueGrowth,
    /// Annual cost of revenue growth
    CostOfRevenueGrowth,
    /// Annual gross profit growth
    GrossProfitGrowth,
    /// Annual operating income growth
    OperatingIncomeGrowth,
    /// Annual net income growth
    NetIncomeGrowth,
    /// Quarter-over-quarter revenue growth
    QuarterlyRevenueGrowth,
    /// Quarter-over-quarter net income growth
    QuarterlyNetIncomeGrowth,
    /// Gross profit over revenue
    GrossMargin,
    /// Operating income over revenue
    OperatingMargin,
    /// Net income over revenue
    NetMargin,
    /// Net income over total equity
    ReturnOnEquity,
    /// Net income over total assets
    ReturnOnAssets,
    /// Current assets over current liabilities
    CurrentRatio,
    /// Current assets less inventory over current liabilities
    QuickRatio,
    /// Total liabilities over total equity
    DebtToEquity,
    /// Total liabilities over total assets
    DebtToAssets,
    /// Revenue over total assets
    AssetTurnover,
    /// Cost of revenue over inventory
    InventoryTurnover,
    /// Revenue over accounts receivable
    ReceivablesTurnover,
    /// Trailing price to earnings
    TrailingPe,
    /// Price to book
    PriceToBook,
    /// Dividend yield
    DividendYield,
    /// Operating cash flow over revenue
    OperatingCashFlowToSales,
    /// Operating cash flow less capital expenditures
    FreeCashFlow,
    /// Price change over 30 days
    Performance30d,
    /// Price change over 180 days
    Performance180d,
    /// Price change over 365 days
    Performance365d,
    /// Price change over one year
    Performance1y,
}

/// Metric categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricCategory {
    /// Absolute size (revenue, free cash flow)
    Size,
    /// Period-over-period growth
    Growth,
    /// Profit margins
    Profitability,
    /// Returns on equity and assets
    Returns,
    /// Short-term solvency
    Liquidity,
    /// Balance sheet leverage
    Leverage,
    /// Asset utilization
    Efficiency,
    /// Cash generation
    CashFlow,
    /// Market valuation
    Valuation,
    /// Price performance
    Performance,
}

impl MetricCategory {
    /// Every category in catalog order.
    pub const fn all() -> [Self; 10] {
        [
            Self::Size,
            Self::Growth,
            Self::Profitability,
            Self::Returns,
            Self::Liquidity,
            Self::Leverage,
            Self::Efficiency,
            Self::CashFlow,
            Self::Valuation,
            Self::Performance,
        ]
    }

    /// Display name of the category.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Size => "Size",
            Self::Growth => "Growth",
            Self::Profitability => "Profitability",
            Self::Returns => "Returns",
            Self::Liquidity => "Liquidity",
            Self::Leverage => "Leverage",
            Self::Efficiency => "Efficiency",
            Self::CashFlow => "Cash Flow",
            Self::Valuation => "Valuation",
            Self::Performance => "Performance",
        }
    }
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for MetricCategory {
    type Err = UnknownCategory;

    /// Parse a display name, ignoring case; `_` stands for a space.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('_', " ");
        Self::all()
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Unit a metric is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricUnit {
    /// Percentage points (already multiplied by 100)
    Percent,
    /// Plain ratio or multiple
    Ratio,
    /// Reporting currency
    Currency,
    /// Copied from the quote provider without rescaling
    AsReported,
}

/// Metric metadata
#[derive(Debug, Clone)]
pub struct MetricInfo {
    /// Metric identifier
    pub id: MetricId,
    /// Stable name used in configuration, CLI flags and exports
    pub name: &'static str,
    /// Column label in tables and reports
    pub label: &'static str,
    /// Unit of the value
    pub unit: MetricUnit,
    /// Metric category
    pub category: MetricCategory,
    /// Brief description of what the metric measures
    pub description: &'static str,
}

impl MetricId {
    /// Every metric in catalog order.
    pub const fn all() -> [Self; 29] {
        [
            Self::Revenue,
            Self::RevenueGrowth,
            Self::CostOfRevenueGrowth,
            Self::GrossProfitGrowth,
            Self::OperatingIncomeGrowth,
            Self::NetIncomeGrowth,
            Self::QuarterlyRevenueGrowth,
            Self::QuarterlyNetIncomeGrowth,
            Self::GrossMargin,
            Self::OperatingMargin,
            Self::NetMargin,
            Self::ReturnOnEquity,
            Self::ReturnOnAssets,
            Self::CurrentRatio,
            Self::QuickRatio,
            Self::DebtToEquity,
            Self::DebtToAssets,
            Self::AssetTurnover,
            Self::InventoryTurnover,
            Self::ReceivablesTurnover,
            Self::TrailingPe,
            Self::PriceToBook,
            Self::DividendYield,
            Self::OperatingCashFlowToSales,
            Self::FreeCashFlow,
            Self::Performance30d,
            Self::Performance180d,
            Self::Performance365d,
            Self::Performance1y,
        ]
    }

    /// Stable snake_case name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::RevenueGrowth => "revenue_growth",
            Self::CostOfRevenueGrowth => "cogs_growth",
            Self::GrossProfitGrowth => "gross_profit_growth",
            Self::OperatingIncomeGrowth => "operating_income_growth",
            Self::NetIncomeGrowth => "net_income_growth",
            Self::QuarterlyRevenueGrowth => "quarterly_revenue_growth",
            Self::QuarterlyNetIncomeGrowth => "quarterly_net_income_growth",
            Self::GrossMargin => "gross_margin",
            Self::OperatingMargin => "operating_margin",
            Self::NetMargin => "net_margin",
            Self::ReturnOnEquity => "roe",
            Self::ReturnOnAssets => "roa",
            Self::CurrentRatio => "current_ratio",
            Self::QuickRatio => "quick_ratio",
            Self::DebtToEquity => "debt_to_equity",
            Self::DebtToAssets => "debt_to_assets",
            Self::AssetTurnover => "asset_turnover",
            Self::InventoryTurnover => "inventory_turnover",
            Self::ReceivablesTurnover => "receivables_turnover",
            Self::TrailingPe => "pe_ratio",
            Self::PriceToBook => "pb_ratio",
            Self::DividendYield => "dividend_yield",
            Self::OperatingCashFlowToSales => "ocf_to_sales",
            Self::FreeCashFlow => "free_cash_flow",
            Self::Performance30d => "perf_30d",
            Self::Performance180d => "perf_180d",
            Self::Performance365d => "perf_365d",
            Self::Performance1y => "perf_1y",
        }
    }

    /// Display label.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Revenue => "Revenue",
            Self::RevenueGrowth => "Revenue Growth",
            Self::CostOfRevenueGrowth => "COGS Growth",
            Self::GrossProfitGrowth => "Gross Profit Growth",
            Self::OperatingIncomeGrowth => "Operating Income Growth",
            Self::NetIncomeGrowth => "Net Income Growth",
            Self::QuarterlyRevenueGrowth => "Quarterly Revenue Growth",
            Self::QuarterlyNetIncomeGrowth => "Quarterly Net Income Growth",
            Self::GrossMargin => "Gross Profit Margin",
            Self::OperatingMargin => "Operating Profit Margin",
            Self::NetMargin => "Net Profit Margin",
            Self::ReturnOnEquity => "Return on Equity (ROE)",
            Self::ReturnOnAssets => "Return on Assets (ROA)",
            Self::CurrentRatio => "Current Ratio",
            Self::QuickRatio => "Quick Ratio",
            Self::DebtToEquity => "Debt-to-Equity",
            Self::DebtToAssets => "Debt-to-Assets",
            Self::AssetTurnover => "Asset Turnover",
            Self::InventoryTurnover => "Inventory Turnover",
            Self::ReceivablesTurnover => "Receivables Turnover",
            Self::TrailingPe => "P/E Ratio",
            Self::PriceToBook => "P/B Ratio",
            Self::DividendYield => "Dividend Yield",
            Self::OperatingCashFlowToSales => "Operating Cash Flow to Sales",
            Self::FreeCashFlow => "Free Cash Flow",
            Self::Performance30d => "30 Day Price Performance",
            Self::Performance180d => "180 Day Price Performance",
            Self::Performance365d => "365 Day Price Performance",
            Self::Performance1y => "1 Year Price Performance",
        }
    }

    /// Unit of the metric's values.
    pub const fn unit(&self) -> MetricUnit {
        match self {
            Self::Revenue | Self::FreeCashFlow => MetricUnit::Currency,
            Self::CurrentRatio
            | Self::QuickRatio
            | Self::DebtToEquity
            | Self::DebtToAssets
            | Self::AssetTurnover
            | Self::InventoryTurnover
            | Self::ReceivablesTurnover
            | Self::TrailingPe
            | Self::PriceToBook => MetricUnit::Ratio,
            Self::DividendYield => MetricUnit::AsReported,
            _ => MetricUnit::Percent,
        }
    }

    /// Category of the metric.
    pub const fn category(&self) -> MetricCategory {
        match self {
            Self::Revenue | Self::FreeCashFlow => MetricCategory::Size,
            Self::RevenueGrowth
            | Self::CostOfRevenueGrowth
            | Self::GrossProfitGrowth
            | Self::OperatingIncomeGrowth
            | Self::NetIncomeGrowth
            | Self::QuarterlyRevenueGrowth
            | Self::QuarterlyNetIncomeGrowth => MetricCategory::Growth,
            Self::GrossMargin | Self::OperatingMargin | Self::NetMargin => {
                MetricCategory::Profitability
            }
            Self::ReturnOnEquity | Self::ReturnOnAssets => MetricCategory::Returns,
            Self::CurrentRatio | Self::QuickRatio => MetricCategory::Liquidity,
            Self::DebtToEquity | Self::DebtToAssets => MetricCategory::Leverage,
            Self::AssetTurnover | Self::InventoryTurnover | Self::ReceivablesTurnover => {
                MetricCategory::Efficiency
            }
            Self::OperatingCashFlowToSales => MetricCategory::CashFlow,
            Self::TrailingPe | Self::PriceToBook | Self::DividendYield => {
                MetricCategory::Valuation
            }
            Self::Performance30d
            | Self::Performance180d
            | Self::Performance365d
            | Self::Performance1y => MetricCategory::Performance,
        }
    }

    /// The price window of a performance metric.
    pub const fn window(&self) -> Option<PriceWindow> {
        match self {
            Self::Performance30d => Some(PriceWindow::Days30),
            Self::Performance180d => Some(PriceWindow::Days180),
            Self::Performance365d => Some(PriceWindow::Days365),
            Self::Performance1y => Some(PriceWindow::OneYear),
            _ => None,
        }
    }

    const fn description(&self) -> &'static str {
        match self.category() {
            MetricCategory::Size => "Latest annual figure in reporting currency",
            MetricCategory::Growth => "Change from the prior period to the latest one",
            MetricCategory::Profitability => "Share of revenue kept as profit",
            MetricCategory::Returns => "Net income relative to the capital base",
            MetricCategory::Liquidity => "Ability to cover short-term obligations",
            MetricCategory::Leverage => "Reliance on liabilities to fund assets",
            MetricCategory::Efficiency => "Revenue or cost generated per unit of assets",
            MetricCategory::CashFlow => "Cash generated by operations",
            MetricCategory::Valuation => "Market price relative to fundamentals",
            MetricCategory::Performance => "Change in closing price over the window",
        }
    }

    /// Full catalog entry.
    pub const fn info(&self) -> MetricInfo {
        MetricInfo {
            id: *self,
            name: self.name(),
            label: self.label(),
            unit: self.unit(),
            category: self.category(),
            description: self.description(),
        }
    }

    /// Look up a metric by its stable name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|m| m.name() == name)
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for MetricId {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s.trim()).ok_or_else(|| UnknownMetric(s.to_string()))
    }
}

impl TryFrom<String> for MetricId {
    type Error = UnknownMetric;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MetricId> for String {
    fn from(metric: MetricId) -> Self {
        metric.name().to_string()
    }
}

/// Get all available metric info
pub fn available_metrics() -> Vec<MetricInfo> {
    MetricId::all().iter().map(MetricId::info).collect()
}

/// Get metrics by category
pub fn metrics_by_category(category: MetricCategory) -> Vec<MetricInfo> {
    available_metrics()
        .into_iter()
        .filter(|m| m.category == category)
        .collect()
}

/// Count metrics by category
pub fn count_by_category() -> HashMap<MetricCategory, usize> {
    let mut counts = HashMap::new();
    for metric in available_metrics() {
        *counts.entry(metric.category).or_insert(0) += 1;
    }
    counts
}

/// Columns of the standard analysis table.
pub fn default_columns() -> Vec<MetricId> {
    vec![
        MetricId::Revenue,
        MetricId::RevenueGrowth,
        MetricId::CostOfRevenueGrowth,
        MetricId::GrossProfitGrowth,
        MetricId::OperatingIncomeGrowth,
        MetricId::NetIncomeGrowth,
        MetricId::GrossMargin,
        MetricId::OperatingMargin,
        MetricId::NetMargin,
        MetricId::ReturnOnEquity,
        MetricId::ReturnOnAssets,
        MetricId::CurrentRatio,
        MetricId::QuickRatio,
        MetricId::DebtToEquity,
        MetricId::DebtToAssets,
        MetricId::AssetTurnover,
        MetricId::InventoryTurnover,
        MetricId::ReceivablesTurnover,
        MetricId::TrailingPe,
        MetricId::PriceToBook,
        MetricId::DividendYield,
        MetricId::OperatingCashFlowToSales,
        MetricId::FreeCashFlow,
        MetricId::Performance30d,
        MetricId::Performance180d,
        MetricId::Performance365d,
    ]
}
