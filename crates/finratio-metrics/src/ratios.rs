//! Ratio Engine
//!
//! Derives margins, returns, liquidity, leverage, efficiency, cash flow and
//! growth figures from [`ExtractedFields`]. Each ratio is computed on its own,
//! so one unavailable input only blanks the ratios that use it.
//!
//! A present zero denominator yields an unavailable ratio, the same as a
//! missing one.

use crate::extract::ExtractedFields;
use crate::registry::MetricId;
use crate::value::{difference, percent, safe_div};
use serde::{Deserialize, Serialize};

/// Ratios and growth figures for one symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatioSet {
    /// Latest annual revenue
    pub revenue: Option<f64>,

    /// Revenue growth (%)
    pub revenue_growth: Option<f64>,
    /// Cost of revenue growth (%)
    pub cost_of_revenue_growth: Option<f64>,
    /// Gross profit growth (%)
    pub gross_profit_growth: Option<f64>,
    /// Operating income growth (%)
    pub operating_income_growth: Option<f64>,
    /// Net income growth (%)
    pub net_income_growth: Option<f64>,
    /// Quarter-over-quarter revenue growth (%)
    pub quarterly_revenue_growth: Option<f64>,
    /// Quarter-over-quarter net income growth (%)
    pub quarterly_net_income_growth: Option<f64>,

    /// Gross margin (%)
    pub gross_margin: Option<f64>,
    /// Operating margin (%)
    pub operating_margin: Option<f64>,
    /// Net margin (%)
    pub net_margin: Option<f64>,

    /// Return on equity (%)
    pub return_on_equity: Option<f64>,
    /// Return on assets (%)
    pub return_on_assets: Option<f64>,

    /// Current ratio
    pub current_ratio: Option<f64>,
    /// Quick ratio
    pub quick_ratio: Option<f64>,

    /// Debt to equity
    pub debt_to_equity: Option<f64>,
    /// Debt to assets
    pub debt_to_assets: Option<f64>,

    /// Asset turnover
    pub asset_turnover: Option<f64>,
    /// Inventory turnover
    pub inventory_turnover: Option<f64>,
    /// Receivables turnover
    pub receivables_turnover: Option<f64>,

    /// Trailing P/E
    pub trailing_pe: Option<f64>,
    /// Price to book
    pub price_to_book: Option<f64>,
    /// Dividend yield as reported
    pub dividend_yield: Option<f64>,

    /// Operating cash flow to sales (%)
    pub operating_cash_flow_to_sales: Option<f64>,
    /// Free cash flow
    pub free_cash_flow: Option<f64>,
}

impl RatioSet {
    /// Value of a ratio metric.
    ///
    /// Price performance metrics are not part of a ratio set and return `None`.
    pub const fn get(&self, metric: MetricId) -> Option<f64> {
        match metric {
            MetricId::Revenue => self.revenue,
            MetricId::RevenueGrowth => self.revenue_growth,
            MetricId::CostOfRevenueGrowth => self.cost_of_revenue_growth,
            MetricId::GrossProfitGrowth => self.gross_profit_growth,
            MetricId::OperatingIncomeGrowth => self.operating_income_growth,
            MetricId::NetIncomeGrowth => self.net_income_growth,
            MetricId::QuarterlyRevenueGrowth => self.quarterly_revenue_growth,
            MetricId::QuarterlyNetIncomeGrowth => self.quarterly_net_income_growth,
            MetricId::GrossMargin => self.gross_margin,
            MetricId::OperatingMargin => self.operating_margin,
            MetricId::NetMargin => self.net_margin,
            MetricId::ReturnOnEquity => self.return_on_equity,
            MetricId::ReturnOnAssets => self.return_on_assets,
            MetricId::CurrentRatio => self.current_ratio,
            MetricId::QuickRatio => self.quick_ratio,
            MetricId::DebtToEquity => self.debt_to_equity,
            MetricId::DebtToAssets => self.debt_to_assets,
            MetricId::AssetTurnover => self.asset_turnover,
            MetricId::InventoryTurnover => self.inventory_turnover,
            MetricId::ReceivablesTurnover => self.receivables_turnover,
            MetricId::TrailingPe => self.trailing_pe,
            MetricId::PriceToBook => self.price_to_book,
            MetricId::DividendYield => self.dividend_yield,
            MetricId::OperatingCashFlowToSales => self.operating_cash_flow_to_sales,
            MetricId::FreeCashFlow => self.free_cash_flow,
            MetricId::Performance30d
            | MetricId::Performance180d
            | MetricId::Performance365d
            | MetricId::Performance1y => None,
        }
    }
}

/// Compute every ratio from the extracted fields.
pub fn compute(fields: &ExtractedFields) -> RatioSet {
    let revenue = fields.revenue.current;
    let cost_of_revenue = fields.cost_of_revenue.current;
    let net_income = fields.net_income.current;
    let total_assets = fields.total_assets.current;
    let total_equity = fields.total_equity.current;
    let total_liabilities = fields.total_liabilities.current;
    let current_assets = fields.current_assets.current;
    let current_liabilities = fields.current_liabilities.current;
    let inventory = fields.inventory.current;
    let operating_cash_flow = fields.operating_cash_flow.current;

    RatioSet {
        revenue,

        revenue_growth: fields.revenue.growth(),
        cost_of_revenue_growth: fields.cost_of_revenue.growth(),
        gross_profit_growth: fields.gross_profit.growth(),
        operating_income_growth: fields.operating_income.growth(),
        net_income_growth: fields.net_income.growth(),
        quarterly_revenue_growth: fields.quarterly_revenue.growth(),
        quarterly_net_income_growth: fields.quarterly_net_income.growth(),

        gross_margin: percent(safe_div(fields.gross_profit.current, revenue)),
        operating_margin: percent(safe_div(fields.operating_income.current, revenue)),
        net_margin: percent(safe_div(net_income, revenue)),

        return_on_equity: percent(safe_div(net_income, total_equity)),
        return_on_assets: percent(safe_div(net_income, total_assets)),

        current_ratio: safe_div(current_assets, current_liabilities),
        quick_ratio: safe_div(difference(current_assets, inventory), current_liabilities),

        debt_to_equity: safe_div(total_liabilities, total_equity),
        debt_to_assets: safe_div(total_liabilities, total_assets),

        asset_turnover: safe_div(revenue, total_assets),
        inventory_turnover: safe_div(cost_of_revenue, inventory),
        receivables_turnover: safe_div(revenue, fields.accounts_receivable.current),

        trailing_pe: fields.trailing_pe,
        price_to_book: fields.price_to_book,
        dividend_yield: fields.dividend_yield,

        operating_cash_flow_to_sales: percent(safe_div(operating_cash_flow, revenue)),
        free_cash_flow: difference(operating_cash_flow, fields.capital_expenditures.current),
    }
}
