//! Per-symbol records and the result set they are collected into.

use crate::performance::PriceWindow;
use crate::ranking::{RankSpec, SortDirection, sort_by_metric};
use crate::ratios::RatioSet;
use crate::registry::MetricId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every metric computed for one symbol in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    symbol: String,
    ratios: RatioSet,
    performance: BTreeMap<PriceWindow, Option<f64>>,
}

impl FinancialRecord {
    /// Assemble a record from its ratios and per-window price performance.
    pub fn new(
        symbol: impl Into<String>,
        ratios: RatioSet,
        performance: BTreeMap<PriceWindow, Option<f64>>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            ratios,
            performance,
        }
    }

    /// Ticker symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Ratio set.
    pub const fn ratios(&self) -> &RatioSet {
        &self.ratios
    }

    /// Price performance for a window, `None` if unavailable or not computed.
    pub fn performance(&self, window: PriceWindow) -> Option<f64> {
        self.performance.get(&window).copied().flatten()
    }

    /// Value of any metric.
    pub fn get(&self, metric: MetricId) -> Option<f64> {
        match metric.window() {
            Some(window) => self.performance(window),
            None => self.ratios.get(metric),
        }
    }
}

/// Records of one run, in input symbol order, with the selected columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    columns: Vec<MetricId>,
    records: Vec<FinancialRecord>,
}

impl ResultSet {
    /// Create a result set over `columns`.
    pub const fn new(columns: Vec<MetricId>, records: Vec<FinancialRecord>) -> Self {
        Self { columns, records }
    }

    /// Selected output columns.
    pub fn columns(&self) -> &[MetricId] {
        &self.columns
    }

    /// Records in input order.
    pub fn records(&self) -> &[FinancialRecord] {
        &self.records
    }

    /// Number of records.
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no symbol produced a record.
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over records in input order.
    pub fn iter(&self) -> std::slice::Iter<'_, FinancialRecord> {
        self.records.iter()
    }

    /// Record for a symbol.
    pub fn get(&self, symbol: &str) -> Option<&FinancialRecord> {
        self.records.iter().find(|r| r.symbol == symbol)
    }

    /// All records re-sorted by a metric.
    pub fn sorted_by(&self, metric: MetricId, direction: SortDirection) -> Vec<&FinancialRecord> {
        sort_by_metric(&self.records, metric, direction)
    }

    /// The first `spec.n` records of [`sorted_by`](Self::sorted_by).
    pub fn ranked(&self, spec: &RankSpec) -> Vec<&FinancialRecord> {
        let mut sorted = self.sorted_by(spec.metric, spec.direction);
        sorted.truncate(spec.n);
        sorted
    }

    /// `(symbol, value)` pairs of one metric, in input order.
    pub fn column(&self, metric: MetricId) -> Vec<(&str, Option<f64>)> {
        self.records
            .iter()
            .map(|r| (r.symbol(), r.get(metric)))
            .collect()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a FinancialRecord;
    type IntoIter = std::slice::Iter<'a, FinancialRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(symbol: &str, growth: Option<f64>, perf: Option<f64>) -> FinancialRecord {
        let ratios = RatioSet {
            revenue_growth: growth,
            ..Default::default()
        };
        FinancialRecord::new(symbol, ratios, BTreeMap::from([(PriceWindow::Days30, perf)]))
    }

    fn sample() -> ResultSet {
        ResultSet::new(
            vec![MetricId::RevenueGrowth, MetricId::Performance30d],
            vec![
                record("A", Some(5.0), Some(-2.0)),
                record("B", None, Some(4.0)),
                record("C", Some(12.0), None),
                record("D", Some(5.0), Some(1.0)),
            ],
        )
    }

    fn symbols(records: &[&FinancialRecord]) -> Vec<String> {
        records.iter().map(|r| r.symbol().to_string()).collect()
    }

    #[test]
    fn test_record_lookup() {
        let r = record("A", Some(5.0), Some(-2.0));
        assert_eq!(r.get(MetricId::RevenueGrowth), Some(5.0));
        assert_eq!(r.get(MetricId::Performance30d), Some(-2.0));
        assert_eq!(r.get(MetricId::Performance180d), None);
    }

    #[test]
    fn test_sorted_by_descending_is_stable_with_unavailable_last() {
        let set = sample();
        let sorted = set.sorted_by(MetricId::RevenueGrowth, SortDirection::Descending);
        assert_eq!(symbols(&sorted), ["C", "A", "D", "B"]);
    }

    #[test]
    fn test_sorted_by_ascending_keeps_unavailable_last() {
        let set = sample();
        let sorted = set.sorted_by(MetricId::Performance30d, SortDirection::Ascending);
        assert_eq!(symbols(&sorted), ["A", "D", "B", "C"]);
    }

    #[test]
    fn test_ranked_truncates() {
        let set = sample();
        assert_eq!(
            symbols(&set.ranked(&RankSpec::top(MetricId::RevenueGrowth, 2))),
            ["C", "A"]
        );
        assert_eq!(set.ranked(&RankSpec::top(MetricId::RevenueGrowth, 10)).len(), 4);
        assert!(set.ranked(&RankSpec::top(MetricId::RevenueGrowth, 0)).is_empty());
    }

    #[test]
    fn test_input_order_is_preserved() {
        let set = sample();
        let order: Vec<&str> = set.iter().map(FinancialRecord::symbol).collect();
        assert_eq!(order, ["A", "B", "C", "D"]);
        assert_eq!(set.get("C").unwrap().get(MetricId::RevenueGrowth), Some(12.0));
        assert_eq!(set.column(MetricId::Performance30d)[2], ("C", None));
    }
}
