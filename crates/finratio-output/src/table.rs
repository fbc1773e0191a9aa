//! Tabular views of a result set.
//!
//! A [`Table`] borrows records from a [`ResultSet`] and renders them either
//! as fixed-width ASCII or as a Markdown table. Rows are kept in input order
//! unless the table was built sorted or ranked.

use crate::format::format_metric;
use finratio_metrics::{FinancialRecord, MetricId, RankSpec, ResultSet, SortDirection};

const SYMBOL_HEADER: &str = "Symbol";

/// Rows and columns selected for display.
#[derive(Debug, Clone)]
pub struct Table<'a> {
    columns: Vec<MetricId>,
    rows: Vec<&'a FinancialRecord>,
}

impl<'a> Table<'a> {
    /// All records and columns of a result set, in input order.
    pub fn new(results: &'a ResultSet) -> Self {
        Self::from_rows(results.columns().to_vec(), results.iter().collect())
    }

    /// All records re-sorted by a metric.
    pub fn sorted(results: &'a ResultSet, metric: MetricId, direction: SortDirection) -> Self {
        Self::from_rows(results.columns().to_vec(), results.sorted_by(metric, direction))
    }

    /// A ranked view showing only the ranking metric.
    pub fn ranked(results: &'a ResultSet, spec: &RankSpec) -> Self {
        Self::from_rows(vec![spec.metric], results.ranked(spec))
    }

    /// Build a table from explicit rows.
    pub const fn from_rows(columns: Vec<MetricId>, rows: Vec<&'a FinancialRecord>) -> Self {
        Self { columns, rows }
    }

    /// Displayed columns, after the symbol column.
    pub fn columns(&self) -> &[MetricId] {
        &self.columns
    }

    /// Displayed rows.
    pub fn rows(&self) -> &[&'a FinancialRecord] {
        &self.rows
    }

    /// Number of rows.
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn cells(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|record| {
                std::iter::once(record.symbol().to_string())
                    .chain(self.columns.iter().map(|m| format_metric(record, *m)))
                    .collect()
            })
            .collect()
    }

    /// Fixed-width ASCII rendering, one string per line.
    pub fn ascii_lines(&self) -> Vec<String> {
        let headers: Vec<&str> = std::iter::once(SYMBOL_HEADER)
            .chain(self.columns.iter().map(MetricId::name))
            .collect();
        let cells = self.cells();

        let widths: Vec<usize> = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                cells
                    .iter()
                    .map(|row| row[i].len())
                    .chain(std::iter::once(header.len()))
                    .max()
                    .unwrap_or_default()
            })
            .collect();
        let total = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);

        let render = |row: &[&str]| -> String {
            row.iter()
                .zip(&widths)
                .enumerate()
                .map(|(i, (cell, width))| {
                    if i == 0 {
                        format!("{cell:<width$}")
                    } else {
                        format!("{cell:>width$}")
                    }
                })
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut lines = Vec::with_capacity(cells.len() + 4);
        lines.push("=".repeat(total));
        lines.push(render(&headers));
        lines.push("-".repeat(total));
        for row in &cells {
            let row: Vec<&str> = row.iter().map(String::as_str).collect();
            lines.push(render(&row));
        }
        lines.push("=".repeat(total));
        lines
    }

    /// Fixed-width ASCII rendering.
    pub fn to_ascii_table(&self) -> String {
        let mut output = self.ascii_lines().join("\n");
        output.push('\n');
        output
    }

    /// Markdown rendering with metric labels as headers.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str("| ");
        output.push_str(SYMBOL_HEADER);
        for metric in &self.columns {
            output.push_str(" | ");
            output.push_str(metric.label());
        }
        output.push_str(" |\n");

        output.push_str("|--------|");
        for _ in &self.columns {
            output.push_str("-------:|");
        }
        output.push('\n');

        for row in self.cells() {
            output.push_str("| ");
            output.push_str(&row.join(" | "));
            output.push_str(" |\n");
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finratio_metrics::RatioSet;
    use std::collections::BTreeMap;

    fn record(symbol: &str, roe: Option<f64>) -> FinancialRecord {
        let ratios = RatioSet {
            return_on_equity: roe,
            ..RatioSet::default()
        };
        FinancialRecord::new(symbol, ratios, BTreeMap::new())
    }

    fn results() -> ResultSet {
        ResultSet::new(
            vec![MetricId::ReturnOnEquity, MetricId::CurrentRatio],
            vec![
                record("TCS.NS", Some(45.5)),
                record("INFY.NS", None),
                record("HDFCBANK.NS", Some(16.25)),
            ],
        )
    }

    #[test]
    fn test_ascii_table_layout() {
        let results = results();
        let lines = Table::new(&results).ascii_lines();

        assert_eq!(lines.len(), 3 + 4);
        assert!(lines[1].starts_with("Symbol"));
        assert!(lines[1].contains("roe"));
        assert!(lines[3].starts_with("TCS.NS"));
        assert!(lines[3].contains("45.50%"));
        assert!(lines[4].contains("N/A"));
        assert_eq!(lines[0].len(), lines[2].len());
    }

    #[test]
    fn test_sorted_table_puts_unavailable_last() {
        let results = results();
        let table = Table::sorted(&results, MetricId::ReturnOnEquity, SortDirection::Ascending);
        let symbols: Vec<&str> = table.rows().iter().map(|r| r.symbol()).collect();
        assert_eq!(symbols, vec!["HDFCBANK.NS", "TCS.NS", "INFY.NS"]);
    }

    #[test]
    fn test_ranked_table_shows_one_column() {
        let results = results();
        let table = Table::ranked(&results, &RankSpec::top(MetricId::ReturnOnEquity, 1));
        assert_eq!(table.len(), 1);
        assert_eq!(table.columns(), &[MetricId::ReturnOnEquity]);
    }

    #[test]
    fn test_markdown() {
        let results = results();
        let markdown = Table::new(&results).to_markdown();

        assert!(markdown.starts_with("| Symbol | Return on Equity (ROE) | Current Ratio |"));
        assert!(markdown.contains("| INFY.NS | N/A | N/A |"));
        assert_eq!(markdown.lines().count(), 2 + 3);
    }

    #[test]
    fn test_empty_table() {
        let results = ResultSet::default();
        let table = Table::new(&results);
        assert!(table.is_empty());
        assert_eq!(table.ascii_lines().len(), 4);
    }
}
