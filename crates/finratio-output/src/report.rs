//! Printable report generation.
//!
//! A [`ReportDocument`] gathers everything one run produced: a metadata
//! header, the full result table, one ranked sub-table per [`RankSpec`], the
//! symbols that were skipped and a closing disclaimer. It renders to plain
//! text split into fixed-length pages, or to Markdown.
//!
//! The full table follows the report's sort order when one is set. Ranked
//! sections always rank the records in input order.

use crate::table::Table;
use chrono::{Local, NaiveDate};
use finratio_metrics::{MetricId, RankSpec, ResultSet, SortDirection};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lines per printed page, footer included.
pub const DEFAULT_PAGE_LINES: usize = 60;

/// Shortest page that still fits a header row and the footer.
const MIN_PAGE_LINES: usize = 10;

/// Wrap width of prose paragraphs.
const TEXT_WIDTH: usize = 78;

/// Page break between printed pages.
const FORM_FEED: char = '\u{000C}';

/// Closing text of every report.
pub const DISCLAIMER: &str = "This report is generated automatically from publicly available \
financial statements and market prices. Figures may be incomplete, delayed or restated by the \
issuer, and unavailable values are shown as N/A. Nothing in this report is investment advice.";

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Page too short to lay out.
    #[error("Page length {lines} is below the minimum of {MIN_PAGE_LINES} lines")]
    PageTooShort {
        /// Requested lines per page.
        lines: usize,
    },
}

/// Header block of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Report title.
    pub title: String,

    /// Analyst the report is prepared by.
    pub analyst: String,

    /// Report date.
    pub date: NaiveDate,

    /// Index sheet the symbols came from, if any.
    pub sheet: Option<String>,

    /// Symbols requested.
    pub requested: usize,

    /// Symbols with a record.
    pub processed: usize,
}

/// A skipped symbol and the reason it was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SkippedEntry {
    symbol: String,
    reason: String,
}

/// A complete report, ready to render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDocument {
    metadata: ReportMetadata,
    results: ResultSet,
    sections: Vec<RankSpec>,
    skipped: Vec<SkippedEntry>,
    page_lines: usize,
    #[serde(default)]
    sort: Option<(MetricId, SortDirection)>,
}

impl ReportDocument {
    /// Header block.
    pub const fn metadata(&self) -> &ReportMetadata {
        &self.metadata
    }

    /// Full result set, in input order.
    pub const fn results(&self) -> &ResultSet {
        &self.results
    }

    /// Sort order of the full table, if any.
    pub const fn sort(&self) -> Option<(MetricId, SortDirection)> {
        self.sort
    }

    /// The full table, in report order.
    pub fn table(&self) -> Table<'_> {
        match self.sort {
            Some((metric, direction)) => Table::sorted(&self.results, metric, direction),
            None => Table::new(&self.results),
        }
    }

    /// The result set with its records in report order.
    pub fn ordered_results(&self) -> ResultSet {
        let records = self.table().rows().iter().map(|r| (*r).clone()).collect();
        ResultSet::new(self.results.columns().to_vec(), records)
    }

    /// Ranked sections, in report order.
    pub fn sections(&self) -> &[RankSpec] {
        &self.sections
    }

    /// `(symbol, reason)` of every skipped symbol.
    pub fn skipped(&self) -> impl Iterator<Item = (&str, &str)> {
        self.skipped
            .iter()
            .map(|s| (s.symbol.as_str(), s.reason.as_str()))
    }

    /// Lines per printed page.
    pub const fn page_lines(&self) -> usize {
        self.page_lines
    }

    fn header_lines(&self) -> Vec<String> {
        let meta = &self.metadata;
        let mut lines = vec![meta.title.clone(), "=".repeat(meta.title.len())];
        lines.push(format!("Prepared by: {}", meta.analyst));
        lines.push(format!("Date: {}", meta.date));
        if let Some(sheet) = &meta.sheet {
            lines.push(format!("Index: {sheet}"));
        }
        lines.push(format!(
            "Symbols: {} requested, {} processed, {} skipped",
            meta.requested,
            meta.processed,
            self.skipped.len()
        ));
        lines
    }

    /// Body lines before pagination.
    fn body_lines(&self) -> Vec<String> {
        let mut lines = self.header_lines();

        lines.push(String::new());
        lines.push("Financial Ratios".to_string());
        lines.extend(self.table().ascii_lines());

        for spec in &self.sections {
            lines.push(String::new());
            lines.push(spec.title());
            lines.extend(Table::ranked(&self.results, spec).ascii_lines());
        }

        if !self.skipped.is_empty() {
            lines.push(String::new());
            lines.push("Skipped Symbols".to_string());
            for entry in &self.skipped {
                lines.push(format!("  {}: {}", entry.symbol, entry.reason));
            }
        }

        lines.push(String::new());
        lines.push("Disclaimer".to_string());
        lines.extend(wrap(DISCLAIMER, TEXT_WIDTH));
        lines
    }

    /// The report split into pages, each ending with its footer.
    pub fn pages(&self) -> Vec<String> {
        let body_per_page = self.body_per_page();
        let body = self.body_lines();
        let chunks: Vec<&[String]> = body.chunks(body_per_page).collect();
        let total = chunks.len();

        chunks
            .into_iter()
            .enumerate()
            .map(|(index, chunk)| {
                let mut page = chunk.join("\n");
                // Pad short pages so footers land on the same line.
                for _ in chunk.len()..body_per_page {
                    page.push('\n');
                }
                page.push_str(&format!("\n\nPage {} of {}\n", index + 1, total));
                page
            })
            .collect()
    }

    /// Number of printed pages.
    pub fn page_count(&self) -> usize {
        self.body_lines().len().div_ceil(self.body_per_page())
    }

    // One blank separator line and the footer.
    fn body_per_page(&self) -> usize {
        self.page_lines.saturating_sub(2).max(1)
    }

    /// Plain text with a form feed between pages.
    pub fn to_text(&self) -> String {
        self.pages().join(&FORM_FEED.to_string())
    }

    /// Markdown rendering without pagination.
    pub fn to_markdown(&self) -> String {
        let meta = &self.metadata;
        let mut output = String::new();

        output.push_str(&format!("# {}\n\n", meta.title));
        output.push_str(&format!("**Prepared by:** {}\n\n", meta.analyst));
        output.push_str(&format!("**Date:** {}\n\n", meta.date));
        if let Some(sheet) = &meta.sheet {
            output.push_str(&format!("**Index:** {sheet}\n\n"));
        }
        output.push_str(&format!(
            "**Symbols:** {} requested, {} processed, {} skipped\n\n",
            meta.requested,
            meta.processed,
            self.skipped.len()
        ));

        output.push_str("## Financial Ratios\n\n");
        output.push_str(&self.table().to_markdown());
        output.push('\n');

        for spec in &self.sections {
            output.push_str(&format!("## {}\n\n", spec.title()));
            output.push_str(&Table::ranked(&self.results, spec).to_markdown());
            output.push('\n');
        }

        if !self.skipped.is_empty() {
            output.push_str("## Skipped Symbols\n\n");
            for entry in &self.skipped {
                output.push_str(&format!("- **{}:** {}\n", entry.symbol, entry.reason));
            }
            output.push('\n');
        }

        output.push_str("## Disclaimer\n\n");
        output.push_str(DISCLAIMER);
        output.push('\n');
        output
    }

    /// Convert report to JSON string, with results in report order.
    pub fn to_json(&self) -> Result<String, ReportError> {
        let ordered = Self {
            results: self.ordered_results(),
            ..self.clone()
        };
        Ok(serde_json::to_string_pretty(&ordered)?)
    }
}

/// Greedy word wrap.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    title: Option<String>,
    analyst: Option<String>,
    date: Option<NaiveDate>,
    sheet: Option<String>,
    requested: Option<usize>,
    sections: Option<Vec<RankSpec>>,
    skipped: Vec<SkippedEntry>,
    page_lines: Option<usize>,
    sort: Option<(MetricId, SortDirection)>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the analyst name.
    pub fn analyst(mut self, analyst: impl Into<String>) -> Self {
        self.analyst = Some(analyst.into());
        self
    }

    /// Set the report date.
    pub const fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Set the index sheet.
    pub fn sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    /// Set the number of requested symbols.
    pub const fn requested(mut self, requested: usize) -> Self {
        self.requested = Some(requested);
        self
    }

    /// Set the ranked sections.
    pub fn sections(mut self, sections: Vec<RankSpec>) -> Self {
        self.sections = Some(sections);
        self
    }

    /// Add a skipped symbol.
    pub fn skipped(mut self, symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        self.skipped.push(SkippedEntry {
            symbol: symbol.into(),
            reason: reason.into(),
        });
        self
    }

    /// Set the lines per printed page.
    pub const fn page_lines(mut self, lines: usize) -> Self {
        self.page_lines = Some(lines);
        self
    }

    /// Sort the full table by a metric.
    pub const fn sort(mut self, metric: MetricId, direction: SortDirection) -> Self {
        self.sort = Some((metric, direction));
        self
    }

    /// Build the report over `results`.
    ///
    /// The requested count defaults to processed plus skipped symbols.
    pub fn build(self, results: ResultSet) -> Result<ReportDocument, ReportError> {
        let page_lines = self.page_lines.unwrap_or(DEFAULT_PAGE_LINES);
        if page_lines < MIN_PAGE_LINES {
            return Err(ReportError::PageTooShort { lines: page_lines });
        }

        let processed = results.len();
        let metadata = ReportMetadata {
            title: self
                .title
                .unwrap_or_else(|| "Stock Financial Analysis".to_string()),
            analyst: self.analyst.unwrap_or_default(),
            date: self.date.unwrap_or_else(|| Local::now().date_naive()),
            sheet: self.sheet,
            requested: self.requested.unwrap_or(processed + self.skipped.len()),
            processed,
        };

        Ok(ReportDocument {
            metadata,
            results,
            sections: self.sections.unwrap_or_else(RankSpec::default_sections),
            skipped: self.skipped,
            page_lines,
            sort: self.sort,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finratio_metrics::{FinancialRecord, MetricId, RatioSet};
    use std::collections::BTreeMap;

    fn results(count: usize) -> ResultSet {
        let records = (0..count)
            .map(|i| {
                let ratios = RatioSet {
                    revenue_growth: Some(i as f64),
                    ..RatioSet::default()
                };
                FinancialRecord::new(format!("SYM{i}.NS"), ratios, BTreeMap::new())
            })
            .collect();
        ResultSet::new(vec![MetricId::RevenueGrowth], records)
    }

    fn builder() -> ReportBuilder {
        ReportBuilder::new()
            .analyst("A. Analyst")
            .date(NaiveDate::from_ymd_opt(2024, 6, 28).unwrap())
            .sheet("NIFTY50")
    }

    #[test]
    fn test_header_and_disclaimer() {
        let report = builder()
            .skipped("BAD.NS", "timed out after 30s")
            .build(results(3))
            .unwrap();
        let text = report.to_text();

        assert!(text.starts_with("Stock Financial Analysis\n"));
        assert!(text.contains("Prepared by: A. Analyst"));
        assert!(text.contains("Date: 2024-06-28"));
        assert!(text.contains("Index: NIFTY50"));
        assert!(text.contains("Symbols: 4 requested, 3 processed, 1 skipped"));
        assert!(text.contains("BAD.NS: timed out after 30s"));
        assert!(text.contains("Top 10 by Revenue Growth"));
        assert!(text.contains("Disclaimer"));
        assert!(text.contains("investment advice."));
    }

    #[test]
    fn test_pagination() {
        let report = builder().page_lines(20).build(results(50)).unwrap();
        let pages = report.pages();

        assert!(pages.len() > 1);
        assert_eq!(pages.len(), report.page_count());
        for (i, page) in pages.iter().enumerate() {
            let lines: Vec<&str> = page.lines().collect();
            assert_eq!(lines.len(), 20);
            assert_eq!(lines[19], format!("Page {} of {}", i + 1, pages.len()));
        }

        let text = report.to_text();
        assert_eq!(text.matches(FORM_FEED).count(), pages.len() - 1);
    }

    #[test]
    fn test_page_too_short() {
        assert!(matches!(
            builder().page_lines(3).build(results(1)),
            Err(ReportError::PageTooShort { lines: 3 })
        ));
    }

    #[test]
    fn test_sections_are_ranked() {
        let report = builder()
            .sections(vec![RankSpec::top(MetricId::RevenueGrowth, 2)])
            .build(results(5))
            .unwrap();
        let markdown = report.to_markdown();

        assert!(markdown.contains("## Top 2 by Revenue Growth"));
        let section = markdown
            .split("## Top 2 by Revenue Growth")
            .nth(1)
            .unwrap();
        let first = section.find("SYM4.NS").unwrap();
        let second = section.find("SYM3.NS").unwrap();
        assert!(first < second);
        assert!(!section.split("## Disclaimer").next().unwrap().contains("SYM2.NS"));
    }

    #[test]
    fn test_sorted_table_in_every_rendering() {
        let report = builder()
            .sort(MetricId::RevenueGrowth, SortDirection::Descending)
            .sections(vec![])
            .build(results(3))
            .unwrap();

        let text = report.to_text();
        assert!(text.find("SYM2.NS").unwrap() < text.find("SYM1.NS").unwrap());
        assert!(text.find("SYM1.NS").unwrap() < text.find("SYM0.NS").unwrap());

        let markdown = report.to_markdown();
        assert!(markdown.find("SYM2.NS").unwrap() < markdown.find("SYM0.NS").unwrap());

        let ordered: Vec<String> = report
            .ordered_results()
            .iter()
            .map(|r| r.symbol().to_string())
            .collect();
        assert_eq!(ordered, ["SYM2.NS", "SYM1.NS", "SYM0.NS"]);
        assert_eq!(report.results().records()[0].symbol(), "SYM0.NS");

        let parsed: ReportDocument = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(parsed.results().records()[0].symbol(), "SYM2.NS");
        assert_eq!(
            parsed.sort(),
            Some((MetricId::RevenueGrowth, SortDirection::Descending))
        );
    }

    #[test]
    fn test_json_roundtrip_keeps_metadata() {
        let report = builder().build(results(2)).unwrap();
        let json = report.to_json().unwrap();
        let parsed: ReportDocument = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.metadata(), report.metadata());
        assert_eq!(parsed.results(), report.results());
    }

    #[test]
    fn test_wrap() {
        let lines = wrap(DISCLAIMER, TEXT_WIDTH);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|line| line.len() <= TEXT_WIDTH));
    }
}
