//! Writing run artifacts to an output directory.

use finratio_metrics::MetricId;
use finratio_output::{
    BarChart, ChartError, ExportError, ExportFormat, Exporter, ReportDocument, ReportError,
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Errors writing run artifacts.
#[derive(Debug, Error)]
pub(crate) enum OutputError {
    /// Result export failed.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Report rendering failed.
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Chart drawing failed.
    #[error("Chart error: {0}")]
    Chart(#[from] ChartError),

    /// File or directory could not be written.
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn write_file(path: PathBuf, content: &str) -> Result<PathBuf, OutputError> {
    std::fs::write(&path, content).map_err(|source| OutputError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Write exports, the report and the optional chart into `dir`.
///
/// Exports list records in report order. Returns the written paths. A chart
/// metric with no values is logged and skipped.
pub(crate) fn write_outputs(
    dir: &Path,
    report: &ReportDocument,
    chart_metric: Option<MetricId>,
) -> Result<Vec<PathBuf>, OutputError> {
    std::fs::create_dir_all(dir).map_err(|source| OutputError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let results = report.ordered_results();
    let mut written = Vec::new();

    for format in [ExportFormat::Csv, ExportFormat::PrettyJson] {
        let path = dir.join(format!("results.{}", format.extension()));
        written.push(write_file(path, &results.export_to_string(format)?)?);
    }

    written.push(write_file(dir.join("report.txt"), &report.to_text())?);
    written.push(write_file(dir.join("report.md"), &report.to_markdown())?);

    if let Some(metric) = chart_metric {
        let chart = BarChart::new(metric);
        match chart.render_svg(&results) {
            Ok(svg) => {
                written.push(write_file(dir.join(format!("chart_{}.svg", metric.name())), &svg)?);
            }
            Err(ChartError::NoData { metric }) => {
                warn!(%metric, "no values to chart, skipping chart");
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(dir = %dir.display(), files = written.len(), "wrote run artifacts");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use finratio_metrics::{FinancialRecord, RatioSet, ResultSet, SortDirection};
    use finratio_output::ReportBuilder;
    use std::collections::BTreeMap;

    fn record(symbol: &str, gross_margin: f64) -> FinancialRecord {
        let ratios = RatioSet {
            gross_margin: Some(gross_margin),
            ..RatioSet::default()
        };
        FinancialRecord::new(symbol, ratios, BTreeMap::new())
    }

    fn report() -> ReportDocument {
        let results = ResultSet::new(vec![MetricId::GrossMargin], vec![record("TCS.NS", 42.0)]);
        ReportBuilder::new()
            .analyst("Research Desk")
            .build(results)
            .unwrap()
    }

    #[test]
    fn test_write_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("run");

        let written = write_outputs(&out, &report(), Some(MetricId::GrossMargin)).unwrap();

        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "results.csv",
                "results.json",
                "report.txt",
                "report.md",
                "chart_gross_margin.svg"
            ]
        );
        let csv = std::fs::read_to_string(out.join("results.csv")).unwrap();
        assert!(csv.contains("TCS.NS,42"));
    }

    #[test]
    fn test_exports_follow_report_order() {
        let results = ResultSet::new(
            vec![MetricId::GrossMargin],
            vec![
                record("WIPRO.NS", 30.0),
                record("TCS.NS", 42.0),
                record("INFY.NS", 36.0),
            ],
        );
        let report = ReportBuilder::new()
            .sort(MetricId::GrossMargin, SortDirection::Descending)
            .build(results)
            .unwrap();
        let dir = tempfile::tempdir().unwrap();

        write_outputs(dir.path(), &report, None).unwrap();

        let csv = std::fs::read_to_string(dir.path().join("results.csv")).unwrap();
        let symbols: Vec<&str> = csv
            .lines()
            .skip(1)
            .filter_map(|line| line.split(',').next())
            .collect();
        assert_eq!(symbols, ["TCS.NS", "INFY.NS", "WIPRO.NS"]);

        let text = std::fs::read_to_string(dir.path().join("report.txt")).unwrap();
        assert!(text.find("TCS.NS").unwrap() < text.find("WIPRO.NS").unwrap());
    }

    #[test]
    fn test_empty_chart_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_outputs(dir.path(), &report(), Some(MetricId::DividendYield)).unwrap();
        assert_eq!(written.len(), 4);
    }
}
