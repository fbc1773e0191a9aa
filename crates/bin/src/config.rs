//! Analysis configuration.
//!
//! Loaded from a JSON file passed with `--config`; every field has a default,
//! so a file only needs the keys it changes. Command-line flags are applied
//! on top of the loaded values.

use chrono::NaiveDate;
use finratio::IndexSheet;
use finratio::pipeline::{DEFAULT_CONCURRENCY, PipelineConfig};
use finratio_metrics::{MetricId, PriceWindow, RankSpec, default_columns};
use finratio_output::DEFAULT_PAGE_LINES;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors loading a configuration file.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// File could not be read.
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid configuration JSON.
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A value is out of range.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Cache options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct CacheConfig {
    /// Read and write the SQLite cache.
    pub use_cache: bool,
    /// Ignore cached payloads and fetch again.
    pub force_refresh: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            use_cache: true,
            force_refresh: false,
        }
    }
}

/// Everything one `analyze` run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AnalysisConfig {
    /// Symbol workbook, or a directory of per-sheet CSV files.
    pub symbols_file: PathBuf,
    /// Index sheet to analyze.
    pub sheet: IndexSheet,
    /// Analyst named in the report header.
    pub analyst: String,
    /// Exchange suffix appended to bare symbols.
    pub symbol_suffix: String,
    /// Table columns.
    pub columns: Vec<MetricId>,
    /// Price performance windows.
    pub windows: Vec<PriceWindow>,
    /// Symbols fetched concurrently.
    pub concurrency: usize,
    /// Per-symbol timeout in seconds.
    pub timeout_secs: u64,
    /// Minimum delay between provider requests in milliseconds.
    pub rate_limit_ms: u64,
    /// Ranked report sections.
    pub sections: Vec<RankSpec>,
    /// Metric to chart, if any.
    pub chart_metric: Option<MetricId>,
    /// Directory for exports, report and chart.
    pub output_dir: Option<PathBuf>,
    /// Lines per printed report page.
    pub page_lines: usize,
    /// Cache options.
    pub cache: CacheConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            symbols_file: PathBuf::from("stocklist.xlsx"),
            sheet: IndexSheet::Nifty50,
            analyst: String::new(),
            symbol_suffix: ".NS".to_string(),
            columns: default_columns(),
            windows: vec![PriceWindow::Days30, PriceWindow::Days180, PriceWindow::Days365],
            concurrency: DEFAULT_CONCURRENCY,
            timeout_secs: 30,
            rate_limit_ms: 250,
            sections: RankSpec::default_sections(),
            chart_metric: None,
            output_dir: None,
            page_lines: DEFAULT_PAGE_LINES,
            cache: CacheConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load and validate a configuration file.
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values a file or flag could set out of range.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be at least 1".to_string()));
        }
        if self.columns.is_empty() {
            return Err(ConfigError::Invalid("columns must not be empty".to_string()));
        }
        Ok(())
    }

    /// Pipeline settings for a run ending on `as_of`.
    pub(crate) fn pipeline_config(&self, as_of: NaiveDate) -> PipelineConfig {
        // Performance metrics shown, ranked or charted need their window computed.
        let metrics = self
            .columns
            .iter()
            .copied()
            .chain(self.sections.iter().map(|s| s.metric))
            .chain(self.chart_metric);
        let mut windows = self.windows.clone();
        for window in metrics.filter_map(|m| m.window()) {
            if !windows.contains(&window) {
                windows.push(window);
            }
        }

        PipelineConfig {
            columns: self.columns.clone(),
            windows,
            concurrency: self.concurrency,
            timeout: Duration::from_secs(self.timeout_secs),
            as_of,
        }
    }

    /// Minimum delay between provider requests.
    pub(crate) const fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.sheet, IndexSheet::Nifty50);
        assert_eq!(config.symbol_suffix, ".NS");
        assert_eq!(config.sections.len(), 4);
        assert!(config.cache.use_cache);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "sheet": "NIFTY20",
                "analyst": "Research Desk",
                "columns": ["revenue", "roe"],
                "sections": [{{"metric": "roe", "n": 5}}],
                "cache": {{"use_cache": false}}
            }}"#
        )
        .unwrap();

        let config = AnalysisConfig::load(file.path()).unwrap();
        assert_eq!(config.sheet, IndexSheet::Nifty20);
        assert_eq!(config.analyst, "Research Desk");
        assert_eq!(config.columns, vec![MetricId::Revenue, MetricId::ReturnOnEquity]);
        assert_eq!(config.sections, vec![RankSpec::top(MetricId::ReturnOnEquity, 5)]);
        assert!(!config.cache.use_cache);
        assert!(!config.cache.force_refresh);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"concurrency": 0}}"#).unwrap();
        assert!(matches!(
            AnalysisConfig::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"columns": ["not_a_metric"]}}"#).unwrap();
        assert!(matches!(
            AnalysisConfig::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_pipeline_config_adds_column_windows() {
        let config = AnalysisConfig {
            columns: vec![MetricId::Revenue, MetricId::Performance1y],
            windows: vec![PriceWindow::Days30],
            ..AnalysisConfig::default()
        };
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        let pipeline = config.pipeline_config(as_of);

        assert_eq!(pipeline.windows, vec![PriceWindow::Days30, PriceWindow::OneYear]);
        assert_eq!(pipeline.timeout, Duration::from_secs(30));
        assert_eq!(pipeline.as_of, as_of);
    }
}
