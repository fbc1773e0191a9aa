//! Report pipeline.
//!
//! Fetches and computes one [`FinancialRecord`] per symbol on a bounded worker
//! pool. Each symbol runs under a timeout; a provider error, a malformed
//! statement or a timeout skips that symbol and is reported alongside the
//! results. Records are returned in input order regardless of completion
//! order.

use chrono::{Local, NaiveDate};
use finratio_data::{DataError, MarketDataProvider};
use finratio_metrics::{
    ExtractError, FinancialRecord, MetricId, PriceWindow, ResultSet, compute, default_columns,
    extract, window_performance,
};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default number of symbols processed concurrently.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Default per-symbol timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Reasons a symbol is skipped.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Provider failed for the symbol
    #[error("data error: {0}")]
    Data(#[from] DataError),

    /// A statement was malformed
    #[error("extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Processing took longer than the per-symbol timeout
    #[error("timed out after {seconds}s")]
    Timeout {
        /// Configured timeout in seconds
        seconds: u64,
    },
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Columns of the resulting table
    pub columns: Vec<MetricId>,
    /// Price performance windows to compute
    pub windows: Vec<PriceWindow>,
    /// Symbols processed concurrently
    pub concurrency: usize,
    /// Per-symbol timeout
    pub timeout: Duration,
    /// Date price windows end on
    pub as_of: NaiveDate,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            columns: default_columns(),
            windows: vec![PriceWindow::Days30, PriceWindow::Days180, PriceWindow::Days365],
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            as_of: Local::now().date_naive(),
        }
    }
}

/// A symbol left out of the result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSymbol {
    /// Ticker symbol
    pub symbol: String,
    /// Why it was skipped
    pub reason: String,
}

/// Result of one report run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportOutcome {
    /// Records of successfully processed symbols, in input order
    pub results: ResultSet,
    /// Skipped symbols, in input order
    pub skipped: Vec<SkippedSymbol>,
}

impl ReportOutcome {
    /// Number of symbols the run was asked for.
    pub const fn requested(&self) -> usize {
        self.results.len() + self.skipped.len()
    }
}

/// Per-symbol progress notification.
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
    /// A record was computed
    Completed {
        /// Ticker symbol
        symbol: &'a str,
    },
    /// The symbol was skipped
    Skipped {
        /// Ticker symbol
        symbol: &'a str,
        /// Why it was skipped
        error: &'a PipelineError,
    },
}

/// Builds reports from a market data provider.
#[derive(Clone)]
pub struct ReportPipeline {
    provider: Arc<dyn MarketDataProvider>,
    config: PipelineConfig,
}

impl std::fmt::Debug for ReportPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportPipeline")
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .finish()
    }
}

impl ReportPipeline {
    /// Create a pipeline over a provider.
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: PipelineConfig) -> Self {
        Self { provider, config }
    }

    /// Pipeline configuration.
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Build the report for `symbols`.
    pub async fn build_report(&self, symbols: &[String]) -> ReportOutcome {
        self.build_report_with_progress(symbols, |_| {}).await
    }

    /// Build the report, calling `on_progress` as each symbol finishes.
    pub async fn build_report_with_progress<F>(
        &self,
        symbols: &[String],
        mut on_progress: F,
    ) -> ReportOutcome
    where
        F: FnMut(Progress<'_>),
    {
        let mut outcomes: Vec<(usize, &String, Result<FinancialRecord, PipelineError>)> =
            stream::iter(symbols.iter().enumerate())
                .map(|(index, symbol)| async move {
                    (index, symbol, self.run_symbol(symbol).await)
                })
                .buffer_unordered(self.config.concurrency.max(1))
                .inspect(|(_, symbol, result)| match result {
                    Ok(_) => on_progress(Progress::Completed {
                        symbol: symbol.as_str(),
                    }),
                    Err(error) => on_progress(Progress::Skipped {
                        symbol: symbol.as_str(),
                        error,
                    }),
                })
                .collect()
                .await;

        outcomes.sort_by_key(|(index, _, _)| *index);

        let mut records = Vec::with_capacity(outcomes.len());
        let mut skipped = Vec::new();
        for (_, symbol, result) in outcomes {
            match result {
                Ok(record) => records.push(record),
                Err(error) => {
                    warn!(symbol = %symbol, error = %error, "skipping symbol");
                    skipped.push(SkippedSymbol {
                        symbol: symbol.clone(),
                        reason: error.to_string(),
                    });
                }
            }
        }

        info!(
            requested = symbols.len(),
            processed = records.len(),
            skipped = skipped.len(),
            "report built"
        );

        ReportOutcome {
            results: ResultSet::new(self.config.columns.clone(), records),
            skipped,
        }
    }

    async fn run_symbol(&self, symbol: &str) -> Result<FinancialRecord, PipelineError> {
        tokio::time::timeout(self.config.timeout, self.process_symbol(symbol))
            .await
            .map_err(|_| PipelineError::Timeout {
                seconds: self.config.timeout.as_secs(),
            })?
    }

    async fn process_symbol(&self, symbol: &str) -> Result<FinancialRecord, PipelineError> {
        let provider = self.provider.as_ref();
        let as_of = self.config.as_of;
        let widest = PriceWindow::widest(&self.config.windows);

        // One history request covers every window; each is restricted locally.
        let history = async {
            match widest {
                Some(window) => provider
                    .price_history(symbol, window.start(as_of), as_of)
                    .await
                    .map(Some),
                None => Ok(None),
            }
        };

        let (statements, quote, series) =
            tokio::try_join!(provider.statements(symbol), provider.quote(symbol), history)?;
        debug!(symbol, "fetched provider data");

        let fields = extract(&statements, &quote)?;
        let ratios = compute(&fields);

        let performance: BTreeMap<PriceWindow, Option<f64>> = match series {
            Some(series) => self
                .config
                .windows
                .iter()
                .map(|window| (*window, window_performance(&series, *window, as_of)))
                .collect(),
            None => BTreeMap::new(),
        };

        Ok(FinancialRecord::new(symbol, ratios, performance))
    }
}
