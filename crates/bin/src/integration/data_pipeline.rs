//! Provider wiring and the progress-reporting report run.

use super::cache_manager;
use super::progress::{LogWriter, symbol_bar};
use crate::config::AnalysisConfig;
use chrono::NaiveDate;
use finratio::{Progress, ReportOutcome, ReportPipeline};
use finratio_data::error::DataError;
use finratio_data::{CachedProvider, MarketDataProvider, YahooProvider};
use std::sync::Arc;
use tracing::{info, warn};

/// Yahoo provider, behind the SQLite cache unless caching is disabled.
///
/// A cache that cannot be opened is logged and bypassed.
pub(crate) fn build_provider(
    config: &AnalysisConfig,
    as_of: NaiveDate,
) -> Result<Arc<dyn MarketDataProvider>, DataError> {
    let yahoo = YahooProvider::with_rate_limit(config.rate_limit())?;
    if !config.cache.use_cache {
        return Ok(Arc::new(yahoo));
    }

    match cache_manager::open_cache() {
        Ok(cache) => {
            info!(
                path = %cache_manager::cache_path().display(),
                refresh = config.cache.force_refresh,
                "using payload cache"
            );
            Ok(Arc::new(
                CachedProvider::new(yahoo, cache, as_of)
                    .with_force_refresh(config.cache.force_refresh),
            ))
        }
        Err(e) => {
            warn!(error = %e, "cache unavailable, fetching without it");
            Ok(Arc::new(yahoo))
        }
    }
}

/// Build the report with a progress bar, routing logs around it.
pub(crate) async fn run_with_progress(
    pipeline: &ReportPipeline,
    symbols: &[String],
    logs: &LogWriter,
) -> ReportOutcome {
    let pb = symbol_bar(symbols.len());
    pb.set_message(format!(
        "Fetching {} symbols ({} concurrent)...",
        symbols.len(),
        pipeline.config().concurrency
    ));
    logs.attach(&pb);

    let outcome = pipeline
        .build_report_with_progress(symbols, |progress| {
            match progress {
                Progress::Completed { symbol } => pb.set_message(symbol.to_string()),
                Progress::Skipped { symbol, .. } => pb.set_message(format!("{symbol} (skipped)")),
            }
            pb.inc(1);
        })
        .await;

    pb.finish_and_clear();
    logs.detach();
    outcome
}
