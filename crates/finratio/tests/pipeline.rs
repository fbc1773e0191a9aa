//! Report pipeline over an in-memory provider.

use async_trait::async_trait;
use chrono::NaiveDate;
use finratio::data::lines::{balance_sheet, income_statement};
use finratio::data::{
    DataError, LineItemSnapshot, MarketDataProvider, PricePoint, PriceSeries, QuoteSnapshot,
    StatementSet,
};
use finratio::metrics::{MetricId, PriceWindow};
use finratio::{PipelineConfig, Progress, ReportPipeline};
use rstest::rstest;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

const AS_OF: (i32, u32, u32) = (2024, 6, 28);

#[derive(Debug, Clone)]
enum Behavior {
    Healthy { revenue: f64, delay_ms: u64 },
    Missing,
    Malformed,
    Hang,
}

#[derive(Debug, Default)]
struct MockProvider {
    symbols: HashMap<String, Behavior>,
    history_calls: AtomicUsize,
    history_ranges: Mutex<Vec<(NaiveDate, NaiveDate)>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockProvider {
    fn with(mut self, symbol: &str, behavior: Behavior) -> Self {
        self.symbols.insert(symbol.to_string(), behavior);
        self
    }

    fn behavior(&self, symbol: &str) -> Behavior {
        self.symbols.get(symbol).cloned().unwrap_or(Behavior::Missing)
    }
}

fn healthy_statements(revenue: f64) -> StatementSet {
    let periods = vec![date(2024, 3, 31), date(2023, 3, 31)];
    StatementSet {
        annual_income: LineItemSnapshot::new(periods.clone())
            .with_item(
                income_statement::TOTAL_REVENUE,
                vec![Some(revenue), Some(revenue / 2.0)],
            )
            .with_item(income_statement::NET_INCOME, vec![Some(revenue / 10.0), None]),
        balance_sheet: LineItemSnapshot::new(periods)
            .with_item(balance_sheet::TOTAL_EQUITY, vec![Some(revenue), Some(revenue)]),
        ..StatementSet::default()
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn statements(&self, symbol: &str) -> finratio::data::Result<StatementSet> {
        match self.behavior(symbol) {
            Behavior::Healthy { revenue, delay_ms } => {
                let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(healthy_statements(revenue))
            }
            Behavior::Missing => Err(DataError::MissingData {
                symbol: symbol.to_string(),
                reason: "no fundamentals".to_string(),
            }),
            Behavior::Malformed => Ok(StatementSet {
                annual_income: LineItemSnapshot::new(vec![date(2024, 3, 31), date(2023, 3, 31)])
                    .with_item(income_statement::TOTAL_REVENUE, vec![Some(1.0)]),
                ..StatementSet::default()
            }),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(StatementSet::default())
            }
        }
    }

    async fn quote(&self, _symbol: &str) -> finratio::data::Result<QuoteSnapshot> {
        Ok(QuoteSnapshot {
            trailing_pe: Some(20.0),
            price_to_book: Some(3.0),
            dividend_yield: Some(0.012),
        })
    }

    async fn price_history(
        &self,
        _symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> finratio::data::Result<PriceSeries> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.history_ranges.lock().unwrap().push((start, end));
        Ok(PriceSeries::new(vec![
            PricePoint::new(date(2023, 7, 3), 50.0),
            PricePoint::new(date(2024, 5, 30), 100.0),
            PricePoint::new(date(2024, 6, 28), 120.0),
        ]))
    }
}

fn config(timeout: Duration) -> PipelineConfig {
    PipelineConfig {
        timeout,
        as_of: date(AS_OF.0, AS_OF.1, AS_OF.2),
        ..PipelineConfig::default()
    }
}

fn symbols(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_records_follow_input_order() {
    // The first symbol finishes last.
    let provider = MockProvider::default()
        .with("SLOW.NS", Behavior::Healthy { revenue: 100.0, delay_ms: 60 })
        .with("MID.NS", Behavior::Healthy { revenue: 200.0, delay_ms: 20 })
        .with("FAST.NS", Behavior::Healthy { revenue: 300.0, delay_ms: 0 });
    let pipeline = ReportPipeline::new(Arc::new(provider), config(Duration::from_secs(5)));

    let outcome = pipeline
        .build_report(&symbols(&["SLOW.NS", "MID.NS", "FAST.NS"]))
        .await;

    let order: Vec<&str> = outcome.results.iter().map(|r| r.symbol()).collect();
    assert_eq!(order, vec!["SLOW.NS", "MID.NS", "FAST.NS"]);
    assert!(outcome.skipped.is_empty());

    let fast = outcome.results.get("FAST.NS").unwrap();
    assert_eq!(fast.get(MetricId::Revenue), Some(300.0));
    assert_eq!(fast.get(MetricId::RevenueGrowth), Some(100.0));
    assert_eq!(fast.get(MetricId::NetIncomeGrowth), None);
    assert_eq!(fast.get(MetricId::DividendYield), Some(0.012));
    assert_eq!(fast.get(MetricId::Performance30d), Some(20.0));
    assert_eq!(fast.get(MetricId::Performance365d), Some(140.0));
}

#[rstest]
#[case::missing(Behavior::Missing)]
#[case::malformed(Behavior::Malformed)]
#[tokio::test]
async fn test_faulty_symbol_is_skipped(#[case] behavior: Behavior) {
    let provider = MockProvider::default()
        .with("GOOD.NS", Behavior::Healthy { revenue: 100.0, delay_ms: 0 })
        .with("BAD.NS", behavior)
        .with("ALSO.NS", Behavior::Healthy { revenue: 50.0, delay_ms: 0 });
    let pipeline = ReportPipeline::new(Arc::new(provider), config(Duration::from_secs(5)));
    let requested = symbols(&["GOOD.NS", "BAD.NS", "ALSO.NS"]);

    let outcome = pipeline.build_report(&requested).await;

    assert_eq!(outcome.results.len(), requested.len() - 1);
    assert_eq!(outcome.requested(), requested.len());
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].symbol, "BAD.NS");
    assert!(outcome.results.get("BAD.NS").is_none());
}

#[tokio::test]
async fn test_hanging_symbol_times_out() {
    let provider = MockProvider::default()
        .with("HANG.NS", Behavior::Hang)
        .with("GOOD.NS", Behavior::Healthy { revenue: 100.0, delay_ms: 0 });
    let pipeline = ReportPipeline::new(Arc::new(provider), config(Duration::from_millis(50)));

    let outcome = pipeline
        .build_report(&symbols(&["HANG.NS", "GOOD.NS"]))
        .await;

    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].symbol, "HANG.NS");
    assert!(outcome.skipped[0].reason.contains("timed out"));
}

#[tokio::test]
async fn test_one_history_request_per_symbol() {
    let provider = Arc::new(
        MockProvider::default()
            .with("A.NS", Behavior::Healthy { revenue: 1.0, delay_ms: 0 })
            .with("B.NS", Behavior::Healthy { revenue: 2.0, delay_ms: 0 }),
    );
    let pipeline = ReportPipeline::new(provider.clone(), config(Duration::from_secs(5)));

    pipeline.build_report(&symbols(&["A.NS", "B.NS"])).await;

    assert_eq!(provider.history_calls.load(Ordering::SeqCst), 2);
    let as_of = date(AS_OF.0, AS_OF.1, AS_OF.2);
    let expected_start = PriceWindow::Days365.start(as_of);
    for (start, end) in provider.history_ranges.lock().unwrap().iter() {
        assert_eq!(*start, expected_start);
        assert_eq!(*end, as_of);
    }
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let provider: Arc<dyn MarketDataProvider> = Arc::new(
        MockProvider::default()
            .with("A.NS", Behavior::Healthy { revenue: 10.0, delay_ms: 5 })
            .with("B.NS", Behavior::Healthy { revenue: 20.0, delay_ms: 0 }),
    );
    let pipeline = ReportPipeline::new(provider, config(Duration::from_secs(5)));
    let requested = symbols(&["A.NS", "B.NS", "C.NS"]);

    let first = pipeline.build_report(&requested).await;
    let second = pipeline.build_report(&requested).await;

    assert_eq!(
        serde_json::to_string(&first.results).unwrap(),
        serde_json::to_string(&second.results).unwrap()
    );
    assert_eq!(first.skipped, second.skipped);
}

#[tokio::test]
async fn test_progress_reports_every_symbol() {
    let provider = MockProvider::default()
        .with("A.NS", Behavior::Healthy { revenue: 10.0, delay_ms: 0 })
        .with("B.NS", Behavior::Missing);
    let pipeline = ReportPipeline::new(Arc::new(provider), config(Duration::from_secs(5)));

    let mut completed = Vec::new();
    let mut skipped = Vec::new();
    pipeline
        .build_report_with_progress(&symbols(&["A.NS", "B.NS"]), |progress| match progress {
            Progress::Completed { symbol } => completed.push(symbol.to_string()),
            Progress::Skipped { symbol, .. } => skipped.push(symbol.to_string()),
        })
        .await;

    assert_eq!(completed, vec!["A.NS"]);
    assert_eq!(skipped, vec!["B.NS"]);
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let names: Vec<String> = (0..12).map(|i| format!("SYM{i}.NS")).collect();
    let provider = names.iter().fold(MockProvider::default(), |provider, name| {
        provider.with(name, Behavior::Healthy { revenue: 100.0, delay_ms: 20 })
    });
    let provider = Arc::new(provider);
    let config = PipelineConfig {
        concurrency: 3,
        ..config(Duration::from_secs(5))
    };
    let pipeline = ReportPipeline::new(provider.clone(), config);

    let outcome = pipeline.build_report(&names).await;

    assert_eq!(outcome.results.len(), 12);
    assert!(outcome.skipped.is_empty());
    let peak = provider.peak_in_flight.load(Ordering::SeqCst);
    assert!(peak <= 3, "{peak} symbols fetched at once");
    assert!(peak > 1);
}

#[tokio::test]
async fn test_empty_input() {
    let pipeline = ReportPipeline::new(
        Arc::new(MockProvider::default()),
        config(Duration::from_secs(5)),
    );
    let outcome = pipeline.build_report(&[]).await;
    assert!(outcome.results.is_empty());
    assert!(outcome.skipped.is_empty());
}
