//! finratio CLI binary.
//!
//! Provides the command-line interface for financial ratio screening of
//! stock index constituents.

mod config;
mod integration;

use chrono::Local;
use clap::{Parser, Subcommand};
use config::AnalysisConfig;
use finratio::{IndexSheet, ReportPipeline, SymbolWorkbook};
use finratio_metrics::{
    MetricCategory, MetricId, SortDirection, count_by_category, metrics_by_category,
};
use finratio_output::{ReportBuilder, ReportDocument, Table};
use integration::cache_manager::{CacheAction, apply_cache_action, open_cache, print_cache_info};
use integration::data_pipeline::{build_provider, run_with_progress};
use integration::output_writer::write_outputs;
use integration::progress::LogWriter;
use std::path::PathBuf;
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "finratio")]
#[command(
    about = "finratio: financial ratio screening for stock index constituents",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute ratios for every constituent of an index sheet
    Analyze(AnalyzeArgs),

    /// List the recognized index sheets
    Sheets,

    /// List the metric catalog
    Metrics {
        /// Only show one category
        #[arg(long)]
        category: Option<String>,
    },

    /// Inspect or maintain the data cache
    Cache {
        /// Remove cached payloads (all, or one symbol with --symbol)
        #[arg(long)]
        clear: bool,

        /// Symbol to clear
        #[arg(long, requires = "clear")]
        symbol: Option<String>,

        /// Remove payloads fetched before today
        #[arg(long, conflicts_with = "clear")]
        prune: bool,
    },
}

#[derive(clap::Args, Debug, Default)]
struct AnalyzeArgs {
    /// Index sheet (NIFTY50, NIFTYNEXT50, NIFTY100, NIFTY20, NIFTY500)
    #[arg(long)]
    sheet: Option<String>,

    /// Analyst named in the report header
    #[arg(long)]
    analyst: Option<String>,

    /// Symbol workbook, or a directory of <SHEET>.csv files
    #[arg(long)]
    symbols_file: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sort the table by this metric
    #[arg(long)]
    sort_by: Option<String>,

    /// Sort ascending instead of descending
    #[arg(long)]
    ascending: bool,

    /// Size of each ranked section
    #[arg(long)]
    top: Option<usize>,

    /// Draw a bar chart of this metric
    #[arg(long)]
    chart: Option<String>,

    /// Output format (json or text)
    #[arg(long, default_value = "text")]
    format: String,

    /// Directory for exports, the printable report and the chart
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Disable caching (always fetch fresh data)
    #[arg(long)]
    no_cache: bool,

    /// Force refresh cached data
    #[arg(long)]
    refresh: bool,
}

impl AnalyzeArgs {
    /// Apply command-line overrides on top of `config`.
    fn apply(&self, config: &mut AnalysisConfig) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(sheet) = &self.sheet {
            config.sheet = sheet.parse::<IndexSheet>()?;
        }
        if let Some(analyst) = &self.analyst {
            config.analyst.clone_from(analyst);
        }
        if let Some(path) = &self.symbols_file {
            config.symbols_file.clone_from(path);
        }
        if let Some(n) = self.top {
            for section in &mut config.sections {
                section.n = n;
            }
        }
        if let Some(chart) = &self.chart {
            config.chart_metric = Some(chart.parse::<MetricId>()?);
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = Some(dir.clone());
        }
        if config.chart_metric.is_some() && config.output_dir.is_none() {
            config.output_dir = Some(PathBuf::from("."));
        }
        if self.no_cache {
            config.cache.use_cache = false;
        }
        if self.refresh {
            config.cache.force_refresh = true;
        }
        config.validate()?;
        Ok(())
    }

    fn sort(&self) -> Result<Option<(MetricId, SortDirection)>, Box<dyn std::error::Error>> {
        let direction = if self.ascending {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        };
        Ok(match &self.sort_by {
            Some(name) => Some((name.parse::<MetricId>()?, direction)),
            None => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("Unknown format: {other} (expected text or json)")),
        }
    }
}

#[tokio::main]
async fn main() {
    let logs = LogWriter::default();
    init_tracing(logs.clone());

    if let Err(e) = run(logs).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(logs: LogWriter) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("finratio=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(logs).with_target(false))
        .init();
}

async fn run(logs: LogWriter) -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => analyze(&args, &logs).await?,
        Commands::Sheets => list_sheets(),
        Commands::Metrics { category } => list_metrics(category.as_deref())?,
        Commands::Cache {
            clear,
            symbol,
            prune,
        } => manage_cache(clear, symbol.as_deref(), prune)?,
    }

    Ok(())
}

async fn analyze(args: &AnalyzeArgs, logs: &LogWriter) -> Result<(), Box<dyn std::error::Error>> {
    let format: OutputFormat = args.format.parse()?;
    let sort = args.sort()?;

    let mut config = match &args.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    args.apply(&mut config)?;

    let as_of = Local::now().date_naive();
    let workbook =
        SymbolWorkbook::new(&config.symbols_file).with_suffix(config.symbol_suffix.clone());
    let symbols = workbook.load(config.sheet)?;
    if symbols.symbols().is_empty() {
        return Err(format!(
            "No symbols found on sheet {} in {}",
            symbols.sheet(),
            workbook.path().display()
        )
        .into());
    }

    if format == OutputFormat::Text {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!(
            "║{:^62}║",
            format!("FINANCIAL RATIO ANALYSIS: {}", symbols.sheet().name())
        );
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Symbols: {}", symbols.symbols().len());
        println!("As of: {}", as_of);
        if config.cache.use_cache {
            print_cache_info();
            if config.cache.force_refresh {
                println!("  Mode: Force refresh (re-fetching all data)");
            }
        } else {
            println!("  Cache: disabled");
        }
        println!();
    }

    let provider = build_provider(&config, as_of)?;
    let pipeline = ReportPipeline::new(provider, config.pipeline_config(as_of));
    let outcome = run_with_progress(&pipeline, symbols.symbols(), logs).await;

    let mut builder = ReportBuilder::new()
        .analyst(config.analyst.as_str())
        .date(as_of)
        .sheet(symbols.sheet().sheet_name())
        .requested(outcome.requested())
        .sections(config.sections.clone())
        .page_lines(config.page_lines);
    if let Some((metric, direction)) = sort {
        builder = builder.sort(metric, direction);
    }
    for skipped in &outcome.skipped {
        builder = builder.skipped(skipped.symbol.as_str(), skipped.reason.as_str());
    }
    let report = builder.build(outcome.results)?;

    match format {
        OutputFormat::Text => print_report(&report),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    if let Some(dir) = &config.output_dir {
        let written = write_outputs(dir, &report, config.chart_metric)?;
        if format == OutputFormat::Text {
            println!("\nWritten:");
            for path in written {
                println!("  {}", path.display());
            }
        }
    }

    info!(
        processed = report.metadata().processed,
        requested = report.metadata().requested,
        "analysis complete"
    );
    Ok(())
}

fn print_report(report: &ReportDocument) {
    let results = report.results();
    let meta = report.metadata();

    println!(
        "Processed {} of {} symbols\n",
        meta.processed, meta.requested
    );

    print!("{}", report.table().to_ascii_table());

    for spec in report.sections() {
        println!("\n{}", spec.title());
        print!("{}", Table::ranked(results, spec).to_ascii_table());
    }

    let skipped: Vec<(&str, &str)> = report.skipped().collect();
    if !skipped.is_empty() {
        println!("\nSkipped {} symbol(s):", skipped.len());
        for (symbol, reason) in skipped {
            println!("  {}: {}", symbol, reason);
        }
    }
}

fn list_sheets() {
    println!("Index Sheets:");
    println!("=============\n");

    for sheet in IndexSheet::all() {
        println!("{:<12} - {}", sheet.sheet_name(), sheet.name());
    }
}

fn list_metrics(category: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let categories = match category {
        Some(name) => vec![name.parse::<MetricCategory>()?],
        None => MetricCategory::all().to_vec(),
    };
    let counts = count_by_category();

    println!("Metrics:");
    println!("========\n");

    for category in categories {
        println!(
            "{} ({})",
            category.name(),
            counts.get(&category).copied().unwrap_or_default()
        );
        for metric in metrics_by_category(category) {
            println!("  {:<28} {:<30} {}", metric.name, metric.label, metric.description);
        }
    }
    Ok(())
}

fn manage_cache(
    clear: bool,
    symbol: Option<&str>,
    prune: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let action = if clear {
        Some(CacheAction::Clear { symbol })
    } else if prune {
        Some(CacheAction::Prune {
            before: Local::now().date_naive(),
        })
    } else {
        None
    };

    println!("Cache:");
    if let Some(action) = action {
        let removed = apply_cache_action(&open_cache()?, action)?;
        println!("  Removed {} payload(s)", removed);
    }
    print_cache_info();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_analyze_flags() {
        let cli = Cli::try_parse_from([
            "finratio",
            "analyze",
            "--sheet",
            "NIFTY20",
            "--analyst",
            "Research Desk",
            "--sort-by",
            "roe",
            "--ascending",
            "--top",
            "5",
            "--no-cache",
        ])
        .unwrap();

        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        let mut config = AnalysisConfig::default();
        args.apply(&mut config).unwrap();

        assert_eq!(config.sheet, IndexSheet::Nifty20);
        assert_eq!(config.analyst, "Research Desk");
        assert!(config.sections.iter().all(|s| s.n == 5));
        assert!(!config.cache.use_cache);
        assert_eq!(
            args.sort().unwrap(),
            Some((MetricId::ReturnOnEquity, SortDirection::Ascending))
        );
    }

    #[test]
    fn test_chart_defaults_output_dir() {
        let args = AnalyzeArgs {
            chart: Some("net_margin".to_string()),
            ..AnalyzeArgs::default()
        };
        let mut config = AnalysisConfig::default();
        args.apply(&mut config).unwrap();

        assert_eq!(config.chart_metric, Some(MetricId::NetMargin));
        assert_eq!(config.output_dir, Some(PathBuf::from(".")));
    }

    #[rstest]
    #[case("--sheet", "SENSEX")]
    #[case("--chart", "ebitda")]
    fn test_invalid_overrides(#[case] flag: &str, #[case] value: &str) {
        let cli = Cli::try_parse_from(["finratio", "analyze", flag, value]).unwrap();
        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert!(args.apply(&mut AnalysisConfig::default()).is_err());
    }

    #[rstest]
    #[case("text", Some(OutputFormat::Text))]
    #[case("JSON", Some(OutputFormat::Json))]
    #[case("pdf", None)]
    fn test_output_format(#[case] input: &str, #[case] expected: Option<OutputFormat>) {
        assert_eq!(input.parse::<OutputFormat>().ok(), expected);
    }

    #[test]
    fn test_unknown_metric_category() {
        assert!(list_metrics(Some("Astrology")).is_err());
        assert!(list_metrics(Some("cash_flow")).is_ok());
    }

    #[test]
    fn test_cache_flags() {
        let cli =
            Cli::try_parse_from(["finratio", "cache", "--clear", "--symbol", "TCS.NS"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Cache { clear: true, symbol: Some(ref s), prune: false } if s == "TCS.NS"
        ));

        assert!(Cli::try_parse_from(["finratio", "cache", "--symbol", "TCS.NS"]).is_err());
        assert!(Cli::try_parse_from(["finratio", "cache", "--clear", "--prune"]).is_err());
    }
}
