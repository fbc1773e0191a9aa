#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finratio/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod pipeline;
pub mod universe;

// Re-export main types from sub-crates
pub use finratio_data as data;
pub use finratio_metrics as metrics;
pub use finratio_output as output;

pub use pipeline::{
    PipelineConfig, PipelineError, Progress, ReportOutcome, ReportPipeline, SkippedSymbol,
};
pub use universe::{IndexSheet, SymbolList, SymbolWorkbook, UniverseError};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
