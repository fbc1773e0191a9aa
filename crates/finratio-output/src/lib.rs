#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finratio/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chart;
pub mod export;
pub mod format;
pub mod report;
pub mod table;

pub use chart::{BarChart, ChartError};
pub use export::{ExportError, ExportFormat, Exporter};
pub use format::{NOT_AVAILABLE, format_metric, format_value};
pub use report::{
    DEFAULT_PAGE_LINES, DISCLAIMER, ReportBuilder, ReportDocument, ReportError, ReportMetadata,
};
pub use table::Table;
