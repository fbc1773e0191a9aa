#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finratio/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod extract;
pub mod performance;
pub mod ranking;
pub mod ratios;
pub mod record;
pub mod registry;
pub mod value;

pub use extract::{ExtractError, ExtractedFields, LineHistory, extract};
pub use performance::{PriceWindow, performance, window_performance};
pub use ranking::{RankSpec, SortDirection};
pub use ratios::{RatioSet, compute};
pub use record::{FinancialRecord, ResultSet};
pub use registry::{
    MetricCategory, MetricId, MetricInfo, MetricUnit, UnknownCategory, UnknownMetric,
    available_metrics, count_by_category, default_columns, metrics_by_category,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
