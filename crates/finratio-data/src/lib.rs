#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finratio/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod error;
pub mod provider;
pub mod snapshot;
pub mod yahoo;

pub use cache::{CacheStats, CachedProvider, SqliteCache};
pub use error::{DataError, Result};
pub use provider::MarketDataProvider;
pub use snapshot::{
    LineItemSnapshot, PricePoint, PriceSeries, QuoteSnapshot, ShapeError, StatementKind,
    StatementSet, lines,
};
pub use yahoo::YahooProvider;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
