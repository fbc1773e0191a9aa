//! Integration of the finratio crates behind the CLI.
//!
//! Cache location, provider wiring, the progress-reporting report run and
//! writing run artifacts to disk.

pub(crate) mod cache_manager;
pub(crate) mod data_pipeline;
pub(crate) mod output_writer;
pub(crate) mod progress;
