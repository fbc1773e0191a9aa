//! Export of result sets.
//!
//! CSV exports have a `symbol` column followed by one column per selected
//! metric, named by its short metric name; unavailable values are empty
//! cells. JSON exports are an array of flat objects with the same keys and
//! `null` for unavailable values.

use finratio_metrics::{FinancialRecord, MetricId, ResultSet};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn json_row(record: &FinancialRecord, columns: &[MetricId]) -> Value {
    let mut row = Map::new();
    row.insert("symbol".to_string(), Value::from(record.symbol()));
    for metric in columns {
        row.insert(metric.name().to_string(), Value::from(record.get(*metric)));
    }
    Value::Object(row)
}

impl Exporter for ResultSet {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);

                let header: Vec<&str> = std::iter::once("symbol")
                    .chain(self.columns().iter().map(MetricId::name))
                    .collect();
                wtr.write_record(&header)?;

                for record in self {
                    let row: Vec<String> = std::iter::once(record.symbol().to_string())
                        .chain(
                            self.columns()
                                .iter()
                                .map(|m| record.get(*m).map(|v| v.to_string()).unwrap_or_default()),
                        )
                        .collect();
                    wtr.write_record(&row)?;
                }

                let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
                String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
            }
            ExportFormat::Json | ExportFormat::PrettyJson => {
                let rows: Vec<Value> = self
                    .iter()
                    .map(|record| json_row(record, self.columns()))
                    .collect();
                if format == ExportFormat::Json {
                    Ok(serde_json::to_string(&rows)?)
                } else {
                    Ok(serde_json::to_string_pretty(&rows)?)
                }
            }
        }
    }
}
