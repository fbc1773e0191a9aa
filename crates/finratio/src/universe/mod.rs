//! Universe management for finratio.
//!
//! A universe is the list of symbols one report covers. Symbols come from a
//! workbook with one sheet per stock index, see [`SymbolWorkbook`].

pub mod sheet;
pub mod workbook;

pub use sheet::IndexSheet;
pub use workbook::{SymbolList, SymbolWorkbook};

use thiserror::Error;

/// Errors reading a symbol workbook.
#[derive(Debug, Error)]
pub enum UniverseError {
    /// Spreadsheet could not be opened or read
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    /// CSV sheet could not be read
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Sheet name is not a recognized index
    #[error("Unknown index sheet '{0}'. Valid sheets: NIFTY50, NIFTYNEXT50, NIFTY100, NIFTY20, NIFTY500")]
    UnknownSheet(String),

    /// Recognized sheet is absent from the workbook
    #[error("Sheet {sheet} not found in {path}")]
    SheetNotFound {
        /// Requested sheet
        sheet: IndexSheet,
        /// Workbook path
        path: String,
    },

    /// Sheet has no `Symbol` header
    #[error("Sheet {sheet} has no 'Symbol' column")]
    MissingSymbolColumn {
        /// Sheet without the column
        sheet: IndexSheet,
    },
}
