//! Symbol lists read from an index workbook.
//!
//! The workbook is either a spreadsheet (`.xlsx`, `.xls`, `.ods`) with one
//! sheet per index, or a directory holding one `<SHEET>.csv` per index. Each
//! sheet has a `Symbol` header; cells below it are the constituents.

use super::{IndexSheet, UniverseError};
use calamine::{Data, Reader, open_workbook_auto};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Header of the symbol column.
const SYMBOL_HEADER: &str = "Symbol";

/// Constituents of one index sheet, in sheet order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolList {
    sheet: IndexSheet,
    symbols: Vec<String>,
}

impl SymbolList {
    /// Create a symbol list.
    pub const fn new(sheet: IndexSheet, symbols: Vec<String>) -> Self {
        Self { sheet, symbols }
    }

    /// Sheet the symbols were read from.
    pub const fn sheet(&self) -> IndexSheet {
        self.sheet
    }

    /// Symbols in sheet order.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }
}

/// A workbook of index constituents.
#[derive(Debug, Clone)]
pub struct SymbolWorkbook {
    path: PathBuf,
    suffix: Option<String>,
}

impl SymbolWorkbook {
    /// Open a workbook file or CSV directory.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            suffix: None,
        }
    }

    /// Append an exchange suffix (e.g. `.NS`) to symbols that lack it.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        self.suffix = (!suffix.is_empty()).then_some(suffix);
        self
    }

    /// Workbook location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the constituents of one index.
    ///
    /// Blank cells are dropped and duplicates keep their first occurrence.
    pub fn load(&self, sheet: IndexSheet) -> Result<SymbolList, UniverseError> {
        let cells = if self.path.is_dir() {
            self.read_csv(sheet)?
        } else {
            self.read_spreadsheet(sheet)?
        };

        let symbols = normalize_symbols(cells, self.suffix.as_deref());
        debug!(%sheet, count = symbols.len(), path = %self.path.display(), "loaded symbols");
        Ok(SymbolList::new(sheet, symbols))
    }

    fn read_spreadsheet(&self, sheet: IndexSheet) -> Result<Vec<String>, UniverseError> {
        let mut workbook = open_workbook_auto(&self.path)?;

        let name = workbook
            .sheet_names()
            .into_iter()
            .find(|name| name.trim().eq_ignore_ascii_case(sheet.sheet_name()))
            .ok_or_else(|| UniverseError::SheetNotFound {
                sheet,
                path: self.path.display().to_string(),
            })?;

        let range = workbook.worksheet_range(&name)?;
        let mut rows = range.rows();

        let header = rows
            .next()
            .ok_or(UniverseError::MissingSymbolColumn { sheet })?;
        let column = header
            .iter()
            .position(|cell| cell_text(cell).eq_ignore_ascii_case(SYMBOL_HEADER))
            .ok_or(UniverseError::MissingSymbolColumn { sheet })?;

        Ok(rows
            .filter_map(|row| row.get(column))
            .map(cell_text)
            .collect())
    }

    fn read_csv(&self, sheet: IndexSheet) -> Result<Vec<String>, UniverseError> {
        let path = self.path.join(format!("{}.csv", sheet.sheet_name()));
        if !path.exists() {
            return Err(UniverseError::SheetNotFound {
                sheet,
                path: self.path.display().to_string(),
            });
        }

        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(&path)?;
        let column = reader
            .headers()?
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(SYMBOL_HEADER))
            .ok_or(UniverseError::MissingSymbolColumn { sheet })?;

        let mut cells = Vec::new();
        for record in reader.records() {
            if let Some(cell) = record?.get(column) {
                cells.push(cell.to_string());
            }
        }
        Ok(cells)
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

/// Trim, drop blanks and duplicates, and apply the exchange suffix.
pub fn normalize_symbols<I>(cells: I, suffix: Option<&str>) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    cells
        .into_iter()
        .filter_map(|cell| {
            let symbol = cell.trim();
            if symbol.is_empty() {
                return None;
            }
            Some(match suffix {
                Some(suffix) if !symbol.ends_with(suffix) => format!("{symbol}{suffix}"),
                _ => symbol.to_string(),
            })
        })
        .filter(|symbol| seen.insert(symbol.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_drops_blanks_and_duplicates() {
        let cells = strings(&["TCS", "", "  ", "INFY", "TCS", " HDFCBANK "]);
        assert_eq!(
            normalize_symbols(cells, None),
            strings(&["TCS", "INFY", "HDFCBANK"])
        );
    }

    #[test]
    fn test_normalize_applies_suffix_once() {
        let cells = strings(&["TCS", "INFY.NS", "INFY"]);
        assert_eq!(
            normalize_symbols(cells, Some(".NS")),
            strings(&["TCS.NS", "INFY.NS"])
        );
    }

    #[test]
    fn test_load_csv_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("NIFTY20.csv"),
            "Company Name,Symbol,Series\nTata Consultancy,TCS,EQ\nInfosys,INFY,EQ\nBlank,,EQ\nInfosys again,INFY,EQ\n",
        )
        .unwrap();

        let list = SymbolWorkbook::new(dir.path())
            .with_suffix(".NS")
            .load(IndexSheet::Nifty20)
            .unwrap();

        assert_eq!(list.sheet(), IndexSheet::Nifty20);
        assert_eq!(list.symbols(), strings(&["TCS.NS", "INFY.NS"]).as_slice());
    }

    #[test]
    fn test_missing_sheet_and_column() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("NIFTY50.csv"), "Company,Ticker\nTata,TCS\n").unwrap();
        let workbook = SymbolWorkbook::new(dir.path());

        assert!(matches!(
            workbook.load(IndexSheet::Nifty50),
            Err(UniverseError::MissingSymbolColumn { .. })
        ));
        assert!(matches!(
            workbook.load(IndexSheet::Nifty500),
            Err(UniverseError::SheetNotFound { .. })
        ));
    }

    #[test]
    fn test_missing_spreadsheet_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let workbook = SymbolWorkbook::new(dir.path().join("indices.xlsx"));
        assert!(workbook.load(IndexSheet::Nifty50).is_err());
    }
}
