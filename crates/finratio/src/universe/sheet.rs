//! Index sheet definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stock index whose constituents are listed on one sheet of the symbol workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndexSheet {
    /// Nifty 50
    Nifty50,

    /// Nifty Next 50
    NiftyNext50,

    /// Nifty 100
    Nifty100,

    /// Nifty 20
    Nifty20,

    /// Nifty 500
    Nifty500,
}

impl IndexSheet {
    /// Returns all index sheets.
    pub const fn all() -> [Self; 5] {
        [
            Self::Nifty50,
            Self::NiftyNext50,
            Self::Nifty100,
            Self::Nifty20,
            Self::Nifty500,
        ]
    }

    /// Returns the sheet name as it appears in the workbook.
    pub const fn sheet_name(&self) -> &'static str {
        match self {
            Self::Nifty50 => "NIFTY50",
            Self::NiftyNext50 => "NIFTYNEXT50",
            Self::Nifty100 => "NIFTY100",
            Self::Nifty20 => "NIFTY20",
            Self::Nifty500 => "NIFTY500",
        }
    }

    /// Returns the index's display name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Nifty50 => "Nifty 50",
            Self::NiftyNext50 => "Nifty Next 50",
            Self::Nifty100 => "Nifty 100",
            Self::Nifty20 => "Nifty 20",
            Self::Nifty500 => "Nifty 500",
        }
    }

    /// Parse a sheet from its workbook name, ignoring case.
    pub fn from_sheet_name(name: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|sheet| sheet.sheet_name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for IndexSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sheet_name())
    }
}

impl FromStr for IndexSheet {
    type Err = super::UniverseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_sheet_name(s).ok_or_else(|| super::UniverseError::UnknownSheet(s.to_string()))
    }
}
