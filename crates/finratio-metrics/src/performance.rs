//! Price Performance
//!
//! Percentage change between the first and last close of a trailing window.
//! Values are always in percentage units: a move from 100 to 110 is `10.0`.

use crate::registry::MetricId;
use crate::value::{finite, percent};
use chrono::{Duration, NaiveDate};
use finratio_data::PriceSeries;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trailing window over which price performance is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceWindow {
    /// 30 calendar days
    Days30,
    /// 180 calendar days
    Days180,
    /// 365 calendar days
    Days365,
    /// One year, identical to 365 days
    OneYear,
}

impl PriceWindow {
    /// Returns all windows.
    pub const fn all() -> [Self; 4] {
        [Self::Days30, Self::Days180, Self::Days365, Self::OneYear]
    }

    /// Window length in calendar days.
    pub const fn days(&self) -> i64 {
        match self {
            Self::Days30 => 30,
            Self::Days180 => 180,
            Self::Days365 | Self::OneYear => 365,
        }
    }

    /// First date of the window ending at `as_of`.
    pub fn start(&self, as_of: NaiveDate) -> NaiveDate {
        as_of - Duration::days(self.days())
    }

    /// The record column holding this window's performance.
    pub const fn metric(&self) -> MetricId {
        match self {
            Self::Days30 => MetricId::Performance30d,
            Self::Days180 => MetricId::Performance180d,
            Self::Days365 => MetricId::Performance365d,
            Self::OneYear => MetricId::Performance1y,
        }
    }

    /// The longest of `windows`, if any.
    pub fn widest(windows: &[Self]) -> Option<Self> {
        windows.iter().copied().max_by_key(Self::days)
    }
}

impl fmt::Display for PriceWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneYear => write!(f, "1y"),
            _ => write!(f, "{}d", self.days()),
        }
    }
}

/// Percentage change from the first to the last close of `series`.
///
/// Unavailable for an empty series or a zero first close.
pub fn performance(series: &PriceSeries) -> Option<f64> {
    let first = finite(series.first()?.close)?;
    let last = finite(series.last()?.close)?;
    if first == 0.0 {
        return None;
    }
    percent(Some((last - first) / first))
}

/// Performance over `window`, restricting `series` to `[as_of - days, as_of]`.
pub fn window_performance(
    series: &PriceSeries,
    window: PriceWindow,
    as_of: NaiveDate,
) -> Option<f64> {
    performance(&series.window(window.start(as_of), as_of))
}
