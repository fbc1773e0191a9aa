//! Ranked views over financial records.
//!
//! Sorting is stable and places unavailable values last in either direction.

use crate::record::FinancialRecord;
use crate::registry::MetricId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Sort direction of a ranked view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    /// Smallest first
    #[serde(rename = "asc")]
    Ascending,
    /// Largest first
    #[default]
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    /// Order two present values in this direction.
    pub fn order(&self, a: f64, b: f64) -> Ordering {
        match self {
            Self::Ascending => a.total_cmp(&b),
            Self::Descending => b.total_cmp(&a),
        }
    }

    /// Order two possibly-unavailable values, unavailable last.
    pub fn order_optional(&self, a: Option<f64>, b: Option<f64>) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => self.order(a, b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// A top-N (descending) or bottom-N (ascending) view by one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankSpec {
    /// Metric to sort on
    pub metric: MetricId,
    /// Maximum number of records in the view
    pub n: usize,
    /// Sort direction
    #[serde(default)]
    pub direction: SortDirection,
}

impl RankSpec {
    /// The `n` records with the largest values.
    pub const fn top(metric: MetricId, n: usize) -> Self {
        Self {
            metric,
            n,
            direction: SortDirection::Descending,
        }
    }

    /// The `n` records with the smallest values.
    pub const fn bottom(metric: MetricId, n: usize) -> Self {
        Self {
            metric,
            n,
            direction: SortDirection::Ascending,
        }
    }

    /// Section title, e.g. "Top 10 by Revenue Growth".
    pub fn title(&self) -> String {
        let side = match self.direction {
            SortDirection::Descending => "Top",
            SortDirection::Ascending => "Bottom",
        };
        format!("{} {} by {}", side, self.n, self.metric.label())
    }

    /// The sections of the standard report.
    pub fn default_sections() -> Vec<Self> {
        vec![
            Self::top(MetricId::RevenueGrowth, 10),
            Self::top(MetricId::NetIncomeGrowth, 10),
            Self::top(MetricId::ReturnOnEquity, 10),
            Self::bottom(MetricId::Performance30d, 10),
        ]
    }
}

/// Stable sort of `records` by `metric`, unavailable values last.
pub fn sort_by_metric<'a, I>(
    records: I,
    metric: MetricId,
    direction: SortDirection,
) -> Vec<&'a FinancialRecord>
where
    I: IntoIterator<Item = &'a FinancialRecord>,
{
    let mut sorted: Vec<&FinancialRecord> = records.into_iter().collect();
    sorted.sort_by(|a, b| direction.order_optional(a.get(metric), b.get(metric)));
    sorted
}
