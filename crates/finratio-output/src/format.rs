//! Display formatting of metric values.

use finratio_metrics::{FinancialRecord, MetricId, MetricUnit};

/// Placeholder for unavailable values.
pub const NOT_AVAILABLE: &str = "N/A";

/// Format a value in its metric's unit.
///
/// Percentages get two decimals and a `%` sign, ratios two decimals, currency
/// amounts a K/M/B/T suffix and provider pass-through values four decimals.
pub fn format_value(value: Option<f64>, unit: MetricUnit) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return NOT_AVAILABLE.to_string();
    };

    match unit {
        MetricUnit::Percent => format!("{value:.2}%"),
        MetricUnit::Ratio => format!("{value:.2}"),
        MetricUnit::Currency => format_amount(value),
        MetricUnit::AsReported => format!("{value:.4}"),
    }
}

/// Format one metric of a record.
pub fn format_metric(record: &FinancialRecord, metric: MetricId) -> String {
    format_value(record.get(metric), metric.unit())
}

fn format_amount(value: f64) -> String {
    const SCALES: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

    let magnitude = value.abs();
    SCALES
        .iter()
        .find(|(scale, _)| magnitude >= *scale)
        .map_or_else(
            || format!("{value:.2}"),
            |(scale, suffix)| format!("{:.2}{suffix}", value / scale),
        )
}
