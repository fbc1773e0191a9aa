//! SVG bar charts of one metric.

use finratio_metrics::{MetricId, ResultSet};
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Chart height in pixels.
const HEIGHT: u32 = 480;

/// Minimum chart width in pixels.
const MIN_WIDTH: u32 = 800;

/// Horizontal space per bar in pixels.
const BAR_WIDTH: u32 = 24;

/// Errors that can occur while drawing a chart.
#[derive(Debug, Error)]
pub enum ChartError {
    /// No record has a value for the metric.
    #[error("No values to chart for {metric}")]
    NoData {
        /// Charted metric.
        metric: MetricId,
    },

    /// Plotting backend error.
    #[error("Drawing error: {0}")]
    Drawing(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn drawing(err: impl std::fmt::Display) -> ChartError {
    ChartError::Drawing(err.to_string())
}

/// Bar chart of one metric, one bar per symbol in result order.
#[derive(Debug, Clone)]
pub struct BarChart {
    metric: MetricId,
    title: Option<String>,
    size: Option<(u32, u32)>,
}

impl BarChart {
    /// Chart `metric`.
    pub const fn new(metric: MetricId) -> Self {
        Self {
            metric,
            title: None,
            size: None,
        }
    }

    /// Replace the caption, which defaults to the metric label.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Fix the image size instead of scaling width with the bar count.
    pub const fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = Some((width, height));
        self
    }

    /// Charted metric.
    pub const fn metric(&self) -> MetricId {
        self.metric
    }

    /// `(symbol, value)` of every bar; records without a value are left out.
    pub fn bars<'a>(&self, results: &'a ResultSet) -> Vec<(&'a str, f64)> {
        results
            .column(self.metric)
            .into_iter()
            .filter_map(|(symbol, value)| value.filter(|v| v.is_finite()).map(|v| (symbol, v)))
            .collect()
    }

    /// Render the chart as an SVG document.
    pub fn render_svg(&self, results: &ResultSet) -> Result<String, ChartError> {
        let bars = self.bars(results);
        if bars.is_empty() {
            return Err(ChartError::NoData {
                metric: self.metric,
            });
        }

        let size = self.size.unwrap_or_else(|| {
            let width = u32::try_from(bars.len())
                .unwrap_or(u32::MAX)
                .saturating_mul(BAR_WIDTH);
            (width.max(MIN_WIDTH), HEIGHT)
        });
        let (low, high) = value_range(bars.iter().map(|(_, v)| *v));
        let caption = self
            .title
            .clone()
            .unwrap_or_else(|| self.metric.label().to_string());

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
            root.fill(&WHITE).map_err(drawing)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(caption, ("sans-serif", 22))
                .margin(16)
                .x_label_area_size(90)
                .y_label_area_size(70)
                .build_cartesian_2d((0..bars.len()).into_segmented(), low..high)
                .map_err(drawing)?;

            let label = |value: &SegmentValue<usize>| match value {
                SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => bars
                    .get(*i)
                    .map(|(symbol, _)| (*symbol).to_string())
                    .unwrap_or_default(),
                SegmentValue::Last => String::new(),
            };

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(bars.len())
                .x_label_formatter(&label)
                .x_label_style(
                    ("sans-serif", 11)
                        .into_font()
                        .transform(FontTransform::Rotate90),
                )
                .y_desc(self.metric.label())
                .draw()
                .map_err(drawing)?;

            chart
                .draw_series(
                    Histogram::vertical(&chart)
                        .style(BLUE.mix(0.7).filled())
                        .margin(4)
                        .data(bars.iter().enumerate().map(|(i, (_, value))| (i, *value))),
                )
                .map_err(drawing)?;

            root.present().map_err(drawing)?;
        }

        debug!(metric = %self.metric, bars = bars.len(), "rendered chart");
        Ok(svg)
    }

    /// Render the chart and write it to `path`.
    pub fn save(&self, results: &ResultSet, path: &Path) -> Result<(), ChartError> {
        let svg = self.render_svg(results)?;
        std::fs::write(path, svg)?;
        Ok(())
    }
}

/// Value axis range, always including zero and padded on the open sides.
fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = max - min;
    if span == 0.0 {
        return (0.0, 1.0);
    }

    let pad = span * 0.05;
    let low = if min < 0.0 { min - pad } else { min };
    let high = if max > 0.0 { max + pad } else { max };
    (low, high)
}
