//! Key metrics panel: a table of the headline figures or a revenue vs. net income chart.

use crate::align::{AlignedRow, align};
use crate::format::{format_value, format_with_unit, unit_suffix};
use crate::models::{METRIC_KEYS, Metric, MetricSeriesPoint, MetricSet};

pub const REVENUE_SERIES: &str = "Revenue";
pub const NET_INCOME_SERIES: &str = "Net Income";

/// Shown in the history column when a metric has no series.
pub const NO_HISTORY: &str = "No history";

/// Shown instead of the narrative panel when the backend found no MD&A section.
pub const NO_NARRATIVE: &str = "MD&A section not found in this filing.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Table,
    Chart,
}

/// A formatted metrics table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRow {
    pub id: &'static str,
    pub label: String,
    pub latest: String,
    pub unit: Option<String>,
    pub history: Vec<String>,
}

/// What the panel renders in its current mode.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricsView {
    Table(Vec<MetricRow>),
    Chart(Vec<AlignedRow>),
}

/// Metrics panel with its own table/chart toggle.
#[derive(Debug, Clone, Default)]
pub struct MetricsPanel {
    mode: ViewMode,
}

impl MetricsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    pub fn view(&self, metrics: &MetricSet) -> MetricsView {
        match self.mode {
            ViewMode::Table => MetricsView::Table(table_rows(metrics)),
            ViewMode::Chart => MetricsView::Chart(chart_rows(metrics)),
        }
    }
}

/// Table rows in the fixed metric order; metrics the backend did not return are skipped.
pub fn table_rows(metrics: &MetricSet) -> Vec<MetricRow> {
    METRIC_KEYS
        .iter()
        .filter_map(|&id| metrics.get(id).map(|metric| metric_row(id, metric)))
        .collect()
}

fn metric_row(id: &'static str, metric: &Metric) -> MetricRow {
    let unit = metric.unit.as_deref();
    MetricRow {
        id,
        label: metric.label.clone(),
        latest: format_value(metric.current, unit),
        unit: unit_suffix(unit).map(String::from),
        history: history_lines(&metric.series, unit),
    }
}

/// One line per point: `2024-06-29 (Q3): 85.78 B`, unit appended unless it is USD or the
/// value is missing.
pub fn history_lines(series: &[MetricSeriesPoint], unit: Option<&str>) -> Vec<String> {
    if series.is_empty() {
        return vec![NO_HISTORY.to_string()];
    }

    series
        .iter()
        .map(|p| {
            format!(
                "{} ({}): {}",
                p.end.as_deref().unwrap_or_default(),
                p.fp.as_deref().unwrap_or_default(),
                format_with_unit(p.val, unit)
            )
        })
        .collect()
}

/// Revenue and net income merged onto one timeline.
pub fn chart_rows(metrics: &MetricSet) -> Vec<AlignedRow> {
    let revenue = series_of(metrics, "revenue");
    let income = series_of(metrics, "net_income");
    align(&[(REVENUE_SERIES, revenue), (NET_INCOME_SERIES, income)])
}

fn series_of<'a>(metrics: &'a MetricSet, id: &str) -> &'a [MetricSeriesPoint] {
    metrics.get(id).map(|m| m.series.as_slice()).unwrap_or(&[])
}

/// MD&A extract, or the placeholder text when the filing has none.
pub fn narrative(mda_html: Option<&str>) -> &str {
    match mda_html {
        Some(html) if !html.trim().is_empty() => html,
        _ => NO_NARRATIVE,
    }
}
