//! Merging metric histories onto one shared timeline.
//!
//! Charting two metrics side by side needs one row per period end with a column per
//! metric. Metric histories are sparse and independently ordered, so [`align`] builds
//! the union of period ends and fills only the columns that actually have a point
//! there. A column that is missing from a row means "no point for this period"; it is
//! never filled with zero.
//!
//! Period ends are compared as plain strings. That ordering is only chronological for
//! ISO-8601 dates (`YYYY-MM-DD`), which the backend is expected to send. Labels in any
//! other shape are logged and placed by string order, never rewritten.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::MetricSeriesPoint;

/// One period on the merged timeline.
///
/// Serializes flat, e.g. `{"name": "2023-03-31", "Revenue": 10.0}`, which is the shape
/// chart components consume directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedRow {
    /// Period end label shared by every value in the row.
    pub name: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, Option<f64>>,
}

impl AlignedRow {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            values: BTreeMap::new(),
        }
    }

    /// Whether `series` has a point at this period, even one with a null value.
    pub fn has(&self, series: &str) -> bool {
        self.values.contains_key(series)
    }

    /// The value `series` reported for this period.
    pub fn value(&self, series: &str) -> Option<f64> {
        self.values.get(series).copied().flatten()
    }
}

/// Merges named series into rows sorted by period end.
///
/// Points with a missing or empty `end` are skipped. When one series holds several
/// points for the same `end`, the last one in input order wins.
///
/// # Examples
///
/// ```rust
/// use edgardash::align::align;
/// use edgardash::MetricSeriesPoint;
///
/// let revenue = vec![MetricSeriesPoint::new("2023-03-31", Some(10.0))];
/// let income = vec![
///     MetricSeriesPoint::new("2023-03-31", Some(2.0)),
///     MetricSeriesPoint::new("2023-06-30", Some(3.0)),
/// ];
///
/// let rows = align(&[("Revenue", &revenue[..]), ("Net Income", &income[..])]);
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[1].value("Net Income"), Some(3.0));
/// assert!(!rows[1].has("Revenue"));
/// ```
pub fn align(series: &[(&str, &[MetricSeriesPoint])]) -> Vec<AlignedRow> {
    let mut rows: BTreeMap<String, AlignedRow> = BTreeMap::new();

    for (name, points) in series {
        for point in points.iter() {
            let Some(end) = point.end.as_deref().filter(|e| !e.is_empty()) else {
                continue;
            };

            if !is_iso_date(end) {
                tracing::warn!(
                    "Series '{}' has non ISO-8601 period end '{}'; ordering may be wrong",
                    name,
                    end
                );
            }

            rows.entry(end.to_string())
                .or_insert_with(|| AlignedRow::new(end))
                .values
                .insert(name.to_string(), point.val);
        }
    }

    rows.into_values().collect()
}

fn is_iso_date(label: &str) -> bool {
    label.len() == 10 && NaiveDate::parse_from_str(label, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(end: &str, val: f64) -> MetricSeriesPoint {
        MetricSeriesPoint::new(end, Some(val))
    }

    #[test]
    fn test_union_of_period_ends() {
        let revenue = vec![point("2023-03-31", 10.0)];
        let income = vec![point("2023-03-31", 2.0), point("2023-06-30", 3.0)];

        let rows = align(&[("Revenue", &revenue[..]), ("Net Income", &income[..])]);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "2023-03-31");
        assert_eq!(rows[0].value("Revenue"), Some(10.0));
        assert_eq!(rows[0].value("Net Income"), Some(2.0));
        assert_eq!(rows[1].name, "2023-06-30");
        assert_eq!(rows[1].value("Net Income"), Some(3.0));
        assert!(!rows[1].has("Revenue"));
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let revenue = vec![point("2023-03-31", 10.0)];
        let income = vec![point("2023-06-30", 3.0), point("2023-03-31", 2.0)];

        let forward = align(&[("Revenue", &revenue[..]), ("Net Income", &income[..])]);
        let reverse = align(&[("Net Income", &income[..]), ("Revenue", &revenue[..])]);

        assert_eq!(forward, reverse);
    }

    #[test]
    fn test_unsorted_input_is_sorted_by_end() {
        let series = vec![
            point("2024-06-30", 3.0),
            point("2023-12-31", 1.0),
            point("2024-03-31", 2.0),
        ];
        let rows = align(&[("Revenue", &series[..])]);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["2023-12-31", "2024-03-31", "2024-06-30"]);
    }

    #[test]
    fn test_missing_end_is_dropped() {
        let mut undated = point("", 5.0);
        undated.end = None;
        let series = vec![undated, point("", 6.0), point("2024-03-31", 7.0)];

        let rows = align(&[("Revenue", &series[..])]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value("Revenue"), Some(7.0));
    }

    #[test]
    fn test_duplicate_end_last_write_wins() {
        let series = vec![point("2024-03-31", 1.0), point("2024-03-31", 9.0)];
        let rows = align(&[("Revenue", &series[..])]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value("Revenue"), Some(9.0));
    }

    #[test]
    fn test_zero_and_null_are_distinct_from_absent() {
        let revenue = vec![point("2024-03-31", 0.0)];
        let income = vec![MetricSeriesPoint::new("2024-03-31", None)];
        let rows = align(&[("Revenue", &revenue[..]), ("Net Income", &income[..])]);

        assert_eq!(rows[0].value("Revenue"), Some(0.0));
        assert!(rows[0].has("Net Income"));
        assert_eq!(rows[0].value("Net Income"), None);
        assert!(!rows[0].has("EPS"));
    }

    #[test]
    fn test_rows_serialize_flat() {
        let revenue = vec![point("2023-03-31", 10.0)];
        let rows = align(&[("Revenue", &revenue[..])]);
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json, serde_json::json!({"name": "2023-03-31", "Revenue": 10.0}));
    }

    #[test]
    fn test_empty_input() {
        assert!(align(&[]).is_empty());
        let empty: Vec<MetricSeriesPoint> = Vec::new();
        assert!(align(&[("Revenue", &empty[..])]).is_empty());
    }
}
