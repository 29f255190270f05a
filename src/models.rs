//! Data shapes returned by the dashboard backend.
//!
//! Everything here is deserialized straight from the JSON the backend serves and is
//! treated as read-only afterwards. A [`FilingSet`] is replaced wholesale on every
//! lookup and a [`ReportDetail`] belongs to exactly one filing; neither is ever
//! patched in place.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metric ids the backend reports, in display order.
pub const METRIC_KEYS: [&str; 4] = ["revenue", "net_income", "eps_diluted", "cfo"];

/// One regulatory filing (10-Q, 10-K, 20-F, ...) as listed by `/api/reports`.
///
/// Two filings are the same filing when their accession numbers match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filing {
    pub accession: String,
    pub form: String,
    pub filing_date: String,
    #[serde(default)]
    pub report_date: Option<String>,
    pub primary_doc: String,
    #[serde(default)]
    pub filing_url: String,
}

impl Filing {
    /// Composite identifier used to request this filing's details.
    pub fn key(&self, cik: &str) -> FilingKey {
        FilingKey {
            cik: cik.to_string(),
            accession: self.accession.clone(),
            primary_doc: self.primary_doc.clone(),
            filing_date: self.filing_date.clone(),
            report_date: self.report_date.clone().unwrap_or_default(),
        }
    }

    /// Identifier for the raw filing document behind `/proxy-filing`.
    pub fn document_key(&self, cik: &str) -> DocumentKey {
        DocumentKey {
            cik: cik.to_string(),
            accession: self.accession.clone(),
            primary_doc: self.primary_doc.clone(),
        }
    }

    /// Header line for a selected filing, e.g. `AAPL — 10-Q`.
    pub fn title(&self, ticker: &str) -> String {
        format!("{} — {}", ticker, self.form)
    }

    /// Sub-header line, e.g. `Filed on 2024-08-02 • Accession: 0000320193-24-000081`.
    pub fn subtitle(&self) -> String {
        format!(
            "Filed on {} • Accession: {}",
            self.filing_date, self.accession
        )
    }
}

/// All recent filings for one company, most recent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilingSet {
    pub cik: String,
    pub ticker: String,
    pub reports: Vec<Filing>,
}

/// Summary returned by `/api/latest-report`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestReport {
    pub ticker: String,
    pub cik: String,
    pub form: String,
    pub filing_date: String,
    pub accession: String,
    pub primary_doc: String,
    #[serde(default)]
    pub report_date: String,
    pub filing_url: String,
}

/// Composite key for `/api/report-details`.
///
/// Serializes to the exact query string the backend expects; an unknown report date
/// is sent as an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FilingKey {
    pub cik: String,
    pub accession: String,
    pub primary_doc: String,
    pub filing_date: String,
    pub report_date: String,
}

/// Key for `/proxy-filing`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DocumentKey {
    pub cik: String,
    pub accession: String,
    pub primary_doc: String,
}

impl DocumentKey {
    /// File name offered for download.
    pub fn file_name(&self) -> &str {
        if self.primary_doc.trim().is_empty() {
            "filing"
        } else {
            &self.primary_doc
        }
    }
}

/// One reported value in a metric's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeriesPoint {
    /// Period end, expected as `YYYY-MM-DD`.
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub val: Option<f64>,
    /// Fiscal period tag (`Q1`, `FY`, ...).
    #[serde(default)]
    pub fp: Option<String>,
    #[serde(default)]
    pub form: Option<String>,
    #[serde(default)]
    pub fy: Option<i32>,
}

impl MetricSeriesPoint {
    pub fn new(end: impl Into<String>, val: Option<f64>) -> Self {
        Self {
            end: Some(end.into()),
            val,
            fp: None,
            form: None,
            fy: None,
        }
    }

    pub fn with_fp(mut self, fp: impl Into<String>) -> Self {
        self.fp = Some(fp.into());
        self
    }
}

/// A derived metric for one filing plus its recent history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub label: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub current: Option<f64>,
    #[serde(default)]
    pub series: Vec<MetricSeriesPoint>,
    /// XBRL concept the backend resolved this metric from.
    #[serde(default)]
    pub concept: Option<String>,
}

/// Metric id → metric. A missing id means the metric is not available.
pub type MetricSet = HashMap<String, Metric>;

/// A single row of a standardized statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementLineItem {
    pub label: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

/// Statement kind id (`income`, `balance`, `cash_flow`) → ordered line items.
///
/// Keyed by the raw id so kinds this crate does not know about still deserialize.
pub type StatementSet = HashMap<String, Vec<StatementLineItem>>;

/// Everything the backend derives for one filing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDetail {
    #[serde(default)]
    pub metrics: MetricSet,
    #[serde(default)]
    pub statements: Option<StatementSet>,
    #[serde(default)]
    pub mda_html: Option<String>,
    #[serde(default)]
    pub cik: Option<String>,
    #[serde(default)]
    pub accession: Option<String>,
    #[serde(default)]
    pub filing_date: Option<String>,
    #[serde(default)]
    pub report_date: Option<String>,
}

impl ReportDetail {
    pub fn metric(&self, id: &str) -> Option<&Metric> {
        self.metrics.get(id)
    }
}
