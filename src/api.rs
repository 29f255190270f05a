//! Backend endpoints served over HTTP.

use async_trait::async_trait;
use serde::Serialize;

use super::DashboardClient;
use super::error::{DashboardError, Result};
use super::models::{DocumentKey, FilingKey, FilingSet, LatestReport, ReportDetail};
use super::traits::ReportsBackend;

#[derive(Debug, Serialize)]
struct TickerQuery<'a> {
    ticker: &'a str,
}

#[derive(Debug)]
enum Endpoint {
    Reports,
    ReportDetails,
    LatestReport,
    ProxyFiling,
}

impl Endpoint {
    fn path(&self) -> &'static str {
        match self {
            Endpoint::Reports => "/api/reports",
            Endpoint::ReportDetails => "/api/report-details",
            Endpoint::LatestReport => "/api/latest-report",
            Endpoint::ProxyFiling => "/proxy-filing",
        }
    }
}

impl DashboardClient {
    fn build_url<Q: Serialize>(&self, endpoint: Endpoint, query: &Q) -> Result<String> {
        let query = serde_urlencoded::to_string(query)?;
        Ok(format!("{}{}?{}", self.base_url, endpoint.path(), query))
    }

    /// URL that serves the filing document for inline preview.
    pub fn preview_url(&self, key: &DocumentKey) -> Result<String> {
        self.build_url(Endpoint::ProxyFiling, key)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.get(url).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!("Malformed response from {}: {}", url, e);
            DashboardError::Json(e)
        })
    }
}

/// HTTP implementation of the backend operations.
///
/// # Errors
///
/// Every method may return:
/// - `DashboardError::Request`: the backend answered with a non-success status
/// - `DashboardError::Json`: a success response whose body is not the expected shape
/// - `DashboardError::Transport` / `RateLimitExceeded`: retries exhausted
#[async_trait]
impl ReportsBackend for DashboardClient {
    /// Lists recent filings for `ticker`. The ticker is sent as given; normalising it
    /// is the caller's job.
    async fn reports(&self, ticker: &str) -> Result<FilingSet> {
        let url = self.build_url(Endpoint::Reports, &TickerQuery { ticker })?;
        self.get_json(&url).await
    }

    async fn report_details(&self, key: &FilingKey) -> Result<ReportDetail> {
        let url = self.build_url(Endpoint::ReportDetails, key)?;
        self.get_json(&url).await
    }

    async fn filing_document(&self, key: &DocumentKey) -> Result<Vec<u8>> {
        let url = self.preview_url(key)?;
        self.get_bytes(&url).await
    }

    async fn latest_report(&self, ticker: &str) -> Result<LatestReport> {
        let url = self.build_url(Endpoint::LatestReport, &TickerQuery { ticker })?;
        self.get_json(&url).await
    }
}
