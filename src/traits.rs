//! The backend seam the controllers talk to.
//!
//! Controllers never build URLs or touch HTTP; they hand a ticker or a
//! [`FilingKey`] to a [`ReportsBackend`] and get typed data back. The
//! HTTP [`DashboardClient`](crate::DashboardClient) is the production
//! implementation, and tests plug in in-memory fakes to control exactly when
//! and in which order responses arrive.

use async_trait::async_trait;

use super::error::Result;
use super::models::{DocumentKey, FilingKey, FilingSet, LatestReport, ReportDetail};

/// Operations served by the dashboard backend.
#[async_trait]
pub trait ReportsBackend: Send + Sync {
    /// Recent 10-Q / 10-K / 20-F filings for a ticker, most recent first.
    async fn reports(&self, ticker: &str) -> Result<FilingSet>;
    /// Metrics, statements and MD&A extract for one filing.
    async fn report_details(&self, key: &FilingKey) -> Result<ReportDetail>;
    /// Raw bytes of a filing's primary document.
    async fn filing_document(&self, key: &DocumentKey) -> Result<Vec<u8>>;
    /// Only the newest filing for a ticker.
    async fn latest_report(&self, ticker: &str) -> Result<LatestReport>;
}
