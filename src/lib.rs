//! # edgardash - client core of an SEC filings dashboard
//!
//! edgardash is the data layer behind a dashboard that looks up a ticker, lists the
//! company's recent 10-Q / 10-K / 20-F filings, and shows each filing's key metrics,
//! standardized statements, MD&A extract and original document. It reshapes what the
//! dashboard backend returns and guards access to it:
//!
//! - **Number formatting** - magnitude-scaled figures (`1.50 B`), per-share values
//!   never abbreviated
//! - **Series alignment** - sparse metric histories merged onto one timeline for
//!   comparative charts
//! - **Statement views** - income, balance and cash flow tables with a distinct
//!   empty state
//! - **Selection control** - per-filing detail fetches that ignore late responses for
//!   filings no longer selected
//! - **Search control** - ticker lookup state machine gating the rest of the view
//!
//! ## Requirements
//!
//! The controllers are plain state machines, but [`Dashboard`] spawns its fetches and
//! therefore needs a [tokio](https://tokio.rs) runtime.
//!
//! ## Basic Usage
//!
//! ```ignore
//! use edgardash::{Dashboard, DashboardConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut dashboard = Dashboard::connect(DashboardConfig::from_env()?)?;
//!
//!     dashboard.submit_search("aapl")?;
//!     dashboard.settle().await;
//!
//!     let snapshot = dashboard.snapshot();
//!     if let Some(filing) = snapshot.selection.selected() {
//!         println!("{}", filing.subtitle());
//!     }
//!
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod models;
mod traits;

pub mod align;
pub mod dashboard;
pub mod format;
pub mod metrics;
pub mod search;
pub mod selection;
pub mod statements;

#[cfg(feature = "client")]
mod api;
#[cfg(feature = "client")]
mod core;

pub use config::{DEFAULT_BASE_URL, DashboardConfig};
pub use error::{
    DashboardError, INTERRUPTED_MESSAGE, MALFORMED_RESPONSE_MESSAGE, NETWORK_ERROR_MESSAGE,
    Result,
};
pub use models::{
    DocumentKey, Filing, FilingKey, FilingSet, LatestReport, METRIC_KEYS, Metric,
    MetricSeriesPoint, MetricSet, ReportDetail, StatementLineItem, StatementSet,
};
pub use traits::ReportsBackend;

#[cfg(feature = "client")]
pub use self::core::DashboardClient;

pub use align::{AlignedRow, align};
pub use dashboard::{Dashboard, DashboardEvent, DashboardSnapshot, FilingDocument};
pub use format::format_value;
pub use metrics::{MetricsPanel, ViewMode};
pub use search::{SearchController, SearchState};
pub use selection::{Completion, DetailState, DetailView, ReportSelectionController};
pub use statements::{StatementKind, StatementPanel};

/// Current crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
