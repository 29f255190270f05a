//! Event loop tying the search and selection controllers to a backend.
//!
//! [`Dashboard`] is the explicit replacement for "re-run the fetch whenever the
//! selection changes": every mutating call runs the controller operation, spawns
//! whatever fetch it produced, and publishes a fresh [`DashboardSnapshot`]. Fetches
//! run as tasks in a [`JoinSet`] and are applied one at a time by
//! [`Dashboard::next_event`], where the controllers' staleness checks decide whether
//! they still matter.
//!
//! In-flight requests are never cancelled; a superseded one simply finishes and is
//! reported as [`Completion::Stale`]. A task that dies without a response (a panicking
//! backend) completes its request with [`DashboardError::TaskFailed`].

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::{Id, JoinError, JoinSet};

use crate::error::{DashboardError, Result};
use crate::models::{FilingSet, LatestReport, ReportDetail};
use crate::search::{SearchController, SearchRequest, SearchState};
use crate::selection::{Completion, DetailRequest, ReportSelectionController, SelectionSnapshot};
use crate::traits::ReportsBackend;

/// Everything a view layer needs to render the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSnapshot {
    pub search: SearchState,
    pub selection: SelectionSnapshot,
}

/// What [`Dashboard::next_event`] just processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    Search {
        ticker: String,
        completion: Completion,
    },
    Details {
        accession: String,
        completion: Completion,
    },
}

/// A downloaded filing document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilingDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

enum Outcome {
    Reports(SearchRequest, Result<FilingSet>),
    Details(DetailRequest, Result<ReportDetail>),
}

// request each running task answers for
enum Pending {
    Search(SearchRequest),
    Details(DetailRequest),
}

impl Pending {
    fn failed(self, err: JoinError) -> Outcome {
        let failure = DashboardError::TaskFailed(err.to_string());
        match self {
            Pending::Search(request) => Outcome::Reports(request, Err(failure)),
            Pending::Details(request) => Outcome::Details(request, Err(failure)),
        }
    }
}

pub struct Dashboard<B: ReportsBackend + 'static> {
    backend: Arc<B>,
    search: SearchController,
    selection: ReportSelectionController,
    tasks: JoinSet<Outcome>,
    pending: HashMap<Id, Pending>,
    snapshots: watch::Sender<DashboardSnapshot>,
}

impl<B: ReportsBackend + 'static> Dashboard<B> {
    pub fn new(backend: Arc<B>) -> Self {
        let (snapshots, _) = watch::channel(DashboardSnapshot::default());

        Self {
            backend,
            search: SearchController::new(),
            selection: ReportSelectionController::new(),
            tasks: JoinSet::new(),
            pending: HashMap::new(),
            snapshots,
        }
    }

    /// Starts a ticker lookup. The current filings are cleared right away.
    ///
    /// # Errors
    ///
    /// `DashboardError::Validation` for a blank ticker; no request is made and the
    /// snapshot shows the validation message.
    pub fn submit_search(&mut self, text: &str) -> Result<()> {
        let result = self.search.search(text);
        self.selection.clear();

        let outcome = result.map(|request| self.spawn_search(request));
        self.publish();
        outcome
    }

    /// Selects a filing and starts loading its details.
    ///
    /// # Errors
    ///
    /// `DashboardError::IndexOutOfRange` if no filing exists at `index`.
    pub fn select_report(&mut self, index: usize) -> Result<()> {
        if let Some(request) = self.selection.select(index)? {
            self.spawn_details(request);
        }
        self.publish();
        Ok(())
    }

    /// Waits for the next fetch to finish and applies it.
    ///
    /// Returns `None` when nothing is in flight.
    pub async fn next_event(&mut self) -> Option<DashboardEvent> {
        let outcome = loop {
            match self.tasks.join_next_with_id().await? {
                Ok((id, outcome)) => {
                    self.pending.remove(&id);
                    break outcome;
                }
                Err(err) => match self.pending.remove(&err.id()) {
                    Some(pending) => {
                        tracing::error!("Fetch task failed: {}", err);
                        break pending.failed(err);
                    }
                    None => tracing::warn!("Untracked fetch task ended: {}", err),
                },
            }
        };

        let event = self.apply(outcome);
        self.publish();
        Some(event)
    }

    /// Processes events until no fetch is left in flight.
    pub async fn settle(&mut self) -> Vec<DashboardEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event);
        }
        events
    }

    /// Downloads the selected filing's primary document.
    pub async fn download_filing(&self) -> Result<FilingDocument> {
        let filings = self
            .selection
            .filings()
            .ok_or_else(|| DashboardError::Validation("No filing selected".to_string()))?;
        let filing = self
            .selection
            .selected()
            .ok_or_else(|| DashboardError::Validation("No filing selected".to_string()))?;

        let key = filing.document_key(&filings.cik);
        let bytes = self.backend.filing_document(&key).await?;
        tracing::info!("Downloaded {} ({} bytes)", key.file_name(), bytes.len());

        Ok(FilingDocument {
            file_name: key.file_name().to_string(),
            bytes,
        })
    }

    /// Looks up only the newest filing for a ticker, bypassing the controllers.
    pub async fn latest_report(&self, ticker: &str) -> Result<LatestReport> {
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(DashboardError::Validation(
                crate::search::EMPTY_TICKER_MESSAGE.to_string(),
            ));
        }
        self.backend.latest_report(&ticker).await
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Fetches spawned but not yet applied.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    fn apply(&mut self, outcome: Outcome) -> DashboardEvent {
        match outcome {
            Outcome::Reports(request, result) => {
                let (completion, published) = self.search.complete(&request, result);
                let published = published.cloned();

                if completion == Completion::Applied {
                    match published {
                        Some(filings) => {
                            if let Some(detail) = self.selection.set_reports(filings) {
                                self.spawn_details(detail);
                            }
                        }
                        None => self.selection.clear(),
                    }
                }

                DashboardEvent::Search {
                    ticker: request.ticker,
                    completion,
                }
            }
            Outcome::Details(request, result) => {
                let completion = self.selection.complete(&request, result);
                DashboardEvent::Details {
                    accession: request.key.accession,
                    completion,
                }
            }
        }
    }

    fn spawn_search(&mut self, request: SearchRequest) {
        let backend = Arc::clone(&self.backend);
        let pending = Pending::Search(request.clone());

        let handle = self.tasks.spawn(async move {
            let result = backend.reports(&request.ticker).await;
            Outcome::Reports(request, result)
        });
        self.pending.insert(handle.id(), pending);
    }

    fn spawn_details(&mut self, request: DetailRequest) {
        let backend = Arc::clone(&self.backend);
        let pending = Pending::Details(request.clone());

        let handle = self.tasks.spawn(async move {
            let result = backend.report_details(&request.key).await;
            Outcome::Details(request, result)
        });
        self.pending.insert(handle.id(), pending);
    }

    fn publish(&self) {
        self.snapshots.send_replace(DashboardSnapshot {
            search: self.search.state().clone(),
            selection: self.selection.snapshot(),
        });
    }
}

#[cfg(feature = "client")]
impl Dashboard<crate::DashboardClient> {
    /// Dashboard talking HTTP to the backend described by `config`.
    pub fn connect(config: crate::DashboardConfig) -> Result<Self> {
        let client = crate::DashboardClient::with_config(config)?;
        Ok(Self::new(Arc::new(client)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentKey, Filing, FilingKey};
    use async_trait::async_trait;

    struct StaticBackend;

    fn filing(accession: &str, primary_doc: &str) -> Filing {
        Filing {
            accession: accession.to_string(),
            form: "10-K".to_string(),
            filing_date: "2024-11-01".to_string(),
            report_date: None,
            primary_doc: primary_doc.to_string(),
            filing_url: String::new(),
        }
    }

    #[async_trait]
    impl ReportsBackend for StaticBackend {
        async fn reports(&self, ticker: &str) -> Result<FilingSet> {
            Ok(FilingSet {
                cik: "0000320193".to_string(),
                ticker: ticker.to_string(),
                reports: vec![filing("A", "a.htm"), filing("B", "")],
            })
        }

        async fn report_details(&self, key: &FilingKey) -> Result<ReportDetail> {
            Ok(ReportDetail {
                metrics: Default::default(),
                statements: None,
                mda_html: None,
                cik: Some(key.cik.clone()),
                accession: Some(key.accession.clone()),
                filing_date: Some(key.filing_date.clone()),
                report_date: Some(key.report_date.clone()),
            })
        }

        async fn filing_document(&self, key: &DocumentKey) -> Result<Vec<u8>> {
            Ok(format!("<html>{}</html>", key.accession).into_bytes())
        }

        async fn latest_report(&self, _ticker: &str) -> Result<LatestReport> {
            Err(DashboardError::Request {
                status: 404,
                message: "No report found".to_string(),
            })
        }
    }

    struct PanickingBackend {
        lookup_panics: bool,
    }

    #[async_trait]
    impl ReportsBackend for PanickingBackend {
        async fn reports(&self, ticker: &str) -> Result<FilingSet> {
            if self.lookup_panics {
                panic!("lookup for {} blew up", ticker);
            }
            StaticBackend.reports(ticker).await
        }

        async fn report_details(&self, key: &FilingKey) -> Result<ReportDetail> {
            panic!("details for {} blew up", key.accession);
        }

        async fn filing_document(&self, _key: &DocumentKey) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }

        async fn latest_report(&self, ticker: &str) -> Result<LatestReport> {
            StaticBackend.latest_report(ticker).await
        }
    }

    async fn settle_within(dashboard: &mut Dashboard<PanickingBackend>) -> Vec<DashboardEvent> {
        tokio::time::timeout(std::time::Duration::from_secs(5), dashboard.settle())
            .await
            .expect("settle should not hang")
    }

    #[tokio::test]
    async fn test_panicking_detail_fetch_becomes_error() {
        let mut dashboard = Dashboard::new(Arc::new(PanickingBackend {
            lookup_panics: false,
        }));
        dashboard.submit_search("aapl").unwrap();

        let events = settle_within(&mut dashboard).await;
        assert_eq!(
            events.last(),
            Some(&DashboardEvent::Details {
                accession: "A".to_string(),
                completion: Completion::Applied,
            })
        );
        assert_eq!(dashboard.in_flight(), 0);

        let state = dashboard.snapshot().selection.state;
        assert!(!state.loading);
        assert!(state.detail.is_none());
        assert_eq!(state.error.as_deref(), Some(crate::error::INTERRUPTED_MESSAGE));
    }

    #[tokio::test]
    async fn test_panicking_lookup_becomes_error() {
        let mut dashboard = Dashboard::new(Arc::new(PanickingBackend {
            lookup_panics: true,
        }));
        dashboard.submit_search("aapl").unwrap();

        let events = settle_within(&mut dashboard).await;
        assert_eq!(events.len(), 1);

        let snapshot = dashboard.snapshot();
        assert_eq!(
            snapshot.search.error(),
            Some(crate::error::INTERRUPTED_MESSAGE)
        );
        assert!(snapshot.selection.filings.is_none());
    }

    #[tokio::test]
    async fn test_search_then_first_filing_loads() {
        let mut dashboard = Dashboard::new(Arc::new(StaticBackend));
        dashboard.submit_search("aapl").unwrap();
        assert!(dashboard.snapshot().search.is_loading());

        let events = dashboard.settle().await;
        assert_eq!(events.len(), 2);

        let snapshot = dashboard.snapshot();
        assert_eq!(snapshot.search.filings().unwrap().ticker, "AAPL");
        let detail = snapshot.selection.state.detail.unwrap();
        assert_eq!(detail.accession.as_deref(), Some("A"));
        assert_eq!(detail.report_date.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_download_uses_primary_doc_or_fallback() {
        let mut dashboard = Dashboard::new(Arc::new(StaticBackend));
        assert!(dashboard.download_filing().await.is_err());

        dashboard.submit_search("aapl").unwrap();
        dashboard.settle().await;

        let doc = dashboard.download_filing().await.unwrap();
        assert_eq!(doc.file_name, "a.htm");
        assert_eq!(doc.bytes, b"<html>A</html>".to_vec());

        dashboard.select_report(1).unwrap();
        let doc = dashboard.download_filing().await.unwrap();
        assert_eq!(doc.file_name, "filing");
    }

    #[tokio::test]
    async fn test_subscribers_see_updates() {
        let mut dashboard = Dashboard::new(Arc::new(StaticBackend));
        let mut rx = dashboard.subscribe();

        dashboard.submit_search("msft").unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().search.is_loading());

        dashboard.settle().await;
        assert!(rx.borrow_and_update().selection.state.detail.is_some());
    }

    #[tokio::test]
    async fn test_latest_report_errors_pass_through() {
        let dashboard = Dashboard::new(Arc::new(StaticBackend));
        let err = dashboard.latest_report("aapl").await.unwrap_err();
        assert_eq!(err.user_message(), "No report found");
        assert!(dashboard.latest_report(" ").await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_next_event_without_work_returns_none() {
        let mut dashboard = Dashboard::new(Arc::new(StaticBackend));
        assert!(dashboard.next_event().await.is_none());
        assert_eq!(dashboard.in_flight(), 0);
    }
}
