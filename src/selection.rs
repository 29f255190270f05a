//! Filing selection and per-filing detail loading.
//!
//! [`ReportSelectionController`] owns the current [`FilingSet`], which filing is
//! selected, and the load state of that filing's [`ReportDetail`]. It never performs
//! I/O itself: every operation that changes what is selected returns a
//! [`DetailRequest`] describing the fetch to run, and the result is handed back
//! through [`ReportSelectionController::complete`].
//!
//! Each request carries the generation it was issued under. Any later selection
//! bumps the generation, so when a slow response for an earlier selection finally
//! arrives it no longer matches and is dropped:
//!
//! ```text
//! select(1) ──► request gen 2 (B) ─────────────────────────┐
//! select(0) ──► request gen 3 (A) ──────┐                  │
//!                                       ▼                  ▼
//!                          complete(gen 3): applied   complete(gen 2): stale
//! ```

use crate::error::{DashboardError, Result};
use crate::models::{Filing, FilingKey, FilingSet, ReportDetail};

/// A detail fetch the caller must run and report back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRequest {
    pub generation: u64,
    pub index: usize,
    pub key: FilingKey,
}

/// Whether a completed fetch changed visible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

/// Load state of the selected filing's detail.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailState {
    pub detail: Option<ReportDetail>,
    pub loading: bool,
    pub error: Option<String>,
}

/// The one thing a detail panel should show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetailView<'a> {
    Empty,
    Loading,
    Failed(&'a str),
    Ready(&'a ReportDetail),
}

impl DetailState {
    fn begin() -> Self {
        Self {
            detail: None,
            loading: true,
            error: None,
        }
    }

    pub fn view(&self) -> DetailView<'_> {
        if self.loading {
            DetailView::Loading
        } else if let Some(error) = &self.error {
            DetailView::Failed(error)
        } else if let Some(detail) = &self.detail {
            DetailView::Ready(detail)
        } else {
            DetailView::Empty
        }
    }
}

/// Point-in-time copy of the controller for consumers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSnapshot {
    pub filings: Option<FilingSet>,
    pub selected_index: usize,
    pub state: DetailState,
}

impl SelectionSnapshot {
    pub fn selected(&self) -> Option<&Filing> {
        self.filings
            .as_ref()
            .and_then(|set| set.reports.get(self.selected_index))
    }
}

#[derive(Debug, Default)]
pub struct ReportSelectionController {
    filings: Option<FilingSet>,
    selected_index: usize,
    generation: u64,
    state: DetailState,
}

impl ReportSelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the filing set and selects its first filing.
    ///
    /// Any in-flight fetch becomes stale and any previous detail or error is cleared.
    /// Returns the fetch for the first filing, or `None` if the set is empty.
    pub fn set_reports(&mut self, filings: FilingSet) -> Option<DetailRequest> {
        tracing::debug!(
            "Replacing filings for {} ({} reports)",
            filings.ticker,
            filings.reports.len()
        );
        self.filings = Some(filings);
        self.selected_index = 0;
        self.generation += 1;
        self.state = DetailState::default();
        self.trigger()
    }

    /// Drops the filing set, e.g. while a new lookup runs or after it failed.
    pub fn clear(&mut self) {
        self.filings = None;
        self.selected_index = 0;
        self.generation += 1;
        self.state = DetailState::default();
    }

    /// Selects the filing at `index` and returns the fetch for it.
    ///
    /// Re-selecting the current filing returns `Ok(None)` and keeps the current state.
    ///
    /// # Errors
    ///
    /// `DashboardError::IndexOutOfRange` if `index` is not a valid report index; the
    /// selection is left untouched.
    pub fn select(&mut self, index: usize) -> Result<Option<DetailRequest>> {
        let len = self.len();
        if index >= len {
            return Err(DashboardError::IndexOutOfRange { index, len });
        }
        if index == self.selected_index {
            return Ok(None);
        }

        self.selected_index = index;
        Ok(self.trigger())
    }

    fn trigger(&mut self) -> Option<DetailRequest> {
        let filings = self.filings.as_ref()?;
        let filing = filings.reports.get(self.selected_index)?;

        self.generation += 1;
        self.state = DetailState::begin();

        let request = DetailRequest {
            generation: self.generation,
            index: self.selected_index,
            key: filing.key(&filings.cik),
        };
        tracing::debug!(
            "Requesting details for {} (generation {})",
            request.key.accession,
            request.generation
        );
        Some(request)
    }

    /// Applies the outcome of `request` unless the selection has moved on since.
    pub fn complete(
        &mut self,
        request: &DetailRequest,
        result: Result<ReportDetail>,
    ) -> Completion {
        if !self.is_current(request) {
            tracing::debug!(
                "Dropping stale details for {} (generation {}, current {})",
                request.key.accession,
                request.generation,
                self.generation
            );
            return Completion::Stale;
        }

        self.state = match result {
            Ok(detail) => {
                tracing::info!("Loaded details for {}", request.key.accession);
                DetailState {
                    detail: Some(detail),
                    loading: false,
                    error: None,
                }
            }
            Err(err) => {
                tracing::warn!(
                    "Failed to load details for {}: {}",
                    request.key.accession,
                    err
                );
                DetailState {
                    detail: None,
                    loading: false,
                    error: Some(err.user_message()),
                }
            }
        };
        Completion::Applied
    }

    /// Whether `request` still describes the current selection.
    pub fn is_current(&self, request: &DetailRequest) -> bool {
        request.generation == self.generation
            && request.index == self.selected_index
            && self.selected().map(|f| f.accession.as_str()) == Some(request.key.accession.as_str())
    }

    pub fn filings(&self) -> Option<&FilingSet> {
        self.filings.as_ref()
    }

    pub fn reports(&self) -> &[Filing] {
        self.filings
            .as_ref()
            .map(|set| set.reports.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.reports().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn selected(&self) -> Option<&Filing> {
        self.reports().get(self.selected_index)
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            filings: self.filings.clone(),
            selected_index: self.selected_index,
            state: self.state.clone(),
        }
    }
}
