//! Ticker lookup state machine.
//!
//! ```text
//!         search()              ok
//!  Idle ───────────► Searching ─────► Ready(FilingSet)
//!   ▲                 ▲     │
//!   │                 │     └───────► Failed(message)
//!   └── any state ────┘  search()
//! ```
//!
//! A blank submission never reaches the backend; it moves straight to `Failed` with
//! a validation message. Like detail fetches, a lookup overtaken by a newer
//! submission is discarded when it completes.

use crate::error::{DashboardError, Result};
use crate::models::FilingSet;
use crate::selection::Completion;

/// Message for a blank ticker submission.
pub const EMPTY_TICKER_MESSAGE: &str = "Please enter a ticker symbol";

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SearchState {
    #[default]
    Idle,
    Searching { ticker: String },
    Ready(FilingSet),
    Failed(String),
}

impl SearchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SearchState::Searching { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SearchState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn filings(&self) -> Option<&FilingSet> {
        match self {
            SearchState::Ready(set) => Some(set),
            _ => None,
        }
    }
}

/// A lookup the caller must run and report back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub generation: u64,
    pub ticker: String,
}

#[derive(Debug, Default)]
pub struct SearchController {
    state: SearchState,
    generation: u64,
}

impl SearchController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a lookup for `text`, trimmed and uppercased.
    ///
    /// # Errors
    ///
    /// `DashboardError::Validation` if `text` is blank. The state becomes `Failed` and
    /// any previous lookup is invalidated; no request should be issued.
    pub fn search(&mut self, text: &str) -> Result<SearchRequest> {
        self.generation += 1;

        let ticker = text.trim().to_uppercase();
        if ticker.is_empty() {
            self.state = SearchState::Failed(EMPTY_TICKER_MESSAGE.to_string());
            return Err(DashboardError::Validation(EMPTY_TICKER_MESSAGE.to_string()));
        }

        tracing::debug!("Looking up reports for {}", ticker);
        self.state = SearchState::Searching {
            ticker: ticker.clone(),
        };

        Ok(SearchRequest {
            generation: self.generation,
            ticker,
        })
    }

    /// Applies a lookup outcome. On success the new filing set is returned so the
    /// caller can hand it to the selection controller.
    pub fn complete(
        &mut self,
        request: &SearchRequest,
        result: Result<FilingSet>,
    ) -> (Completion, Option<&FilingSet>) {
        if request.generation != self.generation {
            tracing::debug!("Dropping stale lookup for {}", request.ticker);
            return (Completion::Stale, None);
        }

        match result {
            Ok(filings) => {
                tracing::info!(
                    "Found {} reports for {}",
                    filings.reports.len(),
                    request.ticker
                );
                self.state = SearchState::Ready(filings);
            }
            Err(err) => {
                tracing::warn!("Lookup for {} failed: {}", request.ticker, err);
                self.state = SearchState::Failed(err.user_message());
            }
        }

        (Completion::Applied, self.state.filings())
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }
}
