#![allow(dead_code)]

use async_trait::async_trait;
use edgardash::{
    DashboardError, DocumentKey, FilingKey, FilingSet, LatestReport, ReportDetail,
    ReportsBackend, Result,
};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio::sync::Semaphore;

pub fn fixture_path(relative: impl AsRef<Path>) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(relative)
}

pub fn read_fixture(relative: impl AsRef<Path>) -> String {
    fs::read_to_string(fixture_path(relative)).expect("fixture file should be readable")
}

pub fn filing_set() -> FilingSet {
    serde_json::from_str(&read_fixture("reports.json")).unwrap()
}

pub fn report_detail() -> ReportDetail {
    serde_json::from_str(&read_fixture("report_details.json")).unwrap()
}

/// In-memory backend whose detail responses are held until released per accession.
///
/// Each `report_details` call takes one permit from its accession's gate, so a test
/// decides exactly which in-flight fetch finishes next.
#[derive(Default)]
pub struct GatedBackend {
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    failing: Mutex<HashMap<String, String>>,
    report_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl GatedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn gate(&self, accession: &str) -> Arc<Semaphore> {
        let mut gates = self.gates.lock().unwrap();
        Arc::clone(
            gates
                .entry(accession.to_string())
                .or_insert_with(|| Arc::new(Semaphore::new(0))),
        )
    }

    /// Lets `count` pending (or future) detail fetches for `accession` finish.
    pub fn release(&self, accession: &str, count: usize) {
        self.gate(accession).add_permits(count);
    }

    /// Makes detail fetches for `accession` fail with `message`.
    pub fn fail(&self, accession: &str, message: &str) {
        self.failing
            .lock()
            .unwrap()
            .insert(accession.to_string(), message.to_string());
    }

    pub fn report_calls(&self) -> usize {
        self.report_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReportsBackend for GatedBackend {
    async fn reports(&self, ticker: &str) -> Result<FilingSet> {
        self.report_calls.fetch_add(1, Ordering::SeqCst);
        if ticker == "AAPL" {
            Ok(filing_set())
        } else {
            Err(DashboardError::from_response_body(
                404,
                r#"{"detail":"Ticker not found"}"#,
            ))
        }
    }

    async fn report_details(&self, key: &FilingKey) -> Result<ReportDetail> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.gate(&key.accession);
        gate.acquire()
            .await
            .expect("gate semaphore is never closed")
            .forget();

        let failure = self.failing.lock().unwrap().get(&key.accession).cloned();
        if let Some(message) = failure {
            return Err(DashboardError::Request {
                status: 500,
                message,
            });
        }

        let mut detail = report_detail();
        detail.accession = Some(key.accession.clone());
        detail.mda_html = Some(format!("MD&A for {}", key.accession));
        Ok(detail)
    }

    async fn filing_document(&self, key: &DocumentKey) -> Result<Vec<u8>> {
        Ok(key.accession.clone().into_bytes())
    }

    async fn latest_report(&self, _ticker: &str) -> Result<LatestReport> {
        Err(DashboardError::InvalidResponse("not served".to_string()))
    }
}
