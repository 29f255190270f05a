//! Terminal rendition of the filings dashboard
//!
//! Looks up a ticker against a running dashboard backend, selects a filing and prints
//! its header, key metrics, statements and chart data the way the web view lays them out.
//!
//! Run with: `cargo run --example dashboard -- --ticker AAPL --index 1`
//!
//! The backend location comes from `EDGARDASH_BASE_URL` (default `http://127.0.0.1:8000`).

use clap::Parser;
use edgardash::format::format_axis_billions;
use edgardash::metrics::{self, MetricsView, NET_INCOME_SERIES, REVENUE_SERIES};
use edgardash::statements::{NO_STATEMENT_DATA, STATEMENT_FOOTNOTE, StatementTable};
use edgardash::{
    Dashboard, DashboardConfig, DetailView, MetricsPanel, StatementKind, StatementPanel, ViewMode,
};
use std::error::Error;
use tracing_subscriber::{EnvFilter, fmt};

/// Browse recent SEC filings for a company
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Ticker symbol of the company
    #[arg(short, long)]
    ticker: String,

    /// Which filing to open, 0 being the most recent
    #[arg(short, long)]
    index: Option<usize>,

    /// Write the filing's primary document to the current directory
    #[arg(short, long)]
    download: bool,
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    setup_logging();
    let args = Args::parse();

    let mut dashboard = Dashboard::connect(DashboardConfig::from_env()?)?;
    dashboard.submit_search(&args.ticker)?;
    dashboard.settle().await;

    if let Some(index) = args.index {
        dashboard.select_report(index)?;
        dashboard.settle().await;
    }

    let snapshot = dashboard.snapshot();
    if let Some(error) = snapshot.search.error() {
        eprintln!("{}", error);
        return Ok(());
    }

    let Some(filings) = snapshot.search.filings() else {
        return Ok(());
    };

    println!("=== {} (CIK {}) ===\n", filings.ticker, filings.cik);
    for (i, filing) in filings.reports.iter().enumerate() {
        let marker = if i == snapshot.selection.selected_index { ">" } else { " " };
        println!("{} [{}] {} {}", marker, i, filing.form, filing.filing_date);
    }

    let Some(filing) = snapshot.selection.selected() else {
        println!("\nNo filings found.");
        return Ok(());
    };
    println!("\n{}", filing.title(&filings.ticker));
    println!("{}\n", filing.subtitle());

    let detail = match snapshot.selection.state.view() {
        DetailView::Ready(detail) => detail,
        DetailView::Failed(error) => {
            eprintln!("{}", error);
            return Ok(());
        }
        DetailView::Loading | DetailView::Empty => return Ok(()),
    };

    println!("--- Key metrics ---");
    let mut panel = MetricsPanel::new();
    if let MetricsView::Table(rows) = panel.view(&detail.metrics) {
        for row in rows {
            let unit = row.unit.map(|u| format!(" {}", u)).unwrap_or_default();
            println!("{:<24} {:>12}{}", row.label, row.latest, unit);
            for line in row.history {
                println!("    {}", line);
            }
        }
    }

    panel.set_mode(ViewMode::Chart);
    if let MetricsView::Chart(rows) = panel.view(&detail.metrics) {
        println!("\n--- {} vs. {} ---", REVENUE_SERIES, NET_INCOME_SERIES);
        for row in rows {
            let show = |series| {
                row.value(series)
                    .map(format_axis_billions)
                    .unwrap_or_else(|| "-".to_string())
            };
            println!(
                "{}  {:>8}  {:>8}",
                row.name,
                show(REVENUE_SERIES),
                show(NET_INCOME_SERIES)
            );
        }
    }

    let mut statements = StatementPanel::new();
    for kind in StatementKind::ALL {
        statements.set_active(kind);
        println!("\n--- {} ---", kind.label());
        match statements.table(detail.statements.as_ref()) {
            StatementTable::Empty => println!("{}", NO_STATEMENT_DATA),
            StatementTable::Rows(rows) => {
                for row in rows {
                    println!("{:<32} {:>12}", row.label, row.value);
                }
            }
        }
    }
    println!("\n{}", STATEMENT_FOOTNOTE);

    println!("\n--- MD&A ---");
    println!("{}", metrics::narrative(detail.mda_html.as_deref()));

    if args.download {
        let document = dashboard.download_filing().await?;
        std::fs::write(&document.file_name, &document.bytes)?;
        println!("\nSaved {} ({} bytes)", document.file_name, document.bytes.len());
    }

    Ok(())
}
