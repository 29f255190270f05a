//! Standardized financial statement views.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::format::format_value;
use crate::models::{StatementLineItem, StatementSet};

/// Text shown when the selected statement has no line items.
pub const NO_STATEMENT_DATA: &str = "No data available for this statement.";

/// Footnote shown under every statement table.
pub const STATEMENT_FOOTNOTE: &str =
    "* Standardized view based on common US-GAAP tags. Some line items may be missing.";

/// The three standardized statements the backend builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    #[default]
    Income,
    Balance,
    CashFlow,
}

impl StatementKind {
    /// Tab order.
    pub const ALL: [StatementKind; 3] = [
        StatementKind::Income,
        StatementKind::Balance,
        StatementKind::CashFlow,
    ];

    /// Key used by the backend's `statements` object.
    pub fn id(self) -> &'static str {
        match self {
            StatementKind::Income => "income",
            StatementKind::Balance => "balance",
            StatementKind::CashFlow => "cash_flow",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatementKind::Income => "Income Statement",
            StatementKind::Balance => "Balance Sheet",
            StatementKind::CashFlow => "Cash Flow",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Line items of one statement; empty when the statement or the whole set is missing.
pub fn select(statements: Option<&StatementSet>, kind: StatementKind) -> &[StatementLineItem] {
    statements
        .and_then(|s| s.get(kind.id()))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// A formatted table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementRow {
    pub label: String,
    pub value: String,
}

/// What a statement panel shows for its active tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementTable {
    /// The statement exists in the response but carries no line items, or is absent.
    Empty,
    Rows(Vec<StatementRow>),
}

impl StatementTable {
    pub fn is_empty(&self) -> bool {
        matches!(self, StatementTable::Empty)
    }
}

/// Statement panel with its own tab selection.
#[derive(Debug, Clone, Default)]
pub struct StatementPanel {
    active: StatementKind,
}

impl StatementPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> StatementKind {
        self.active
    }

    pub fn set_active(&mut self, kind: StatementKind) {
        self.active = kind;
    }

    /// Tabs as `(kind, label, is_active)`.
    pub fn tabs(&self) -> Vec<(StatementKind, &'static str, bool)> {
        StatementKind::ALL
            .iter()
            .map(|&kind| (kind, kind.label(), kind == self.active))
            .collect()
    }

    /// Formats the active statement for display.
    pub fn table(&self, statements: Option<&StatementSet>) -> StatementTable {
        let items = select(statements, self.active);
        if items.is_empty() {
            return StatementTable::Empty;
        }

        StatementTable::Rows(
            items
                .iter()
                .map(|item| StatementRow {
                    label: item.label.clone(),
                    value: format_value(item.value, item.unit.as_deref()),
                })
                .collect(),
        )
    }
}
