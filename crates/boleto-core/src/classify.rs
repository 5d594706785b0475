//! # Overdue / Next-Due Classification
//!
//! Partitions a payer's invoices relative to a calendar date:
//!
//! 1. Only invoices with status `open` or `late` (case-insensitive) take part.
//!    `cancelled`, `paid`, and any status the provider adds later are dropped
//!    from both outputs.
//! 2. Comparison is by date only. Time-of-day never participates because
//!    [`EnrichedInvoice::due_date`] is a [`NaiveDate`].
//! 3. `overdue` = due strictly before `today`; `upcoming` = due on or after.
//! 4. Both partitions are stably sorted ascending by due date.
//! 5. `next_due` = earliest upcoming, or, when nothing is upcoming, the
//!    earliest overdue invoice.
//!
//! Invoices without a due date cannot be placed on either side and are
//! skipped.

use chrono::NaiveDate;
use serde::Serialize;

use crate::invoice::EnrichedInvoice;

/// Statuses that represent an amount still owed.
const PAYABLE_STATUSES: [&str; 2] = ["open", "late"];

/// Result of [`classify`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    /// Payable invoices due before the classification date, ascending.
    pub overdue: Vec<EnrichedInvoice>,
    /// The earliest upcoming invoice, or the earliest overdue one when
    /// nothing is upcoming.
    pub next_due: Option<EnrichedInvoice>,
}

impl ClassificationResult {
    /// True when no payable invoice was found at all.
    pub fn is_empty(&self) -> bool {
        self.overdue.is_empty() && self.next_due.is_none()
    }

    /// True when `next_due` is a stand-in taken from `overdue` because no
    /// invoice is upcoming.
    pub fn next_due_is_overdue(&self) -> bool {
        match &self.next_due {
            Some(next) => self.overdue.first().is_some_and(|first| first.id == next.id),
            None => false,
        }
    }
}

/// Whether an invoice status counts as payable.
pub fn is_payable_status(status: &str) -> bool {
    let status = status.trim().to_ascii_lowercase();
    PAYABLE_STATUSES.contains(&status.as_str())
}

/// Classify invoices relative to `today`.
pub fn classify(invoices: Vec<EnrichedInvoice>, today: NaiveDate) -> ClassificationResult {
    let mut overdue: Vec<(NaiveDate, EnrichedInvoice)> = Vec::new();
    let mut upcoming: Vec<(NaiveDate, EnrichedInvoice)> = Vec::new();

    for invoice in invoices {
        if !invoice.status.as_deref().is_some_and(is_payable_status) {
            continue;
        }
        let Some(due) = invoice.due_date else {
            tracing::debug!(invoice_id = %invoice.id, "payable invoice has no due date, skipping");
            continue;
        };
        if due < today {
            overdue.push((due, invoice));
        } else {
            upcoming.push((due, invoice));
        }
    }

    // `sort_by_key` is stable: equal dates keep provider order.
    overdue.sort_by_key(|(due, _)| *due);
    upcoming.sort_by_key(|(due, _)| *due);

    let overdue: Vec<EnrichedInvoice> = overdue.into_iter().map(|(_, inv)| inv).collect();
    let next_due = upcoming
        .into_iter()
        .next()
        .map(|(_, inv)| inv)
        .or_else(|| overdue.first().cloned());

    ClassificationResult { overdue, next_due }
}
