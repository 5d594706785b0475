//! # Enriched Invoice
//!
//! The canonical, front-consumable invoice record produced after detail
//! enrichment and field extraction. Every field except the identifier is
//! optional: a field whose source is absent in the provider payload stays
//! `None` and is never filled with a synthesized default.

use chrono::NaiveDate;
use serde::Serialize;

/// An invoice (boleto) normalized from the provider's detail payload.
///
/// `amount` is held in minor currency units (centavos). The display string
/// is derived from it and only from it, so the two are kept private and
/// updated together through [`EnrichedInvoice::set_amount`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedInvoice {
    pub id: String,
    /// Payer display name.
    pub name: Option<String>,
    /// Provider status vocabulary, verbatim (`OPEN`, `LATE`, `CANCELLED`, ...).
    pub status: Option<String>,
    pub due_date: Option<NaiveDate>,
    amount: Option<u64>,
    amount_display: Option<String>,
    pub pix_key: Option<String>,
    /// Full EMV/BR-Code copy-paste payload.
    pub pix_payload: Option<String>,
    pub barcode: Option<String>,
    pub digitable_line: Option<String>,
    pub pdf_url: Option<String>,
    pub payer_document: Option<String>,
}

impl EnrichedInvoice {
    /// Create a record with only the identifier set.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            status: None,
            due_date: None,
            amount: None,
            amount_display: None,
            pix_key: None,
            pix_payload: None,
            barcode: None,
            digitable_line: None,
            pdf_url: None,
            payer_document: None,
        }
    }

    /// Builder-style status setter.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Builder-style due date setter.
    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Builder-style amount setter.
    pub fn with_amount(mut self, amount: u64) -> Self {
        self.set_amount(Some(amount));
        self
    }

    /// Set (or clear) the amount, recomputing the display string.
    pub fn set_amount(&mut self, amount: Option<u64>) {
        self.amount = amount;
        self.amount_display = amount.map(format_brl);
    }

    /// Amount in minor units (centavos).
    pub fn amount(&self) -> Option<u64> {
        self.amount
    }

    /// Localized display string, e.g. `R$ 1.234,56`.
    pub fn amount_display(&self) -> Option<&str> {
        self.amount_display.as_deref()
    }
}

/// Format an amount in centavos as Brazilian reais: `R$ 1.234,56`.
pub fn format_brl(minor_units: u64) -> String {
    let reais = (minor_units / 100).to_string();
    let cents = minor_units % 100;

    let mut grouped = String::with_capacity(reais.len() + reais.len() / 3);
    for (i, ch) in reais.chars().enumerate() {
        if i > 0 && (reais.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("R$ {grouped},{cents:02}")
}
