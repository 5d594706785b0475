//! # boleto-cli: Operator CLI for the boleto lookup engine
//!
//! Provides the `boleto` command-line interface on top of
//! [`boleto_client::InvoiceClient`]. Provider settings and credentials are
//! read from `BOLETO_*` environment variables.
//!
//! ## Subcommands
//!
//! - `boleto lookup`: overdue invoices and next due invoice for a payer.
//! - `boleto invoice`: a single invoice by provider identifier.
//!
//! ```bash
//! boleto lookup 123.456.789-09
//! boleto lookup 11222333000181 --today 2024-02-01 --json
//! boleto invoice inv_8f2a
//! ```
//!
//! ## Exit codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Configuration, credential or provider failure |
//! | 3 | Nothing found (no payable invoice, or unknown invoice id) |

pub mod invoice;
pub mod lookup;

use boleto_core::EnrichedInvoice;

/// Exit code when the query succeeded but matched nothing.
pub const EXIT_NOT_FOUND: u8 = 3;

/// One-line human summary of an invoice.
pub fn render_invoice(invoice: &EnrichedInvoice) -> String {
    let due = invoice
        .due_date
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "-".into());
    let mut line = format!(
        "{:<24} {:<10} {:<10} {:>16}",
        invoice.id,
        invoice.status.as_deref().unwrap_or("-"),
        due,
        invoice.amount_display().unwrap_or("-"),
    );
    if let Some(name) = &invoice.name {
        line.push_str("  ");
        line.push_str(name);
    }
    line
}

/// Payment targets of an invoice, one per line, indented.
pub fn render_payment_targets(invoice: &EnrichedInvoice) -> Vec<String> {
    let targets = [
        ("pix key", invoice.pix_key.as_deref()),
        ("pix copy-paste", invoice.pix_payload.as_deref()),
        ("digitable line", invoice.digitable_line.as_deref()),
        ("barcode", invoice.barcode.as_deref()),
        ("pdf", invoice.pdf_url.as_deref()),
    ];
    targets
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| format!("    {label:<15} {v}")))
        .collect()
}
