//! # Lookup: overdue and next-due invoices for a payer
//!
//! ```bash
//! boleto lookup 123.456.789-09
//! boleto lookup 12345678909 --today 2024-02-01 --json
//! ```

use anyhow::{Context, Result};
use boleto_client::InvoiceClient;
use boleto_core::{ClassificationResult, PayerDocument};
use chrono::NaiveDate;
use clap::Args;

use crate::{render_invoice, render_payment_targets, EXIT_NOT_FOUND};

/// Lookup subcommand arguments.
#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Payer CPF or CNPJ, with or without punctuation.
    pub document: PayerDocument,

    /// Classification date (YYYY-MM-DD). Defaults to the local date.
    #[arg(long)]
    pub today: Option<NaiveDate>,

    /// Print the result as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Execute the lookup subcommand.
pub async fn run_lookup(args: &LookupArgs, client: &InvoiceClient) -> Result<u8> {
    let today = args
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    tracing::info!(payer = %args.document, %today, "looking up payer invoices");

    let result = client
        .classify_for_payer(&args.document, today)
        .await
        .with_context(|| format!("invoice lookup failed for payer {}", args.document))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_table(&result);
    }

    if result.is_empty() {
        return Ok(EXIT_NOT_FOUND);
    }
    Ok(0)
}

fn print_table(result: &ClassificationResult) {
    if result.is_empty() {
        println!("No open invoices.");
        return;
    }

    if let Some(next) = &result.next_due {
        if result.next_due_is_overdue() {
            println!("Next due (already overdue):");
        } else {
            println!("Next due:");
        }
        println!("  {}", render_invoice(next));
        for line in render_payment_targets(next) {
            println!("{line}");
        }
    }

    if !result.overdue.is_empty() {
        println!();
        println!("Overdue ({}):", result.overdue.len());
        for invoice in &result.overdue {
            println!("  {}", render_invoice(invoice));
        }
    }
}
