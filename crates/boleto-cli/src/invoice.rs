//! # Invoice: fetch a single invoice by provider identifier

use anyhow::{Context, Result};
use boleto_client::InvoiceClient;
use clap::Args;

use crate::{render_invoice, render_payment_targets, EXIT_NOT_FOUND};

/// Invoice subcommand arguments.
#[derive(Args, Debug)]
pub struct InvoiceArgs {
    /// Provider invoice identifier.
    pub id: String,

    /// Print the invoice as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the invoice subcommand.
pub async fn run_invoice(args: &InvoiceArgs, client: &InvoiceClient) -> Result<u8> {
    let invoice = client
        .invoice(&args.id)
        .await
        .with_context(|| format!("failed to fetch invoice {}", args.id))?;

    let Some(invoice) = invoice else {
        eprintln!("Invoice {} not found.", args.id);
        return Ok(EXIT_NOT_FOUND);
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&invoice)?);
    } else {
        println!("{}", render_invoice(&invoice));
        for line in render_payment_targets(&invoice) {
            println!("{line}");
        }
    }
    Ok(0)
}
