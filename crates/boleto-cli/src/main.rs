//! # boleto CLI entry point
//!
//! Parses command-line arguments, loads the provider configuration from the
//! environment, and dispatches to subcommand handlers.

use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use boleto_cli::invoice::{run_invoice, InvoiceArgs};
use boleto_cli::lookup::{run_lookup, LookupArgs};
use boleto_client::{InvoiceClient, ProviderConfig};

/// Boleto lookup CLI
///
/// Retrieves a payer's invoices from the payment provider over mutual TLS
/// and reports overdue invoices and the next one due.
#[derive(Parser, Debug)]
#[command(name = "boleto", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Overdue invoices and the next due invoice for a payer document.
    Lookup(LookupArgs),

    /// Fetch a single invoice by identifier.
    Invoice(InvoiceArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<u8> {
    let config = ProviderConfig::from_env().context("failed to load provider configuration")?;
    tracing::debug!(?config, "loaded provider configuration");
    let client = InvoiceClient::new(config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(async {
        match &cli.command {
            Commands::Lookup(args) => run_lookup(args, &client).await,
            Commands::Invoice(args) => run_invoice(args, &client).await,
        }
    })
}
