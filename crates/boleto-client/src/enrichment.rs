//! # Detail Enrichment
//!
//! Fetches `GET /v2/invoices/{id}` for every summary from the list phase and
//! formats each detail into an [`EnrichedInvoice`].
//!
//! Summaries are processed in fixed-size batches. Requests inside a batch
//! run concurrently and are awaited together; batches run one after another
//! with a fixed pause in between. Each request resolves to a
//! [`DetailOutcome`] value rather than an early-returning error, so one
//! failing invoice never cancels its siblings or later batches. Failed
//! invoices are left out of the result and reported as warnings.
//!
//! Only a token failure escalates, since without a token no detail can be
//! fetched at all.

use std::sync::Arc;

use boleto_core::EnrichedInvoice;
use futures::future::join_all;
use serde_json::Value;

use crate::error::{InvoiceError, ProviderError};
use crate::extract::format_invoice;
use crate::listing::InvoiceSummary;
use crate::transport::{get_json, AuthenticatedTransport};

/// Result of one detail request.
#[derive(Debug)]
pub enum DetailOutcome {
    Fetched { id: String, detail: Value },
    Failed { id: String, error: ProviderError },
}

impl DetailOutcome {
    pub fn id(&self) -> &str {
        match self {
            Self::Fetched { id, .. } | Self::Failed { id, .. } => id,
        }
    }
}

/// An invoice left out of the result because its detail was unavailable.
#[derive(Debug)]
pub struct DetailFailure {
    pub id: String,
    pub error: ProviderError,
}

impl From<DetailFailure> for InvoiceError {
    fn from(failure: DetailFailure) -> Self {
        InvoiceError::DetailFetchFailed {
            id: failure.id,
            source: failure.error,
        }
    }
}

/// Enriched invoices plus the invoices whose detail could not be fetched.
#[derive(Debug, Default)]
pub struct EnrichmentReport {
    pub invoices: Vec<EnrichedInvoice>,
    pub failures: Vec<DetailFailure>,
}

impl EnrichmentReport {
    /// Identifiers of invoices that were skipped, in summary order.
    pub fn failed_ids(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.id.as_str()).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Batched, failure-tolerant detail fetcher.
#[derive(Debug, Clone)]
pub struct DetailEnricher {
    transport: Arc<AuthenticatedTransport>,
}

impl DetailEnricher {
    pub fn new(transport: Arc<AuthenticatedTransport>) -> Self {
        Self { transport }
    }

    /// Fetch one invoice detail payload.
    ///
    /// Calls `GET {base_url}/v2/invoices/{id}`.
    pub async fn fetch_detail(&self, id: &str) -> Result<Value, InvoiceError> {
        let client = self.transport.client().await?;
        let token = self.transport.token().await?;
        let url = self.transport.config().invoice_url(id);

        let endpoint = format!("GET /v2/invoices/{id}");
        get_json(client, &token, self.transport.config().retry, &endpoint, &url, &[])
            .await
            .map_err(|source| InvoiceError::DetailFetchFailed {
                id: id.to_string(),
                source,
            })
    }

    /// Fetch details for every summary, batch by batch.
    pub async fn fetch_details(
        &self,
        summaries: &[InvoiceSummary],
    ) -> Result<Vec<DetailOutcome>, InvoiceError> {
        let config = self.transport.config();
        let mut outcomes = Vec::with_capacity(summaries.len());

        for (index, batch) in summaries.chunks(config.detail_batch_size).enumerate() {
            if index > 0 {
                tokio::time::sleep(config.pause).await;
            }

            let client = self.transport.client().await?;
            let token = self.transport.token().await?;
            let token = token.as_str();

            let requests = batch.iter().map(|summary| async move {
                let id = summary.id.clone();
                let url = config.invoice_url(&id);
                let endpoint = format!("GET /v2/invoices/{id}");
                match get_json::<Value>(client, token, config.retry, &endpoint, &url, &[]).await {
                    Ok(detail) => DetailOutcome::Fetched { id, detail },
                    Err(error) => DetailOutcome::Failed { id, error },
                }
            });

            let batch_outcomes = join_all(requests).await;
            tracing::debug!(
                batch = index + 1,
                size = batch.len(),
                failed = batch_outcomes
                    .iter()
                    .filter(|o| matches!(o, DetailOutcome::Failed { .. }))
                    .count(),
                "detail batch complete"
            );
            outcomes.extend(batch_outcomes);
        }

        Ok(outcomes)
    }

    /// Fetch and format every summary; failures are collected, not raised.
    pub async fn enrich(&self, summaries: &[InvoiceSummary]) -> Result<EnrichmentReport, InvoiceError> {
        let outcomes = self.fetch_details(summaries).await?;
        let mut report = EnrichmentReport::default();

        for outcome in outcomes {
            match outcome {
                DetailOutcome::Fetched { id, detail } => {
                    report.invoices.push(format_invoice(&id, &detail));
                }
                DetailOutcome::Failed { id, error } => {
                    tracing::warn!(invoice_id = %id, "skipping invoice, detail unavailable: {error}");
                    report.failures.push(DetailFailure { id, error });
                }
            }
        }

        if report.invoices.is_empty() && !report.failures.is_empty() {
            tracing::warn!(
                failed = report.failures.len(),
                "no invoice detail could be fetched"
            );
        }
        Ok(report)
    }
}
