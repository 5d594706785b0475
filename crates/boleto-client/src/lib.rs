//! # boleto-client: Invoice retrieval and classification engine
//!
//! Retrieves a payer's invoices (boletos) from the payment provider and
//! classifies them as overdue or upcoming:
//!
//! 1. [`credentials`] resolves the mutual-TLS certificate and key from files
//!    or environment-sourced literals.
//! 2. [`transport`] owns the mutual-TLS client and the cached bearer token.
//! 3. [`listing`] walks the paged invoice list for the payer.
//! 4. [`enrichment`] fetches every invoice's detail in concurrent batches,
//!    tolerating per-invoice failures.
//! 5. [`extract`] derives pix, boleto and amount fields from the
//!    variably-shaped detail payload.
//! 6. [`boleto_core::classify`] selects the overdue list and the next due
//!    invoice.
//!
//! ## Provider Endpoints
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST   | `/token` | Client-credentials grant (mutual TLS) |
//! | GET    | `/v2/invoices` | Paged list filtered by payer document |
//! | GET    | `/v2/invoices/{id}` | Invoice detail |

pub mod config;
pub mod credentials;
pub mod enrichment;
pub mod error;
pub mod extract;
pub mod listing;
mod retry;
pub mod transport;

pub use config::{ConfigError, PayerParam, ProviderConfig};
pub use credentials::{CredentialSource, MaterialKind};
pub use enrichment::{DetailFailure, EnrichmentReport};
pub use error::{InvoiceError, ProviderError};
pub use retry::RetryPolicy;

use std::sync::Arc;

use boleto_core::{classify, ClassificationResult, EnrichedInvoice, PayerDocument};
use chrono::NaiveDate;

use enrichment::DetailEnricher;
use listing::InvoiceListFetcher;
use transport::AuthenticatedTransport;

/// Entry point for the calling layer.
///
/// Cheap to share behind an `Arc`; the TLS client and token cache inside
/// are process-wide state shared by every call.
#[derive(Debug)]
pub struct InvoiceClient {
    transport: Arc<AuthenticatedTransport>,
    listing: InvoiceListFetcher,
    enrichment: DetailEnricher,
}

impl InvoiceClient {
    /// Create a client from configuration.
    ///
    /// Fails when a credential kind has no configured source at all. The
    /// TLS transport itself is built lazily on the first request.
    pub fn new(config: ProviderConfig) -> Result<Self, InvoiceError> {
        config.validate()?;
        let transport = Arc::new(AuthenticatedTransport::new(Arc::new(config)));
        Ok(Self {
            listing: InvoiceListFetcher::new(transport.clone()),
            enrichment: DetailEnricher::new(transport.clone()),
            transport,
        })
    }

    pub fn transport(&self) -> &AuthenticatedTransport {
        &self.transport
    }

    pub fn listing(&self) -> &InvoiceListFetcher {
        &self.listing
    }

    pub fn enrichment(&self) -> &DetailEnricher {
        &self.enrichment
    }

    /// List and enrich every invoice of the payer.
    ///
    /// List failures propagate; per-invoice detail failures are reported in
    /// [`EnrichmentReport::failures`].
    pub async fn enrich_for_payer(
        &self,
        payer: &PayerDocument,
    ) -> Result<EnrichmentReport, InvoiceError> {
        let summaries = self.listing.fetch_all_summaries(payer).await?;
        if summaries.is_empty() {
            return Ok(EnrichmentReport::default());
        }
        self.enrichment.enrich(&summaries).await
    }

    /// Overdue invoices and the next due invoice for the payer, relative to
    /// `today`.
    pub async fn classify_for_payer(
        &self,
        payer: &PayerDocument,
        today: NaiveDate,
    ) -> Result<ClassificationResult, InvoiceError> {
        let report = self.enrich_for_payer(payer).await?;
        let result = classify(report.invoices, today);
        tracing::info!(
            overdue = result.overdue.len(),
            has_next_due = result.next_due.is_some(),
            skipped = report.failures.len(),
            "classified payer invoices"
        );
        Ok(result)
    }

    /// Look up a single invoice by identifier, bounded by the configured
    /// lookup timeout. A 404 from the provider yields `Ok(None)`.
    pub async fn invoice(&self, id: &str) -> Result<Option<EnrichedInvoice>, InvoiceError> {
        let deadline = self.transport.config().lookup_timeout;
        match tokio::time::timeout(deadline, self.enrichment.fetch_detail(id)).await {
            Err(_) => Err(InvoiceError::DetailFetchFailed {
                id: id.to_string(),
                source: ProviderError::Timeout {
                    endpoint: format!("GET /v2/invoices/{id}"),
                    elapsed: deadline,
                },
            }),
            Ok(Err(InvoiceError::DetailFetchFailed { source, .. })) if source.status() == Some(404) => {
                Ok(None)
            }
            Ok(Err(e)) => Err(e),
            Ok(Ok(detail)) => Ok(Some(extract::format_invoice(id, &detail))),
        }
    }
}
