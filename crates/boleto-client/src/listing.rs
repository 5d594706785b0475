//! # Paginated Invoice Listing
//!
//! Walks `GET /v2/invoices` for one payer until the provider runs out of
//! items. The date window is deliberately wide so the provider does no
//! date filtering at all; classification happens downstream on the full
//! history.
//!
//! The walk stops when a page comes back empty or when the number of items
//! received reaches the provider-reported `totalItems`. A fixed pause
//! separates pages to stay under the provider's rate limits.
//!
//! There is no partial success at this layer: if any page fails, the items
//! accumulated so far are dropped and the error propagates. An incomplete
//! list would silently produce a wrong overdue/next-due answer.

use std::sync::Arc;

use boleto_core::PayerDocument;
use serde::{Deserialize, Serialize};

use crate::error::InvoiceError;
use crate::transport::{get_json, AuthenticatedTransport};

/// Start of the date window sent to the list endpoint.
pub const WINDOW_START: &str = "2000-01-01";
/// End of the date window sent to the list endpoint.
pub const WINDOW_END: &str = "2099-12-31";

/// Minimal invoice record from the list endpoint.
///
/// Unknown fields are kept in `extra`; `deny_unknown_fields` is
/// intentionally not used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "dueDate")]
    pub due_date: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One page of the list endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePage {
    #[serde(default)]
    pub items: Vec<InvoiceSummary>,
    #[serde(default, alias = "total_items")]
    pub total_items: Option<u64>,
}

/// Fetches every invoice summary for a payer.
#[derive(Debug, Clone)]
pub struct InvoiceListFetcher {
    transport: Arc<AuthenticatedTransport>,
}

impl InvoiceListFetcher {
    pub fn new(transport: Arc<AuthenticatedTransport>) -> Self {
        Self { transport }
    }

    /// Request a single page (1-based).
    ///
    /// Calls `GET {base_url}/v2/invoices?page&perPage&start&end&<payer>`.
    pub async fn page(&self, payer: &PayerDocument, page: u32) -> Result<InvoicePage, InvoiceError> {
        let config = self.transport.config();
        let client = self.transport.client().await?;
        let token = self.transport.token().await?;

        let endpoint = format!("GET /v2/invoices?page={page}");
        let url = config.endpoint("v2/invoices");
        let query = [
            ("page", page.to_string()),
            ("perPage", config.page_size.to_string()),
            ("start", WINDOW_START.to_string()),
            ("end", WINDOW_END.to_string()),
            (config.payer_param.as_str(), payer.as_str().to_string()),
        ];

        get_json(client, &token, config.retry, &endpoint, &url, &query)
            .await
            .map_err(InvoiceError::UpstreamRequestFailed)
    }

    /// Walk every page for the payer and return all summaries.
    pub async fn fetch_all_summaries(
        &self,
        payer: &PayerDocument,
    ) -> Result<Vec<InvoiceSummary>, InvoiceError> {
        let config = self.transport.config();
        let mut summaries: Vec<InvoiceSummary> = Vec::new();
        let mut page = 1u32;

        loop {
            if page > config.max_pages {
                return Err(InvoiceError::PaginationLimitExceeded {
                    max_pages: config.max_pages,
                });
            }

            let body = self.page(payer, page).await?;
            let count = body.items.len();
            summaries.extend(body.items);

            tracing::debug!(
                page,
                count,
                received = summaries.len(),
                total = ?body.total_items,
                "fetched invoice page"
            );

            if count == 0 {
                break;
            }
            if body
                .total_items
                .is_some_and(|total| summaries.len() as u64 >= total)
            {
                break;
            }

            page += 1;
            tokio::time::sleep(config.pause).await;
        }

        tracing::info!(pages = page, invoices = summaries.len(), "invoice list complete");
        Ok(summaries)
    }
}
