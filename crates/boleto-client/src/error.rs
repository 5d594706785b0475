//! Error types for the provider client.
//!
//! Two layers:
//! - [`ProviderError`]: what went wrong on the wire for one call, labelled
//!   with the endpoint.
//! - [`InvoiceError`]: what that means for the caller (authentication,
//!   list phase, per-item detail fetch, configuration).

use std::time::Duration;

use crate::config::ConfigError;
use crate::credentials::MaterialKind;

/// Errors from a single provider HTTP call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Provider returned a non-2xx status.
    #[error("provider {endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Explicit deadline elapsed before the call completed.
    #[error("{endpoint} timed out after {elapsed:?}")]
    Timeout { endpoint: String, elapsed: Duration },
}

impl ProviderError {
    /// HTTP status returned by the provider, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http { source, .. } | Self::Deserialization { source, .. } => {
                source.status().map(|s| s.as_u16())
            }
            Self::Timeout { .. } => None,
        }
    }

    /// Response body returned by the provider, when there was one.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Api { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Errors surfaced by the invoice lookup engine.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceError {
    /// No usable certificate or private key could be produced.
    #[error("client {kind} unavailable: {reason}")]
    CredentialUnavailable { kind: MaterialKind, reason: String },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// The mutual-TLS transport could not be built.
    #[error("failed to build TLS transport: {0}")]
    Transport(String),
    /// Token endpoint rejected the credentials or was unreachable.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(#[source] ProviderError),
    /// A list page request failed; the whole fetch is abandoned.
    #[error("invoice list request failed: {0}")]
    UpstreamRequestFailed(#[source] ProviderError),
    /// The provider kept returning full pages past the configured limit.
    #[error("invoice list exceeded {max_pages} pages without reaching the reported total")]
    PaginationLimitExceeded { max_pages: u32 },
    /// Detail fetch failed for a single invoice.
    #[error("detail fetch for invoice {id} failed: {source}")]
    DetailFetchFailed {
        id: String,
        #[source]
        source: ProviderError,
    },
}
