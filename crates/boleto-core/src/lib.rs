//! # boleto-core: Domain types for the boleto lookup engine
//!
//! Pure, I/O-free building blocks shared by the provider client and the
//! operator CLI:
//!
//! - [`PayerDocument`]: digits-only CPF/CNPJ used as the payer filter.
//! - [`EnrichedInvoice`]: the canonical, front-consumable invoice record.
//! - [`classify`]: partitions invoices into overdue vs. upcoming relative to
//!   a calendar date and selects the single "next due" invoice.
//!
//! Nothing in this crate talks to the network. Everything provider-shaped
//! (raw JSON payloads, tokens, TLS material) lives in `boleto-client`.

pub mod classify;
pub mod document;
pub mod error;
pub mod invoice;

pub use classify::{classify, ClassificationResult};
pub use document::PayerDocument;
pub use error::ValidationError;
pub use invoice::{format_brl, EnrichedInvoice};
