//! Validation errors for domain newtypes.

use thiserror::Error;

/// Rejected input while constructing a domain value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Payer document is not 11 (CPF) or 14 (CNPJ) digits after
    /// stripping punctuation.
    #[error("invalid payer document {0:?}: expected 11 (CPF) or 14 (CNPJ) digits")]
    InvalidPayerDocument(String),
}
