//! # Payer Document Newtype
//!
//! Brazilian taxpayer identifiers used to filter the provider's invoice list.
//! The canonical form is digits only. The constructor accepts the common
//! punctuated renderings:
//! - `"12345678909"` / `"123.456.789-09"` (CPF, 11 digits)
//! - `"11222333000181"` / `"11.222.333/0001-81"` (CNPJ, 14 digits)
//!
//! Check digits are NOT verified here; that belongs to the request layer
//! that accepts the document from the outside world.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A CPF or CNPJ in canonical digits-only form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PayerDocument(String);

impl<'de> Deserialize<'de> for PayerDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl PayerDocument {
    /// Create a payer document, stripping `.`, `-`, `/` and whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPayerDocument`] if anything other
    /// than digits remains, or the digit count is neither 11 nor 14.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let digits: String = raw
            .chars()
            .filter(|c| !matches!(c, '.' | '-' | '/') && !c.is_whitespace())
            .collect();
        if !digits.chars().all(|c| c.is_ascii_digit()) || !matches!(digits.len(), 11 | 14) {
            return Err(ValidationError::InvalidPayerDocument(raw));
        }
        Ok(Self(digits))
    }

    /// Access the digits-only value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for an 11-digit individual (CPF) document.
    pub fn is_cpf(&self) -> bool {
        self.0.len() == 11
    }
}

impl std::fmt::Display for PayerDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PayerDocument {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
