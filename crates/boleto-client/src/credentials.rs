//! # Credential Material Resolution
//!
//! Produces the client certificate and private key used for mutual TLS.
//! Each material kind has two possible sources, tried in order:
//!
//! 1. A file `{dir}/{file_name}` when a directory is configured. Read
//!    failures are logged and fall through; they are never fatal on their own.
//! 2. A literal value, usually injected through an environment variable by
//!    a secret manager. Literals arrive in several shapes and are normalized:
//!    - surrounding whitespace is trimmed, and one layer of matching quotes
//!      is stripped;
//!    - PEM text is returned as-is, with `\n` escape sequences turned into
//!      real newlines and a single trailing newline;
//!    - otherwise, a string made only of base64 alphabet characters is
//!      decoded (raw bytes are kept if decoding fails);
//!    - anything else is returned as raw UTF-8.
//!
//! The outcome is identical bytes for a PEM file, a PEM literal, a quoted
//! PEM literal, an escaped-newline PEM literal and a base64-encoded PEM.

use std::path::{Path, PathBuf};

use base64::Engine as _;
use zeroize::Zeroizing;

use crate::error::InvoiceError;

const PEM_HEADER: &str = "-----BEGIN";

/// Which piece of TLS client material is being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    Certificate,
    PrivateKey,
}

impl std::fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Certificate => write!(f, "certificate"),
            Self::PrivateKey => write!(f, "private key"),
        }
    }
}

/// Where resolved material came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    File,
    EnvironmentLiteral,
    EnvironmentBase64,
}

/// Resolved certificate or key bytes.
pub struct CredentialMaterial {
    pub kind: MaterialKind,
    pub provenance: Provenance,
    pub bytes: Zeroizing<Vec<u8>>,
}

impl std::fmt::Debug for CredentialMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialMaterial")
            .field("kind", &self.kind)
            .field("provenance", &self.provenance)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Configured sources for one material kind.
#[derive(Clone, Default)]
pub struct CredentialSource {
    /// Base directory holding the file. `None` disables the file source.
    pub dir: Option<PathBuf>,
    pub file_name: String,
    /// Literal content, typically environment-sourced.
    pub literal: Option<Zeroizing<String>>,
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSource")
            .field("dir", &self.dir)
            .field("file_name", &self.file_name)
            .field("literal", &self.literal.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl CredentialSource {
    /// A source backed only by a file.
    pub fn file(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            dir: Some(dir.into()),
            file_name: file_name.into(),
            literal: None,
        }
    }

    /// A source backed only by a literal value.
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            dir: None,
            file_name: String::new(),
            literal: Some(Zeroizing::new(value.into())),
        }
    }

    /// At least one of the two sources is set.
    pub fn is_configured(&self) -> bool {
        self.dir.is_some() || self.literal.as_ref().is_some_and(|l| !l.trim().is_empty())
    }

    /// Resolve the material, file first, literal second.
    pub fn resolve(&self, kind: MaterialKind) -> Result<CredentialMaterial, InvoiceError> {
        if let Some(dir) = &self.dir {
            let path = dir.join(&self.file_name);
            if let Some(bytes) = read_file(&path, kind) {
                tracing::debug!(%kind, path = %path.display(), "loaded credential from file");
                return Ok(CredentialMaterial {
                    kind,
                    provenance: Provenance::File,
                    bytes,
                });
            }
        }

        if let Some(literal) = &self.literal {
            if let Some((bytes, provenance)) = normalize_literal(literal) {
                tracing::debug!(%kind, ?provenance, "loaded credential from environment");
                return Ok(CredentialMaterial {
                    kind,
                    provenance,
                    bytes,
                });
            }
        }

        Err(InvoiceError::CredentialUnavailable {
            kind,
            reason: "neither the file nor the literal source yielded content".into(),
        })
    }
}

fn read_file(path: &Path, kind: MaterialKind) -> Option<Zeroizing<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(bytes) if !bytes.is_empty() => Some(Zeroizing::new(bytes)),
        Ok(_) => {
            tracing::warn!(%kind, path = %path.display(), "credential file is empty, falling back");
            None
        }
        Err(e) => {
            tracing::warn!(%kind, path = %path.display(), "failed to read credential file, falling back: {e}");
            None
        }
    }
}

/// Normalize a literal credential value. `None` when nothing is left after
/// trimming.
fn normalize_literal(raw: &str) -> Option<(Zeroizing<Vec<u8>>, Provenance)> {
    let value = strip_quotes(raw.trim()).trim();
    if value.is_empty() {
        return None;
    }

    if value.contains(PEM_HEADER) {
        let mut pem = value.replace("\\r\\n", "\n").replace("\\n", "\n");
        if !pem.ends_with('\n') {
            pem.push('\n');
        }
        return Some((Zeroizing::new(pem.into_bytes()), Provenance::EnvironmentLiteral));
    }

    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.chars().all(is_base64_char) {
        match base64::engine::general_purpose::STANDARD.decode(&compact) {
            Ok(decoded) => return Some((Zeroizing::new(decoded), Provenance::EnvironmentBase64)),
            Err(e) => {
                tracing::debug!("credential literal looked like base64 but did not decode: {e}");
            }
        }
    }

    Some((
        Zeroizing::new(value.as_bytes().to_vec()),
        Provenance::EnvironmentLiteral,
    ))
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')
}
