//! Provider client configuration.
//!
//! Every value is environment-sourced in production (see
//! [`ProviderConfig::from_env`]) or built explicitly for tests. Secrets
//! (private key passphrase, literal key material) are held in
//! [`Zeroizing`] buffers and redacted from `Debug` output.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;
use zeroize::Zeroizing;

use crate::credentials::{CredentialSource, MaterialKind};
use crate::retry::RetryPolicy;

/// Query parameter the list endpoint uses to filter by payer document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayerParam {
    /// `customer_document=<digits>`
    CustomerDocument,
    /// `search=<digits>`
    Search,
}

impl PayerParam {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CustomerDocument => "customer_document",
            Self::Search => "search",
        }
    }
}

impl std::str::FromStr for PayerParam {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "customer_document" => Ok(Self::CustomerDocument),
            "search" => Ok(Self::Search),
            other => Err(ConfigError::InvalidValue(
                "BOLETO_PAYER_PARAM".into(),
                other.to_string(),
            )),
        }
    }
}

/// Configuration for the invoice provider integration.
///
/// Custom `Debug` implementation redacts the passphrase and literal
/// credential material.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Provider API base URL (token and invoice endpoints hang off it).
    pub base_url: Url,
    /// Client-credentials client identifier.
    pub client_id: String,
    /// Passphrase for an encrypted PKCS#8 private key.
    pub key_passphrase: Option<Zeroizing<String>>,
    /// Client certificate sources.
    pub certificate: CredentialSource,
    /// Client private key sources.
    pub private_key: CredentialSource,
    /// Socket-level request timeout in seconds.
    pub timeout_secs: u64,
    /// Lifetime assumed for a freshly issued token. Kept below the
    /// provider's nominal 60 minutes.
    pub token_ttl: Duration,
    /// Items requested per list page.
    pub page_size: u32,
    /// Upper bound on pages walked for a single payer.
    pub max_pages: u32,
    /// Detail requests issued concurrently per batch.
    pub detail_batch_size: usize,
    /// Fixed pause between list pages and between detail batches.
    pub pause: Duration,
    /// Re-sends of a throttled or transport-failed list/detail GET.
    pub retry: RetryPolicy,
    /// Query parameter carrying the payer document.
    pub payer_param: PayerParam,
    /// Deadline for a standalone single-invoice lookup.
    pub lookup_timeout: Duration,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field(
                "key_passphrase",
                &self.key_passphrase.as_ref().map(|_| "[REDACTED]"),
            )
            .field("certificate", &self.certificate)
            .field("private_key", &self.private_key)
            .field("timeout_secs", &self.timeout_secs)
            .field("token_ttl", &self.token_ttl)
            .field("page_size", &self.page_size)
            .field("max_pages", &self.max_pages)
            .field("detail_batch_size", &self.detail_batch_size)
            .field("pause", &self.pause)
            .field("retry", &self.retry)
            .field("payer_param", &self.payer_param)
            .field("lookup_timeout", &self.lookup_timeout)
            .finish()
    }
}

/// Default token lifetime: 50 minutes under a nominal 60-minute grant.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(50 * 60);

impl ProviderConfig {
    /// Build a configuration with default tuning for the given endpoint and
    /// credential sources.
    pub fn new(
        base_url: Url,
        client_id: impl Into<String>,
        certificate: CredentialSource,
        private_key: CredentialSource,
    ) -> Self {
        Self {
            base_url,
            client_id: client_id.into(),
            key_passphrase: None,
            certificate,
            private_key,
            timeout_secs: 30,
            token_ttl: DEFAULT_TOKEN_TTL,
            page_size: 100,
            max_pages: 500,
            detail_batch_size: 10,
            pause: Duration::from_millis(200),
            retry: RetryPolicy::default(),
            payer_param: PayerParam::CustomerDocument,
            lookup_timeout: Duration::from_secs(20),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `BOLETO_API_BASE_URL` (required)
    /// - `BOLETO_CLIENT_ID` (required)
    /// - `BOLETO_KEY_PASSPHRASE` (optional)
    /// - `BOLETO_CERT_DIR` (optional base directory for the files below)
    /// - `BOLETO_CERT_FILE` (default: `certificate.pem`)
    /// - `BOLETO_KEY_FILE` (default: `private-key.key`)
    /// - `BOLETO_CERT` / `BOLETO_PRIVATE_KEY` (optional literal material)
    /// - `BOLETO_TIMEOUT_SECS` (default: 30)
    /// - `BOLETO_PAGE_SIZE` (default: 100)
    /// - `BOLETO_DETAIL_BATCH_SIZE` (default: 10)
    /// - `BOLETO_PAUSE_MS` (default: 200)
    /// - `BOLETO_RETRY_ATTEMPTS` (default: 3)
    /// - `BOLETO_RETRY_BASE_MS` (default: 200, doubled per re-send)
    /// - `BOLETO_PAYER_PARAM` (`customer_document` | `search`, default: `customer_document`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = required_var("BOLETO_API_BASE_URL")?;
        let base_url = Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidUrl("BOLETO_API_BASE_URL".into(), e.to_string()))?;
        let client_id = required_var("BOLETO_CLIENT_ID")?;

        let cert_dir = optional_var("BOLETO_CERT_DIR").map(PathBuf::from);
        let certificate = CredentialSource {
            dir: cert_dir.clone(),
            file_name: optional_var("BOLETO_CERT_FILE").unwrap_or_else(|| "certificate.pem".into()),
            literal: optional_var("BOLETO_CERT").map(Zeroizing::new),
        };
        let private_key = CredentialSource {
            dir: cert_dir,
            file_name: optional_var("BOLETO_KEY_FILE").unwrap_or_else(|| "private-key.key".into()),
            literal: optional_var("BOLETO_PRIVATE_KEY").map(Zeroizing::new),
        };

        let mut config = Self::new(base_url, client_id, certificate, private_key);
        config.key_passphrase = optional_var("BOLETO_KEY_PASSPHRASE").map(Zeroizing::new);
        config.timeout_secs = env_number("BOLETO_TIMEOUT_SECS", config.timeout_secs)?;
        config.page_size = env_number("BOLETO_PAGE_SIZE", config.page_size)?;
        config.detail_batch_size = env_number("BOLETO_DETAIL_BATCH_SIZE", config.detail_batch_size)?;
        config.pause = Duration::from_millis(env_number("BOLETO_PAUSE_MS", 200u64)?);
        config.retry.max_retries = env_number("BOLETO_RETRY_ATTEMPTS", config.retry.max_retries)?;
        config.retry.base_delay =
            Duration::from_millis(env_number("BOLETO_RETRY_BASE_MS", 200u64)?);
        if let Some(param) = optional_var("BOLETO_PAYER_PARAM") {
            config.payer_param = param.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot work at all.
    ///
    /// Both credential kinds need at least one source, and batch/page sizes
    /// must be non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.certificate.is_configured() {
            return Err(ConfigError::MissingCredential(MaterialKind::Certificate));
        }
        if !self.private_key.is_configured() {
            return Err(ConfigError::MissingCredential(MaterialKind::PrivateKey));
        }
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue("page_size".into(), "0".into()));
        }
        if self.detail_batch_size == 0 {
            return Err(ConfigError::InvalidValue("detail_batch_size".into(), "0".into()));
        }
        Ok(())
    }

    /// Join a relative path onto the base URL, tolerating a base URL with
    /// or without a trailing slash.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// `{base}/v2/invoices/{id}` with the identifier percent-encoded as a
    /// single path segment.
    pub(crate) fn invoice_url(&self, id: &str) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["v2", "invoices", id]);
        }
        url.to_string()
    }
}

fn optional_var(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn required_var(var: &str) -> Result<String, ConfigError> {
    optional_var(var).ok_or_else(|| ConfigError::MissingVar(var.to_string()))
}

fn env_number<T: std::str::FromStr>(var: &str, default: T) -> Result<T, ConfigError> {
    match optional_var(var) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(var.to_string(), raw)),
        None => Ok(default),
    }
}

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingVar(String),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid value for {0}: {1:?}")]
    InvalidValue(String, String),
    #[error("no source configured for the client {0}: set a file directory or a literal value")]
    MissingCredential(MaterialKind),
}
