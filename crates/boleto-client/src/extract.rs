//! # Field Extraction Heuristics
//!
//! The provider's invoice detail payload is not stable: depending on the
//! invoice type and API version the same datum lives at different nested
//! paths, or under historical field names. Each candidate location is a pure
//! extractor `fn(&Value) -> Option<T>`, and candidates are composed with
//! [`first_match`] (first non-empty value wins).
//!
//! ## Pix
//!
//! A pix candidate is either a short alias (the *key*) or a full EMV/BR-Code
//! copy-paste string (the *payload*). A candidate longer than 100 characters
//! or carrying a BR-Code signature is always a payload. When no candidate
//! path matches, the EMV field is read directly: it becomes the payload, and
//! the charge identifier embedded in its location URL (`.../cob/<id>` or
//! `.../cobv/<id>`) becomes the key.

use std::sync::OnceLock;

use boleto_core::EnrichedInvoice;
use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

/// Candidate extractor over a detail payload.
pub type Extractor<T = String> = fn(&Value) -> Option<T>;

/// Pix candidates above this length are payloads, never keys.
const MAX_PIX_KEY_LEN: usize = 100;

/// Return the first value produced by `extractors`, in order.
pub fn first_match<T>(extractors: &[Extractor<T>], detail: &Value) -> Option<T> {
    extractors.iter().find_map(|extract| extract(detail))
}

/// Non-empty, trimmed string at a JSON pointer.
fn string_at(detail: &Value, pointer: &str) -> Option<String> {
    detail
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Non-negative integer minor units at a JSON pointer.
///
/// Accepts integral JSON numbers and digit strings. Fractional or negative
/// values are treated as absent.
fn minor_units_at(detail: &Value, pointer: &str) -> Option<u64> {
    match detail.pointer(pointer)? {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

macro_rules! string_extractors {
    ($( $name:ident => $pointer:literal ),* $(,)?) => {
        $(
            #[doc = concat!("String at `", $pointer, "`.")]
            pub fn $name(detail: &Value) -> Option<String> {
                string_at(detail, $pointer)
            }
        )*
    };
}

macro_rules! amount_extractors {
    ($( $name:ident => $pointer:literal ),* $(,)?) => {
        $(
            #[doc = concat!("Minor units at `", $pointer, "`.")]
            pub fn $name(detail: &Value) -> Option<u64> {
                minor_units_at(detail, $pointer)
            }
        )*
    };
}

string_extractors! {
    options_pix_key => "/payment_options/pix/key",
    options_pix_copy_paste => "/payment_options/pix/copy_paste",
    options_pix_qr_code => "/payment_options/pix/qr_code",
    pix_key => "/pix/key",
    pix_chave => "/pix/chave",
    pix_copy_paste => "/pix/copy_paste",
    pix_qr_code => "/pix/qr_code",
    top_level_pix_key => "/pix_key",
    options_pix_emv => "/payment_options/pix/emv",
    pix_emv => "/pix/emv",

    customer_name => "/customer/name",
    customer_company_name => "/customer/company_name",
    payer_name => "/payer/name",
    top_level_customer_name => "/customer_name",

    status => "/status",
    terms_due_date => "/payment_terms/due_date",
    top_level_due_date => "/due_date",

    bank_slip_barcode => "/payment_options/bank_slip/barcode",
    bank_slip_bar_code => "/payment_options/bank_slip/bar_code",
    legacy_bank_slip_barcode => "/bank_slip/barcode",
    top_level_barcode => "/barcode",

    bank_slip_digitable => "/payment_options/bank_slip/digitable",
    bank_slip_digitable_line => "/payment_options/bank_slip/digitable_line",
    legacy_bank_slip_digitable => "/bank_slip/digitable",
    legacy_bank_slip_digitable_line => "/bank_slip/digitable_line",
    top_level_digitable_line => "/digitable_line",

    bank_slip_url => "/payment_options/bank_slip/url",
    bank_slip_pdf_url => "/payment_options/bank_slip/pdf_url",
    legacy_bank_slip_url => "/bank_slip/url",
    top_level_pdf_url => "/pdf_url",

    customer_document_identity => "/customer/document/identity",
    customer_document => "/customer/document",
    customer_identity => "/customer/identity",
    top_level_customer_document => "/customer_document",
}

amount_extractors! {
    total_amount => "/total_amount",
    amount => "/amount",
    terms_amount => "/payment_terms/amount",
    first_service_amount => "/services/0/amount",
    first_item_amount => "/items/0/amount",
}

/// Pix candidate locations, most specific first.
pub const PIX_CANDIDATES: &[Extractor] = &[
    options_pix_key,
    options_pix_copy_paste,
    options_pix_qr_code,
    pix_key,
    pix_chave,
    pix_copy_paste,
    pix_qr_code,
    top_level_pix_key,
];

/// Known EMV/BR-Code fields, consulted only when no candidate matched.
pub const EMV_FIELDS: &[Extractor] = &[options_pix_emv, pix_emv];

pub const NAME_FIELDS: &[Extractor] = &[
    customer_name,
    customer_company_name,
    payer_name,
    top_level_customer_name,
];

pub const DUE_DATE_FIELDS: &[Extractor] = &[terms_due_date, top_level_due_date];

pub const AMOUNT_FIELDS: &[Extractor<u64>] = &[
    total_amount,
    amount,
    terms_amount,
    first_service_amount,
    first_item_amount,
];

pub const BARCODE_FIELDS: &[Extractor] = &[
    bank_slip_barcode,
    bank_slip_bar_code,
    legacy_bank_slip_barcode,
    top_level_barcode,
];

pub const DIGITABLE_LINE_FIELDS: &[Extractor] = &[
    bank_slip_digitable,
    bank_slip_digitable_line,
    legacy_bank_slip_digitable,
    legacy_bank_slip_digitable_line,
    top_level_digitable_line,
];

pub const PDF_URL_FIELDS: &[Extractor] = &[
    bank_slip_url,
    bank_slip_pdf_url,
    legacy_bank_slip_url,
    top_level_pdf_url,
];

pub const DOCUMENT_FIELDS: &[Extractor] = &[
    customer_document_identity,
    customer_document,
    customer_identity,
    top_level_customer_document,
];

/// Pix target extracted from a detail payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixFields {
    pub key: Option<String>,
    pub payload: Option<String>,
}

fn crc_suffix() -> &'static Regex {
    static CRC: OnceLock<Regex> = OnceLock::new();
    CRC.get_or_init(|| Regex::new(r"6304[0-9A-Fa-f]{4}$").expect("valid regex literal"))
}

fn charge_location() -> &'static Regex {
    static LOCATION: OnceLock<Regex> = OnceLock::new();
    LOCATION.get_or_init(|| Regex::new(r"cobv?/([0-9A-Fa-f-]{8,})").expect("valid regex literal"))
}

/// Whether `value` carries an EMV/BR-Code signature: the pix GUI domain, or
/// the payload-format header together with the trailing CRC field.
pub fn is_emv_payload(value: &str) -> bool {
    value.to_ascii_lowercase().contains("br.gov.bcb.pix")
        || (value.starts_with("000201") && crc_suffix().is_match(value))
}

/// Whether a pix candidate string is a copy-paste payload rather than a key.
pub fn is_pix_payload(candidate: &str) -> bool {
    candidate.chars().count() > MAX_PIX_KEY_LEN || is_emv_payload(candidate)
}

/// Split an EMV string into `(tag, value)` pairs. `None` if the string is
/// not well-formed TLV (two-digit tag, two-digit length, value).
fn emv_fields(payload: &str) -> Option<Vec<(&str, &str)>> {
    let mut fields = Vec::new();
    let mut rest = payload;
    while !rest.is_empty() {
        let tag = rest.get(..2)?;
        let len: usize = rest.get(2..4)?.parse().ok()?;
        let value = rest.get(4..4 + len)?;
        fields.push((tag, value));
        rest = &rest[4 + len..];
    }
    Some(fields)
}

/// The location URL (sub-tag `25`) of the first merchant account template
/// (tags `26`..=`51`) that has one.
fn emv_location(payload: &str) -> Option<&str> {
    emv_fields(payload)?
        .into_iter()
        .filter(|(tag, _)| matches!(tag.parse::<u8>(), Ok(26..=51)))
        .filter_map(|(_, template)| emv_fields(template))
        .flatten()
        .find_map(|(tag, value)| (tag == "25").then_some(value))
}

/// Charge identifier from a `cob/` or `cobv/` location inside an EMV payload.
///
/// The pattern is matched against the decoded location URL when the payload
/// is well-formed TLV, and against the raw string otherwise.
pub fn charge_id(emv: &str) -> Option<String> {
    let haystack = emv_location(emv).unwrap_or(emv);
    charge_location()
        .captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract the pix key and/or payload.
pub fn extract_pix(detail: &Value) -> PixFields {
    if let Some(candidate) = first_match(PIX_CANDIDATES, detail) {
        return if is_pix_payload(&candidate) {
            PixFields {
                key: None,
                payload: Some(candidate),
            }
        } else {
            PixFields {
                key: Some(candidate),
                payload: None,
            }
        };
    }

    match first_match(EMV_FIELDS, detail) {
        Some(emv) => PixFields {
            key: charge_id(&emv),
            payload: Some(emv),
        },
        None => PixFields::default(),
    }
}

/// Parse `YYYY-MM-DD`, an RFC 3339 timestamp (date part), or `DD/MM/YYYY`.
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Some(prefix) = raw.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return Some(date);
        }
    }
    NaiveDate::parse_from_str(raw, "%d/%m/%Y").ok()
}

/// Build the canonical record from a detail payload.
///
/// `fallback_id` (the summary identifier) is used when the detail does not
/// repeat its own `id`.
pub fn format_invoice(fallback_id: &str, detail: &Value) -> EnrichedInvoice {
    let id = match detail.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => fallback_id.to_string(),
    };

    let pix = extract_pix(detail);
    let mut invoice = EnrichedInvoice::new(id);
    invoice.name = first_match(NAME_FIELDS, detail);
    invoice.status = status(detail);
    invoice.due_date = first_match(DUE_DATE_FIELDS, detail).and_then(|raw| parse_due_date(&raw));
    invoice.set_amount(first_match(AMOUNT_FIELDS, detail));
    invoice.pix_key = pix.key;
    invoice.pix_payload = pix.payload;
    invoice.barcode = first_match(BARCODE_FIELDS, detail);
    invoice.digitable_line = first_match(DIGITABLE_LINE_FIELDS, detail);
    invoice.pdf_url = first_match(PDF_URL_FIELDS, detail);
    invoice.payer_document = first_match(DOCUMENT_FIELDS, detail);
    invoice
}
