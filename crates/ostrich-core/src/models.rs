//! Trigger event model and strongly-typed identifiers.
//!
//! Defines the unit of work flowing through the ingestion pipeline, the
//! audit record identifier, and the helpers that turn raw request parts
//! into a trigger (header capture and best-effort body parsing).

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{OstrichError, Result};

type PgDb = sqlx::Postgres;
type PgValueRef<'r> = sqlx::postgres::PgValueRef<'r>;
type PgTypeInfo = sqlx::postgres::PgTypeInfo;
type PgArgumentBuffer = sqlx::postgres::PgArgumentBuffer;
type EncodeResult =
    std::result::Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync + 'static>>;
type BoxDynError = sqlx::error::BoxDynError;

/// Inbound request metadata captured on a trigger.
///
/// A flat name-to-value map: when a header name repeats, the last value
/// wins. Names are stored in Title-Case (`Content-Type`, `X-Github-Event`)
/// whatever case the client sent, so new documents key their headers the
/// same way as the documents already in the audit log.
pub type TriggerHeaders = BTreeMap<String, String>;

/// Identifier of a stored audit record.
///
/// Generated by the document store on append. Used for logging and
/// correlation only; it is not propagated to the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub Uuid);

impl RecordId {
    /// Creates a new random record ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RecordId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl sqlx::Type<PgDb> for RecordId {
    fn type_info() -> PgTypeInfo {
        <Uuid as sqlx::Type<PgDb>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, PgDb> for RecordId {
    fn decode(value: PgValueRef<'r>) -> std::result::Result<Self, BoxDynError> {
        let uuid = <Uuid as sqlx::Decode<PgDb>>::decode(value)?;
        Ok(Self(uuid))
    }
}

impl sqlx::Encode<'_, PgDb> for RecordId {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> EncodeResult {
        <Uuid as sqlx::Encode<PgDb>>::encode_by_ref(&self.0, buf)
    }
}

/// Channel a trigger arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerSource {
    /// HTTP `POST /trigger`.
    Api,
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api => write!(f, "api"),
        }
    }
}

/// A received trigger, as written to the audit log.
///
/// Serialized with the field names of the stored document format
/// (`trigger_source`, `server_time`, `request_headers`, `trigger_body`).
/// Header names inside `request_headers` are Title-Case, see
/// [`canonical_header_name`]. Created once at receipt and never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerEvent {
    /// Ingestion channel tag.
    #[serde(rename = "trigger_source")]
    pub source: TriggerSource,
    /// Receipt time assigned by the ingestion handler.
    #[serde(rename = "server_time")]
    pub received_at: DateTime<Utc>,
    /// Inbound request headers, last value wins on duplicates.
    #[serde(rename = "request_headers")]
    pub headers: TriggerHeaders,
    /// Parsed payload, `Value::Null` when absent or unparseable.
    #[serde(rename = "trigger_body")]
    pub body: Value,
}

impl TriggerEvent {
    /// Creates a trigger received through the HTTP API.
    pub fn from_api(received_at: DateTime<Utc>, headers: TriggerHeaders, body: Value) -> Self {
        Self { source: TriggerSource::Api, received_at, headers, body }
    }
}

/// Captures header pairs into a flat map, last value wins.
///
/// Names go through [`canonical_header_name`], so `x-trace` and `X-TRACE`
/// are the same header. Values that are not valid UTF-8 are kept lossily
/// rather than dropped so the audit record reflects every header the caller
/// sent.
pub fn capture_headers<'a, I>(pairs: I) -> TriggerHeaders
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut headers = TriggerHeaders::new();
    for (name, value) in pairs {
        headers.insert(canonical_header_name(name), String::from_utf8_lossy(value).into_owned());
    }
    headers
}

/// Title-cases a header name: a letter is upper-cased when it does not
/// follow another letter, and lower-cased otherwise.
///
/// `x-github-event` becomes `X-Github-Event`, `x-b3-traceid` becomes
/// `X-B3-Traceid`.
pub fn canonical_header_name(name: &str) -> String {
    let mut canonical = String::with_capacity(name.len());
    let mut after_letter = false;
    for c in name.chars() {
        if after_letter {
            canonical.extend(c.to_lowercase());
        } else {
            canonical.extend(c.to_uppercase());
        }
        after_letter = c.is_alphabetic();
    }
    canonical
}

/// Whether a `Content-Type` value declares a JSON body.
///
/// Matches `application/json` and any `application/*+json` type, ignoring
/// parameters and case.
pub fn is_json_content_type(content_type: &str) -> bool {
    let mime = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Decodes a raw request body as JSON.
///
/// # Errors
///
/// Returns `OstrichError::Parse` for empty or malformed input. Callers on
/// the ingestion path recover by substituting `Value::Null`.
///
/// Numbers keep their source text, so integers wider than 64 bits and
/// exponents outside the `f64` range are accepted and re-encoded verbatim.
pub fn parse_body(raw: &[u8]) -> Result<Value> {
    serde_json::from_slice(raw).map_err(|e| OstrichError::Parse(e.to_string()))
}
