//! Cloudflare API v4 wire types
//!
//! Every response is wrapped in the same envelope:
//! `{"result": .., "success": bool, "errors": [..], "messages": [..]}`.
//! Only the fields the sync needs are decoded; the rest are ignored.

use ddns_core::config::RecordConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// Envelope of `GET /zones/:zone_id/dns_records`
#[derive(Debug, Deserialize)]
pub struct ListResponse {
    /// Matching records; `null` when the request failed
    #[serde(default)]
    pub result: Option<Vec<RecordEntry>>,

    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub errors: Option<Vec<ApiMessage>>,

    #[serde(default)]
    pub messages: Option<Vec<ApiMessage>>,
}

impl ListResponse {
    /// The records in the order Cloudflare returned them
    pub fn records(self) -> Vec<RecordEntry> {
        self.result.unwrap_or_default()
    }

    /// Errors formatted as `"code: message"`
    pub fn error_messages(&self) -> Vec<String> {
        format_messages(self.errors.as_deref())
    }
}

/// One DNS record inside a list result
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecordEntry {
    pub id: String,
    pub content: String,
}

/// Entry of the `errors` or `messages` arrays
///
/// Usually `{"code": 1003, "message": ".."}`, but plain strings show up too.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ApiMessage {
    Detailed { code: i64, message: String },
    Text(String),
    Other(serde_json::Value),
}

impl fmt::Display for ApiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiMessage::Detailed { code, message } => write!(f, "{}: {}", code, message),
            ApiMessage::Text(text) => f.write_str(text),
            ApiMessage::Other(value) => write!(f, "{}", value),
        }
    }
}

/// Body of `PUT /zones/:zone_id/dns_records/:record_id`
#[derive(Debug, Serialize)]
pub struct UpdateRequest<'a> {
    /// Identifier of the record being replaced
    pub id: &'a str,

    #[serde(rename = "type")]
    pub record_type: &'static str,

    pub proxied: bool,

    pub name: &'a str,

    pub content: String,

    pub ttl: u32,
}

impl<'a> UpdateRequest<'a> {
    /// A-record replacement for `record` pointing at `new_ip`
    pub fn new(record: &'a RecordConfig, record_id: &'a str, new_ip: Ipv4Addr) -> Self {
        Self {
            id: record_id,
            record_type: "A",
            proxied: record.proxied,
            name: &record.name,
            content: new_ip.to_string(),
            ttl: record.ttl,
        }
    }
}

/// Envelope of the update response; the echoed record is not needed
#[derive(Debug, Deserialize)]
pub struct UpdateResponse {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub errors: Option<Vec<ApiMessage>>,
}

impl UpdateResponse {
    /// Errors formatted as `"code: message"`
    pub fn error_messages(&self) -> Vec<String> {
        format_messages(self.errors.as_deref())
    }
}

fn format_messages(messages: Option<&[ApiMessage]>) -> Vec<String> {
    messages
        .unwrap_or_default()
        .iter()
        .map(ToString::to_string)
        .collect()
}
