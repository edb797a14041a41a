// # DNS Provider Trait
//
// Defines the interface for reading and replacing one A record via a
// provider API.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate

use async_trait::async_trait;
use std::net::Ipv4Addr;

use crate::config::RecordConfig;

/// A DNS record as reported by the provider
///
/// Fetched fresh on every cycle; never mutated locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    /// The record ID (provider-specific, opaque)
    pub id: String,
    /// The record content (the address currently published)
    pub content: String,
}

impl DnsRecord {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

/// Result of looking up the configured record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordLookup {
    /// The provider answered; the list may be empty
    Records(Vec<DnsRecord>),
    /// The provider answered but flagged the request as failed
    Rejected {
        /// Error messages reported by the provider
        errors: Vec<String>,
    },
}

/// Trait for DNS provider implementations
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to their endpoints only
/// - ✅ Parse provider-specific responses
///
/// ## Forbidden Capabilities
/// - ❌ Implement retry logic or backoff
/// - ❌ Decide whether an update is needed (owned by `DdnsEngine`)
/// - ❌ Cache records between cycles
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Fetch the A records matching the configured name
    ///
    /// A provider-side failure flag is reported as [`RecordLookup::Rejected`],
    /// not as an error. Errors are reserved for transport and decode failures.
    async fn lookup_records(&self, record: &RecordConfig) -> Result<RecordLookup, crate::Error>;

    /// Replace `existing` with an A record pointing at `new_ip`
    ///
    /// Issues exactly one request.
    async fn update_record(
        &self,
        record: &RecordConfig,
        existing: &DnsRecord,
        new_ip: Ipv4Addr,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
