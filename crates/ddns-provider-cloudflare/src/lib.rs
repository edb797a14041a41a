// # Cloudflare DNS Provider
//
// This crate provides a Cloudflare DNS provider implementation for the DDNS system.
//
// The provider is stateless and single-shot: every call issues exactly one
// HTTP request. Deciding whether an update is needed, dry-run and scheduling
// are owned by `DdnsEngine`.
//
// ## Cloudflare API v4 Endpoints Used
//
// - List DNS Records: GET `/zones/:zone_id/dns_records?name=...&type=A`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`
//
// Both requests carry `Authorization: Bearer <token>`. The token is never
// logged.

mod api;

use async_trait::async_trait;
use ddns_core::config::{ProviderConfig, RecordConfig};
use ddns_core::traits::{DnsProvider, DnsRecord, RecordLookup};
use ddns_core::{Error, Result};
use std::net::Ipv4Addr;

pub use api::{ApiMessage, ListResponse, RecordEntry, UpdateRequest, UpdateResponse};

/// Record type this provider reads and writes
const RECORD_TYPE: &str = "A";

/// Cloudflare DNS provider
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API token.
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// Zone holding the record
    zone_id: String,

    /// API base URL, without trailing slash
    api_base: String,

    /// HTTP client, shared by every request
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// The token needs Zone:DNS:Edit permission on `zone_id`. Fails with a
    /// configuration error if any setting is missing or malformed.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token: config.api_token.clone(),
            zone_id: config.zone_id.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// URL of the zone's record collection
    fn records_url(&self) -> String {
        format!("{}/zones/{}/dns_records", self.api_base, self.zone_id)
    }

    /// URL of a single record
    fn record_url(&self, record_id: &str) -> String {
        format!("{}/{}", self.records_url(), record_id)
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// List the A records named `record.name`
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?name=home.example.com&type=A
    /// Authorization: Bearer <token>
    /// ```
    ///
    /// The envelope is decoded whatever the HTTP status, since Cloudflare
    /// reports failures through `success` and `errors`.
    async fn lookup_records(&self, record: &RecordConfig) -> Result<RecordLookup> {
        tracing::debug!("Looking up {} records for {}", RECORD_TYPE, record.name);

        let response = self
            .client
            .get(self.records_url())
            .query(&[("name", record.name.as_str()), ("type", RECORD_TYPE)])
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| Error::network(format!("cannot fetch DNS record: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Failed to read response: {}", e)))?;

        let envelope: ListResponse = serde_json::from_str(&body)?;

        if !envelope.success {
            tracing::debug!("Record lookup rejected with HTTP {}", status);
            return Ok(RecordLookup::Rejected {
                errors: envelope.error_messages(),
            });
        }

        let records: Vec<DnsRecord> = envelope
            .records()
            .into_iter()
            .map(|entry| DnsRecord::new(entry.id, entry.content))
            .collect();

        tracing::debug!("Found {} record(s) for {}", records.len(), record.name);
        Ok(RecordLookup::Records(records))
    }

    /// Replace the record with one pointing at `new_ip`
    ///
    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// Authorization: Bearer <token>
    /// Content-Type: application/json
    ///
    /// {"id":"..","type":"A","proxied":false,"name":"..","content":"..","ttl":120}
    /// ```
    async fn update_record(
        &self,
        record: &RecordConfig,
        existing: &DnsRecord,
        new_ip: Ipv4Addr,
    ) -> Result<()> {
        let payload = UpdateRequest::new(record, &existing.id, new_ip);

        tracing::debug!(
            "Replacing record {} ({}): {} -> {}",
            existing.id,
            record.name,
            existing.content,
            new_ip
        );

        let response = self
            .client
            .put(self.record_url(&existing.id))
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::network(format!("cannot update DNS record: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Failed to read response: {}", e)))?;

        let envelope: UpdateResponse = serde_json::from_str(&body)?;

        if !envelope.success {
            return Err(Error::provider(
                "cloudflare",
                format!(
                    "Failed to update record (HTTP {}): {}",
                    status,
                    envelope.error_messages().join(", ")
                ),
            ));
        }

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}
