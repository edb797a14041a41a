//! Configuration types for the DDNS system
//!
//! The configuration is built once at startup, validated, and then shared
//! read-only with every component for the lifetime of the process.

use std::fmt;
use std::time::Duration;

/// Default public IP echo endpoint
pub const DEFAULT_IP_LOOKUP_URL: &str = "https://icanhazip.com/";

/// Cloudflare API v4 base URL
pub const DEFAULT_CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Timeout applied to every outbound HTTP request
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// TTL written on every record update
pub const RECORD_TTL_SECS: u32 = 120;

/// Main DDNS configuration
#[derive(Debug, Clone)]
pub struct DdnsConfig {
    /// Where the external IP is looked up
    pub ip_source: IpSourceConfig,

    /// DNS provider credentials and zone
    pub provider: ProviderConfig,

    /// The single A record kept in sync
    pub record: RecordConfig,

    /// Engine settings
    pub engine: EngineConfig,
}

impl DdnsConfig {
    /// Create a configuration for one record with default endpoints
    pub fn new(
        api_token: impl Into<String>,
        zone_id: impl Into<String>,
        record_name: impl Into<String>,
    ) -> Self {
        Self {
            ip_source: IpSourceConfig::default(),
            provider: ProviderConfig::new(api_token, zone_id),
            record: RecordConfig::new(record_name),
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.provider.validate()?;
        self.record.validate()?;
        self.ip_source.validate()?;

        if self.engine.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }

        Ok(())
    }
}

/// IP lookup configuration
#[derive(Debug, Clone)]
pub struct IpSourceConfig {
    /// URL returning the caller's address as plain text
    pub url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl IpSourceConfig {
    /// Validate the IP source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.url.is_empty() {
            return Err(crate::Error::config("IP lookup URL cannot be empty"));
        }
        if !self.url.starts_with("https://") && !self.url.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "IP lookup URL must use HTTP or HTTPS scheme. Got: {}",
                self.url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("IP lookup timeout must be > 0"));
        }
        Ok(())
    }

    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for IpSourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_IP_LOOKUP_URL.to_string(),
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

/// Cloudflare provider configuration
#[derive(Clone)]
pub struct ProviderConfig {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    pub api_token: String,

    /// Zone identifier the record lives in
    pub zone_id: String,

    /// API base URL, overridable for tests
    pub api_base: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// Create a provider configuration against the production API
    pub fn new(api_token: impl Into<String>, zone_id: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            zone_id: zone_id.into(),
            api_base: DEFAULT_CLOUDFLARE_API_BASE.to_string(),
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_token.is_empty() {
            return Err(crate::Error::config("Cloudflare API token cannot be empty"));
        }
        if self.zone_id.is_empty() {
            return Err(crate::Error::config("Cloudflare zone identifier cannot be empty"));
        }
        if self.api_base.is_empty() {
            return Err(crate::Error::config("Cloudflare API base URL cannot be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Cloudflare request timeout must be > 0"));
        }
        Ok(())
    }

    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// Custom Debug implementation that hides the API token
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// DNS record configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordConfig {
    /// DNS record name (e.g., "home.example.com")
    pub name: String,

    /// TTL written on update
    pub ttl: u32,

    /// Whether the record is proxied through Cloudflare
    pub proxied: bool,
}

impl RecordConfig {
    /// Create a new record configuration
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ttl: RECORD_TTL_SECS,
            proxied: false,
        }
    }

    /// Validate the record configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.name.is_empty() {
            return Err(crate::Error::config("Record name cannot be empty"));
        }
        Ok(())
    }
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Look everything up but never send the update
    pub dry_run: bool,

    /// Capacity of the engine event channel
    ///
    /// When full, new events are dropped with a warning log.
    pub event_channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_event_channel_capacity() -> usize {
    100
}
