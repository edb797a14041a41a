// # HTTP IP Source
//
// This crate provides an HTTP-based IP source for the DDNS system.
//
// ## Architecture
//
// Fetches the current IP from an external echo service (icanhazip.com by
// default) with one unauthenticated GET per cycle. The body is the address
// as plain text, usually with a trailing newline.
//
// Echo services answer with the address family the request arrived on, so
// connections are bound to IPv4 only.

use ddns_core::config::IpSourceConfig;
use ddns_core::traits::IpSource;
use ddns_core::{Error, Result};

use std::net::{IpAddr, Ipv4Addr};

/// Local bind address; restricts outgoing connections to IPv4
const IPV4_ANY: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// HTTP-based IP source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// HTTP client, reused across lookups
    client: reqwest::Client,

    /// Address the client binds to before connecting
    local_address: IpAddr,
}

impl HttpIpSource {
    /// Create a new HTTP IP source from configuration
    pub fn new(config: &IpSourceConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .local_address(IPV4_ANY)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: config.url.clone(),
            client,
            local_address: IPV4_ANY,
        })
    }

    /// The URL this source queries
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The local address outgoing requests are bound to
    pub fn local_address(&self) -> IpAddr {
        self.local_address
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        tracing::debug!("Fetching external IP from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| {
                Error::network(format!("cannot fetch external network IP: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(Error::network(format!(
                "cannot fetch external network IP: HTTP {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Failed to read response: {}", e)))?;

        parse_ip(&body)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

/// Parse an echo-service body into an IPv4 address
///
/// Surrounding whitespace is ignored. Anything else, including an IPv6
/// address, is a decode error.
pub fn parse_ip(body: &str) -> Result<Ipv4Addr> {
    let text = body.trim();
    text.parse()
        .map_err(|_| Error::decode(format!("Invalid IPv4 address: {:?}", text)))
}
