// # IP Source Trait
//
// Defines the interface for looking up the caller's current public address.
//
// ## Implementations
//
// - HTTP echo service (icanhazip.com): `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//
//     let current_ip = source.current().await?;
//     println!("external address: {}", current_ip);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for IP source implementations
///
/// A source answers one question per call: what is the caller's public IPv4
/// address right now. Nothing is cached between calls; every cycle asks again.
///
/// # Trust Level: Semi-Trusted
///
/// ## Allowed Capabilities
/// - ✅ Perform a single outbound request per call
/// - ✅ Parse the service's response format
///
/// ## Forbidden Capabilities
/// - ❌ Perform DNS updates (use `DnsProvider`)
/// - ❌ Implement retry logic (a failed lookup fails the cycle)
/// - ❌ Spawn polling loops (scheduling is owned by the engine)
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current external IPv4 address
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: The current address
    /// - `Err(Error::Network)`: The lookup request failed
    /// - `Err(Error::Decode)`: The response was not an IPv4 address
    async fn current(&self) -> Result<Ipv4Addr, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
