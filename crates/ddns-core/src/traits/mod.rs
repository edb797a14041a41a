//! Core traits for the DDNS system
//!
//! - [`IpSource`]: Look up the current external address
//! - [`DnsProvider`]: Read and replace the record via a provider API

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::IpSource;
pub use dns_provider::{DnsProvider, DnsRecord, RecordLookup};
