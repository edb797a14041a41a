//! Test doubles and common utilities for engine contract tests
//!
//! These doubles record every call so tests can assert which requests a
//! cycle would have made, without any network access.

#![allow(dead_code)]

use ddns_core::config::{DdnsConfig, RecordConfig};
use ddns_core::error::{Error, Result};
use ddns_core::schedule::{Schedule, Tick};
use ddns_core::traits::{DnsProvider, DnsRecord, IpSource, RecordLookup};
use std::net::Ipv4Addr;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_stream::Stream;

/// An IpSource returning a fixed address, or failing like a dead network
pub struct StaticIpSource {
    ip: Option<Ipv4Addr>,
    call_count: Arc<AtomicUsize>,
}

impl StaticIpSource {
    pub fn new(ip: Ipv4Addr) -> Self {
        Self {
            ip: Some(ip),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source whose every lookup fails with a network error
    pub fn unreachable() -> Self {
        Self {
            ip: None,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared handle to the number of times current() was called
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.call_count)
    }
}

#[async_trait::async_trait]
impl IpSource for StaticIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.ip
            .ok_or_else(|| Error::network("connection refused"))
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}

/// What the mock provider answers to a record lookup
#[derive(Clone)]
pub enum LookupBehavior {
    Records(Vec<DnsRecord>),
    Rejected(Vec<String>),
    NetworkError,
    DecodeError,
}

/// Calls observed by a [`MockDnsProvider`]
#[derive(Default)]
pub struct ProviderCalls {
    lookups: AtomicUsize,
    updates: Mutex<Vec<(String, String, Ipv4Addr)>>,
}

impl ProviderCalls {
    /// Number of record lookups
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Number of update requests
    pub fn update_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }

    /// (record name, record id, new ip) for every update request
    pub fn updates(&self) -> Vec<(String, String, Ipv4Addr)> {
        self.updates.lock().unwrap().clone()
    }
}

/// A mock DnsProvider that tracks calls
pub struct MockDnsProvider {
    lookup: LookupBehavior,
    fail_updates: bool,
    calls: Arc<ProviderCalls>,
}

impl MockDnsProvider {
    pub fn new(lookup: LookupBehavior) -> Self {
        Self {
            lookup,
            fail_updates: false,
            calls: Arc::new(ProviderCalls::default()),
        }
    }

    /// A provider holding exactly one record
    pub fn with_record(id: &str, content: &str) -> Self {
        Self::new(LookupBehavior::Records(vec![DnsRecord::new(id, content)]))
    }

    /// Make every update request fail with a provider error
    pub fn failing_updates(mut self) -> Self {
        self.fail_updates = true;
        self
    }

    /// Shared handle to the observed calls
    pub fn calls(&self) -> Arc<ProviderCalls> {
        Arc::clone(&self.calls)
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn lookup_records(&self, _record: &RecordConfig) -> Result<RecordLookup> {
        self.calls.lookups.fetch_add(1, Ordering::SeqCst);

        match &self.lookup {
            LookupBehavior::Records(records) => Ok(RecordLookup::Records(records.clone())),
            LookupBehavior::Rejected(errors) => Ok(RecordLookup::Rejected {
                errors: errors.clone(),
            }),
            LookupBehavior::NetworkError => Err(Error::network("operation timed out")),
            LookupBehavior::DecodeError => Err(Error::decode("expected value at line 1 column 1")),
        }
    }

    async fn update_record(
        &self,
        record: &RecordConfig,
        existing: &DnsRecord,
        new_ip: Ipv4Addr,
    ) -> Result<()> {
        self.calls
            .updates
            .lock()
            .unwrap()
            .push((record.name.clone(), existing.id.clone(), new_ip));

        if self.fail_updates {
            return Err(Error::provider("mock", "update rejected"));
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A schedule that ticks only when the test says so
pub struct ManualSchedule {
    rx: Mutex<Option<mpsc::UnboundedReceiver<Tick>>>,
}

impl ManualSchedule {
    pub fn new() -> (Self, mpsc::UnboundedSender<Tick>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                rx: Mutex::new(Some(rx)),
            },
            tx,
        )
    }
}

impl Schedule for ManualSchedule {
    fn ticks(&self) -> Pin<Box<dyn Stream<Item = Tick> + Send + 'static>> {
        let rx = self
            .rx
            .lock()
            .unwrap()
            .take()
            .expect("ticks() can only be called once");

        Box::pin(tokio_stream::wrappers::UnboundedReceiverStream::new(rx))
    }
}

/// Helper to create a minimal DdnsConfig for testing
pub fn minimal_config(record_name: &str) -> DdnsConfig {
    DdnsConfig::new("test-token", "zone-123", record_name)
}

pub fn ip(a: u8, b: u8, c: u8, d: u8) -> Ipv4Addr {
    Ipv4Addr::new(a, b, c, d)
}
