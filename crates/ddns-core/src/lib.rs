// # ddns-core
//
// Core library for the scheduled DDNS A-record synchronizer.
//
// ## Architecture Overview
//
// - **IpSource**: Trait for looking up the current external address
// - **DnsProvider**: Trait for reading and replacing the A record via a provider API
// - **Schedule**: Trait for the tick stream that triggers cycles
// - **DdnsEngine**: Runs the fetch → compare → update cycle on every tick
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from HTTP implementations
// 2. **Explicit Configuration**: Built once at startup, passed in, never global
// 3. **Testable Scheduling**: Cycles are driven by a tick stream, not the wall clock
// 4. **Library-First**: All core functionality can be used as a library

pub mod traits;
pub mod engine;
pub mod schedule;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{IpSource, DnsProvider, DnsRecord, RecordLookup};
pub use engine::{DdnsEngine, EngineEvent, CycleOutcome};
pub use schedule::{Schedule, HourlySchedule, Tick};
pub use config::{DdnsConfig, IpSourceConfig, ProviderConfig, RecordConfig, EngineConfig};
pub use error::{Error, Result};
