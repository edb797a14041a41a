//! Core DDNS engine
//!
//! The DdnsEngine is responsible for:
//! - Running the update cycle (look up IP, look up record, compare, update)
//! - Running one cycle at startup and one per schedule tick
//! - Reporting progress as [`EngineEvent`]s
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Schedule   │─── Tick ────────────┐
//! └─────────────┘                     │
//!                                     ▼
//!                            ┌──────────────┐
//!                            │ DdnsEngine   │
//!                            └──────────────┘
//!                                     │
//!         ┌───────────────────────────┼───────────────────────────┐
//!         │                           │                           │
//!         ▼                           ▼                           ▼
//! ┌─────────────┐           ┌──────────────┐           ┌─────────────┐
//! │  IpSource   │           │ DnsProvider  │           │   Events    │
//! │ (current)   │           │ (lookup/put) │           │  (notify)   │
//! └─────────────┘           └──────────────┘           └─────────────┘
//! ```
//!
//! ## Cycle Flow
//!
//! 1. Fetch the external IP
//! 2. Fetch the A records for the configured name
//! 3. Provider rejection or no records: stop, nothing to do
//! 4. First record wins
//! 5. Same content: stop
//! 6. Otherwise replace the record with the new IP

use crate::config::{DdnsConfig, RecordConfig};
use crate::error::Result;
use crate::schedule::Schedule;
use crate::traits::{DnsProvider, IpSource, RecordLookup};
use std::net::Ipv4Addr;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn};

/// What a completed cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Record already points at the current IP
    Unchanged { ip: Ipv4Addr },

    /// Record was replaced
    Updated {
        record_id: String,
        previous: String,
        new_ip: Ipv4Addr,
    },

    /// Record differs but dry-run mode suppressed the update
    DryRun {
        record_id: String,
        previous: String,
        new_ip: Ipv4Addr,
    },

    /// Provider returned an empty record list
    NoRecord,

    /// Provider flagged the lookup as failed
    ProviderRejected { errors: Vec<String> },
}

impl CycleOutcome {
    /// Whether an update request was sent
    pub fn is_update(&self) -> bool {
        matches!(self, CycleOutcome::Updated { .. })
    }
}

/// Events emitted by the DdnsEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started { record_name: String },

    /// A cycle began
    CycleStarted { record_name: String },

    /// A cycle finished without error
    CycleCompleted {
        record_name: String,
        outcome: CycleOutcome,
    },

    /// A cycle was aborted
    CycleFailed { record_name: String, error: String },

    /// Engine stopped
    Stopped { reason: String },
}

/// Core DDNS engine
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Start with [`DdnsEngine::run()`]
/// 3. Engine runs until a shutdown signal is received
///
/// Cycles run inline in the engine loop, so two cycles never overlap. A
/// failed cycle is logged and the loop waits for the next tick; nothing is
/// retried in between.
pub struct DdnsEngine {
    /// IP source for the external address
    ip_source: Box<dyn IpSource>,

    /// DNS provider for reading and replacing the record
    provider: Box<dyn DnsProvider>,

    /// The record kept in sync
    record: RecordConfig,

    /// Skip the update request, only log it
    dry_run: bool,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        config: &DdnsConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let engine = Self {
            ip_source,
            provider,
            record: config.record.clone(),
            dry_run: config.engine.dry_run,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run the engine until Ctrl-C
    ///
    /// Runs one cycle immediately, then one per tick of `schedule`.
    pub async fn run(&self, schedule: &dyn Schedule) -> Result<()> {
        self.run_with_shutdown(schedule, None).await
    }

    /// Run the engine until `shutdown_rx` fires
    ///
    /// With `None`, the engine stops on Ctrl-C instead. The engine also stops
    /// if the schedule's tick stream ends.
    pub async fn run_with_shutdown(
        &self,
        schedule: &dyn Schedule,
        shutdown_rx: Option<oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.emit_event(EngineEvent::Started {
            record_name: self.record.name.clone(),
        });

        let shutdown = async move {
            match shutdown_rx {
                Some(rx) => {
                    let _ = rx.await;
                }
                None => {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        error!("Failed to wait for Ctrl-C: {}", e);
                    }
                }
            }
        };
        tokio::pin!(shutdown);

        let mut ticks = schedule.ticks();

        // Startup cycle
        if let Err(e) = self.run_cycle().await {
            error!("First update error: {}", e);
        }

        let reason = loop {
            tokio::select! {
                tick = ticks.next() => {
                    let Some(tick) = tick else {
                        break "Schedule finished";
                    };
                    debug!("Tick scheduled at {}", tick.scheduled_at);
                    if let Err(e) = self.run_cycle().await {
                        error!("Update error: {}", e);
                    }
                }

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break "Shutdown signal";
                }
            }
        };

        self.emit_event(EngineEvent::Stopped {
            reason: reason.to_string(),
        });
        info!("Engine stopped: {}", reason);

        Ok(())
    }

    /// Run a single update cycle
    ///
    /// Transport and decode failures abort the cycle and are returned.
    /// A provider rejection or an empty record list is not an error.
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        info!("Check initiated for {}", self.record.name);
        self.emit_event(EngineEvent::CycleStarted {
            record_name: self.record.name.clone(),
        });

        let result = self.cycle().await;

        match &result {
            Ok(outcome) => self.emit_event(EngineEvent::CycleCompleted {
                record_name: self.record.name.clone(),
                outcome: outcome.clone(),
            }),
            Err(e) => self.emit_event(EngineEvent::CycleFailed {
                record_name: self.record.name.clone(),
                error: e.to_string(),
            }),
        }

        result
    }

    async fn cycle(&self) -> Result<CycleOutcome> {
        let ip = self.ip_source.current().await?;
        info!(
            "Fetched current external IP from {}: {}",
            self.ip_source.source_name(),
            ip
        );

        let records = match self.provider.lookup_records(&self.record).await? {
            RecordLookup::Records(records) => records,
            RecordLookup::Rejected { errors } => {
                warn!(
                    "Error in {} API response: {}",
                    self.provider.provider_name(),
                    errors.join(", ")
                );
                return Ok(CycleOutcome::ProviderRejected { errors });
            }
        };

        if records.len() > 1 {
            debug!(
                "{} records named {}, using the first",
                records.len(),
                self.record.name
            );
        }

        let Some(record) = records.into_iter().next() else {
            warn!("No DNS records found for {}", self.record.name);
            return Ok(CycleOutcome::NoRecord);
        };
        info!("Fetched current DNS record value: {}", record.content);

        if record.content == ip.to_string() {
            info!(
                "Update for A record '{}' cancelled: IP has not changed",
                record.id
            );
            return Ok(CycleOutcome::Unchanged { ip });
        }

        if self.dry_run {
            info!(
                "[DRY-RUN] Would update A record '{}': {} -> {}",
                record.id, record.content, ip
            );
            return Ok(CycleOutcome::DryRun {
                record_id: record.id,
                previous: record.content,
                new_ip: ip,
            });
        }

        info!("Different IP addresses detected, synchronizing...");
        self.provider
            .update_record(&self.record, &record, ip)
            .await?;

        info!(
            "Update for A record '{}' succeeded: {} -> {}",
            record.id, record.content, ip
        );
        Ok(CycleOutcome::Updated {
            record_id: record.id,
            previous: record.content,
            new_ip: ip,
        })
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
            }
            // Nobody is listening
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }
}
