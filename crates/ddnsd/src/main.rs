// # ddnsd - DDNS Daemon
//
// This daemon is a thin integration layer. All sync logic lives in ddns-core.
//
// The ddnsd daemon is responsible for:
// 1. Reading configuration from flags and environment variables
// 2. Initializing logging and the runtime
// 3. Wiring the HTTP IP source and the Cloudflare provider into the engine
// 4. Running one cycle at startup and then one every hour, until SIGTERM/SIGINT
//
// ## Configuration
//
// - `-authToken` / `DDNS_PROVIDER_API_TOKEN`: Cloudflare API token
// - `-zoneIdentifier` / `DDNS_PROVIDER_ZONE_ID`: Zone ID
// - `-recordName` / `DDNS_RECORD_NAME`: A record to keep in sync
// - `-ipUrl` / `DDNS_IP_SOURCE_URL`: IP echo endpoint (default icanhazip.com)
// - `-dryRun` / `DDNS_MODE=dry-run`: log the update instead of sending it
// - `-logLevel` / `DDNS_LOG_LEVEL`: trace, debug, info, warn, error
// - `-once`: run a single cycle and exit
//
// ## Example
//
// ```bash
// ddnsd -authToken your_token -zoneIdentifier 023e105f4ecef8ad9ca31a8372d0c353 \
//       -recordName home.example.com
// ```

mod cli;

use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;
use ddns_core::{DdnsConfig, DdnsEngine, EngineEvent, HourlySchedule};
use ddns_ip_http::HttpIpSource;
use ddns_provider_cloudflare::CloudflareProvider;
use std::process::ExitCode;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use crate::cli::{Cli, DdnsExitCode, Launch};

/// How long a cycle in flight may take to finish after a shutdown signal
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

fn main() -> ExitCode {
    let cli = match Cli::try_parse_from(cli::normalize_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    DdnsExitCode::CleanShutdown.into()
                }
                _ => DdnsExitCode::ConfigError.into(),
            };
        }
    };

    let config = match cli.launch() {
        Launch::Run(config) => config,
        Launch::Usage => return cli::usage(&mut std::io::stdout()).into(),
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let log_level = match cli.log_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration validation error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting ddnsd daemon");
    info!("Managing record: {}", config.record.name);
    if config.engine.dry_run {
        warn!("Running in DRY-RUN mode - no changes will be made");
    }

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match run_daemon(config, cli.once).await {
            Ok(code) => code,
            Err(e) => {
                error!("Daemon error: {}", e);
                DdnsExitCode::RuntimeError
            }
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: DdnsConfig, once: bool) -> Result<DdnsExitCode> {
    let ip_source = HttpIpSource::new(&config.ip_source)?;
    let provider = CloudflareProvider::new(&config.provider)?;
    debug!("Provider: {:?}", provider);

    let (engine, events) = DdnsEngine::new(Box::new(ip_source), Box::new(provider), &config)?;
    tokio::spawn(log_events(events));

    if once {
        let result = engine.run_cycle().await;
        match &result {
            Ok(outcome) => info!("Cycle finished: {:?}", outcome),
            Err(e) => error!("Update error: {}", e),
        }
        return Ok(DdnsExitCode::for_cycle(&result));
    }

    let schedule = HourlySchedule::new();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let engine_run = engine.run_with_shutdown(&schedule, Some(shutdown_rx));
    tokio::pin!(engine_run);

    tokio::select! {
        result = &mut engine_run => {
            // The hourly schedule never ends on its own
            result?;
            return Ok(DdnsExitCode::CleanShutdown);
        }
        signal = wait_for_shutdown() => {
            info!("Received shutdown signal: {}", signal?);
            let _ = shutdown_tx.send(());
        }
    }

    match tokio::time::timeout(SHUTDOWN_TIMEOUT, engine_run).await {
        Ok(result) => result?,
        Err(_) => anyhow::bail!("Shutdown timeout after {:?}", SHUTDOWN_TIMEOUT),
    }

    info!("Shutting down daemon");
    Ok(DdnsExitCode::CleanShutdown)
}

/// Forward engine events to the log until the engine goes away
async fn log_events(mut events: mpsc::Receiver<EngineEvent>) {
    while let Some(event) = events.recv().await {
        debug!("Engine event: {:?}", event);
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(name)
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
