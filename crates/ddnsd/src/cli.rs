//! Command-line interface
//!
//! Flags use camelCase names and may be written Go-style with a single dash
//! (`-authToken x`) as well as `--authToken x` or `--authToken=x`. Each
//! required flag falls back to an environment variable.

use anyhow::Result;
use clap::Parser;
use ddns_core::{CycleOutcome, DdnsConfig};
use ddns_core::config::DEFAULT_IP_LOOKUP_URL;
use std::ffi::OsString;
use std::fmt;
use std::io::Write;
use std::process::ExitCode;
use tracing::Level;

/// Printed to stdout when a required parameter is missing
pub const USAGE: &str =
    "Please provide all required parameters: -authToken, -zoneIdentifier, -recordName";

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error, or a failed cycle in `--once` mode
    RuntimeError = 2,
}

impl DdnsExitCode {
    /// Exit code for a `--once` run
    pub fn for_cycle(result: &ddns_core::Result<CycleOutcome>) -> Self {
        match result {
            Ok(_) => DdnsExitCode::CleanShutdown,
            Err(_) => DdnsExitCode::RuntimeError,
        }
    }
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// What the daemon does after parsing its arguments
#[derive(Debug)]
pub enum Launch {
    /// A required parameter is missing: print [`USAGE`] and exit cleanly
    Usage,
    /// Start with this configuration
    Run(DdnsConfig),
}

/// Print [`USAGE`] to `out`
///
/// A missing parameter is not a failure, so the daemon exits cleanly.
pub fn usage(out: &mut impl Write) -> DdnsExitCode {
    let _ = writeln!(out, "{}", USAGE);
    DdnsExitCode::CleanShutdown
}

/// Long flags that may be written with a single dash
const LONG_FLAGS: &[&str] = &[
    "authToken",
    "zoneIdentifier",
    "recordName",
    "dryRun",
    "once",
    "ipUrl",
    "logLevel",
    "help",
    "version",
];

#[derive(Parser, Clone)]
#[command(name = "ddnsd", version)]
#[command(about = "Keeps a Cloudflare A record pointed at this host's external IP")]
pub struct Cli {
    /// Cloudflare API token with DNS edit permission on the zone
    #[arg(long = "authToken", env = "DDNS_PROVIDER_API_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Cloudflare zone identifier
    #[arg(long = "zoneIdentifier", env = "DDNS_PROVIDER_ZONE_ID")]
    pub zone_identifier: Option<String>,

    /// Fully qualified name of the A record to keep in sync
    #[arg(long = "recordName", env = "DDNS_RECORD_NAME")]
    pub record_name: Option<String>,

    /// Look everything up but only log the update
    #[arg(long = "dryRun")]
    pub dry_run: bool,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Plain-text IP echo endpoint
    #[arg(long = "ipUrl", env = "DDNS_IP_SOURCE_URL", default_value = DEFAULT_IP_LOOKUP_URL)]
    pub ip_url: String,

    /// trace, debug, info, warn or error
    #[arg(long = "logLevel", env = "DDNS_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Operating mode; `dry-run` is the same as --dryRun
    #[arg(long, env = "DDNS_MODE", hide = true)]
    pub mode: Option<String>,
}

// Custom Debug implementation that hides the API token
impl fmt::Debug for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cli")
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<REDACTED>"))
            .field("zone_identifier", &self.zone_identifier)
            .field("record_name", &self.record_name)
            .field("dry_run", &self.dry_run)
            .field("once", &self.once)
            .field("ip_url", &self.ip_url)
            .field("log_level", &self.log_level)
            .field("mode", &self.mode)
            .finish()
    }
}

impl Cli {
    /// Decide whether to start or to print usage
    pub fn launch(&self) -> Launch {
        match self.to_config() {
            Some(config) => Launch::Run(config),
            None => Launch::Usage,
        }
    }

    /// Build the daemon configuration
    ///
    /// Returns `None` if any required parameter is missing or empty.
    pub fn to_config(&self) -> Option<DdnsConfig> {
        let api_token = non_empty(&self.auth_token)?;
        let zone_id = non_empty(&self.zone_identifier)?;
        let record_name = non_empty(&self.record_name)?;

        let mut config = DdnsConfig::new(api_token, zone_id, record_name);
        config.ip_source.url = self.ip_url.clone();
        config.engine.dry_run = self.dry_run_requested();

        Some(config)
    }

    /// Whether updates should only be logged
    pub fn dry_run_requested(&self) -> bool {
        self.dry_run
            || self
                .mode
                .as_deref()
                .is_some_and(|mode| mode.eq_ignore_ascii_case("dry-run"))
    }

    /// Parse the requested log level
    pub fn log_level(&self) -> Result<Level> {
        let level = match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        };
        Ok(level)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Rewrite single-dash long flags (`-authToken`) into `--authToken`
///
/// The first element is the program name and is kept as is. Only known flag
/// names are rewritten, so values that start with a dash pass through.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut normalized: Vec<OsString> = args.next().into_iter().collect();

    for arg in args {
        match arg.to_str() {
            Some(text) if is_single_dash_long_flag(text) => {
                normalized.push(format!("-{}", text).into());
            }
            _ => normalized.push(arg),
        }
    }

    normalized
}

fn is_single_dash_long_flag(arg: &str) -> bool {
    let Some(rest) = arg.strip_prefix('-') else {
        return false;
    };
    if rest.starts_with('-') {
        return false;
    }
    let name = rest.split_once('=').map_or(rest, |(name, _)| name);
    LONG_FLAGS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["ddnsd"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(normalize_args(argv)).unwrap()
    }

    #[test]
    fn missing_parameter_prints_usage_and_exits_cleanly() {
        let cli = parse(&["-authToken", "tok", "-recordName", "home.example.com"]);
        assert!(matches!(cli.launch(), Launch::Usage));

        let mut out = Vec::new();
        let code = usage(&mut out);

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Please provide all required parameters: -authToken, -zoneIdentifier, -recordName\n"
        );
        assert_eq!(code, DdnsExitCode::CleanShutdown);
        assert_eq!(code as u8, 0);
    }

    #[test]
    fn complete_parameters_launch_the_daemon() {
        let cli = parse(&[
            "-authToken",
            "tok",
            "-zoneIdentifier",
            "zone-123",
            "-recordName",
            "home.example.com",
        ]);

        match cli.launch() {
            Launch::Run(config) => assert_eq!(config.record.name, "home.example.com"),
            Launch::Usage => panic!("all parameters were given"),
        }
    }

    #[test]
    fn once_exit_code_follows_the_cycle_result() {
        let ok = Ok(CycleOutcome::Unchanged {
            ip: std::net::Ipv4Addr::new(203, 0, 113, 5),
        });
        let failed = Err(ddns_core::Error::network("connection refused"));

        assert_eq!(DdnsExitCode::for_cycle(&ok), DdnsExitCode::CleanShutdown);
        assert_eq!(DdnsExitCode::for_cycle(&failed), DdnsExitCode::RuntimeError);
        assert_eq!(DdnsExitCode::for_cycle(&failed) as u8, 2);
        assert_eq!(DdnsExitCode::ConfigError as u8, 1);
    }

    #[test]
    fn single_dash_flags_are_rewritten() {
        let args = normalize_args(["ddnsd", "-authToken", "tok", "-recordName=home.example.com"]);
        assert_eq!(
            args,
            vec![
                OsString::from("ddnsd"),
                OsString::from("--authToken"),
                OsString::from("tok"),
                OsString::from("--recordName=home.example.com"),
            ]
        );
    }

    #[test]
    fn unknown_and_double_dash_args_pass_through() {
        let args = normalize_args(["ddnsd", "--once", "-x", "-tok-with-dash", "-h"]);
        assert_eq!(
            args,
            vec![
                OsString::from("ddnsd"),
                OsString::from("--once"),
                OsString::from("-x"),
                OsString::from("-tok-with-dash"),
                OsString::from("-h"),
            ]
        );
    }

    #[test]
    fn go_style_flags_build_config() {
        let cli = parse(&[
            "-authToken",
            "tok",
            "-zoneIdentifier",
            "zone-123",
            "-recordName",
            "home.example.com",
        ]);

        let config = cli.to_config().expect("all parameters given");
        assert_eq!(config.provider.api_token, "tok");
        assert_eq!(config.provider.zone_id, "zone-123");
        assert_eq!(config.record.name, "home.example.com");
        assert_eq!(config.ip_source.url, "https://icanhazip.com/");
        assert!(!config.engine.dry_run);
    }

    #[test]
    fn equals_form_is_accepted() {
        let cli = parse(&[
            "--authToken=tok",
            "--zoneIdentifier=zone-123",
            "--recordName=home.example.com",
            "--ipUrl=http://127.0.0.1:8080/",
        ]);

        let config = cli.to_config().expect("all parameters given");
        assert_eq!(config.ip_source.url, "http://127.0.0.1:8080/");
    }

    #[test]
    fn missing_parameter_yields_no_config() {
        let cli = parse(&["-authToken", "tok", "-zoneIdentifier", "zone-123"]);
        assert!(cli.to_config().is_none());
    }

    #[test]
    fn empty_parameter_counts_as_missing() {
        let cli = parse(&[
            "-authToken",
            "",
            "-zoneIdentifier",
            "zone-123",
            "-recordName",
            "home.example.com",
        ]);
        assert!(cli.to_config().is_none());
    }

    #[test]
    fn dry_run_via_flag_or_mode() {
        assert!(parse(&["-dryRun"]).dry_run_requested());
        assert!(parse(&["--mode", "dry-run"]).dry_run_requested());
        assert!(!parse(&["--mode", "live"]).dry_run_requested());
    }

    #[test]
    fn log_level_is_validated() {
        assert_eq!(parse(&["-logLevel", "DEBUG"]).log_level().unwrap(), Level::DEBUG);
        assert!(parse(&["-logLevel", "loud"]).log_level().is_err());
    }

    #[test]
    fn api_token_not_exposed_in_debug() {
        let cli = parse(&["-authToken", "secret_token_12345"]);
        let debug_str = format!("{:?}", cli);
        assert!(!debug_str.contains("secret_token_12345"));
        assert!(debug_str.contains("<REDACTED>"));
    }
}
