// # mk-netd - microkernel network bring-up
//
// Runs once during early boot, before any network-dependent service:
// 1. Waits for an interface matching the configured prefix to get a
//    routable IPv4 address
// 2. Discovers the provisioning server address
// 3. Prints the provisioning endpoint URL on stdout (and optionally merges
//    it into the microkernel's YAML config file)
//
// All decision logic lives in mk-net-core; this binary only wires the Linux
// ports to it and turns outcomes into exit codes.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Readiness
// - `MK_ETH_PREFIX`: Interface name prefix (default: eth)
// - `MK_MAX_WAIT_SECS`: Soft ceiling on the wait (default: 120)
// - `MK_FIRMWARE_MODULES`: Comma-separated firmware-dependent module prefixes (default: bnx2)
// - `MK_PROC_MODULES`: Loaded module table (default: /proc/modules)
// - `MK_DHCP_SCRIPT`: DHCP client init script (default: /etc/init.d/services/dhcp)
// - `MK_USE_SUDO`: Run system commands through sudo (default: true)
//
// ### Discovery
// - `MK_CMDLINE_PATH`: Boot command line (default: /proc/cmdline)
// - `MK_NEXT_SERVER_FILE`: DHCP next-server file (default: /tmp/nextServerIP.addr)
// - `MK_SERVER_HOSTNAME`: Hostname resolved without `razor.server=` (default: razor)
// - `MK_SERVER_PORT`: Provisioning endpoint port (default: 8026)
// - `MK_DISCOVERY_ORDER`: Comma-separated strategies (default: pxe,dns,dhcp)
//
// ### Daemon
// - `MK_SETTLE_SECS`: Delay between network readiness and discovery (default: 5)
// - `MK_CONF_FILE`: YAML config file to receive `mk_uri`, e.g. /tmp/mk_conf.yaml (optional)
// - `MK_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Exit codes
//
// | code | meaning                                   |
// |------|-------------------------------------------|
// | 0    | network up, endpoint printed              |
// | 1    | configuration error                       |
// | 2    | runtime error                             |
// | 3    | network up but no server found            |
// | 255  | timeout exceeded (-1), no address at all  |
// | 254  | invalid address (-2), e.g. link-local     |

mod conf_file;

use anyhow::{Context, Result};
use mk_net_core::{MkNetConfig, Outcome, ReadinessDetector, ServerResolver, StrategyKind, server_uri};
use mk_net_sys::SysConfig;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for the boot orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MkExitCode {
    /// Network up and server discovered
    Ready,
    /// Configuration error or startup failure
    ConfigError,
    /// Runtime error (unexpected failure)
    RuntimeError,
    /// Network up, but every discovery strategy came up empty
    DiscoveryFailed,
    /// Readiness check failed with the given outcome
    Network(Outcome),
}

impl From<MkExitCode> for ExitCode {
    fn from(code: MkExitCode) -> Self {
        let status: u8 = match code {
            MkExitCode::Ready => 0,
            MkExitCode::ConfigError => 1,
            MkExitCode::RuntimeError => 2,
            MkExitCode::DiscoveryFailed => 3,
            // the shell sees the negative outcome codes modulo 256
            MkExitCode::Network(outcome) => outcome.code() as u8,
        };
        ExitCode::from(status)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    net: MkNetConfig,
    sys: SysConfig,
    settle_secs: u64,
    conf_file: Option<PathBuf>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut net = MkNetConfig::new();
        let mut sys = SysConfig::default();

        if let Some(prefix) = lookup("MK_ETH_PREFIX") {
            net.readiness.interface_prefix = prefix.trim().to_string();
        }
        if let Some(secs) = parse_var(&lookup, "MK_MAX_WAIT_SECS")? {
            net.readiness.max_wait_secs = secs;
        }
        if let Some(modules) = lookup("MK_FIRMWARE_MODULES") {
            net.readiness.firmware_module_prefixes = split_list(&modules);
        }
        if let Some(path) = lookup("MK_PROC_MODULES") {
            sys.proc_modules_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("MK_DHCP_SCRIPT") {
            sys.dhcp_service_script = PathBuf::from(path);
        }
        if let Some(use_sudo) = parse_var(&lookup, "MK_USE_SUDO")? {
            sys.use_sudo = use_sudo;
        }

        if let Some(path) = lookup("MK_CMDLINE_PATH") {
            net.discovery.cmdline_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("MK_NEXT_SERVER_FILE") {
            net.discovery.next_server_file = PathBuf::from(path);
        }
        if let Some(hostname) = lookup("MK_SERVER_HOSTNAME") {
            net.discovery.default_server_hostname = hostname.trim().to_string();
        }
        if let Some(port) = parse_var(&lookup, "MK_SERVER_PORT")? {
            net.discovery.server_port = port;
        }
        if let Some(order) = lookup("MK_DISCOVERY_ORDER") {
            net.discovery.strategies = split_list(&order)
                .iter()
                .map(|name| StrategyKind::from_str(name))
                .collect::<mk_net_core::Result<Vec<_>>>()
                .context("MK_DISCOVERY_ORDER")?;
        }

        Ok(Self {
            net,
            sys,
            settle_secs: parse_var(&lookup, "MK_SETTLE_SECS")?.unwrap_or(5),
            conf_file: lookup("MK_CONF_FILE")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
            log_level: lookup("MK_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.net.validate()?;

        if self.settle_secs > 300 {
            anyhow::bail!(
                "MK_SETTLE_SECS must be at most 300 seconds. Got: {}",
                self.settle_secs
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "MK_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }
}

/// Parse an optional variable, failing on malformed values
fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e)),
        None => Ok(None),
    }
}

/// Split a comma-separated list, dropping blanks
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return MkExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return MkExitCode::ConfigError.into();
    }

    // Initialize tracing; stdout is reserved for the endpoint URL
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return MkExitCode::ConfigError.into();
    }

    info!("Starting mk-netd");

    // Single logical thread of control
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return MkExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run(config).await {
            Ok(code) => code,
            Err(e) => {
                error!("mk-netd error: {:#}", e);
                MkExitCode::RuntimeError
            }
        }
    });

    code.into()
}

/// Wait for the network, then discover the server
async fn run(config: Config) -> Result<MkExitCode> {
    let ports = mk_net_sys::system_ports(&config.sys);
    let detector = ReadinessDetector::new(
        ports.interfaces,
        ports.modules,
        ports.dhcp,
        config.net.readiness.clone(),
    )?;

    let report = detector.check().await;
    debug!(
        "Readiness report: {}",
        serde_json::to_string(&report).unwrap_or_default()
    );

    if !report.outcome.is_success() {
        error!("{}, exiting...", report.outcome);
        return Ok(MkExitCode::Network(report.outcome));
    }

    info!("Network is available, proceeding...");
    tokio::time::sleep(Duration::from_secs(config.settle_secs)).await;

    let resolver = ServerResolver::with_system_resolver(&config.net.discovery)?;
    let Some(address) = resolver.discover_server_address().await else {
        error!("Provisioning server could not be discovered, exiting...");
        return Ok(MkExitCode::DiscoveryFailed);
    };

    let uri = server_uri(&address, config.net.discovery.server_port);
    info!("Discovered provisioning server at: {}", address);
    println!("{}", uri);

    if let Some(path) = &config.conf_file {
        conf_file::persist_mk_uri(path, &uri).await?;
        info!("Wrote {} to {}", uri, path.display());
    }

    Ok(MkExitCode::Ready)
}
