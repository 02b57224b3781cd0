//! Configuration types for the network bring-up system
//!
//! This module defines all configuration structures used throughout the crate.
//! Every field has a default matching the microkernel image layout, so an
//! empty JSON object deserializes into a working configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MkNetConfig {
    /// Readiness detector settings
    #[serde(default)]
    pub readiness: ReadinessConfig,

    /// Server discovery settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

impl MkNetConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.readiness.validate()?;
        self.discovery.validate()?;
        Ok(())
    }
}

/// Readiness detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessConfig {
    /// Interface name prefix; matching names are this prefix plus digits (e.g. "eth" -> "eth0")
    #[serde(default = "default_interface_prefix")]
    pub interface_prefix: String,

    /// Soft ceiling on the whole check, in seconds
    ///
    /// Checked once per attempt after the backoff sleep, so the check can
    /// overrun it by up to one backoff interval.
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,

    /// Kernel module name prefixes of NIC drivers that need their firmware
    /// reloaded after early boot (first loaded match is reloaded once per check)
    #[serde(default = "default_firmware_module_prefixes")]
    pub firmware_module_prefixes: Vec<String>,
}

impl ReadinessConfig {
    /// Set the interface prefix
    pub fn with_interface_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.interface_prefix = prefix.into();
        self
    }

    /// Set the maximum wait
    pub fn with_max_wait_secs(mut self, secs: u64) -> Self {
        self.max_wait_secs = secs;
        self
    }

    /// Replace the firmware-dependent module prefixes
    pub fn with_firmware_module_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.firmware_module_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Validate the readiness configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.interface_prefix.is_empty() {
            return Err(crate::Error::config("Interface prefix cannot be empty"));
        }
        if self.interface_prefix.chars().any(|c| c.is_ascii_digit() || c.is_whitespace()) {
            return Err(crate::Error::config(format!(
                "Interface prefix '{}' must not contain digits or whitespace",
                self.interface_prefix
            )));
        }
        if self.firmware_module_prefixes.iter().any(|p| p.is_empty()) {
            return Err(crate::Error::config(
                "Firmware module prefixes cannot contain empty entries",
            ));
        }
        Ok(())
    }
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            interface_prefix: default_interface_prefix(),
            max_wait_secs: default_max_wait_secs(),
            firmware_module_prefixes: default_firmware_module_prefixes(),
        }
    }
}

/// Discovery strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// `razor.ip=` boot parameter
    Pxe,
    /// `razor.server=` boot parameter (or the default hostname) via name resolution
    Dns,
    /// Next-server address written by the DHCP client
    DhcpOption,
}

impl StrategyKind {
    /// Stable name used in logs and environment configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Pxe => "pxe",
            StrategyKind::Dns => "dns",
            StrategyKind::DhcpOption => "dhcp_option",
        }
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pxe" => Ok(StrategyKind::Pxe),
            "dns" | "hostname" => Ok(StrategyKind::Dns),
            "dhcp" | "dhcp_option" => Ok(StrategyKind::DhcpOption),
            other => Err(crate::Error::config(format!(
                "Unknown discovery strategy '{}'. Supported: pxe, dns, dhcp",
                other
            ))),
        }
    }
}

/// Server discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Boot command line file
    #[serde(default = "default_cmdline_path")]
    pub cmdline_path: PathBuf,

    /// File the DHCP client fills with the next-server option
    #[serde(default = "default_next_server_file")]
    pub next_server_file: PathBuf,

    /// Hostname resolved when no `razor.server=` parameter is given
    #[serde(default = "default_server_hostname")]
    pub default_server_hostname: String,

    /// Port of the provisioning endpoint built from the discovered address
    #[serde(default = "default_server_port")]
    pub server_port: u16,

    /// Strategy evaluation order
    #[serde(default = "default_strategies")]
    pub strategies: Vec<StrategyKind>,
}

impl DiscoveryConfig {
    /// Validate the discovery configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.strategies.is_empty() {
            return Err(crate::Error::config("At least one discovery strategy is required"));
        }
        for (i, kind) in self.strategies.iter().enumerate() {
            if self.strategies[..i].contains(kind) {
                return Err(crate::Error::config(format!(
                    "Discovery strategy '{}' listed more than once",
                    kind.as_str()
                )));
            }
        }
        if self.default_server_hostname.trim().is_empty() {
            return Err(crate::Error::config("Default server hostname cannot be empty"));
        }
        if self.server_port == 0 {
            return Err(crate::Error::config("Server port must be > 0"));
        }
        Ok(())
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            cmdline_path: default_cmdline_path(),
            next_server_file: default_next_server_file(),
            default_server_hostname: default_server_hostname(),
            server_port: default_server_port(),
            strategies: default_strategies(),
        }
    }
}

fn default_interface_prefix() -> String {
    "eth".to_string()
}

fn default_max_wait_secs() -> u64 {
    120
}

fn default_firmware_module_prefixes() -> Vec<String> {
    vec!["bnx2".to_string()]
}

fn default_cmdline_path() -> PathBuf {
    PathBuf::from("/proc/cmdline")
}

fn default_next_server_file() -> PathBuf {
    PathBuf::from("/tmp/nextServerIP.addr")
}

fn default_server_hostname() -> String {
    "razor".to_string()
}

fn default_server_port() -> u16 {
    8026
}

fn default_strategies() -> Vec<StrategyKind> {
    vec![StrategyKind::Pxe, StrategyKind::Dns, StrategyKind::DhcpOption]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config: MkNetConfig = serde_json::from_str("{}").unwrap();

        assert_eq!(config.readiness.interface_prefix, "eth");
        assert_eq!(config.readiness.max_wait_secs, 120);
        assert_eq!(config.readiness.firmware_module_prefixes, vec!["bnx2"]);
        assert_eq!(config.discovery.cmdline_path, PathBuf::from("/proc/cmdline"));
        assert_eq!(config.discovery.server_port, 8026);
        assert_eq!(
            config.discovery.strategies,
            vec![StrategyKind::Pxe, StrategyKind::Dns, StrategyKind::DhcpOption]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn strategies_deserialize_snake_case() {
        let config: DiscoveryConfig =
            serde_json::from_str(r#"{"strategies": ["dhcp_option", "pxe"]}"#).unwrap();
        assert_eq!(config.strategies, vec![StrategyKind::DhcpOption, StrategyKind::Pxe]);
    }

    #[test]
    fn duplicate_strategy_is_rejected() {
        let config = DiscoveryConfig {
            strategies: vec![StrategyKind::Pxe, StrategyKind::Dns, StrategyKind::Pxe],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_strategy_list_is_rejected() {
        let config = DiscoveryConfig {
            strategies: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn interface_prefix_must_be_plain_text() {
        assert!(ReadinessConfig::default().with_interface_prefix("").validate().is_err());
        assert!(ReadinessConfig::default().with_interface_prefix("eth0").validate().is_err());
        assert!(ReadinessConfig::default().with_interface_prefix("enp").validate().is_ok());
    }

    #[test]
    fn strategy_names_parse() {
        assert_eq!("pxe".parse::<StrategyKind>().unwrap(), StrategyKind::Pxe);
        assert_eq!(" DNS ".parse::<StrategyKind>().unwrap(), StrategyKind::Dns);
        assert_eq!("dhcp".parse::<StrategyKind>().unwrap(), StrategyKind::DhcpOption);
        assert!("mdns".parse::<StrategyKind>().is_err());
    }
}
