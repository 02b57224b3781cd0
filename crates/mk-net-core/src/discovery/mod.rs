//! Provisioning server discovery
//!
//! The ServerResolver runs an ordered chain of [`DiscoveryStrategy`]
//! implementations and returns the first address any of them produces.
//!
//! ## Default Order
//!
//! 1. **pxe**: `razor.ip=` boot parameter (explicit override wins)
//! 2. **dns**: `razor.server=` boot parameter, or the default hostname,
//!    through standard name resolution
//! 3. **dhcp_option**: next-server address written by the DHCP client
//!
//! Strategies run strictly one after another and the chain short-circuits on
//! the first hit. A strategy that fails reports `NotFound`, so the chain as a
//! whole never errors: exhausting it yields `NotFound`.

mod cmdline;
mod dhcp;
mod dns;
mod pxe;

pub use cmdline::{BootParams, SERVER_IP_KEY, SERVER_NAME_KEY};
pub use dhcp::DhcpOptionStrategy;
pub use dns::HostnameStrategy;
pub use pxe::PxeStrategy;

use crate::config::{DiscoveryConfig, StrategyKind};
use crate::traits::{DiscoveryStrategy, HostResolver, SystemResolver};
use std::net::{IpAddr, Ipv6Addr};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a discovery attempt, tagged with the method that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryResult {
    /// Address from the `razor.ip=` boot parameter
    Pxe(String),
    /// Address resolved from the server hostname
    Dns(IpAddr),
    /// Address from the DHCP next-server option
    DhcpOption(String),
    /// No address found
    NotFound,
}

impl DiscoveryResult {
    /// The discovered address as text
    pub fn address(&self) -> Option<String> {
        match self {
            DiscoveryResult::Pxe(addr) | DiscoveryResult::DhcpOption(addr) => Some(addr.clone()),
            DiscoveryResult::Dns(ip) => Some(ip.to_string()),
            DiscoveryResult::NotFound => None,
        }
    }

    /// Name of the method that found the address
    pub fn method(&self) -> Option<&'static str> {
        match self {
            DiscoveryResult::Pxe(_) => Some("pxe"),
            DiscoveryResult::Dns(_) => Some("dns"),
            DiscoveryResult::DhcpOption(_) => Some("dhcp_option"),
            DiscoveryResult::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, DiscoveryResult::NotFound)
    }
}

/// Ordered discovery chain
pub struct ServerResolver {
    strategies: Vec<Box<dyn DiscoveryStrategy>>,
}

impl ServerResolver {
    /// Create a resolver from strategies, evaluated in the given order
    pub fn new(strategies: Vec<Box<dyn DiscoveryStrategy>>) -> Self {
        Self { strategies }
    }

    /// Build the configured chain
    ///
    /// # Parameters
    ///
    /// - `config`: discovery configuration (paths, default hostname, order)
    /// - `resolver`: name resolution used by the hostname strategy
    pub fn from_config(
        config: &DiscoveryConfig,
        resolver: Arc<dyn HostResolver>,
    ) -> crate::Result<Self> {
        config.validate()?;

        let strategies = config
            .strategies
            .iter()
            .map(|kind| -> Box<dyn DiscoveryStrategy> {
                match kind {
                    StrategyKind::Pxe => Box::new(PxeStrategy::new(&config.cmdline_path)),
                    StrategyKind::Dns => Box::new(HostnameStrategy::new(
                        &config.cmdline_path,
                        config.default_server_hostname.clone(),
                        Arc::clone(&resolver),
                    )),
                    StrategyKind::DhcpOption => {
                        Box::new(DhcpOptionStrategy::new(&config.next_server_file))
                    }
                }
            })
            .collect();

        Ok(Self::new(strategies))
    }

    /// Build the configured chain with the system name service
    pub fn with_system_resolver(config: &DiscoveryConfig) -> crate::Result<Self> {
        Self::from_config(config, Arc::new(SystemResolver))
    }

    /// Names of the strategies, in evaluation order
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run the chain and return the first hit
    pub async fn discover(&self) -> DiscoveryResult {
        for strategy in &self.strategies {
            let result = strategy.try_discover().await;
            if let Some(addr) = result.address() {
                info!("Discovered provisioning server at {} via {}", addr, strategy.name());
                return result;
            }
            debug!("Strategy {} found nothing", strategy.name());
        }

        warn!(
            "No provisioning server found (tried: {})",
            self.strategy_names().join(", ")
        );
        DiscoveryResult::NotFound
    }

    /// Run the chain and return only the address
    pub async fn discover_server_address(&self) -> Option<String> {
        self.discover().await.address()
    }
}

/// Build the provisioning endpoint URL for a discovered address
///
/// IPv6 literals are bracketed.
pub fn server_uri(address: &str, port: u16) -> String {
    if address.parse::<Ipv6Addr>().is_ok() {
        format!("http://[{}]:{}", address, port)
    } else {
        format!("http://{}:{}", address, port)
    }
}
