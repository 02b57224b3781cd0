// # Interface Provider Trait
//
// Defines the interface for reading the OS network interface table.
//
// ## Implementations
//
// - datalink-based (Linux): `mk-net-sys` crate
// - Scripted fakes: `mk-net-core/tests/common`
//
// ## Usage
//
// ```rust,ignore
// use mk_net_core::InterfaceProvider;
//
// let provider = /* InterfaceProvider implementation */;
// for iface in provider.snapshot().await? {
//     println!("{} -> {:?}", iface.name, iface.ipv4);
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// One row of the OS interface table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSnapshot {
    /// Interface name as reported by the OS (e.g. "eth0")
    pub name: String,
    /// First IPv4 address assigned to the interface, if any
    pub ipv4: Option<Ipv4Addr>,
    /// Whether the interface is administratively up
    pub is_up: bool,
}

impl InterfaceSnapshot {
    /// An interface that is up and has no IPv4 address yet
    pub fn without_address(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ipv4: None,
            is_up: true,
        }
    }

    /// An interface that is up with the given IPv4 address
    pub fn with_address(name: impl Into<String>, ipv4: Ipv4Addr) -> Self {
        Self {
            name: name.into(),
            ipv4: Some(ipv4),
            is_up: true,
        }
    }
}

/// Trait for interface table implementations
///
/// Implementations are **observers**: they report what the OS sees and never
/// configure interfaces themselves.
#[async_trait]
pub trait InterfaceProvider: Send + Sync {
    /// Take a fresh snapshot of all interfaces, in OS order
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<InterfaceSnapshot>)`: one entry per interface
    /// - `Err(Error)`: If the table could not be read
    async fn snapshot(&self) -> Result<Vec<InterfaceSnapshot>, crate::Error>;
}
