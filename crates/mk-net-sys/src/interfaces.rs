//! Interface table from the datalink layer

use async_trait::async_trait;
use mk_net_core::traits::{InterfaceProvider, InterfaceSnapshot};

/// Interface table read through `pnet::datalink`
///
/// One row per interface name, in OS order, carrying its first IPv4 address.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatalinkInterfaces;

impl DatalinkInterfaces {
    pub fn new() -> Self {
        Self
    }
}

/// Reduce one datalink interface to a table row
#[cfg(target_os = "linux")]
fn snapshot_of(name: &str, ips: &[pnet::ipnetwork::IpNetwork], is_up: bool) -> InterfaceSnapshot {
    use pnet::ipnetwork::IpNetwork;

    let ipv4 = ips.iter().find_map(|net| match net {
        IpNetwork::V4(v4) => Some(v4.ip()),
        IpNetwork::V6(_) => None,
    });

    InterfaceSnapshot {
        name: name.to_string(),
        ipv4,
        is_up,
    }
}

#[cfg(target_os = "linux")]
#[async_trait]
impl InterfaceProvider for DatalinkInterfaces {
    async fn snapshot(&self) -> mk_net_core::Result<Vec<InterfaceSnapshot>> {
        // the datalink enumeration is a blocking syscall
        let table = tokio::task::spawn_blocking(|| {
            pnet::datalink::interfaces()
                .iter()
                .map(|iface| snapshot_of(&iface.name, &iface.ips, iface.is_up()))
                .collect::<Vec<_>>()
        })
        .await
        .map_err(|e| mk_net_core::Error::interface_provider(format!("Interface enumeration task failed: {}", e)))?;

        Ok(table)
    }
}

#[cfg(not(target_os = "linux"))]
#[async_trait]
impl InterfaceProvider for DatalinkInterfaces {
    async fn snapshot(&self) -> mk_net_core::Result<Vec<InterfaceSnapshot>> {
        Err(mk_net_core::Error::interface_provider(
            "Interface enumeration is only supported on Linux",
        ))
    }
}
