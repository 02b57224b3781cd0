//! Capability traits (ports) for the network bring-up core
//!
//! Every interaction with the running system goes through one of these:
//!
//! - [`InterfaceProvider`]: point-in-time interface table
//! - [`ModuleControl`]: loaded kernel modules and driver reload
//! - [`DhcpControl`]: DHCP client restart
//! - [`HostResolver`]: standard name resolution
//! - [`DiscoveryStrategy`]: one way of finding the provisioning server

pub mod discovery;
pub mod interface_provider;
pub mod system;

pub use discovery::{DiscoveryStrategy, HostResolver, SystemResolver};
pub use interface_provider::{InterfaceProvider, InterfaceSnapshot};
pub use system::{DhcpControl, ModuleControl};
