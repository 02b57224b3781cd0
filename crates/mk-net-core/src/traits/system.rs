// # System Control Traits
//
// Best-effort side effects applied between readiness attempts.
//
// The detector never propagates failures from these ports: an error is
// logged at warn level and the check carries on.

use async_trait::async_trait;

/// Kernel module inspection and reload
#[async_trait]
pub trait ModuleControl: Send + Sync {
    /// Names of the currently loaded kernel modules, in kernel order
    async fn loaded_modules(&self) -> Result<Vec<String>, crate::Error>;

    /// Unload and load the named module again
    async fn reload(&self, module: &str) -> Result<(), crate::Error>;
}

/// DHCP client service control
#[async_trait]
pub trait DhcpControl: Send + Sync {
    /// Stop and start the DHCP client to force a new lease request
    async fn restart(&self) -> Result<(), crate::Error>;
}
