//! Boot-parameter hostname strategy: `razor.server=<host>`, resolved by name

use async_trait::async_trait;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use super::DiscoveryResult;
use super::cmdline::{BootParams, SERVER_NAME_KEY};
use crate::traits::{DiscoveryStrategy, HostResolver};

/// Resolves the server hostname from the boot command line, or a default name
pub struct HostnameStrategy {
    cmdline_path: PathBuf,
    default_hostname: String,
    resolver: Arc<dyn HostResolver>,
}

impl HostnameStrategy {
    pub fn new(
        cmdline_path: impl Into<PathBuf>,
        default_hostname: impl Into<String>,
        resolver: Arc<dyn HostResolver>,
    ) -> Self {
        Self {
            cmdline_path: cmdline_path.into(),
            default_hostname: default_hostname.into(),
            resolver,
        }
    }

    async fn lookup(&self) -> crate::Result<Option<IpAddr>> {
        let params = BootParams::load(&self.cmdline_path).await?;
        let hostname = params
            .unique(SERVER_NAME_KEY)
            .unwrap_or(&self.default_hostname);

        debug!("Resolving provisioning server hostname {}", hostname);
        let addrs = self.resolver.resolve(hostname).await?;
        Ok(addrs.into_iter().next())
    }
}

#[async_trait]
impl DiscoveryStrategy for HostnameStrategy {
    fn name(&self) -> &'static str {
        "dns"
    }

    async fn try_discover(&self) -> DiscoveryResult {
        match self.lookup().await {
            Ok(Some(ip)) => DiscoveryResult::Dns(ip),
            Ok(None) => DiscoveryResult::NotFound,
            Err(e) => {
                debug!("Hostname discovery failed: {}", e);
                DiscoveryResult::NotFound
            }
        }
    }
}
