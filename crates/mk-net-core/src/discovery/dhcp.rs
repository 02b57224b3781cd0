//! DHCP-option strategy: next-server address left behind by the DHCP client

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use super::DiscoveryResult;
use crate::traits::DiscoveryStrategy;

/// Reads the next-server option the DHCP client wrote to disk
#[derive(Debug, Clone)]
pub struct DhcpOptionStrategy {
    path: PathBuf,
}

impl DhcpOptionStrategy {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DiscoveryStrategy for DhcpOptionStrategy {
    fn name(&self) -> &'static str {
        "dhcp_option"
    }

    async fn try_discover(&self) -> DiscoveryResult {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => match contents.trim() {
                "" => DiscoveryResult::NotFound,
                addr => DiscoveryResult::DhcpOption(addr.to_string()),
            },
            Err(e) => {
                debug!("Cannot read {}: {}", self.path.display(), e);
                DiscoveryResult::NotFound
            }
        }
    }
}
