//! Boot-parameter PXE strategy: `razor.ip=<address>`

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, warn};

use super::DiscoveryResult;
use super::cmdline::{BootParams, SERVER_IP_KEY};
use crate::traits::DiscoveryStrategy;

/// Reads the server address straight from the boot command line
#[derive(Debug, Clone)]
pub struct PxeStrategy {
    cmdline_path: PathBuf,
}

impl PxeStrategy {
    pub fn new(cmdline_path: impl Into<PathBuf>) -> Self {
        Self {
            cmdline_path: cmdline_path.into(),
        }
    }

    async fn lookup(&self) -> crate::Result<Option<String>> {
        let params = BootParams::load(&self.cmdline_path).await?;

        match params.values(SERVER_IP_KEY).as_slice() {
            [ip] => Ok(Some(ip.to_string())),
            [] => Ok(None),
            many => {
                warn!(
                    "Ignoring {} conflicting {}= boot parameters",
                    many.len(),
                    SERVER_IP_KEY
                );
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl DiscoveryStrategy for PxeStrategy {
    fn name(&self) -> &'static str {
        "pxe"
    }

    async fn try_discover(&self) -> DiscoveryResult {
        match self.lookup().await {
            Ok(Some(ip)) => DiscoveryResult::Pxe(ip),
            Ok(None) => DiscoveryResult::NotFound,
            Err(e) => {
                debug!(
                    "Cannot read boot parameters from {}: {}",
                    self.cmdline_path.display(),
                    e
                );
                DiscoveryResult::NotFound
            }
        }
    }
}
