//! Boot command line parsing
//!
//! The kernel command line is a single line of whitespace-separated tokens;
//! the ones we care about have the form `key=value`.

use std::path::Path;

/// Provisioning server IP passed by the PXE boot configuration
pub const SERVER_IP_KEY: &str = "razor.ip";

/// Provisioning server hostname passed by the PXE boot configuration
pub const SERVER_NAME_KEY: &str = "razor.server";

/// Parsed boot parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootParams {
    tokens: Vec<String>,
}

impl BootParams {
    /// Split a command line into tokens
    pub fn parse(cmdline: &str) -> Self {
        Self {
            tokens: cmdline.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// Read and parse a command line file (e.g. `/proc/cmdline`)
    pub async fn load(path: &Path) -> crate::Result<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        Ok(Self::parse(&contents))
    }

    /// Every non-empty value given for `key`, in command line order
    pub fn values(&self, key: &str) -> Vec<&str> {
        self.tokens
            .iter()
            .filter_map(|token| token.strip_prefix(key)?.strip_prefix('='))
            .filter(|value| !value.is_empty())
            .collect()
    }

    /// The value of `key` if it is given exactly once
    pub fn unique(&self, key: &str) -> Option<&str> {
        match self.values(key).as_slice() {
            [value] => Some(*value),
            _ => None,
        }
    }
}
