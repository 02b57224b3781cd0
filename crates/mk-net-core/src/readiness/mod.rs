//! Network readiness detector
//!
//! The ReadinessDetector is responsible for:
//! - Polling the interface table for a matching, addressed interface
//! - Classifying the address (loopback and link-local are not usable)
//! - Applying the NIC firmware reload workaround once per check
//! - Restarting the DHCP client between attempts that saw no address
//! - Backing off exponentially until success or the wait ceiling
//!
//! ## Architecture
//!
//! ```text
//!                     ┌────────────────────┐
//!                     │ ReadinessDetector  │── AttemptState (by value)
//!                     └────────────────────┘
//!                               │
//!         ┌─────────────────────┼─────────────────────┐
//!         │                     │                     │
//!         ▼                     ▼                     ▼
//! ┌───────────────────┐ ┌───────────────┐   ┌───────────────┐
//! │ InterfaceProvider │ │ ModuleControl │   │  DhcpControl  │
//! │ (snapshot)        │ │ (reload once) │   │  (restart)    │
//! └───────────────────┘ └───────────────┘   └───────────────┘
//! ```
//!
//! ## Attempt Flow
//!
//! 1. On a retry: reload the first firmware-dependent module (first retry
//!    only), restart DHCP if the previous attempt saw no address
//! 2. Snapshot the interface table and classify the selected interface
//! 3. Stop on a routable address
//! 4. Otherwise count the failure, sleep `backoff_secs(count)`, update elapsed
//! 5. Stop once elapsed reaches the ceiling

mod backoff;
mod observation;
mod state;

pub use backoff::backoff_secs;
pub use observation::{InterfaceObservation, matches_prefix, observe};
pub use state::AttemptState;

use crate::config::ReadinessConfig;
use crate::traits::{DhcpControl, InterfaceProvider, ModuleControl};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Result of a readiness check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A matching interface has a routable IPv4 address
    Success,
    /// No matching interface ever reported an address
    TimeoutExceeded,
    /// A matching interface had an address, but never a routable one
    InvalidAddress,
}

impl Outcome {
    /// Numeric code handed to the boot orchestrator
    pub fn code(self) -> i32 {
        match self {
            Outcome::Success => 0,
            Outcome::TimeoutExceeded => -1,
            Outcome::InvalidAddress => -2,
        }
    }

    pub fn is_success(self) -> bool {
        self == Outcome::Success
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Outcome::Success => "network available",
            Outcome::TimeoutExceeded => "maximum wait time exceeded, network not found",
            Outcome::InvalidAddress => "DHCP address assignment failed",
        };
        f.write_str(text)
    }
}

/// Summary of one completed check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadinessReport {
    /// Three-valued result
    pub outcome: Outcome,
    /// Failed attempts before the check ended
    pub attempts: u32,
    /// Monotonic time spent in the check
    pub elapsed: Duration,
    /// Module reloaded by the firmware workaround, if any
    pub firmware_module_reloaded: Option<String>,
    /// Observation from the final attempt
    pub last_observation: Option<InterfaceObservation>,
    /// Wall-clock start of the check
    pub started_at: DateTime<Utc>,
}

/// Network readiness detector
///
/// Owns the ports it needs for one or more sequential checks. Each check
/// starts from a fresh [`AttemptState`]; no state carries over between checks.
pub struct ReadinessDetector {
    /// Interface table source
    interfaces: Box<dyn InterfaceProvider>,

    /// Kernel module inspection and reload
    modules: Box<dyn ModuleControl>,

    /// DHCP client control
    dhcp: Box<dyn DhcpControl>,

    /// Prefix, ceiling and firmware module families
    config: ReadinessConfig,
}

impl ReadinessDetector {
    /// Create a new detector
    ///
    /// # Parameters
    ///
    /// - `interfaces`: interface table implementation
    /// - `modules`: kernel module control implementation
    /// - `dhcp`: DHCP client control implementation
    /// - `config`: readiness configuration
    pub fn new(
        interfaces: Box<dyn InterfaceProvider>,
        modules: Box<dyn ModuleControl>,
        dhcp: Box<dyn DhcpControl>,
        config: ReadinessConfig,
    ) -> crate::Result<Self> {
        config.validate()?;

        Ok(Self {
            interfaces,
            modules,
            dhcp,
            config,
        })
    }

    /// Run a check with the configured prefix and ceiling
    pub async fn check(&self) -> ReadinessReport {
        self.run_check(&self.config.interface_prefix, self.config.max_wait_secs)
            .await
    }

    /// Wait until an interface named `interface_prefix` + digits has a routable address
    ///
    /// Never fails; every result is one of the three outcomes.
    pub async fn check_network_ready(&self, interface_prefix: &str, max_wait_secs: u64) -> Outcome {
        self.run_check(interface_prefix, max_wait_secs).await.outcome
    }

    /// Run a check and return the full report
    pub async fn run_check(&self, interface_prefix: &str, max_wait_secs: u64) -> ReadinessReport {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut state = AttemptState::new();
        let mut reloaded = None;

        info!(
            "Looking for network on {}N, this is attempt #{}",
            interface_prefix,
            state.attempt_count + 1
        );

        loop {
            if state.is_retry() {
                if !state.firmware_workaround_applied {
                    reloaded = self.reload_firmware_module().await;
                    state = state.with_firmware_workaround_applied();
                }
                if state.needs_dhcp_restart() {
                    self.restart_dhcp().await;
                }
            }

            let observation = self.poll(interface_prefix).await;
            state = state.observed(observation);

            if state.is_ready() {
                break;
            }

            state = state.failed_attempt();
            let wait_secs = backoff_secs(state.attempt_count);
            info!(
                "Attempt #{} failed; sleeping for {} secs and retrying...",
                state.attempt_count, wait_secs
            );
            tokio::time::sleep(Duration::from_secs(wait_secs)).await;

            state = state.with_elapsed(start.elapsed());
            if state.elapsed_secs >= max_wait_secs {
                debug!(
                    "Gave up after {}s (ceiling {}s)",
                    state.elapsed_secs, max_wait_secs
                );
                break;
            }
        }

        let outcome = state.outcome();
        match outcome {
            Outcome::Success => info!(
                "Network available on {} ({})",
                state
                    .last_observation
                    .as_ref()
                    .map_or("?", |obs| obs.name.as_str()),
                state
                    .last_observation
                    .as_ref()
                    .and_then(|obs| obs.address)
                    .map_or_else(|| "?".to_string(), |ip| ip.to_string()),
            ),
            _ => warn!("Readiness check ended: {}", outcome),
        }

        ReadinessReport {
            outcome,
            attempts: state.attempt_count,
            elapsed: start.elapsed(),
            firmware_module_reloaded: reloaded,
            last_observation: state.last_observation,
            started_at,
        }
    }

    /// Snapshot and classify; a failed snapshot counts as "nothing matched"
    async fn poll(&self, interface_prefix: &str) -> Option<InterfaceObservation> {
        match self.interfaces.snapshot().await {
            Ok(table) => {
                debug!("Interface table: {:?}", table);
                observe(&table, interface_prefix)
            }
            Err(e) => {
                warn!("Failed to read interface table: {}", e);
                None
            }
        }
    }

    /// Reload the first loaded module of a firmware-dependent family
    ///
    /// Returns the module name only if the reload succeeded.
    async fn reload_firmware_module(&self) -> Option<String> {
        let loaded = match self.modules.loaded_modules().await {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!("Failed to list kernel modules: {}", e);
                return None;
            }
        };

        let module = loaded.into_iter().find(|name| {
            self.config
                .firmware_module_prefixes
                .iter()
                .any(|prefix| name.starts_with(prefix.as_str()))
        })?;

        info!("No NICs found; reloading network firmware module {}...", module);
        match self.modules.reload(&module).await {
            Ok(()) => Some(module),
            Err(e) => {
                warn!("Failed to reload module {}: {}", module, e);
                None
            }
        }
    }

    async fn restart_dhcp(&self) {
        info!("No valid IP addresses found; restarting DHCP client...");
        if let Err(e) = self.dhcp.restart().await {
            warn!("Failed to restart DHCP client: {}", e);
        }
    }
}
