// # mk-net-core
//
// Core library for the boot agent's network bring-up.
//
// ## Architecture Overview
//
// This library answers two questions during early boot, before any
// higher-level service can start:
// - **ReadinessDetector**: has an interface matching the configured prefix
//   come up with a routable IPv4 address? Polls with exponential backoff,
//   reloads firmware-dependent NIC drivers once and restarts the DHCP client
//   between attempts.
// - **ServerResolver**: where is the provisioning server? Tries an ordered
//   chain of discovery strategies (boot parameter, hostname resolution,
//   DHCP next-server option) and returns the first hit.
//
// Every OS interaction sits behind a port in [`traits`], so the decision
// logic runs unchanged against the Linux implementations in `mk-net-sys`
// or against fakes in tests.
//
// ## Design Principles
//
// 1. **No escaping errors**: port failures are logged and swallowed; outcomes
//    are values (`Outcome`, `DiscoveryResult`), never errors.
// 2. **Single logical thread**: attempts and strategies run strictly in
//    sequence; the only suspension point is the backoff sleep.
// 3. **Library-first**: the `mk-netd` binary is a thin layer over this crate.

pub mod config;
pub mod discovery;
pub mod error;
pub mod readiness;
pub mod traits;

// Re-export core types for convenience
pub use config::{DiscoveryConfig, MkNetConfig, ReadinessConfig, StrategyKind};
pub use discovery::{DiscoveryResult, ServerResolver, server_uri};
pub use error::{Error, Result};
pub use readiness::{AttemptState, InterfaceObservation, Outcome, ReadinessDetector, ReadinessReport};
pub use traits::{DhcpControl, DiscoveryStrategy, HostResolver, InterfaceProvider, ModuleControl};
