//! Per-check attempt state
//!
//! `AttemptState` is created fresh for every check and threaded through the
//! retry loop by value: each transition consumes the previous state and
//! returns the next one.

use std::time::Duration;

use super::Outcome;
use super::observation::InterfaceObservation;

/// State of one in-flight readiness check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttemptState {
    /// Failed attempts so far
    pub attempt_count: u32,
    /// Whole seconds since the check began; never decreases
    pub elapsed_secs: u64,
    /// The firmware reload workaround has been considered for this check
    pub firmware_workaround_applied: bool,
    /// Observation from the most recent attempt (`None` if nothing matched)
    pub last_observation: Option<InterfaceObservation>,
    /// Some attempt in this check saw a matching interface with an address
    pub address_seen: bool,
}

impl AttemptState {
    /// Initial state: no attempts, no time elapsed, workaround pending
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a backoff wait has already happened in this check
    pub fn is_retry(&self) -> bool {
        self.attempt_count > 0
    }

    /// The DHCP client is restarted unless the previous attempt saw an address
    pub fn needs_dhcp_restart(&self) -> bool {
        !self
            .last_observation
            .as_ref()
            .is_some_and(|obs| obs.has_address)
    }

    /// Whether the last attempt found a routable address
    pub fn is_ready(&self) -> bool {
        self.last_observation
            .as_ref()
            .is_some_and(InterfaceObservation::has_valid_address)
    }

    /// Record the result of an interface table poll
    pub fn observed(self, observation: Option<InterfaceObservation>) -> Self {
        let saw_address = observation.as_ref().is_some_and(|obs| obs.has_address);
        Self {
            address_seen: self.address_seen || saw_address,
            last_observation: observation,
            ..self
        }
    }

    /// Mark the firmware workaround as done for this check
    pub fn with_firmware_workaround_applied(self) -> Self {
        Self {
            firmware_workaround_applied: true,
            ..self
        }
    }

    /// Count one more failed attempt
    pub fn failed_attempt(self) -> Self {
        Self {
            attempt_count: self.attempt_count.saturating_add(1),
            ..self
        }
    }

    /// Update the elapsed time, measured from the start of the check
    pub fn with_elapsed(self, elapsed: Duration) -> Self {
        Self {
            elapsed_secs: self.elapsed_secs.max(elapsed.as_secs()),
            ..self
        }
    }

    /// Map the final state to the check outcome
    pub fn outcome(&self) -> Outcome {
        if self.is_ready() {
            Outcome::Success
        } else if !self.address_seen {
            Outcome::TimeoutExceeded
        } else {
            Outcome::InvalidAddress
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::InterfaceSnapshot;
    use std::net::Ipv4Addr;

    fn obs(ip: Option<[u8; 4]>) -> Option<InterfaceObservation> {
        let snapshot = InterfaceSnapshot {
            name: "eth0".to_string(),
            ipv4: ip.map(Ipv4Addr::from),
            is_up: true,
        };
        Some(InterfaceObservation::from_snapshot(&snapshot))
    }

    #[test]
    fn fresh_state_is_not_a_retry() {
        let state = AttemptState::new();
        assert!(!state.is_retry());
        assert!(!state.firmware_workaround_applied);
        assert!(state.needs_dhcp_restart());
        assert_eq!(state.outcome(), Outcome::TimeoutExceeded);
    }

    #[test]
    fn elapsed_never_goes_backwards() {
        let state = AttemptState::new()
            .with_elapsed(Duration::from_secs(7))
            .with_elapsed(Duration::from_secs(3));
        assert_eq!(state.elapsed_secs, 7);
    }

    #[test]
    fn link_local_then_nothing_is_invalid_address() {
        let state = AttemptState::new()
            .observed(obs(Some([169, 254, 1, 1])))
            .failed_attempt()
            .observed(None)
            .failed_attempt();
        assert_eq!(state.attempt_count, 2);
        assert!(state.address_seen);
        assert!(state.needs_dhcp_restart());
        assert_eq!(state.outcome(), Outcome::InvalidAddress);
    }

    #[test]
    fn addressed_observation_suppresses_dhcp_restart() {
        let state = AttemptState::new().observed(obs(Some([169, 254, 1, 1])));
        assert!(!state.needs_dhcp_restart());
        assert!(!state.is_ready());
    }

    #[test]
    fn routable_observation_is_success() {
        let state = AttemptState::new().observed(obs(Some([10, 0, 0, 9])));
        assert!(state.is_ready());
        assert_eq!(state.outcome(), Outcome::Success);
    }
}
