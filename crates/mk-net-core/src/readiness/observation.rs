//! Interface observation and classification
//!
//! An observation is derived fresh from every interface table snapshot and
//! never outlives the attempt that produced it.

use serde::Serialize;
use std::net::Ipv4Addr;

use crate::traits::InterfaceSnapshot;

/// Classified view of the interface selected during one attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceObservation {
    /// Interface name
    pub name: String,
    /// Whether the interface reported an IPv4 address
    pub has_address: bool,
    /// The reported IPv4 address
    pub address: Option<Ipv4Addr>,
    /// Address is in 127.0.0.0/8
    pub is_loopback: bool,
    /// Address is in 169.254.0.0/16 (DHCP gave up, autoconfig kicked in)
    pub is_link_local: bool,
}

impl InterfaceObservation {
    /// Classify one interface table row
    pub fn from_snapshot(snapshot: &InterfaceSnapshot) -> Self {
        Self {
            name: snapshot.name.clone(),
            has_address: snapshot.ipv4.is_some(),
            address: snapshot.ipv4,
            is_loopback: snapshot.ipv4.is_some_and(|ip| ip.is_loopback()),
            is_link_local: snapshot.ipv4.is_some_and(|ip| ip.is_link_local()),
        }
    }

    /// True only for an assigned address outside the loopback and link-local ranges
    pub fn has_valid_address(&self) -> bool {
        self.has_address && !self.is_loopback && !self.is_link_local
    }
}

/// Whether `name` is `prefix` followed by one or more ASCII digits
pub fn matches_prefix(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .is_some_and(|suffix| !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()))
}

/// Select and classify the relevant interface from a table snapshot
///
/// Interfaces that are down are not candidates, whatever address they keep.
/// Among up interfaces matching the prefix, in table order: the first with a
/// valid address, else the first with any address, else the first match.
pub fn observe(table: &[InterfaceSnapshot], prefix: &str) -> Option<InterfaceObservation> {
    let candidates: Vec<InterfaceObservation> = table
        .iter()
        .filter(|iface| iface.is_up && matches_prefix(&iface.name, prefix))
        .map(InterfaceObservation::from_snapshot)
        .collect();

    let index = candidates
        .iter()
        .position(InterfaceObservation::has_valid_address)
        .or_else(|| candidates.iter().position(|obs| obs.has_address))
        .unwrap_or(0);

    candidates.into_iter().nth(index)
}
