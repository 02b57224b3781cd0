// # Discovery Traits
//
// A discovery strategy is one independent way to learn the provisioning
// server address. Strategies never fail: anything that goes wrong is
// reported as `DiscoveryResult::NotFound` so the resolver can fall through
// to the next one.

use async_trait::async_trait;
use std::net::IpAddr;

use crate::discovery::DiscoveryResult;

/// Trait for server discovery strategies
#[async_trait]
pub trait DiscoveryStrategy: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Try to discover the server address
    ///
    /// Must not mutate any state: calling it twice against unchanged inputs
    /// yields the same result.
    async fn try_discover(&self) -> DiscoveryResult;
}

/// Standard host name resolution
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Resolve a host name to its addresses, in resolver order
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, crate::Error>;
}

/// Resolver backed by the system's name service (via tokio)
///
/// IPv4 answers are listed before IPv6 ones; order within each family is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl HostResolver for SystemResolver {
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, crate::Error> {
        let addrs = tokio::net::lookup_host((host, 0))
            .await
            .map_err(|e| crate::Error::resolution(format!("{}: {}", host, e)))?;

        Ok(ipv4_first(addrs.map(|addr| addr.ip())))
    }
}

/// Stable partition: IPv4 addresses first
fn ipv4_first(addrs: impl IntoIterator<Item = IpAddr>) -> Vec<IpAddr> {
    let (mut v4, v6): (Vec<IpAddr>, Vec<IpAddr>) = addrs.into_iter().partition(IpAddr::is_ipv4);
    v4.extend(v6);
    v4
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn ipv4_answers_come_first() {
        let v6 = IpAddr::V6(Ipv6Addr::new(0xfd00, 0, 0, 0, 0, 0, 0, 5));
        let a = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5));
        let b = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 6));

        assert_eq!(ipv4_first([v6, a, b]), vec![a, b, v6]);
        assert_eq!(ipv4_first([v6]), vec![v6]);
    }
}
