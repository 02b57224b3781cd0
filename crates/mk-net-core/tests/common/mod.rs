//! Test doubles and common utilities for contract tests
//!
//! Every double is `Clone`; clones share their script and counters, so a
//! test can hand one clone to the detector or resolver and keep another to
//! inspect afterwards.

#![allow(dead_code)]

use async_trait::async_trait;
use mk_net_core::config::{DiscoveryConfig, ReadinessConfig};
use mk_net_core::error::{Error, Result};
use mk_net_core::traits::{
    DhcpControl, HostResolver, InterfaceProvider, InterfaceSnapshot, ModuleControl,
};
use mk_net_core::ReadinessDetector;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Interface table that plays back a script, one table per poll
///
/// The last table repeats once the script is exhausted.
#[derive(Clone)]
pub struct ScriptedInterfaces {
    script: Arc<Vec<Vec<InterfaceSnapshot>>>,
    poll_count: Arc<AtomicUsize>,
}

impl ScriptedInterfaces {
    pub fn new(script: Vec<Vec<InterfaceSnapshot>>) -> Self {
        assert!(!script.is_empty(), "script needs at least one table");
        Self {
            script: Arc::new(script),
            poll_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The same table on every poll
    pub fn constant(table: Vec<InterfaceSnapshot>) -> Self {
        Self::new(vec![table])
    }

    /// Number of snapshots taken so far
    pub fn poll_count(&self) -> usize {
        self.poll_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InterfaceProvider for ScriptedInterfaces {
    async fn snapshot(&self) -> Result<Vec<InterfaceSnapshot>> {
        let n = self.poll_count.fetch_add(1, Ordering::SeqCst);
        let index = n.min(self.script.len() - 1);
        Ok(self.script[index].clone())
    }
}

/// Interface table that can never be read
#[derive(Clone, Default)]
pub struct BrokenInterfaces {
    poll_count: Arc<AtomicUsize>,
}

impl BrokenInterfaces {
    pub fn poll_count(&self) -> usize {
        self.poll_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InterfaceProvider for BrokenInterfaces {
    async fn snapshot(&self) -> Result<Vec<InterfaceSnapshot>> {
        self.poll_count.fetch_add(1, Ordering::SeqCst);
        Err(Error::interface_provider("netlink socket unavailable"))
    }
}

/// Module control that records list and reload calls
#[derive(Clone, Default)]
pub struct RecordingModules {
    loaded: Vec<String>,
    fail: bool,
    list_calls: Arc<AtomicUsize>,
    reloaded: Arc<Mutex<Vec<String>>>,
}

impl RecordingModules {
    pub fn with_loaded(loaded: &[&str]) -> Self {
        Self {
            loaded: loaded.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Every call fails
    pub fn failing(loaded: &[&str]) -> Self {
        Self {
            fail: true,
            ..Self::with_loaded(loaded)
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn reloaded(&self) -> Vec<String> {
        self.reloaded.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModuleControl for RecordingModules {
    async fn loaded_modules(&self) -> Result<Vec<String>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.loaded.clone())
    }

    async fn reload(&self, module: &str) -> Result<()> {
        self.reloaded.lock().unwrap().push(module.to_string());
        if self.fail {
            return Err(Error::module_control(format!("rmmod {}: busy", module)));
        }
        Ok(())
    }
}

/// DHCP control that counts restarts
#[derive(Clone, Default)]
pub struct RecordingDhcp {
    fail: bool,
    restarts: Arc<AtomicUsize>,
}

impl RecordingDhcp {
    /// Every restart fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn restarts(&self) -> usize {
        self.restarts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DhcpControl for RecordingDhcp {
    async fn restart(&self) -> Result<()> {
        self.restarts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::dhcp("init script exited with status 1"));
        }
        Ok(())
    }
}

/// Resolver with a fixed answer that records every queried host
#[derive(Clone, Default)]
pub struct StaticResolver {
    answer: Option<Vec<IpAddr>>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl StaticResolver {
    pub fn answering(addrs: &[[u8; 4]]) -> Self {
        Self {
            answer: Some(addrs.iter().map(|a| IpAddr::from(*a)).collect()),
            ..Default::default()
        }
    }

    /// Every lookup fails
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl HostResolver for StaticResolver {
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>> {
        self.queries.lock().unwrap().push(host.to_string());
        self.answer
            .clone()
            .ok_or_else(|| Error::resolution(format!("{}: Name or service not known", host)))
    }
}

/// An up interface with an IPv4 address
pub fn iface(name: &str, ip: [u8; 4]) -> InterfaceSnapshot {
    InterfaceSnapshot::with_address(name, Ipv4Addr::from(ip))
}

/// An administratively down interface that still holds an IPv4 address
pub fn down(name: &str, ip: [u8; 4]) -> InterfaceSnapshot {
    InterfaceSnapshot {
        is_up: false,
        ..iface(name, ip)
    }
}

/// An up interface without an address
pub fn bare(name: &str) -> InterfaceSnapshot {
    InterfaceSnapshot::without_address(name)
}

/// Detector over the given doubles with the default "eth" prefix
pub fn detector(
    interfaces: impl InterfaceProvider + 'static,
    modules: &RecordingModules,
    dhcp: &RecordingDhcp,
    max_wait_secs: u64,
) -> ReadinessDetector {
    ReadinessDetector::new(
        Box::new(interfaces),
        Box::new(modules.clone()),
        Box::new(dhcp.clone()),
        ReadinessConfig::default().with_max_wait_secs(max_wait_secs),
    )
    .expect("detector construction succeeds")
}

/// Write a file under `dir` and return its path
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write test file");
    path
}

/// Discovery config pointing at files under `dir`
pub fn discovery_config(dir: &Path, cmdline: Option<&str>, next_server: Option<&str>) -> DiscoveryConfig {
    let cmdline_path = match cmdline {
        Some(text) => write_file(dir, "cmdline", text),
        None => dir.join("missing-cmdline"),
    };
    let next_server_file = match next_server {
        Some(text) => write_file(dir, "nextServerIP.addr", text),
        None => dir.join("missing-nextServerIP.addr"),
    };

    DiscoveryConfig {
        cmdline_path,
        next_server_file,
        ..Default::default()
    }
}
