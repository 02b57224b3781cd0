// # mk-net-sys
//
// Linux implementations of the mk-net-core ports.
//
// ## Ports
//
// - [`DatalinkInterfaces`]: interface table from `pnet::datalink`
// - [`KernelModules`]: loaded modules from `/proc/modules`, reload through
//   `rmmod` + `modprobe`
// - [`InitScriptDhcp`]: DHCP client restart through its init script
//
// ## Platform Support
//
// The crate builds everywhere so the workspace does, but the interface
// table can only be read on Linux; elsewhere every snapshot is an error,
// which the detector treats as "no interface found".

mod command;
mod dhcp;
mod interfaces;
mod modules;

pub use dhcp::InitScriptDhcp;
pub use interfaces::DatalinkInterfaces;
pub use modules::{KernelModules, parse_proc_modules};

use mk_net_core::traits::{DhcpControl, InterfaceProvider, ModuleControl};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the system ports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SysConfig {
    /// Loaded module table
    #[serde(default = "default_proc_modules_path")]
    pub proc_modules_path: PathBuf,

    /// DHCP client init script, invoked with `stop` then `start`
    #[serde(default = "default_dhcp_service_script")]
    pub dhcp_service_script: PathBuf,

    /// Run system commands through `sudo`; the boot agent does not run as root
    #[serde(default = "default_use_sudo")]
    pub use_sudo: bool,
}

impl Default for SysConfig {
    fn default() -> Self {
        Self {
            proc_modules_path: default_proc_modules_path(),
            dhcp_service_script: default_dhcp_service_script(),
            use_sudo: default_use_sudo(),
        }
    }
}

fn default_use_sudo() -> bool {
    true
}

fn default_proc_modules_path() -> PathBuf {
    PathBuf::from("/proc/modules")
}

fn default_dhcp_service_script() -> PathBuf {
    PathBuf::from("/etc/init.d/services/dhcp")
}

/// The three detector ports, boxed and ready for `ReadinessDetector::new`
pub struct SystemPorts {
    pub interfaces: Box<dyn InterfaceProvider>,
    pub modules: Box<dyn ModuleControl>,
    pub dhcp: Box<dyn DhcpControl>,
}

/// Build the Linux ports from configuration
pub fn system_ports(config: &SysConfig) -> SystemPorts {
    SystemPorts {
        interfaces: Box::new(DatalinkInterfaces::new()),
        modules: Box::new(KernelModules::new(
            config.proc_modules_path.clone(),
            config.use_sudo,
        )),
        dhcp: Box::new(InitScriptDhcp::new(
            config.dhcp_service_script.clone(),
            config.use_sudo,
        )),
    }
}
