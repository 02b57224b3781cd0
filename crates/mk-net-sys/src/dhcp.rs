//! DHCP client control through its init script

use async_trait::async_trait;
use mk_net_core::Error;
use mk_net_core::traits::DhcpControl;
use std::path::PathBuf;

use crate::command;

/// Restarts the DHCP client with `<script> stop; <script> start`
#[derive(Debug, Clone)]
pub struct InitScriptDhcp {
    script: PathBuf,
    use_sudo: bool,
}

impl InitScriptDhcp {
    pub fn new(script: PathBuf, use_sudo: bool) -> Self {
        Self { script, use_sudo }
    }
}

#[async_trait]
impl DhcpControl for InitScriptDhcp {
    async fn restart(&self) -> mk_net_core::Result<()> {
        let script = self.script.to_string_lossy();

        // start is attempted even if stop failed; the client may not be running
        let stopped = command::run(&script, &["stop"], self.use_sudo).await;
        let started = command::run(&script, &["start"], self.use_sudo).await;

        stopped.and(started).map_err(Error::dhcp)
    }
}
