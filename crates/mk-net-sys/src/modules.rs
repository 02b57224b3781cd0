//! Kernel module listing and reload

use async_trait::async_trait;
use mk_net_core::Error;
use mk_net_core::traits::ModuleControl;
use std::path::PathBuf;

use crate::command;

/// Reads `/proc/modules` and reloads drivers with `rmmod` + `modprobe`
#[derive(Debug, Clone)]
pub struct KernelModules {
    proc_modules: PathBuf,
    use_sudo: bool,
}

impl KernelModules {
    pub fn new(proc_modules: PathBuf, use_sudo: bool) -> Self {
        Self {
            proc_modules,
            use_sudo,
        }
    }
}

/// Module names from `/proc/modules` contents (first column, kernel order)
pub fn parse_proc_modules(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl ModuleControl for KernelModules {
    async fn loaded_modules(&self) -> mk_net_core::Result<Vec<String>> {
        let contents = tokio::fs::read_to_string(&self.proc_modules)
            .await
            .map_err(|e| {
                Error::module_control(format!("{}: {}", self.proc_modules.display(), e))
            })?;

        Ok(parse_proc_modules(&contents))
    }

    async fn reload(&self, module: &str) -> mk_net_core::Result<()> {
        // modprobe runs even if rmmod failed, matching `rmmod m; modprobe m`
        let unloaded = command::run("rmmod", &[module], self.use_sudo).await;
        let loaded = command::run("modprobe", &[module], self.use_sudo).await;

        unloaded.and(loaded).map_err(Error::module_control)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROC_MODULES: &str = "\
bnx2x 1234 0 - Live 0xffffffffc0a2b000
mdio 16384 1 bnx2x, Live 0xffffffffc0a22000
e1000 151552 0 - Live 0xffffffffc09f0000

";

    #[test]
    fn first_column_in_kernel_order() {
        assert_eq!(parse_proc_modules(PROC_MODULES), vec!["bnx2x", "mdio", "e1000"]);
    }

    #[test]
    fn empty_table_has_no_modules() {
        assert!(parse_proc_modules("").is_empty());
    }

    #[tokio::test]
    async fn reads_module_table_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modules");
        std::fs::write(&path, PROC_MODULES).unwrap();

        let modules = KernelModules::new(path, false);
        assert_eq!(
            modules.loaded_modules().await.unwrap(),
            vec!["bnx2x", "mdio", "e1000"]
        );
    }

    #[tokio::test]
    async fn missing_table_is_a_module_control_error() {
        let dir = tempfile::tempdir().unwrap();
        let modules = KernelModules::new(dir.path().join("absent"), false);

        let err = modules.loaded_modules().await.unwrap_err();
        assert!(matches!(err, Error::ModuleControl(_)));
    }
}
