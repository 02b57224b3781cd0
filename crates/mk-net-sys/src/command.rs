//! Running short-lived system commands

use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Upper bound for one command; a hung init script must not stall boot
const COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// Run `program args...` to completion, optionally through sudo
///
/// Returns a human-readable reason on spawn failure, timeout or non-zero exit.
pub(crate) async fn run(program: &str, args: &[&str], use_sudo: bool) -> Result<(), String> {
    run_with_timeout(program, args, use_sudo, COMMAND_TIMEOUT).await
}

async fn run_with_timeout(
    program: &str,
    args: &[&str],
    use_sudo: bool,
    limit: Duration,
) -> Result<(), String> {
    let mut command = if use_sudo {
        let mut sudo = Command::new("sudo");
        sudo.arg(program);
        sudo
    } else {
        Command::new(program)
    };
    // no terminal to answer a password prompt; killed if the timeout fires
    command.args(args).stdin(Stdio::null()).kill_on_drop(true);

    debug!("Running {} {}", program, args.join(" "));
    let output = tokio::time::timeout(limit, command.output())
        .await
        .map_err(|_| format!("{} {} timed out after {:?}", program, args.join(" "), limit))?
        .map_err(|e| format!("failed to run {}: {}", program, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "{} {} exited with {}: {}",
            program,
            args.join(" "),
            output.status,
            stderr.trim()
        ));
    }

    Ok(())
}
