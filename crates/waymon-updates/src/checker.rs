//! Pending-update counting.
//!
//! `checkupdates` (pacman-contrib) prints one line per pending update but
//! exits non-zero when there is nothing to do, so only its output counts.
//! `pikaur -Qua` does the same for AUR packages, except a non-zero exit
//! there is a real failure.

use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, bail};
use tokio::process::Command;
use tracing::debug;

/// Upper bound for one checker command; past it the child is killed.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(90);

/// Number of pending official-repo updates.
pub async fn count_pacman_updates() -> anyhow::Result<usize> {
    let output = run_checker("checkupdates", &[], false).await?;
    Ok(count_nonempty_lines(&output))
}

/// Number of pending AUR updates.
pub async fn count_aur_updates() -> anyhow::Result<usize> {
    let output = run_checker("pikaur", &["-Qua"], true).await?;
    Ok(count_nonempty_lines(&output))
}

/// Run one checker command to completion and return its stdout.
async fn run_checker(program: &str, args: &[&str], require_success: bool) -> anyhow::Result<String> {
    debug!(%program, "running update checker");
    let child = Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("failed to run {program}"))?;

    let output = match tokio::time::timeout(COMMAND_TIMEOUT, child.wait_with_output()).await {
        Ok(result) => result.with_context(|| format!("{program} produced no output"))?,
        Err(_) => bail!("{program} timed out after {}s", COMMAND_TIMEOUT.as_secs()),
    };

    if require_success && !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("{program} exited with {}: {}", output.status, stderr.trim());
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Count the non-blank lines of a checker's output, one per pending
/// update.
fn count_nonempty_lines(output: &str) -> usize {
    output.lines().filter(|line| !line.trim().is_empty()).count()
}
