//! The update monitor loop.
//!
//! Counts pending pacman and AUR updates once an hour, or immediately on
//! the wake signal, and publishes the counts for waybar. Checking is
//! pointless without working internet, so each cycle first waits on the
//! connectivity monitor's readiness gate.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::{Notify, watch};
use tracing::{debug, error, info, warn};

use waymon_connectivity::ReadinessHandle;
use waymon_status::{Status, StatusFile};

use crate::checker::{count_aur_updates, count_pacman_updates};

/// Tunables for the update monitor.
#[derive(Debug, Clone)]
pub struct UpdatesConfig {
    /// Pause between checks; the wake signal cuts it short.
    pub interval: Duration,
}

impl Default for UpdatesConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
        }
    }
}

pub struct UpdatesMonitor {
    config: UpdatesConfig,
    sink: StatusFile,
    readiness: ReadinessHandle,
}

impl UpdatesMonitor {
    pub fn new(config: UpdatesConfig, sink: StatusFile, readiness: ReadinessHandle) -> Self {
        Self {
            config,
            sink,
            readiness,
        }
    }

    /// Run until shutdown. `wake` forces an immediate check.
    pub async fn run(
        mut self,
        shutdown: watch::Receiver<bool>,
        wake: Arc<Notify>,
    ) -> anyhow::Result<()> {
        match self.run_inner(shutdown, wake).await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!(error = %e, "updates monitor terminating");
                let _ = self.sink.write(&Status::new(
                    "!",
                    format!("Unexpected error, terminating monitor\n{e}"),
                    "error",
                ));
                Err(e)
            }
        }
    }

    async fn run_inner(
        &mut self,
        mut shutdown: watch::Receiver<bool>,
        wake: Arc<Notify>,
    ) -> anyhow::Result<()> {
        info!(
            interval_secs = self.config.interval.as_secs(),
            "updates monitor started"
        );

        loop {
            if !self.readiness.is_set() {
                // Nothing worth showing while offline; the check would
                // only fail.
                self.sink.write(&Status::new("", "Waiting for connectivity", ""))?;
                tokio::select! {
                    res = self.readiness.wait() => res?,
                    _ = shutdown.changed() => break,
                }
            }

            self.check_once().await?;

            debug!("waiting for the next check or a wake signal");
            tokio::select! {
                _ = tokio::time::sleep(self.config.interval) => {}
                _ = wake.notified() => info!("wake signal received, checking immediately"),
                _ = shutdown.changed() => break,
            }
        }

        info!("updates monitor shutting down");
        Ok(())
    }

    /// One check cycle. Checker failures are reported on the bar and
    /// absorbed; only sink failures escape.
    async fn check_once(&mut self) -> anyhow::Result<()> {
        self.sink
            .write(&Status::new("", "Checking updates...", "checking"))?;

        match tokio::try_join!(count_pacman_updates(), count_aur_updates()) {
            Ok((pacman, aur)) => {
                info!(pacman, aur, "update check finished");
                self.sink.write(&update_status(pacman, aur))?;
            }
            Err(e) => {
                warn!(error = %e, "update check failed");
                self.sink.write(&Status::new(
                    "!",
                    format!("Error checking updates\n{e}"),
                    "error",
                ))?;
            }
        }
        Ok(())
    }
}

/// Waybar payload for finished counts.
fn update_status(pacman: usize, aur: usize) -> Status {
    if pacman == 0 && aur == 0 {
        let checked = Local::now().format("%H:%M");
        return Status::new(
            "",
            format!("No updates found\nLast checked: {checked}"),
            "none",
        );
    }

    let mut tooltips = Vec::new();
    let mut classes = Vec::new();
    if pacman > 0 {
        tooltips.push(format!("Arch updates: {pacman}"));
        classes.push("arch");
    }
    if aur > 0 {
        tooltips.push(format!("AUR updates: {aur}"));
        classes.push("aur");
    }
    Status::new("", tooltips.join("\n"), classes.join("_"))
}
