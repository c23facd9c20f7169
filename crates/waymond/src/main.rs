//! waymond — the waybar monitor daemon.
//!
//! Single binary that runs both monitors:
//! - connectivity: the staged gateway/internet/HTTP prober, publishing
//!   `internet_monitor.json` and owning the readiness gate
//! - updates: the pacman/AUR update counter, publishing
//!   `arch_updates_monitor.json` and waiting on the gate
//!
//! # Usage
//!
//! ```text
//! waymond --interval 10 --updates-interval 3600
//! ```
//!
//! `SIGUSR1` forces an immediate update check (handy after a manual
//! upgrade); Ctrl-C shuts both monitors down.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::{Notify, watch};
use tracing::{debug, info};

use waymon_connectivity::{ConnectivityConfig, ConnectivityMonitor};
use waymon_status::StatusFile;
use waymon_updates::{UpdatesConfig, UpdatesMonitor};

#[derive(Parser)]
#[command(name = "waymond", about = "Waybar connectivity and update monitors")]
struct Cli {
    /// Directory for the status JSON files. Defaults to $XDG_RUNTIME_DIR.
    #[arg(long)]
    status_dir: Option<PathBuf>,

    /// Seconds between connectivity checks.
    #[arg(long, default_value = "10")]
    interval: u64,

    /// Seconds between update checks.
    #[arg(long, default_value = "3600")]
    updates_interval: u64,

    /// Target for the ICMP probes (gateway probe TTL-limits its way there).
    #[arg(long, default_value = "8.8.8.8")]
    target_ip: IpAddr,

    /// Endpoint for the no-content HTTP check.
    #[arg(long, default_value = "http://clients3.google.com/generate_204")]
    probe_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,waymond=debug,waymon_connectivity=debug,waymon_updates=debug"
                    .parse()
                    .unwrap()
            }),
        )
        .init();

    let cli = Cli::parse();
    run(cli).await
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    info!("waymon daemon starting");

    if let Some(dir) = &cli.status_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create status dir {}", dir.display()))?;
    }

    // ── Assemble monitors ──────────────────────────────────────

    let connectivity_sink = status_file(cli.status_dir.as_deref(), "internet_monitor.json")?;
    let updates_sink = status_file(cli.status_dir.as_deref(), "arch_updates_monitor.json")?;

    let config = ConnectivityConfig {
        target_ip: cli.target_ip,
        probe_url: cli.probe_url.clone(),
        interval: Duration::from_secs(cli.interval),
        ..ConnectivityConfig::default()
    };
    let connectivity = ConnectivityMonitor::new(config, connectivity_sink);
    let readiness = connectivity.readiness();
    info!(target = %cli.target_ip, interval = cli.interval, "connectivity monitor initialized");

    let updates = UpdatesMonitor::new(
        UpdatesConfig {
            interval: Duration::from_secs(cli.updates_interval),
        },
        updates_sink,
        readiness,
    );
    info!(interval = cli.updates_interval, "updates monitor initialized");

    // ── Signals and shutdown ───────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // SIGUSR1 becomes a plain wake event for the update monitor.
    let wake = Arc::new(Notify::new());
    spawn_usr1_bridge(wake.clone())?;

    // ── Run both monitors ──────────────────────────────────────

    let mut connectivity_task = tokio::spawn(connectivity.run(shutdown_rx.clone()));
    let mut updates_task = tokio::spawn(updates.run(shutdown_rx, wake));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
        res = &mut connectivity_task => {
            let _ = shutdown_tx.send(true);
            let _ = updates_task.await;
            return finish("connectivity monitor", res);
        }
        res = &mut updates_task => {
            let _ = shutdown_tx.send(true);
            let _ = connectivity_task.await;
            return finish("updates monitor", res);
        }
    }

    // Wait for both monitors to finish their cycle.
    let _ = connectivity_task.await;
    let _ = updates_task.await;

    info!("waymon daemon stopped");
    Ok(())
}

/// Status sink in the explicit directory, or under $XDG_RUNTIME_DIR.
fn status_file(dir: Option<&Path>, filename: &str) -> anyhow::Result<StatusFile> {
    match dir {
        Some(dir) => Ok(StatusFile::at(dir.join(filename))),
        None => Ok(StatusFile::in_runtime_dir(filename)?),
    }
}

/// Map a finished monitor task to the daemon's exit result. A monitor
/// stopping while the daemon is still running is always a failure.
fn finish(
    name: &str,
    res: Result<anyhow::Result<()>, tokio::task::JoinError>,
) -> anyhow::Result<()> {
    match res {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.context(format!("{name} failed"))),
        Err(e) => Err(anyhow::anyhow!("{name} panicked: {e}")),
    }
}

/// Forward every SIGUSR1 into the wake event.
fn spawn_usr1_bridge(wake: Arc<Notify>) -> anyhow::Result<()> {
    let mut usr1 = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::user_defined1())
        .context("failed to install SIGUSR1 handler")?;
    tokio::spawn(async move {
        while usr1.recv().await.is_some() {
            debug!("SIGUSR1 received, waking the update monitor");
            wake.notify_one();
        }
    });
    Ok(())
}
