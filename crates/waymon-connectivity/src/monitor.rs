//! The connectivity monitor loop.
//!
//! Owns the pipeline, the waybar status file and the readiness gate. Each
//! cycle runs one escalation, publishes the classified status, then sets
//! the gate only when the HTTP stage confirmed an unrestricted path.
//! Probe failures are ordinary results; anything else is systemic and
//! terminates the monitor with an explicit failure status on the bar.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};

use waymon_status::{Status, StatusFile};

use crate::classify::classify;
use crate::config::ConnectivityConfig;
use crate::gate::{ReadinessGate, ReadinessHandle};
use crate::pipeline::run_pipeline;
use crate::probe::{NetProber, Prober};
use crate::types::ConnectivityStatus;

pub struct ConnectivityMonitor {
    config: ConnectivityConfig,
    prober: Arc<dyn Prober>,
    sink: StatusFile,
    gate: ReadinessGate,
    last_logged: Option<String>,
}

impl ConnectivityMonitor {
    /// Monitor backed by the real network prober.
    pub fn new(config: ConnectivityConfig, sink: StatusFile) -> Self {
        let prober = Arc::new(NetProber::new(config.clone()));
        Self::with_prober(config, sink, prober)
    }

    /// Monitor with an injected prober.
    pub fn with_prober(
        config: ConnectivityConfig,
        sink: StatusFile,
        prober: Arc<dyn Prober>,
    ) -> Self {
        Self {
            config,
            prober,
            sink,
            gate: ReadinessGate::new(),
            last_logged: None,
        }
    }

    /// Read-and-wait handle for gate consumers.
    pub fn readiness(&self) -> ReadinessHandle {
        self.gate.subscribe()
    }

    /// Run until shutdown. On a systemic error the published status is
    /// replaced with an explicit failure marker before the error is
    /// returned; a monitor that stopped measuring must not leave a stale
    /// OK on the bar.
    pub async fn run(mut self, shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        match self.run_inner(shutdown).await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!(error = %e, "connectivity monitor terminating");
                let _ = self.sink.write(&Status::new(
                    "!",
                    format!("Unexpected error, terminating monitor\n{e}"),
                    "critical",
                ));
                Err(e)
            }
        }
    }

    async fn run_inner(&mut self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        // Placeholder so the bar shows nothing alarming before the first
        // run finishes.
        self.sink.write(&Status::new("", "Starting...", ""))?;
        info!(
            interval_secs = self.config.interval.as_secs(),
            target = %self.config.target_ip,
            "connectivity monitor started"
        );

        loop {
            let result = run_pipeline(&self.prober, &self.config).await?;
            let status = classify(&result);
            self.report(&status)?;

            if result.http == ConnectivityStatus::Success {
                self.gate.set();
            } else {
                self.gate.clear();
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.interval) => {}
                _ = shutdown.changed() => {
                    info!("connectivity monitor shutting down");
                    return Ok(());
                }
            }
        }
    }

    /// Publish a status, logging each distinct message once. Tooltips are
    /// multi-line for the bar but logs want them flat.
    fn report(&mut self, status: &Status) -> Result<(), waymon_status::StatusError> {
        let mut message = status.tooltip.replace('\n', " ");
        if message.is_empty() {
            message = "Internet connection working".to_string();
        }
        if self.last_logged.as_deref() != Some(message.as_str()) {
            info!(status = %message, "connectivity changed");
            self.last_logged = Some(message);
        }
        self.sink.write(status)
    }
}
