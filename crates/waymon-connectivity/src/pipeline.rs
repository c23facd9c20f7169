//! The escalation pipeline.
//!
//! One run probes the three layers with overlapping stages: gateway
//! sampling starts immediately, the first gateway success opens internet
//! sampling, and the first internet success opens the single HTTP check.
//! Escalation only ever adds work; a stage that opened always runs to
//! completion. Waiting for a whole stage before starting the next would
//! serialize the layers, while opening on first proof that the path is
//! live keeps a healthy run close to one probe's round trip.

use std::sync::Arc;

use anyhow::Context;
use tokio::task::JoinSet;
use tracing::debug;

use crate::config::ConnectivityConfig;
use crate::probe::Prober;
use crate::sampler::{PingStage, ProbeEvent, spawn_http_probe, spawn_ping_samples};
use crate::types::{ConnectivityStatus, PipelineResult, SampleResult};

/// Run one full escalation and aggregate the outcome.
///
/// Probe failures never surface here; they are part of the result. The
/// only error path is a systemic one (a probe task panicking), which the
/// owning monitor treats as fatal.
pub async fn run_pipeline(
    prober: &Arc<dyn Prober>,
    config: &ConnectivityConfig,
) -> anyhow::Result<PipelineResult> {
    let mut tasks: JoinSet<ProbeEvent> = JoinSet::new();

    let mut gateway = Vec::with_capacity(config.gateway_probes as usize);
    let mut internet = Vec::with_capacity(config.internet_probes as usize);
    let mut http = ConnectivityStatus::Unknown;
    let mut internet_open = false;
    let mut http_open = false;

    spawn_ping_samples(
        &mut tasks,
        prober,
        PingStage::Gateway,
        config.gateway_probes,
        config.stagger,
    );

    while let Some(joined) = tasks.join_next().await {
        let event = joined.context("probe task failed")?;
        match event {
            ProbeEvent::Ping {
                stage: PingStage::Gateway,
                success,
            } => {
                gateway.push(success);
                if success && !internet_open {
                    internet_open = true;
                    debug!("gateway reachable, opening internet stage");
                    spawn_ping_samples(
                        &mut tasks,
                        prober,
                        PingStage::Internet,
                        config.internet_probes,
                        config.stagger,
                    );
                }
            }
            ProbeEvent::Ping {
                stage: PingStage::Internet,
                success,
            } => {
                internet.push(success);
                if success && !http_open {
                    http_open = true;
                    debug!("internet reachable, opening http stage");
                    spawn_http_probe(&mut tasks, prober);
                }
            }
            ProbeEvent::Http(status) => http = status,
        }
    }

    Ok(PipelineResult {
        gateway: SampleResult::from_outcomes(&gateway),
        internet: if internet_open {
            SampleResult::from_outcomes(&internet)
        } else {
            SampleResult::EMPTY
        },
        // A stage that never opened never had a chance to pass.
        http: if http_open {
            http
        } else {
            ConnectivityStatus::Failed
        },
    })
}
