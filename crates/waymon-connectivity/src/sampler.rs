//! Staggered probe sampling.
//!
//! A sample run launches N probes of one kind into the pipeline's shared
//! task set, the i-th delayed by i × stagger so the burst is spread out.
//! Nothing here waits for completions; the pipeline folds them in as they
//! land.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use crate::probe::Prober;
use crate::types::ConnectivityStatus;

/// The two sampled ping stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PingStage {
    Gateway,
    Internet,
}

impl PingStage {
    /// TTL cap for the stage's probes: the gateway probe must die at the
    /// first hop, the internet probe runs unrestricted.
    fn ttl(self) -> Option<u32> {
        match self {
            PingStage::Gateway => Some(1),
            PingStage::Internet => None,
        }
    }
}

/// One completed probe, tagged with its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProbeEvent {
    Ping { stage: PingStage, success: bool },
    Http(ConnectivityStatus),
}

/// Launch `count` staggered ping probes for `stage` into `tasks`.
pub(crate) fn spawn_ping_samples(
    tasks: &mut JoinSet<ProbeEvent>,
    prober: &Arc<dyn Prober>,
    stage: PingStage,
    count: u32,
    stagger: Duration,
) {
    for i in 0..count {
        let prober = Arc::clone(prober);
        let delay = stagger * i;
        tasks.spawn(async move {
            tokio::time::sleep(delay).await;
            let success = prober.ping(stage.ttl()).await;
            ProbeEvent::Ping { stage, success }
        });
    }
}

/// Launch the single HTTP probe into `tasks`.
pub(crate) fn spawn_http_probe(tasks: &mut JoinSet<ProbeEvent>, prober: &Arc<dyn Prober>) {
    let prober = Arc::clone(prober);
    tasks.spawn(async move { ProbeEvent::Http(prober.http().await) });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeFuture;
    use std::sync::Mutex;

    /// Records when each ping starts, relative to construction.
    struct RecordingProber {
        start: tokio::time::Instant,
        starts: Mutex<Vec<Duration>>,
    }

    impl RecordingProber {
        fn new() -> Self {
            Self {
                start: tokio::time::Instant::now(),
                starts: Mutex::new(Vec::new()),
            }
        }
    }

    impl Prober for RecordingProber {
        fn ping(&self, _ttl: Option<u32>) -> ProbeFuture<bool> {
            self.starts.lock().unwrap().push(self.start.elapsed());
            Box::pin(async { true })
        }

        fn http(&self) -> ProbeFuture<ConnectivityStatus> {
            Box::pin(async { ConnectivityStatus::Success })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sample_launches_one_task_per_probe() {
        let prober = Arc::new(RecordingProber::new());
        let as_prober: Arc<dyn Prober> = prober.clone();
        let mut tasks = JoinSet::new();

        spawn_ping_samples(
            &mut tasks,
            &as_prober,
            PingStage::Gateway,
            5,
            Duration::from_millis(500),
        );
        assert_eq!(tasks.len(), 5);

        let mut events = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            events.push(joined.unwrap());
        }
        assert_eq!(events.len(), 5);
        assert!(events.iter().all(|e| matches!(
            e,
            ProbeEvent::Ping {
                stage: PingStage::Gateway,
                success: true
            }
        )));
        assert_eq!(prober.starts.lock().unwrap().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn stagger_offsets_consecutive_probe_starts() {
        let prober = Arc::new(RecordingProber::new());
        let as_prober: Arc<dyn Prober> = prober.clone();
        let mut tasks = JoinSet::new();

        spawn_ping_samples(
            &mut tasks,
            &as_prober,
            PingStage::Internet,
            3,
            Duration::from_secs(1),
        );
        while let Some(joined) = tasks.join_next().await {
            joined.unwrap();
        }

        let mut starts = prober.starts.lock().unwrap().clone();
        starts.sort();
        assert_eq!(
            starts,
            vec![
                Duration::ZERO,
                Duration::from_secs(1),
                Duration::from_secs(2)
            ]
        );
    }

    #[tokio::test]
    async fn http_probe_spawns_a_single_task() {
        let prober: Arc<dyn Prober> = Arc::new(RecordingProber::new());
        let mut tasks = JoinSet::new();

        spawn_http_probe(&mut tasks, &prober);
        assert_eq!(tasks.len(), 1);

        let event = tasks.join_next().await.unwrap().unwrap();
        assert_eq!(event, ProbeEvent::Http(ConnectivityStatus::Success));
    }
}
