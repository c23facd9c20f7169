//! The probe seam between the pipeline and the network.
//!
//! The pipeline only needs "run this probe, hand me its outcome"; the
//! trait keeps subprocess and HTTP mechanics out of the escalation logic
//! and lets tests script outcomes.

use std::future::Future;
use std::pin::Pin;

use crate::config::ConnectivityConfig;
use crate::http::http_check;
use crate::ping::ping_probe;
use crate::types::ConnectivityStatus;

/// Boxed future returned by probe methods.
pub type ProbeFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Executes individual probes. Implementations absorb every error into
/// the returned outcome.
pub trait Prober: Send + Sync + 'static {
    /// One ICMP echo; `ttl` caps the hop count for the gateway probe.
    fn ping(&self, ttl: Option<u32>) -> ProbeFuture<bool>;

    /// The no-content HTTP check.
    fn http(&self) -> ProbeFuture<ConnectivityStatus>;
}

/// The real prober, bound to the configured targets and timeouts.
pub struct NetProber {
    config: ConnectivityConfig,
}

impl NetProber {
    pub fn new(config: ConnectivityConfig) -> Self {
        Self { config }
    }
}

impl Prober for NetProber {
    fn ping(&self, ttl: Option<u32>) -> ProbeFuture<bool> {
        let target = self.config.target_ip;
        let timeout = self.config.ping_timeout;
        Box::pin(async move { ping_probe(target, ttl, timeout).await })
    }

    fn http(&self) -> ProbeFuture<ConnectivityStatus> {
        let url = self.config.probe_url.clone();
        let dns_servers = self.config.dns_servers.clone();
        let timeout = self.config.http_timeout;
        Box::pin(async move { http_check(&url, &dns_servers, timeout).await })
    }
}
