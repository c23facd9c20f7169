//! Probe and monitor configuration.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Tunables for the connectivity monitor and its probe pipeline.
///
/// The defaults are the values the monitor has always shipped with; the
/// daemon exposes the commonly adjusted ones as flags.
#[derive(Debug, Clone)]
pub struct ConnectivityConfig {
    /// Target for both the TTL-limited gateway probe and the internet
    /// probe. Any stable public anycast address works.
    pub target_ip: IpAddr,
    /// Endpoint for the no-content HTTP check.
    pub probe_url: String,
    /// Public resolvers used for the HTTP probe's hostname, bypassing
    /// whatever DNS the local network hands out.
    pub dns_servers: Vec<IpAddr>,
    /// Number of gateway probes per run.
    pub gateway_probes: u32,
    /// Number of internet probes per run.
    pub internet_probes: u32,
    /// Offset between consecutive probe starts within a stage.
    pub stagger: Duration,
    /// Per-ping timeout, passed to the ping binary. The subprocess wait
    /// gets a small grace buffer on top.
    pub ping_timeout: Duration,
    /// Total timeout for the HTTP check, DNS resolution included.
    pub http_timeout: Duration,
    /// Pause between pipeline runs.
    pub interval: Duration,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            target_ip: IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
            probe_url: "http://clients3.google.com/generate_204".to_string(),
            dns_servers: vec![
                IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
                IpAddr::V4(Ipv4Addr::new(8, 8, 4, 4)),
            ],
            gateway_probes: 5,
            internet_probes: 3,
            stagger: Duration::from_millis(500),
            ping_timeout: Duration::from_secs(3),
            http_timeout: Duration::from_secs(5),
            interval: Duration::from_secs(10),
        }
    }
}
