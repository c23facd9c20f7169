//! waymon-connectivity — the staged connectivity prober.
//!
//! Answers three questions every cycle: is the default gateway reachable,
//! is the internet reachable, and is HTTP egress unrestricted (no captive
//! portal)? Probing is pipelined rather than sequential: gateway sampling
//! starts immediately, the first gateway success opens internet sampling,
//! the first internet success opens the no-content HTTP check, and every
//! opened stage still runs to completion.
//!
//! # Architecture
//!
//! ```text
//! ConnectivityMonitor (10 s cadence)
//!   ├── run_pipeline()
//!   │   ├── sampler: staggered pings (TTL = 1 → gateway, unrestricted → internet)
//!   │   └── single HTTP generate-204 probe (public-DNS resolution)
//!   ├── classify() → waybar Status
//!   └── ReadinessGate (set iff HTTP confirmed unrestricted)
//! ```
//!
//! Consumers that are pointless without working internet hold a
//! [`ReadinessHandle`] and wait on it before doing anything.

pub mod classify;
pub mod config;
pub mod gate;
pub mod http;
pub mod monitor;
pub mod ping;
pub mod pipeline;
pub mod probe;
mod sampler;
pub mod types;

pub use classify::classify;
pub use config::ConnectivityConfig;
pub use gate::{GateClosed, ReadinessGate, ReadinessHandle};
pub use http::http_check;
pub use monitor::ConnectivityMonitor;
pub use ping::ping_probe;
pub use pipeline::run_pipeline;
pub use probe::{NetProber, ProbeFuture, Prober};
pub use types::{ConnectivityStatus, PipelineResult, SampleResult};
