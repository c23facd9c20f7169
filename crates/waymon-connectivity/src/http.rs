//! The no-content HTTP probe.
//!
//! Captive portals intercept DNS as readily as HTTP, so the probe URL's
//! hostname is resolved through the configured public resolvers instead of
//! whatever the local network advertises, and the TCP connection goes
//! straight to the resolved address. Redirects are never followed: the
//! bare http1 client hands the 30x back as-is, which classifies as a
//! captive portal.

use std::net::IpAddr;
use std::time::Duration;

use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use tracing::{debug, warn};

use crate::types::ConnectivityStatus;

/// Run the no-content check against `url`.
///
/// `Success` for a 204, `Captive` for any other HTTP status, `Failed` when
/// the request could not be completed at all. All errors are absorbed into
/// the outcome.
pub async fn http_check(
    url: &str,
    dns_servers: &[IpAddr],
    timeout: Duration,
) -> ConnectivityStatus {
    let (host, port, path) = match split_url(url) {
        Ok(parts) => parts,
        Err(e) => {
            warn!(error = %e, %url, "invalid probe URL");
            return ConnectivityStatus::Failed;
        }
    };

    let result = tokio::time::timeout(timeout, async {
        let addr = match resolve(&host, dns_servers).await {
            Ok(addr) => addr,
            Err(e) => {
                debug!(error = %e, %host, "204 check resolution failed");
                return ConnectivityStatus::Failed;
            }
        };

        let stream = match tokio::net::TcpStream::connect((addr, port)).await {
            Ok(s) => s,
            Err(e) => {
                debug!(error = %e, %addr, "204 check connection failed");
                return ConnectivityStatus::Failed;
            }
        };

        let io = hyper_util::rt::TokioIo::new(stream);
        let (mut sender, conn) = match hyper::client::conn::http1::handshake(io).await {
            Ok(pair) => pair,
            Err(e) => {
                debug!(error = %e, %url, "204 check handshake failed");
                return ConnectivityStatus::Failed;
            }
        };

        // Drive the connection in the background.
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let host_header = if port == 80 {
            host.clone()
        } else {
            format!("{host}:{port}")
        };
        let req = match http::Request::builder()
            .method("GET")
            .uri(&path)
            .header("host", host_header)
            .header("user-agent", "waymon-connectivity/0.1")
            .body(http_body_util::Empty::<bytes::Bytes>::new())
        {
            Ok(req) => req,
            Err(e) => {
                warn!(error = %e, %url, "failed to build 204 check request");
                return ConnectivityStatus::Failed;
            }
        };

        match sender.send_request(req).await {
            Ok(resp) if resp.status() == http::StatusCode::NO_CONTENT => {
                ConnectivityStatus::Success
            }
            Ok(resp) => {
                debug!(status = %resp.status(), %url, "204 check answered with unexpected status");
                ConnectivityStatus::Captive
            }
            Err(e) => {
                debug!(error = %e, %url, "204 check request failed");
                ConnectivityStatus::Failed
            }
        }
    })
    .await;

    match result {
        Ok(status) => status,
        Err(_) => {
            debug!(%url, "204 check timed out");
            ConnectivityStatus::Failed
        }
    }
}

/// Break a probe URL into host, port and origin-form path.
fn split_url(url: &str) -> anyhow::Result<(String, u16, String)> {
    let uri: http::Uri = url.parse()?;
    let host = uri
        .host()
        .ok_or_else(|| anyhow::anyhow!("probe URL has no host"))?
        .to_string();
    let port = uri.port_u16().unwrap_or(80);
    let mut path = uri.path().to_string();
    if path.is_empty() {
        path = "/".to_string();
    }
    if let Some(query) = uri.query() {
        path.push('?');
        path.push_str(query);
    }
    Ok((host, port, path))
}

/// Resolve `host` through the given nameservers only. IP literals skip
/// DNS entirely.
async fn resolve(host: &str, dns_servers: &[IpAddr]) -> anyhow::Result<IpAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    let group = NameServerConfigGroup::from_ips_clear(dns_servers, 53, true);
    let config = ResolverConfig::from_parts(None, Vec::new(), group);
    let resolver = TokioAsyncResolver::tokio(config, ResolverOpts::default());

    let lookup = resolver.lookup_ip(host).await?;
    lookup
        .iter()
        .find(IpAddr::is_ipv4)
        .or_else(|| lookup.iter().next())
        .ok_or_else(|| anyhow::anyhow!("no addresses for {host}"))
}
