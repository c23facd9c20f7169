//! Status classification.
//!
//! Collapses a pipeline result into the single waybar payload, most
//! severe layer first: with a broken gateway the internet and HTTP
//! results are noise, and with a broken internet path the HTTP verdict
//! is noise. Only a fully clean ping picture lets the HTTP tri-state
//! speak.

use waymon_status::Status;

use crate::types::{ConnectivityStatus, PipelineResult};

/// Waybar class for a dead (`critical`) versus degraded (`warning`)
/// ping stage.
fn severity(status: ConnectivityStatus) -> &'static str {
    if status == ConnectivityStatus::Failed {
        "critical"
    } else {
        "warning"
    }
}

/// Derive the waybar status for one pipeline result.
pub fn classify(result: &PipelineResult) -> Status {
    let gateway = result.gateway.status();
    if gateway != ConnectivityStatus::Success {
        return Status::new(
            "⚠",
            format!("Pings to default gateway:\n{}", result.gateway),
            severity(gateway),
        );
    }

    let internet = result.internet.status();
    if internet != ConnectivityStatus::Success {
        return Status::new(
            "",
            format!("Pings to internet:\n{}", result.internet),
            severity(internet),
        );
    }

    match result.http {
        ConnectivityStatus::Failed => {
            Status::new("", "HTTP connection to 204 check failed", "critical")
        }
        ConnectivityStatus::Captive => Status::new("", "Captive portal detected", "warning"),
        _ => Status::clear(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SampleResult;

    fn result(
        gateway: (u32, u32),
        internet: (u32, u32),
        http: ConnectivityStatus,
    ) -> PipelineResult {
        PipelineResult {
            gateway: SampleResult {
                successful: gateway.0,
                total: gateway.1,
            },
            internet: SampleResult {
                successful: internet.0,
                total: internet.1,
            },
            http,
        }
    }

    #[test]
    fn dead_gateway_is_critical_with_warning_glyph() {
        let status = classify(&result((0, 5), (0, 0), ConnectivityStatus::Failed));
        assert_eq!(status.text, "⚠");
        assert_eq!(status.tooltip, "Pings to default gateway:\nFAILED (0/5)");
        assert_eq!(status.class, "critical");
    }

    #[test]
    fn choppy_gateway_is_warning() {
        let status = classify(&result((2, 5), (3, 3), ConnectivityStatus::Success));
        assert_eq!(status.text, "⚠");
        assert_eq!(status.tooltip, "Pings to default gateway:\nCHOPPY (2/5)");
        assert_eq!(status.class, "warning");
    }

    #[test]
    fn dead_internet_is_critical_without_glyph() {
        let status = classify(&result((5, 5), (0, 3), ConnectivityStatus::Failed));
        assert_eq!(status.text, "");
        assert_eq!(status.tooltip, "Pings to internet:\nFAILED (0/3)");
        assert_eq!(status.class, "critical");
    }

    #[test]
    fn never_opened_internet_reads_as_dead() {
        let status = classify(&result((0, 5), (0, 0), ConnectivityStatus::Failed));
        // Gateway outranks it, but an EMPTY internet sample on its own
        // would classify as FAILED (0/0).
        assert_eq!(
            SampleResult::EMPTY.status(),
            ConnectivityStatus::Failed
        );
        assert_eq!(status.class, "critical");
    }

    #[test]
    fn choppy_internet_is_warning() {
        let status = classify(&result((5, 5), (2, 3), ConnectivityStatus::Success));
        assert_eq!(status.tooltip, "Pings to internet:\nCHOPPY (2/3)");
        assert_eq!(status.class, "warning");
    }

    #[test]
    fn http_failure_is_critical() {
        let status = classify(&result((5, 5), (3, 3), ConnectivityStatus::Failed));
        assert_eq!(status.text, "");
        assert_eq!(status.tooltip, "HTTP connection to 204 check failed");
        assert_eq!(status.class, "critical");
    }

    #[test]
    fn captive_portal_is_warning() {
        let status = classify(&result((5, 5), (3, 3), ConnectivityStatus::Captive));
        assert_eq!(status.tooltip, "Captive portal detected");
        assert_eq!(status.class, "warning");
    }

    #[test]
    fn fully_working_connection_clears_the_status() {
        let status = classify(&result((5, 5), (3, 3), ConnectivityStatus::Success));
        assert_eq!(status, Status::clear());
    }

    #[test]
    fn gateway_trouble_outranks_internet_and_http() {
        let status = classify(&result((3, 5), (0, 3), ConnectivityStatus::Captive));
        assert!(status.tooltip.starts_with("Pings to default gateway:"));
    }

    #[test]
    fn internet_trouble_outranks_http() {
        let status = classify(&result((5, 5), (1, 3), ConnectivityStatus::Captive));
        assert!(status.tooltip.starts_with("Pings to internet:"));
    }
}
