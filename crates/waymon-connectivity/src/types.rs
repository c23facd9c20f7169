//! Domain types for the connectivity prober.
//!
//! `SampleResult` aggregates one stage's probe outcomes, `ConnectivityStatus`
//! is the closed classification vocabulary shared by the ping stages and the
//! HTTP check, and `PipelineResult` is the output of one escalation run.

use std::fmt;

// ── Connectivity status ────────────────────────────────────────────

/// Classified connectivity state for a single stage.
///
/// The ping stages only ever produce `Failed`, `Choppy` or `Success`,
/// derived from their sample counts. The HTTP stage adds `Captive` for a
/// network that carries traffic but intercepts it. `Unknown` is the
/// cold-start value before a stage has been evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityStatus {
    Failed,
    Choppy,
    Success,
    Captive,
    Unknown,
}

impl fmt::Display for ConnectivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectivityStatus::Failed => "FAILED",
            ConnectivityStatus::Choppy => "CHOPPY",
            ConnectivityStatus::Success => "SUCCESS",
            ConnectivityStatus::Captive => "CAPTIVE",
            ConnectivityStatus::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

// ── Sample results ─────────────────────────────────────────────────

/// Aggregate outcome of one sampled stage: how many probes succeeded out
/// of how many ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleResult {
    pub successful: u32,
    pub total: u32,
}

impl SampleResult {
    /// The result of a stage that never ran. Classifies as `Failed`.
    pub const EMPTY: SampleResult = SampleResult {
        successful: 0,
        total: 0,
    };

    /// Fold individual probe outcomes into a sample result.
    pub fn from_outcomes(outcomes: &[bool]) -> Self {
        Self {
            successful: outcomes.iter().filter(|ok| **ok).count() as u32,
            total: outcomes.len() as u32,
        }
    }

    /// Derive the stage status: no successes (including an empty sample)
    /// is `Failed`, all successes is `Success`, anything in between is
    /// `Choppy`.
    pub fn status(&self) -> ConnectivityStatus {
        if self.successful == 0 {
            ConnectivityStatus::Failed
        } else if self.successful == self.total {
            ConnectivityStatus::Success
        } else {
            ConnectivityStatus::Choppy
        }
    }
}

impl fmt::Display for SampleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/{})", self.status(), self.successful, self.total)
    }
}

// ── Pipeline result ────────────────────────────────────────────────

/// The output of one full escalation run.
///
/// `gateway` is always populated since that stage always runs. `internet`
/// is [`SampleResult::EMPTY`] when no gateway probe succeeded, and `http`
/// is `Failed` when the HTTP stage never opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineResult {
    pub gateway: SampleResult,
    pub internet: SampleResult,
    pub http: ConnectivityStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sample_is_failed() {
        assert_eq!(SampleResult::EMPTY.status(), ConnectivityStatus::Failed);
    }

    #[test]
    fn all_failures_is_failed() {
        let sample = SampleResult::from_outcomes(&[false, false, false]);
        assert_eq!(sample.status(), ConnectivityStatus::Failed);
        assert_eq!(sample.successful, 0);
        assert_eq!(sample.total, 3);
    }

    #[test]
    fn all_successes_is_success() {
        let sample = SampleResult::from_outcomes(&[true, true, true, true, true]);
        assert_eq!(sample.status(), ConnectivityStatus::Success);
    }

    #[test]
    fn partial_successes_are_choppy() {
        let sample = SampleResult::from_outcomes(&[true, false, true, false, true]);
        assert_eq!(sample.status(), ConnectivityStatus::Choppy);
        assert_eq!(sample.successful, 3);
    }

    #[test]
    fn single_probe_samples_have_no_choppy_band() {
        assert_eq!(
            SampleResult::from_outcomes(&[true]).status(),
            ConnectivityStatus::Success
        );
        assert_eq!(
            SampleResult::from_outcomes(&[false]).status(),
            ConnectivityStatus::Failed
        );
    }

    #[test]
    fn sample_display_includes_status_and_counts() {
        let sample = SampleResult::from_outcomes(&[true, false, true]);
        assert_eq!(sample.to_string(), "CHOPPY (2/3)");
        assert_eq!(SampleResult::EMPTY.to_string(), "FAILED (0/0)");
    }

    #[test]
    fn status_display_matches_classification_vocabulary() {
        assert_eq!(ConnectivityStatus::Success.to_string(), "SUCCESS");
        assert_eq!(ConnectivityStatus::Captive.to_string(), "CAPTIVE");
        assert_eq!(ConnectivityStatus::Unknown.to_string(), "UNKNOWN");
    }
}
