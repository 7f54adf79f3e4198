//! Verification report: what each stage found and the final verdict.

use std::fmt;

use serde::Serialize;

use crate::probe::ProbeResult;

/// One step of a setup run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// A real queue backend is configured.
    QueueBackend,
    /// The push server receives queue messages.
    QueueRelay,
    /// The push server reads storage mappings from the database.
    Mapping,
    /// The push server can call back into Nextcloud.
    Reverse,
}

impl Stage {
    fn success_message(self) -> &'static str {
        match self {
            Self::QueueBackend => "redis is configured",
            Self::QueueRelay => "push server is receiving redis messages",
            Self::Mapping => "push server can load mount info from database",
            Self::Reverse => "push server can connect to the Nextcloud server",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Self::QueueBackend => "redis is not configured",
            Self::QueueRelay => "push server is not receiving redis messages",
            Self::Mapping => "push server can't load mount info from database",
            Self::Reverse => "push server can't connect to the Nextcloud server",
        }
    }
}

/// Outcome of one stage, with the line shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    /// Which stage ran.
    pub stage: Stage,
    /// What it found.
    #[serde(flatten)]
    pub result: ProbeResult,
    /// Human-readable explanation.
    pub message: String,
}

impl StageReport {
    /// Builds the report line for `result`.
    pub fn new(stage: Stage, result: ProbeResult) -> Self {
        let message = match &result {
            ProbeResult::Success => stage.success_message().to_string(),
            ProbeResult::Unconfigured { .. } if stage == Stage::QueueBackend => {
                stage.failure_message().to_string()
            }
            ProbeResult::Unconfigured { message } => message.clone(),
            ProbeResult::TransportFailure { message } => {
                format!("can't connect to push server: {}", message)
            }
            ProbeResult::MismatchFailure { expected, actual } => format!(
                "{} (expected {}, got '{}')",
                stage.failure_message(),
                expected,
                actual
            ),
            ProbeResult::Inconclusive { message } => {
                format!("can't verify database access: {}", message)
            }
        };
        Self {
            stage,
            result,
            message,
        }
    }

    /// Whether this stage passed.
    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }
}

impl fmt::Display for StageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.is_success() { '✓' } else { '🗴' };
        write!(f, "{} {}", marker, self.message)
    }
}

/// Final verdict of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Every stage passed and the endpoint was saved.
    Pass,
    /// A stage failed; later stages did not run.
    Fail,
}

/// Everything a setup run found, in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    /// Push server URL the run checked.
    pub server: String,
    /// Stages in the order they ran.
    pub stages: Vec<StageReport>,
    /// Whether the server URL was saved as `base_endpoint`.
    pub endpoint_saved: bool,
    /// Final verdict; `Fail` until the run completes successfully.
    pub verdict: Verdict,
}

impl VerificationReport {
    /// Starts an empty report for `server`.
    pub fn new(server: &str) -> Self {
        Self {
            server: server.to_string(),
            stages: Vec::new(),
            endpoint_saved: false,
            verdict: Verdict::Fail,
        }
    }

    /// Appends a stage outcome and returns it.
    pub fn record(&mut self, stage: Stage, result: ProbeResult) -> &StageReport {
        self.stages.push(StageReport::new(stage, result));
        &self.stages[self.stages.len() - 1]
    }

    /// Marks the run as passed and the endpoint as saved.
    pub fn pass(&mut self) {
        self.endpoint_saved = true;
        self.verdict = Verdict::Pass;
    }

    /// Whether the run passed.
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }

    /// Process exit status: `0` on pass, `1` otherwise.
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.passed())
    }

    /// The stage that ended the run, if one failed.
    pub fn failed_stage(&self) -> Option<&StageReport> {
        self.stages.iter().find(|s| !s.is_success())
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stage in &self.stages {
            writeln!(f, "{}", stage)?;
        }
        if self.endpoint_saved {
            writeln!(f, "  configuration saved")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_report_fails_by_default() {
        let report = VerificationReport::new("https://cloud.example.com/push");
        assert!(!report.passed());
        assert_eq!(report.exit_code(), 1);
        assert!(report.failed_stage().is_none());
    }

    #[test]
    fn test_pass_sets_exit_code() {
        let mut report = VerificationReport::new("https://push");
        report.record(Stage::QueueBackend, ProbeResult::Success);
        report.pass();
        assert_eq!(report.exit_code(), 0);
        assert!(report.to_string().ends_with("  configuration saved\n"));
    }

    #[test]
    fn test_mismatch_line_names_expected_and_actual() {
        let line = StageReport::new(
            Stage::Mapping,
            ProbeResult::MismatchFailure {
                expected: 4,
                actual: "3".to_string(),
            },
        );
        assert_eq!(
            line.to_string(),
            "🗴 push server can't load mount info from database (expected 4, got '3')"
        );
    }

    #[test]
    fn test_transport_line() {
        let line = StageReport::new(
            Stage::Reverse,
            ProbeResult::TransportFailure {
                message: "connection refused".to_string(),
            },
        );
        assert_eq!(line.to_string(), "🗴 can't connect to push server: connection refused");
    }

    #[test]
    fn test_unconfigured_relay_line_carries_cause() {
        let line = StageReport::new(
            Stage::QueueRelay,
            ProbeResult::Unconfigured {
                message: "can't publish to redis: connection refused".to_string(),
            },
        );
        assert_eq!(line.to_string(), "🗴 can't publish to redis: connection refused");
    }

    #[test]
    fn test_failed_stage_is_first_failure() {
        let mut report = VerificationReport::new("https://push");
        report.record(Stage::QueueBackend, ProbeResult::Success);
        report.record(
            Stage::QueueRelay,
            ProbeResult::MismatchFailure {
                expected: 1,
                actual: "2".to_string(),
            },
        );
        assert_eq!(report.failed_stage().map(|s| s.stage), Some(Stage::QueueRelay));
    }

    #[test]
    fn test_report_json_shape() {
        let mut report = VerificationReport::new("https://push");
        report.record(Stage::QueueBackend, ProbeResult::Success);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["verdict"], "fail");
        assert_eq!(json["stages"][0]["stage"], "queue_backend");
        assert_eq!(json["stages"][0]["result"], "success");
        assert_eq!(json["stages"][0]["message"], "redis is configured");
    }
}
