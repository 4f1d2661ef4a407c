use crate::runner::ExecRecord;
use crate::types::{Operation, PlatformKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Succeeded,
    Failed,
    Skipped,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Succeeded => "succeeded",
            Outcome::Failed => "failed",
            Outcome::Skipped => "skipped",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ServiceResult
// ---------------------------------------------------------------------------

/// The outcome of one operation against one service. Failures are data, not
/// errors: the run continues to the next service and the summary reports
/// the aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceResult {
    pub service: String,
    pub platform: PlatformKind,
    pub outcome: Outcome,
    /// Failure reason, skip reason, or terse success note.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    /// Executed invocations, in order. Empty for skips and dry runs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<ExecRecord>,
    /// Planned command lines, populated on dry runs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub planned: Vec<String>,
    pub duration_ms: u64,
}

// ---------------------------------------------------------------------------
// Summary / CommandResults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// The aggregated, serializable outcome of one run across services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResults {
    pub run_id: Uuid,
    pub operation: Operation,
    pub environment: String,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub results: Vec<ServiceResult>,
    pub summary: Summary,
}

impl CommandResults {
    /// The summary is always derived from `results`; it is never hand-set.
    pub fn new(
        operation: Operation,
        environment: impl Into<String>,
        dry_run: bool,
        started_at: DateTime<Utc>,
        results: Vec<ServiceResult>,
    ) -> Self {
        let summary = Summary {
            total: results.len(),
            succeeded: results
                .iter()
                .filter(|r| r.outcome == Outcome::Succeeded)
                .count(),
            failed: results.iter().filter(|r| r.outcome == Outcome::Failed).count(),
            skipped: results
                .iter()
                .filter(|r| r.outcome == Outcome::Skipped)
                .count(),
        };
        Self {
            run_id: Uuid::new_v4(),
            operation,
            environment: environment.into(),
            dry_run,
            started_at,
            results,
            summary,
        }
    }

    pub fn any_failed(&self) -> bool {
        self.summary.failed > 0
    }

    /// 0 when nothing failed; 2 otherwise. 1 is reserved for top-level CLI
    /// errors (bad arguments, unreadable config).
    pub fn exit_code(&self) -> i32 {
        if self.any_failed() {
            2
        } else {
            0
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn result(service: &str, outcome: Outcome) -> ServiceResult {
        ServiceResult {
            service: service.to_string(),
            platform: PlatformKind::Process,
            outcome,
            message: String::new(),
            records: vec![],
            planned: vec![],
            duration_ms: 0,
        }
    }

    #[test]
    fn summary_is_derived_from_results() {
        let results = CommandResults::new(
            Operation::Deploy,
            "dev",
            false,
            Utc::now(),
            vec![
                result("a", Outcome::Succeeded),
                result("b", Outcome::Failed),
                result("c", Outcome::Skipped),
                result("d", Outcome::Succeeded),
            ],
        );
        assert_eq!(results.summary.total, 4);
        assert_eq!(results.summary.succeeded, 2);
        assert_eq!(results.summary.failed, 1);
        assert_eq!(results.summary.skipped, 1);
    }

    #[test]
    fn exit_code_reflects_failures() {
        let ok = CommandResults::new(
            Operation::Start,
            "dev",
            false,
            Utc::now(),
            vec![result("a", Outcome::Succeeded), result("b", Outcome::Skipped)],
        );
        assert!(!ok.any_failed());
        assert_eq!(ok.exit_code(), 0);

        let bad = CommandResults::new(
            Operation::Start,
            "dev",
            false,
            Utc::now(),
            vec![result("a", Outcome::Failed)],
        );
        assert!(bad.any_failed());
        assert_eq!(bad.exit_code(), 2);
    }

    #[test]
    fn empty_run_exits_clean() {
        let results = CommandResults::new(Operation::Status, "dev", false, Utc::now(), vec![]);
        assert_eq!(results.summary.total, 0);
        assert_eq!(results.exit_code(), 0);
    }

    #[test]
    fn json_roundtrip() {
        let results = CommandResults::new(
            Operation::Deploy,
            "prod",
            true,
            Utc::now(),
            vec![result("api", Outcome::Succeeded)],
        );
        let json = serde_json::to_string(&results).unwrap();
        assert!(json.contains("\"operation\":\"deploy\""));
        assert!(json.contains("\"dry_run\":true"));
        let parsed: CommandResults = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.run_id, results.run_id);
        assert_eq!(parsed.summary, results.summary);
    }

    #[test]
    fn empty_fields_are_not_serialized() {
        let json =
            serde_json::to_string(&result("api", Outcome::Succeeded)).unwrap();
        assert!(!json.contains("records"));
        assert!(!json.contains("planned"));
        assert!(!json.contains("message"));
    }
}
