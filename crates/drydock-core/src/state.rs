use crate::error::{DrydockError, Result};
use crate::paths;
use crate::results::CommandResults;
use crate::types::Operation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Most recent entries kept in the history log.
pub const HISTORY_CAP: usize = 50;

// ---------------------------------------------------------------------------
// HistoryEntry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
    pub environment: String,
    pub services: Vec<String>,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl HistoryEntry {
    pub fn from_results(results: &CommandResults) -> Self {
        Self {
            timestamp: results.started_at,
            operation: results.operation,
            environment: results.environment.clone(),
            services: results.results.iter().map(|r| r.service.clone()).collect(),
            succeeded: results.summary.succeeded,
            failed: results.summary.failed,
            skipped: results.summary.skipped,
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Project-local run log, written after every mutating, non-dry run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    pub project: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoryEntry>,
}

impl State {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            history: Vec::new(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::state_path(root);
        if !path.exists() {
            return Err(DrydockError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let state: State = serde_yaml::from_str(&data)?;
        Ok(state)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::state_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Append an entry, keeping only the most recent `HISTORY_CAP`.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
        if self.history.len() > HISTORY_CAP {
            let excess = self.history.len() - HISTORY_CAP;
            self.history.drain(..excess);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(n: usize) -> HistoryEntry {
        HistoryEntry {
            timestamp: Utc::now(),
            operation: Operation::Deploy,
            environment: "dev".to_string(),
            services: vec![format!("svc-{n}")],
            succeeded: 1,
            failed: 0,
            skipped: 0,
        }
    }

    #[test]
    fn record_caps_history() {
        let mut state = State::new("p");
        for n in 0..60 {
            state.record(entry(n));
        }
        assert_eq!(state.history.len(), HISTORY_CAP);
        // Oldest entries were dropped
        assert_eq!(state.history[0].services, vec!["svc-10"]);
        assert_eq!(state.history.last().unwrap().services, vec!["svc-59"]);
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut state = State::new("my-project");
        state.record(entry(1));
        state.save(dir.path()).unwrap();

        let loaded = State::load(dir.path()).unwrap();
        assert_eq!(loaded.project, "my-project");
        assert_eq!(loaded.history.len(), 1);
        assert_eq!(loaded.history[0], state.history[0]);
    }

    #[test]
    fn load_missing_state_fails() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            State::load(dir.path()),
            Err(DrydockError::NotInitialized)
        ));
    }

    #[test]
    fn from_results_copies_counts() {
        use crate::results::{Outcome, ServiceResult};
        use crate::types::PlatformKind;

        let results = CommandResults::new(
            Operation::Stop,
            "prod",
            false,
            Utc::now(),
            vec![ServiceResult {
                service: "api".to_string(),
                platform: PlatformKind::Container,
                outcome: Outcome::Failed,
                message: "boom".to_string(),
                records: vec![],
                planned: vec![],
                duration_ms: 10,
            }],
        );
        let entry = HistoryEntry::from_results(&results);
        assert_eq!(entry.operation, Operation::Stop);
        assert_eq!(entry.environment, "prod");
        assert_eq!(entry.services, vec!["api"]);
        assert_eq!(entry.failed, 1);
        assert_eq!(entry.succeeded, 0);
    }
}
