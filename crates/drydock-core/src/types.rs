use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// The closed set of verbs the engine understands. Every CLI run maps to
/// exactly one operation applied across a selection of services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Deploy,
    Start,
    Stop,
    Restart,
    Status,
    Logs,
    Build,
}

impl Operation {
    pub fn all() -> &'static [Operation] {
        &[
            Operation::Deploy,
            Operation::Start,
            Operation::Stop,
            Operation::Restart,
            Operation::Status,
            Operation::Logs,
            Operation::Build,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Deploy => "deploy",
            Operation::Start => "start",
            Operation::Stop => "stop",
            Operation::Restart => "restart",
            Operation::Status => "status",
            Operation::Logs => "logs",
            Operation::Build => "build",
        }
    }

    /// Mutating operations change the state of the world and are recorded in
    /// history; read-only operations (status, logs) are not.
    pub fn is_mutating(self) -> bool {
        !matches!(self, Operation::Status | Operation::Logs)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Operation {
    type Err = crate::error::DrydockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deploy" => Ok(Operation::Deploy),
            "start" => Ok(Operation::Start),
            "stop" => Ok(Operation::Stop),
            "restart" => Ok(Operation::Restart),
            "status" => Ok(Operation::Status),
            "logs" => Ok(Operation::Logs),
            "build" => Ok(Operation::Build),
            _ => Err(crate::error::DrydockError::InvalidOperation(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// PlatformKind
// ---------------------------------------------------------------------------

/// Where a service runs. Each kind has a dedicated strategy that turns an
/// operation into subprocess invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformKind {
    Process,
    Container,
    Aws,
    External,
}

impl PlatformKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PlatformKind::Process => "process",
            PlatformKind::Container => "container",
            PlatformKind::Aws => "aws",
            PlatformKind::External => "external",
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
