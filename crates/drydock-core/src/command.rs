use crate::types::{Operation, PlatformKind};

// ---------------------------------------------------------------------------
// CommandSpec
// ---------------------------------------------------------------------------

/// Declarative definition of one engine command: which platforms it applies
/// to and how the executor walks the service selection. The strategies decide
/// *how* an operation runs; this table decides *whether* it runs at all for a
/// given platform.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub operation: Operation,
    pub about: &'static str,
    pub supported: &'static [PlatformKind],
    /// Walk services in reverse dependency order (dependents first).
    pub reverse_order: bool,
}

impl CommandSpec {
    pub fn supports(&self, kind: PlatformKind) -> bool {
        self.supported.contains(&kind)
    }
}

// ---------------------------------------------------------------------------
// CommandRegistry
// ---------------------------------------------------------------------------

const MANAGED: &[PlatformKind] = &[
    PlatformKind::Process,
    PlatformKind::Container,
    PlatformKind::Aws,
];

static SPECS: &[CommandSpec] = &[
    CommandSpec {
        operation: Operation::Deploy,
        about: "Build (where applicable) and (re)start services at the latest version",
        supported: MANAGED,
        reverse_order: false,
    },
    CommandSpec {
        operation: Operation::Start,
        about: "Start services",
        supported: MANAGED,
        reverse_order: false,
    },
    CommandSpec {
        operation: Operation::Stop,
        about: "Stop services (dependents stop before their dependencies)",
        supported: MANAGED,
        reverse_order: true,
    },
    CommandSpec {
        operation: Operation::Restart,
        about: "Restart services",
        supported: MANAGED,
        reverse_order: false,
    },
    CommandSpec {
        operation: Operation::Status,
        about: "Report the current state of services",
        supported: &[
            PlatformKind::Process,
            PlatformKind::Container,
            PlatformKind::Aws,
            PlatformKind::External,
        ],
        reverse_order: false,
    },
    CommandSpec {
        operation: Operation::Logs,
        about: "Show recent service logs",
        supported: MANAGED,
        reverse_order: false,
    },
    CommandSpec {
        operation: Operation::Build,
        about: "Build service artifacts without deploying",
        supported: &[PlatformKind::Process, PlatformKind::Container],
        reverse_order: false,
    },
];

/// The builtin command table. One entry per `Operation`.
pub struct CommandRegistry {
    specs: &'static [CommandSpec],
}

static REGISTRY: CommandRegistry = CommandRegistry { specs: SPECS };

impl CommandRegistry {
    pub fn builtin() -> &'static CommandRegistry {
        &REGISTRY
    }

    pub fn lookup(&self, operation: Operation) -> &CommandSpec {
        self.specs
            .iter()
            .find(|s| s.operation == operation)
            .expect("every operation is registered")
    }

    pub fn all(&self) -> &[CommandSpec] {
        self.specs
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
