//! The execution pipeline: resolve (command x service x platform), plan,
//! run, aggregate.
//!
//! Services run sequentially in dependency order. A problem with one service
//! becomes a failed `ServiceResult`; the run always continues to the next
//! service and the caller reads the aggregate summary.

use crate::command::{CommandRegistry, CommandSpec};
use crate::config::{Config, EnvironmentConfig, PlatformTarget};
use crate::error::{DrydockError, Result};
use crate::platform::{self, Plan, PlanContext};
use crate::results::{CommandResults, Outcome, ServiceResult};
use crate::runner::{self, DEFAULT_TIMEOUT};
use crate::service::{self, implied_requirements};
use crate::state::{HistoryEntry, State};
use crate::types::{Operation, PlatformKind};
use chrono::Utc;
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ExecuteRequest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ExecuteRequest {
    pub operation: Operation,
    /// Empty means every configured service.
    pub services: Vec<String>,
    /// `None` selects the config's default environment.
    pub environment: Option<String>,
    pub dry_run: bool,
    /// Per-invocation timeout; `None` applies `DEFAULT_TIMEOUT`.
    pub timeout: Option<Duration>,
}

impl ExecuteRequest {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            services: Vec::new(),
            environment: None,
            dry_run: false,
            timeout: None,
        }
    }
}

// ---------------------------------------------------------------------------
// execute
// ---------------------------------------------------------------------------

pub fn execute(root: &Path, config: &Config, request: &ExecuteRequest) -> Result<CommandResults> {
    let started_at = Utc::now();
    let (env_name, env) = config.environment(request.environment.as_deref())?;
    let spec = CommandRegistry::builtin().lookup(request.operation);

    let mut selection = service::resolve_selection(config, &request.services)?;
    if spec.reverse_order {
        selection.reverse();
    }

    let timeout = request.timeout.unwrap_or(DEFAULT_TIMEOUT);

    let mut results = Vec::with_capacity(selection.len());
    for name in &selection {
        results.push(run_service(
            root, config, &env_name, &env, spec, name, request, timeout,
        ));
    }

    let results = CommandResults::new(
        request.operation,
        env_name,
        request.dry_run,
        started_at,
        results,
    );

    if request.operation.is_mutating() && !request.dry_run {
        record_history(root, config, &results);
    }

    Ok(results)
}

#[allow(clippy::too_many_arguments)]
fn run_service(
    root: &Path,
    config: &Config,
    env_name: &str,
    env: &EnvironmentConfig,
    spec: &CommandSpec,
    name: &str,
    request: &ExecuteRequest,
    timeout: Duration,
) -> ServiceResult {
    let start = std::time::Instant::now();

    let target = match config.target_for(name, env) {
        Ok(t) => t,
        Err(e) => {
            return finish(name, PlatformKind::Process, Outcome::Failed, e.to_string(), start)
        }
    };
    let kind = target.kind();

    // Registry-level branching: an unsupported platform is a skip, not a
    // failure. Deploying "all services" past an external database is routine.
    if !spec.supports(kind) {
        let reason = if kind == PlatformKind::External {
            "managed externally".to_string()
        } else {
            format!(
                "'{}' is not supported for {} targets",
                request.operation, kind
            )
        };
        return finish(name, kind, Outcome::Skipped, reason, start);
    }

    let context_env: Vec<(String, String)> =
        env.env.iter().map(|(k, v)| (k.clone(), v.clone())).collect();

    // Platform-implied requirements first, then the service's own.
    let declared = &config.services[name].requires;
    for req in implied_requirements(target).iter().chain(declared.iter()) {
        if let Some(problem) = req.check(root, &context_env) {
            let message = DrydockError::MissingRequirement(problem).to_string();
            return finish(name, kind, Outcome::Failed, message, start);
        }
    }

    let ctx = PlanContext {
        service: name.to_string(),
        environment: env_name.to_string(),
        env: context_env,
        aws_profile: env.aws_profile.clone(),
        aws_region: env.aws_region.clone(),
    };

    let plan = match platform::plan(target, request.operation, &ctx) {
        Ok(p) => p,
        Err(e) => return finish(name, kind, Outcome::Failed, e.to_string(), start),
    };

    let invocations = match plan {
        Plan::Skip { reason } => return finish(name, kind, Outcome::Skipped, reason, start),
        Plan::Run(invocations) => invocations,
    };

    if request.dry_run {
        let planned = invocations.iter().map(|i| i.display()).collect();
        return ServiceResult {
            service: name.to_string(),
            platform: kind,
            outcome: Outcome::Succeeded,
            message: "dry run".to_string(),
            records: vec![],
            planned,
            duration_ms: start.elapsed().as_millis() as u64,
        };
    }

    let mut records = Vec::with_capacity(invocations.len());
    let mut failed_invocation = None;
    for invocation in &invocations {
        tracing::debug!(service = name, command = %invocation.display(), "executing");
        let record = runner::execute(invocation, root, Some(timeout));
        let ok = record.success;
        records.push(record);
        if !ok {
            failed_invocation = Some(invocation.display());
            break;
        }
    }

    let (outcome, message) = match failed_invocation {
        Some(display) => (Outcome::Failed, format!("command failed: {display}")),
        None => (Outcome::Succeeded, String::new()),
    };

    ServiceResult {
        service: name.to_string(),
        platform: kind,
        outcome,
        message,
        records,
        planned: vec![],
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

fn finish(
    name: &str,
    platform: PlatformKind,
    outcome: Outcome,
    message: String,
    start: std::time::Instant,
) -> ServiceResult {
    ServiceResult {
        service: name.to_string(),
        platform,
        outcome,
        message,
        records: vec![],
        planned: vec![],
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

/// History is best-effort: a write failure is logged, never surfaced as a
/// command failure.
fn record_history(root: &Path, config: &Config, results: &CommandResults) {
    let mut state = match State::load(root) {
        Ok(s) => s,
        Err(DrydockError::NotInitialized) => State::new(config.project.name.clone()),
        Err(e) => {
            tracing::warn!("failed to load state for history: {e}");
            return;
        }
    };
    state.record(HistoryEntry::from_results(results));
    if let Err(e) = state.save(root) {
        tracing::warn!("failed to record history: {e}");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
