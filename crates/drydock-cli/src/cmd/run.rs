use crate::output::{self, OutputFormat};
use anyhow::Context;
use drydock_core::config::Config;
use drydock_core::executor::{self, ExecuteRequest};
use drydock_core::types::Operation;
use std::path::Path;
use std::time::Duration;

/// Shared handler for the seven operation subcommands: load config, run the
/// executor, render, and surface the aggregate exit code.
pub fn run(
    root: &Path,
    operation: Operation,
    services: Vec<String>,
    environment: Option<String>,
    format: OutputFormat,
    dry_run: bool,
    timeout_secs: Option<u64>,
) -> anyhow::Result<i32> {
    let config = Config::load(root).context("failed to load config")?;

    let request = ExecuteRequest {
        operation,
        services,
        environment,
        dry_run,
        timeout: timeout_secs.map(Duration::from_secs),
    };

    let results = executor::execute(root, &config, &request)
        .with_context(|| format!("failed to run '{operation}'"))?;

    output::render_results(&results, format)?;
    Ok(results.exit_code())
}
