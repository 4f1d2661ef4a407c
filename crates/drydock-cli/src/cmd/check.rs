use crate::output::{print_json, print_table, print_yaml, OutputFormat};
use anyhow::Context;
use drydock_core::config::Config;
use drydock_core::service::{implied_requirements, resolve_selection};
use std::path::Path;

#[derive(serde::Serialize)]
struct CheckRow {
    service: String,
    requirement: String,
    satisfied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    problem: Option<String>,
}

/// Requirements doctor: evaluate every platform-implied and declared
/// requirement for the selection. Exits 2 when anything is missing.
pub fn run(
    root: &Path,
    services: &[String],
    environment: Option<&str>,
    format: OutputFormat,
) -> anyhow::Result<i32> {
    let config = Config::load(root).context("failed to load config")?;
    let (_, env) = config.environment(environment)?;
    let selection = resolve_selection(&config, services)?;

    let context_env: Vec<(String, String)> =
        env.env.iter().map(|(k, v)| (k.clone(), v.clone())).collect();

    let mut rows = Vec::new();
    for name in &selection {
        let target = config.target_for(name, &env)?;
        let declared = &config.services[name.as_str()].requires;
        for req in implied_requirements(target).iter().chain(declared.iter()) {
            let problem = req.check(root, &context_env);
            rows.push(CheckRow {
                service: name.clone(),
                requirement: req.describe(),
                satisfied: problem.is_none(),
                problem,
            });
        }
    }

    let missing = rows.iter().filter(|r| !r.satisfied).count();

    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Yaml => print_yaml(&rows)?,
        OutputFormat::Table | OutputFormat::Summary => {
            if rows.is_empty() {
                println!("No requirements declared.");
                return Ok(0);
            }
            let table_rows: Vec<Vec<String>> = rows
                .iter()
                .map(|r| {
                    vec![
                        r.service.clone(),
                        r.requirement.clone(),
                        if r.satisfied {
                            "ok".to_string()
                        } else {
                            r.problem.clone().unwrap_or_else(|| "missing".to_string())
                        },
                    ]
                })
                .collect();
            print_table(&["SERVICE", "REQUIREMENT", "STATUS"], table_rows);
            if missing > 0 {
                println!("\n{missing} requirement(s) missing");
            }
        }
    }

    Ok(if missing > 0 { 2 } else { 0 })
}
