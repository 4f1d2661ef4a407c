use crate::output::{print_json, print_table, print_yaml, OutputFormat};
use anyhow::Context;
use drydock_core::config::Config;
use std::path::Path;

#[derive(serde::Serialize)]
struct ServiceRow<'a> {
    name: &'a str,
    platform: String,
    description: &'a str,
    depends_on: &'a [String],
}

pub fn run(root: &Path, environment: Option<&str>, format: OutputFormat) -> anyhow::Result<i32> {
    let config = Config::load(root).context("failed to load config")?;
    let (_, env) = config.environment(environment)?;

    let rows: Vec<ServiceRow> = config
        .services
        .iter()
        .map(|(name, svc)| {
            let target = config.target_for(name, &env)?;
            Ok(ServiceRow {
                name,
                platform: target.kind().to_string(),
                description: &svc.description,
                depends_on: &svc.depends_on,
            })
        })
        .collect::<drydock_core::Result<_>>()?;

    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Yaml => print_yaml(&rows)?,
        OutputFormat::Table | OutputFormat::Summary => {
            if rows.is_empty() {
                println!("No services configured. Edit .drydock/config.yaml to declare them.");
                return Ok(0);
            }
            let table_rows: Vec<Vec<String>> = rows
                .iter()
                .map(|r| {
                    vec![
                        r.name.to_string(),
                        r.platform.clone(),
                        r.depends_on.join(", "),
                        r.description.to_string(),
                    ]
                })
                .collect();
            print_table(&["SERVICE", "PLATFORM", "DEPENDS ON", "DESCRIPTION"], table_rows);
        }
    }
    Ok(0)
}
