use crate::output::{print_json, print_table, print_yaml, OutputFormat};
use drydock_core::command::CommandRegistry;
use drydock_core::types::PlatformKind;

#[derive(serde::Serialize)]
struct CommandRow {
    operation: String,
    platforms: Vec<String>,
    about: &'static str,
}

pub fn run(format: OutputFormat) -> anyhow::Result<i32> {
    let rows: Vec<CommandRow> = CommandRegistry::builtin()
        .all()
        .iter()
        .map(|spec| CommandRow {
            operation: spec.operation.to_string(),
            platforms: spec
                .supported
                .iter()
                .map(|k: &PlatformKind| k.to_string())
                .collect(),
            about: spec.about,
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Yaml => print_yaml(&rows)?,
        OutputFormat::Table | OutputFormat::Summary => {
            let table_rows: Vec<Vec<String>> = rows
                .iter()
                .map(|r| {
                    vec![
                        r.operation.clone(),
                        r.platforms.join(", "),
                        r.about.to_string(),
                    ]
                })
                .collect();
            print_table(&["OPERATION", "PLATFORMS", "DESCRIPTION"], table_rows);
        }
    }
    Ok(0)
}
