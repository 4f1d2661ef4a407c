use crate::output::{print_json, print_table, print_yaml, OutputFormat};
use drydock_core::error::DrydockError;
use drydock_core::state::State;
use std::path::Path;

pub fn run(root: &Path, limit: usize, format: OutputFormat) -> anyhow::Result<i32> {
    let state = match State::load(root) {
        Ok(s) => s,
        Err(DrydockError::NotInitialized) => {
            println!("No history yet.");
            return Ok(0);
        }
        Err(e) => return Err(e.into()),
    };

    // Newest first
    let entries: Vec<_> = state.history.iter().rev().take(limit).collect();

    match format {
        OutputFormat::Json => print_json(&entries)?,
        OutputFormat::Yaml => print_yaml(&entries)?,
        OutputFormat::Table | OutputFormat::Summary => {
            if entries.is_empty() {
                println!("No history yet.");
                return Ok(0);
            }
            let rows: Vec<Vec<String>> = entries
                .iter()
                .map(|e| {
                    vec![
                        e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                        e.operation.to_string(),
                        e.environment.clone(),
                        e.services.join(", "),
                        format!(
                            "{} ok, {} failed, {} skipped",
                            e.succeeded, e.failed, e.skipped
                        ),
                    ]
                })
                .collect();
            print_table(&["WHEN", "OPERATION", "ENV", "SERVICES", "RESULT"], rows);
        }
    }
    Ok(0)
}
