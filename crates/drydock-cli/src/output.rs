use clap::ValueEnum;
use drydock_core::results::{CommandResults, Outcome};
use serde::Serialize;

// ---------------------------------------------------------------------------
// OutputFormat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Table,
    Summary,
}

// ---------------------------------------------------------------------------
// Generic printers
// ---------------------------------------------------------------------------

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_yaml<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let yaml = serde_yaml::to_string(value)?;
    print!("{}", yaml);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    // Calculate column widths
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    // Print header
    let header_row: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
        .collect();
    println!("{}", header_row.join("  "));

    // Print separator
    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("  "));

    // Print rows
    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = w)
            })
            .collect();
        println!("{}", cells.join("  "));
    }
}

// ---------------------------------------------------------------------------
// CommandResults rendering
// ---------------------------------------------------------------------------

pub fn render_results(results: &CommandResults, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(results),
        OutputFormat::Yaml => print_yaml(results),
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = results
                .results
                .iter()
                .map(|r| {
                    vec![
                        r.service.clone(),
                        r.platform.to_string(),
                        r.outcome.to_string(),
                        format!("{}ms", r.duration_ms),
                        r.message.clone(),
                    ]
                })
                .collect();
            print_table(&["SERVICE", "PLATFORM", "OUTCOME", "DURATION", "MESSAGE"], rows);
            Ok(())
        }
        OutputFormat::Summary => {
            render_summary(results);
            Ok(())
        }
    }
}

fn render_summary(results: &CommandResults) {
    println!("{} ({})", results.operation, results.environment);

    if results.results.is_empty() {
        println!("No services configured.");
        return;
    }

    for r in &results.results {
        let mark = match r.outcome {
            Outcome::Succeeded => "✓",
            Outcome::Failed => "✗",
            Outcome::Skipped => "-",
        };
        if r.message.is_empty() {
            println!("{mark} {}", r.service);
        } else {
            println!("{mark} {} — {}", r.service, r.message);
        }

        // Planned command lines (dry runs)
        for cmd in &r.planned {
            println!("    $ {cmd}");
        }

        // Captured output (status, logs, failures)
        for record in &r.records {
            if record.output.is_empty() {
                continue;
            }
            for line in record.output.lines() {
                println!("    {line}");
            }
        }
    }

    let s = &results.summary;
    println!(
        "\n{} succeeded, {} failed, {} skipped",
        s.succeeded, s.failed, s.skipped
    );
    if results.dry_run {
        println!("dry run — nothing executed");
    }
}
