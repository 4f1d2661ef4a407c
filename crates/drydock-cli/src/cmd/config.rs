use crate::output::{print_json, print_yaml, OutputFormat};
use anyhow::Context;
use clap::Subcommand;
use drydock_core::config::{Config, WarnLevel};
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Check the configuration for mistakes
    Validate,
    /// Dump the effective configuration
    Show,
}

pub fn run(root: &Path, subcmd: &ConfigSubcommand, format: OutputFormat) -> anyhow::Result<i32> {
    match subcmd {
        ConfigSubcommand::Validate => validate(root, format),
        ConfigSubcommand::Show => show(root, format),
    }
}

fn validate(root: &Path, format: OutputFormat) -> anyhow::Result<i32> {
    let config = Config::load(root).context("failed to load config")?;
    let warnings = config.validate();

    let has_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);

    match format {
        OutputFormat::Json => print_json(&warnings)?,
        OutputFormat::Yaml => print_yaml(&warnings)?,
        OutputFormat::Table | OutputFormat::Summary => {
            if warnings.is_empty() {
                println!(
                    "Configuration OK: {} service(s), {} environment(s)",
                    config.services.len(),
                    config.environments.len()
                );
            } else {
                for w in &warnings {
                    let level = match w.level {
                        WarnLevel::Error => "error",
                        WarnLevel::Warning => "warning",
                    };
                    println!("{level}: {}", w.message);
                }
            }
        }
    }

    Ok(if has_errors { 1 } else { 0 })
}

fn show(root: &Path, format: OutputFormat) -> anyhow::Result<i32> {
    let config = Config::load(root).context("failed to load config")?;
    match format {
        OutputFormat::Json => print_json(&config)?,
        _ => print_yaml(&config)?,
    }
    Ok(0)
}
