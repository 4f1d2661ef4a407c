use drydock_core::{io, paths, state::State};
use std::path::Path;

/// Scaffold `.drydock/` with a starter config and an empty state file.
/// Idempotent: existing files are left untouched.
pub fn run(root: &Path, name: Option<&str>) -> anyhow::Result<i32> {
    let project_name = match name {
        Some(n) => n.to_string(),
        None => root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("project")
            .to_string(),
    };

    io::ensure_dir(&paths::drydock_dir(root))?;

    let config_written = io::write_if_missing(
        &paths::config_path(root),
        starter_config(&project_name).as_bytes(),
    )?;

    if !paths::state_path(root).exists() {
        State::new(project_name.clone()).save(root)?;
    }

    // State is a run log, not configuration
    io::ensure_gitignore_entry(root, ".drydock/state.yaml")?;

    if config_written {
        println!("Initialized drydock in .drydock/");
        println!("Edit .drydock/config.yaml to declare services, then run: drydock services");
    } else {
        println!("Already initialized (.drydock/config.yaml exists)");
    }
    Ok(0)
}

fn starter_config(project_name: &str) -> String {
    format!(
        r#"version: 1
project:
  name: {project_name}
default_environment: dev
environments:
  dev:
    env:
      DRYDOCK_ENV: dev

# Declare services under 'services:'. Examples:
#
# services:
#   api:
#     description: API server in a local container
#     target:
#       platform: container
#       image: registry.example.com/api:latest
#       build_context: ./api
#       ports:
#         - "8080:80"
#     depends_on:
#       - db
#   db:
#     description: Hosted postgres
#     target:
#       platform: external
#       url: https://db.example.com
#   worker:
#     description: Background worker on the host
#     target:
#       platform: process
#       start: npm run worker
#       stop: pkill -f 'npm run worker'
#     requires:
#       - type: env_var
#         name: QUEUE_URL
#
# Per-environment overrides live under the environment:
#
# environments:
#   prod:
#     aws_profile: prod
#     aws_region: us-east-1
#     services:
#       api:
#         platform: aws
#         cluster: main
#         service: api
#         log_group: /ecs/api
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use drydock_core::config::Config;

    #[test]
    fn starter_config_parses() {
        let yaml = starter_config("my-project");
        let cfg: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(cfg.project.name, "my-project");
        assert_eq!(cfg.default_environment, "dev");
        assert!(cfg.services.is_empty());
        assert!(cfg.environments.contains_key("dev"));
    }

    #[test]
    fn starter_config_validates_clean() {
        let yaml = starter_config("my-project");
        let cfg: Config = serde_yaml::from_str(&yaml).unwrap();
        assert!(cfg.validate().is_empty());
    }
}
