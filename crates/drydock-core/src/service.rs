use crate::config::{Config, PlatformTarget};
use crate::error::{DrydockError, Result};
use crate::types::PlatformKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

// ---------------------------------------------------------------------------
// Requirement
// ---------------------------------------------------------------------------

/// A precondition a service declares on the machine running drydock.
/// Checked before any invocation is planned; an unmet requirement fails the
/// service without aborting the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Requirement {
    Binary { name: String },
    EnvVar { name: String },
    File { path: String },
}

impl Requirement {
    pub fn describe(&self) -> String {
        match self {
            Requirement::Binary { name } => format!("binary '{name}' on PATH"),
            Requirement::EnvVar { name } => format!("environment variable '{name}'"),
            Requirement::File { path } => format!("file '{path}'"),
        }
    }

    /// `None` when satisfied, otherwise a human-readable failure.
    ///
    /// `env` is the composed invocation environment; an env var counts as
    /// set if it appears there or in the parent process environment.
    pub fn check(&self, root: &Path, env: &[(String, String)]) -> Option<String> {
        match self {
            Requirement::Binary { name } => match which::which(name) {
                Ok(_) => None,
                Err(_) => Some(format!("binary '{name}' not found on PATH")),
            },
            Requirement::EnvVar { name } => {
                let in_context = env.iter().any(|(k, v)| k == name && !v.is_empty());
                let in_process = std::env::var(name).map(|v| !v.is_empty()).unwrap_or(false);
                if in_context || in_process {
                    None
                } else {
                    Some(format!("environment variable '{name}' is not set"))
                }
            }
            Requirement::File { path } => {
                if root.join(path).exists() {
                    None
                } else {
                    Some(format!("file '{path}' not found"))
                }
            }
        }
    }
}

/// Requirements implied by the target platform itself, checked ahead of the
/// service's declared ones.
pub fn implied_requirements(target: &PlatformTarget) -> Vec<Requirement> {
    match target.kind() {
        PlatformKind::Container => vec![Requirement::Binary {
            name: "docker".to_string(),
        }],
        PlatformKind::Aws => vec![Requirement::Binary {
            name: "aws".to_string(),
        }],
        PlatformKind::Process | PlatformKind::External => vec![],
    }
}

// ---------------------------------------------------------------------------
// Ordering and selection
// ---------------------------------------------------------------------------

/// All configured services in dependency order: a service appears after
/// everything it depends on. Ties break lexicographically, so the order is
/// deterministic. Dependencies on unknown services are ignored here; config
/// validation reports them.
pub fn dependency_order(config: &Config) -> Result<Vec<String>> {
    let mut remaining: BTreeSet<&str> = config.services.keys().map(|s| s.as_str()).collect();
    let mut order = Vec::with_capacity(remaining.len());
    let mut placed: BTreeSet<&str> = BTreeSet::new();

    while !remaining.is_empty() {
        let next = remaining.iter().copied().find(|name| {
            config.services[*name]
                .depends_on
                .iter()
                .all(|dep| placed.contains(dep.as_str()) || !config.services.contains_key(dep))
        });
        match next {
            Some(name) => {
                remaining.remove(name);
                placed.insert(name);
                order.push(name.to_string());
            }
            None => {
                // Every remaining service waits on another remaining one.
                let first = remaining.iter().next().unwrap();
                return Err(DrydockError::DependencyCycle(first.to_string()));
            }
        }
    }
    Ok(order)
}

/// Resolve the service selection for a run.
///
/// An empty selector means every configured service. Named services must
/// exist; the result always follows dependency order regardless of the order
/// given on the command line. Dependencies are ordering-only and are not
/// implicitly added to the selection.
pub fn resolve_selection(config: &Config, selector: &[String]) -> Result<Vec<String>> {
    let order = dependency_order(config)?;
    if selector.is_empty() {
        return Ok(order);
    }
    let mut wanted: BTreeSet<&str> = BTreeSet::new();
    for name in selector {
        if !config.services.contains_key(name) {
            return Err(DrydockError::ServiceNotFound(name.clone()));
        }
        wanted.insert(name.as_str());
    }
    Ok(order
        .into_iter()
        .filter(|name| wanted.contains(name.as_str()))
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;

    fn svc(start: &str, deps: &[&str]) -> ServiceConfig {
        ServiceConfig {
            description: String::new(),
            target: PlatformTarget::Process {
                start: start.to_string(),
                stop: None,
                build: None,
                logs: None,
                working_dir: None,
            },
            requires: vec![],
            depends_on: deps.iter().map(|d| d.to_string()).collect(),
        }
    }

    fn config_with(services: &[(&str, &[&str])]) -> Config {
        let mut cfg = Config::new("p");
        for (name, deps) in services {
            cfg.services.insert(name.to_string(), svc("echo ok", deps));
        }
        cfg
    }

    #[test]
    fn requirement_serde_tagged() {
        let req = Requirement::Binary {
            name: "docker".to_string(),
        };
        let yaml = serde_yaml::to_string(&req).unwrap();
        assert!(yaml.contains("type: binary"));
        let parsed: Requirement = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, req);
    }

    #[test]
    fn binary_requirement_check() {
        // sh is present on any unix host running the tests
        let req = Requirement::Binary {
            name: "sh".to_string(),
        };
        assert!(req.check(Path::new("/tmp"), &[]).is_none());

        let req = Requirement::Binary {
            name: "definitely-not-a-real-binary-xyz".to_string(),
        };
        let msg = req.check(Path::new("/tmp"), &[]).unwrap();
        assert!(msg.contains("not found on PATH"));
    }

    #[test]
    fn env_var_requirement_checks_context_env() {
        let req = Requirement::EnvVar {
            name: "DRYDOCK_TEST_CTX_ONLY".to_string(),
        };
        assert!(req.check(Path::new("/tmp"), &[]).is_some());
        let ctx = vec![("DRYDOCK_TEST_CTX_ONLY".to_string(), "1".to_string())];
        assert!(req.check(Path::new("/tmp"), &ctx).is_none());
    }

    #[test]
    fn env_var_requirement_empty_value_unsatisfied() {
        let req = Requirement::EnvVar {
            name: "DRYDOCK_TEST_EMPTY".to_string(),
        };
        let ctx = vec![("DRYDOCK_TEST_EMPTY".to_string(), String::new())];
        assert!(req.check(Path::new("/tmp"), &ctx).is_some());
    }

    #[test]
    fn file_requirement_relative_to_root() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("compose.yaml"), "x").unwrap();
        let req = Requirement::File {
            path: "compose.yaml".to_string(),
        };
        assert!(req.check(dir.path(), &[]).is_none());
        let req = Requirement::File {
            path: "missing.yaml".to_string(),
        };
        assert!(req.check(dir.path(), &[]).is_some());
    }

    #[test]
    fn implied_requirements_by_platform() {
        let container = PlatformTarget::Container {
            image: "x".to_string(),
            container_name: None,
            build_context: None,
            ports: vec![],
            env_file: None,
            volumes: vec![],
        };
        assert_eq!(
            implied_requirements(&container),
            vec![Requirement::Binary {
                name: "docker".to_string()
            }]
        );

        let process = PlatformTarget::Process {
            start: "x".to_string(),
            stop: None,
            build: None,
            logs: None,
            working_dir: None,
        };
        assert!(implied_requirements(&process).is_empty());
    }

    #[test]
    fn dependency_order_places_deps_first() {
        let cfg = config_with(&[("api", &["db"]), ("db", &[]), ("worker", &["api"])]);
        let order = dependency_order(&cfg).unwrap();
        assert_eq!(order, vec!["db", "api", "worker"]);
    }

    #[test]
    fn dependency_order_lexicographic_ties() {
        let cfg = config_with(&[("zeta", &[]), ("alpha", &[]), ("mid", &[])]);
        let order = dependency_order(&cfg).unwrap();
        assert_eq!(order, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn dependency_order_cycle_detected() {
        let cfg = config_with(&[("a", &["b"]), ("b", &["a"])]);
        assert!(matches!(
            dependency_order(&cfg),
            Err(DrydockError::DependencyCycle(_))
        ));
    }

    #[test]
    fn dependency_order_ignores_unknown_deps() {
        let cfg = config_with(&[("api", &["ghost"])]);
        let order = dependency_order(&cfg).unwrap();
        assert_eq!(order, vec!["api"]);
    }

    #[test]
    fn empty_selection_is_all_services() {
        let cfg = config_with(&[("api", &["db"]), ("db", &[])]);
        let sel = resolve_selection(&cfg, &[]).unwrap();
        assert_eq!(sel, vec!["db", "api"]);
    }

    #[test]
    fn selection_follows_dependency_order() {
        let cfg = config_with(&[("api", &["db"]), ("db", &[]), ("worker", &[])]);
        let sel =
            resolve_selection(&cfg, &["api".to_string(), "db".to_string()]).unwrap();
        assert_eq!(sel, vec!["db", "api"]);
    }

    #[test]
    fn selection_does_not_pull_in_dependencies() {
        let cfg = config_with(&[("api", &["db"]), ("db", &[])]);
        let sel = resolve_selection(&cfg, &["api".to_string()]).unwrap();
        assert_eq!(sel, vec!["api"]);
    }

    #[test]
    fn unknown_service_in_selection() {
        let cfg = config_with(&[("api", &[])]);
        assert!(matches!(
            resolve_selection(&cfg, &["ghost".to_string()]),
            Err(DrydockError::ServiceNotFound(_))
        ));
    }
}
