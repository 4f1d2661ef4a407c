use crate::error::{DrydockError, Result};
use crate::paths;
use crate::service::Requirement;
use crate::types::PlatformKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// PlatformTarget
// ---------------------------------------------------------------------------

/// Where and how one service runs. The tag selects the strategy; the fields
/// are that strategy's inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "snake_case")]
pub enum PlatformTarget {
    /// A command run on the host through `sh -c`.
    Process {
        start: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stop: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        build: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        logs: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        working_dir: Option<String>,
    },
    /// A docker container managed by name.
    Container {
        image: String,
        /// Defaults to the service name when omitted.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        container_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        build_context: Option<String>,
        /// `HOST:CONTAINER` pairs.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        ports: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        env_file: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        volumes: Vec<String>,
    },
    /// An ECS service driven through the `aws` CLI.
    Aws {
        cluster: String,
        service: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        log_group: Option<String>,
    },
    /// Not managed by drydock; operations are skipped.
    External {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
}

impl PlatformTarget {
    pub fn kind(&self) -> PlatformKind {
        match self {
            PlatformTarget::Process { .. } => PlatformKind::Process,
            PlatformTarget::Container { .. } => PlatformKind::Container,
            PlatformTarget::Aws { .. } => PlatformKind::Aws,
            PlatformTarget::External { .. } => PlatformKind::External,
        }
    }
}

// ---------------------------------------------------------------------------
// EnvironmentConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_region: Option<String>,
    /// Extra env vars injected into every invocation in this environment.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    /// Per-environment target overrides, keyed by service name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub services: BTreeMap<String, PlatformTarget>,
}

impl EnvironmentConfig {
    fn is_empty(&self) -> bool {
        self.aws_profile.is_none()
            && self.aws_region.is_none()
            && self.env.is_empty()
            && self.services.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ServiceConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Default target; an environment may override it.
    pub target: PlatformTarget,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<Requirement>,
    /// Ordering only: listed services run before this one (after, for
    /// reverse-order operations). Not an implicit selection.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectConfig,
    #[serde(default = "default_environment_name")]
    pub default_environment: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environments: BTreeMap<String, EnvironmentConfig>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub services: BTreeMap<String, ServiceConfig>,
}

fn default_version() -> u32 {
    1
}

fn default_environment_name() -> String {
    "dev".to_string()
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        let mut environments = BTreeMap::new();
        environments.insert(default_environment_name(), EnvironmentConfig::default());
        Self {
            version: 1,
            project: ProjectConfig {
                name: project_name.into(),
                description: None,
            },
            default_environment: default_environment_name(),
            environments,
            services: BTreeMap::new(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(DrydockError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Resolve an environment by name. `None` selects `default_environment`.
    /// The default environment may be implicit (absent from `environments`);
    /// any other name must be declared.
    pub fn environment(&self, name: Option<&str>) -> Result<(String, EnvironmentConfig)> {
        let name = name.unwrap_or(&self.default_environment);
        if let Some(env) = self.environments.get(name) {
            return Ok((name.to_string(), env.clone()));
        }
        if name == self.default_environment {
            return Ok((name.to_string(), EnvironmentConfig::default()));
        }
        Err(DrydockError::EnvironmentNotFound(name.to_string()))
    }

    /// The effective target for a service in an environment: the environment
    /// override wins over the service default.
    pub fn target_for<'a>(
        &'a self,
        service: &str,
        environment: &'a EnvironmentConfig,
    ) -> Result<&'a PlatformTarget> {
        let svc = self
            .services
            .get(service)
            .ok_or_else(|| DrydockError::ServiceNotFound(service.to_string()))?;
        Ok(environment.services.get(service).unwrap_or(&svc.target))
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        // Environment overrides must reference declared services
        for (env_name, env) in &self.environments {
            for svc_name in env.services.keys() {
                if !self.services.contains_key(svc_name) {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Error,
                        message: format!(
                            "environment '{env_name}' overrides unknown service '{svc_name}'"
                        ),
                    });
                }
            }
            if env.is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("environment '{env_name}' is empty"),
                });
            }
        }

        // depends_on must reference declared services
        for (svc_name, svc) in &self.services {
            for dep in &svc.depends_on {
                if !self.services.contains_key(dep) {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Error,
                        message: format!(
                            "service '{svc_name}' depends on unknown service '{dep}'"
                        ),
                    });
                }
            }
        }

        // Dependency graph must be acyclic
        if let Err(DrydockError::DependencyCycle(svc)) = crate::service::dependency_order(self) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("dependency cycle involving service '{svc}'"),
            });
        }

        // Target shape checks, per environment-effective target
        for (svc_name, svc) in &self.services {
            let mut targets: Vec<&PlatformTarget> = vec![&svc.target];
            for env in self.environments.values() {
                if let Some(t) = env.services.get(svc_name) {
                    targets.push(t);
                }
            }
            for target in targets {
                match target {
                    PlatformTarget::Process { start, .. } => {
                        if start.trim().is_empty() {
                            warnings.push(ConfigWarning {
                                level: WarnLevel::Error,
                                message: format!(
                                    "service '{svc_name}' has an empty start command"
                                ),
                            });
                        }
                    }
                    PlatformTarget::Container { ports, .. } => {
                        for port in ports {
                            if !valid_port_mapping(port) {
                                warnings.push(ConfigWarning {
                                    level: WarnLevel::Warning,
                                    message: format!(
                                        "service '{svc_name}' has a malformed port mapping \
                                         '{port}' (expected HOST:CONTAINER)"
                                    ),
                                });
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        if !self.environments.contains_key(&self.default_environment) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "default environment '{}' is not declared under 'environments'",
                    self.default_environment
                ),
            });
        }

        warnings
    }
}

fn valid_port_mapping(s: &str) -> bool {
    let parts: Vec<&str> = s.split(':').collect();
    parts.len() == 2 && parts.iter().all(|p| p.parse::<u16>().is_ok())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
