//! Platform strategies: turn (operation, target) into subprocess invocations.
//!
//! Strategies are pure planners: they never touch the outside world, so
//! every docker/aws command line is unit-testable on a machine without
//! docker or aws installed. The executor decides whether a plan is printed
//! (dry run) or handed to the runner.

use crate::config::PlatformTarget;
use crate::error::{DrydockError, Result};
use crate::runner::Invocation;
use crate::types::Operation;

// ---------------------------------------------------------------------------
// PlanContext / Plan
// ---------------------------------------------------------------------------

/// Everything a strategy may consult while planning.
#[derive(Debug, Clone, Default)]
pub struct PlanContext {
    pub service: String,
    pub environment: String,
    /// Composed invocation env (environment config `env` map).
    pub env: Vec<(String, String)>,
    pub aws_profile: Option<String>,
    pub aws_region: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    Run(Vec<Invocation>),
    Skip { reason: String },
}

impl Plan {
    fn run(invocations: Vec<Invocation>) -> Self {
        Plan::Run(invocations)
    }

    fn skip(reason: impl Into<String>) -> Self {
        Plan::Skip {
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Plan `operation` against `target`.
///
/// The command registry filters unsupported (operation, platform) pairs
/// before this is reached; calling outside that matrix is a contract error
/// and returns `UnsupportedOperation`.
pub fn plan(target: &PlatformTarget, operation: Operation, ctx: &PlanContext) -> Result<Plan> {
    match target {
        PlatformTarget::Process {
            start,
            stop,
            build,
            logs,
            working_dir,
        } => plan_process(
            operation,
            ctx,
            start,
            stop.as_deref(),
            build.as_deref(),
            logs.as_deref(),
            working_dir.as_deref(),
        ),
        PlatformTarget::Container {
            image,
            container_name,
            build_context,
            ports,
            env_file,
            volumes,
        } => plan_container(
            operation,
            ctx,
            image,
            container_name.as_deref(),
            build_context.as_deref(),
            ports,
            env_file.as_deref(),
            volumes,
        ),
        PlatformTarget::Aws {
            cluster,
            service,
            log_group,
        } => plan_aws(operation, ctx, cluster, service, log_group.as_deref()),
        PlatformTarget::External { url, note } => {
            plan_external(operation, target, url.as_deref(), note.as_deref())
        }
    }
}

fn unsupported(operation: Operation, target: &PlatformTarget) -> DrydockError {
    DrydockError::UnsupportedOperation {
        operation: operation.to_string(),
        platform: target.kind().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Process
// ---------------------------------------------------------------------------

fn plan_process(
    operation: Operation,
    ctx: &PlanContext,
    start: &str,
    stop: Option<&str>,
    build: Option<&str>,
    logs: Option<&str>,
    working_dir: Option<&str>,
) -> Result<Plan> {
    let sh = |command: &str| {
        let mut inv = Invocation::shell(command).with_env(ctx.env.clone());
        if let Some(dir) = working_dir {
            inv = inv.with_cwd(dir);
        }
        inv
    };

    let plan = match operation {
        Operation::Deploy => {
            let mut invs = Vec::new();
            if let Some(build) = build {
                invs.push(sh(build));
            }
            invs.push(sh(start));
            Plan::run(invs)
        }
        Operation::Start => Plan::run(vec![sh(start)]),
        Operation::Stop => match stop {
            Some(stop) => Plan::run(vec![sh(stop)]),
            None => Plan::skip("no stop command configured"),
        },
        Operation::Restart => {
            let mut invs = Vec::new();
            if let Some(stop) = stop {
                invs.push(sh(stop));
            }
            invs.push(sh(start));
            Plan::run(invs)
        }
        Operation::Status => Plan::skip("status is not tracked for process targets"),
        Operation::Logs => match logs {
            Some(logs) => Plan::run(vec![sh(logs)]),
            None => Plan::skip("no logs command configured"),
        },
        Operation::Build => match build {
            Some(build) => Plan::run(vec![sh(build)]),
            None => Plan::skip("no build command configured"),
        },
    };
    Ok(plan)
}

// ---------------------------------------------------------------------------
// Container
// ---------------------------------------------------------------------------

fn plan_container(
    operation: Operation,
    ctx: &PlanContext,
    image: &str,
    container_name: Option<&str>,
    build_context: Option<&str>,
    ports: &[String],
    env_file: Option<&str>,
    volumes: &[String],
) -> Result<Plan> {
    let name = container_name.unwrap_or(&ctx.service);
    let docker = |args: Vec<String>| Invocation::new("docker", args).with_env(ctx.env.clone());

    let build_invocation = build_context.map(|context| {
        docker(vec![
            "build".to_string(),
            "-t".to_string(),
            image.to_string(),
            context.to_string(),
        ])
    });

    let plan = match operation {
        Operation::Deploy => {
            let mut invs = Vec::new();
            if let Some(build) = build_invocation {
                invs.push(build);
            }
            // rm -f fails when the container doesn't exist yet; that's fine
            invs.push(
                Invocation::shell(format!("docker rm -f {name} >/dev/null 2>&1 || true"))
                    .with_env(ctx.env.clone()),
            );
            let mut run_args = vec![
                "run".to_string(),
                "-d".to_string(),
                "--name".to_string(),
                name.to_string(),
            ];
            for port in ports {
                run_args.push("-p".to_string());
                run_args.push(port.clone());
            }
            for volume in volumes {
                run_args.push("-v".to_string());
                run_args.push(volume.clone());
            }
            if let Some(env_file) = env_file {
                run_args.push("--env-file".to_string());
                run_args.push(env_file.to_string());
            }
            run_args.push(image.to_string());
            invs.push(docker(run_args));
            Plan::run(invs)
        }
        Operation::Start => Plan::run(vec![docker(vec![
            "start".to_string(),
            name.to_string(),
        ])]),
        Operation::Stop => Plan::run(vec![docker(vec![
            "stop".to_string(),
            name.to_string(),
        ])]),
        Operation::Restart => Plan::run(vec![docker(vec![
            "restart".to_string(),
            name.to_string(),
        ])]),
        Operation::Status => Plan::run(vec![docker(vec![
            "ps".to_string(),
            "--all".to_string(),
            "--filter".to_string(),
            format!("name={name}"),
            "--format".to_string(),
            "{{.Names}}\t{{.Status}}".to_string(),
        ])]),
        Operation::Logs => Plan::run(vec![docker(vec![
            "logs".to_string(),
            "--tail".to_string(),
            "100".to_string(),
            name.to_string(),
        ])]),
        Operation::Build => match build_invocation {
            Some(build) => Plan::run(vec![build]),
            None => Plan::skip("no build context configured"),
        },
    };
    Ok(plan)
}

// ---------------------------------------------------------------------------
// Aws
// ---------------------------------------------------------------------------

fn plan_aws(
    operation: Operation,
    ctx: &PlanContext,
    cluster: &str,
    service: &str,
    log_group: Option<&str>,
) -> Result<Plan> {
    let aws = |mut args: Vec<String>| {
        if let Some(profile) = &ctx.aws_profile {
            args.push("--profile".to_string());
            args.push(profile.clone());
        }
        if let Some(region) = &ctx.aws_region {
            args.push("--region".to_string());
            args.push(region.clone());
        }
        Invocation::new("aws", args).with_env(ctx.env.clone())
    };

    let update_service = |extra: &[&str]| {
        let mut args = vec![
            "ecs".to_string(),
            "update-service".to_string(),
            "--cluster".to_string(),
            cluster.to_string(),
            "--service".to_string(),
            service.to_string(),
        ];
        args.extend(extra.iter().map(|s| s.to_string()));
        aws(args)
    };

    let plan = match operation {
        // ECS redeploys by forcing a new deployment of the current task def
        Operation::Deploy | Operation::Restart => {
            Plan::run(vec![update_service(&["--force-new-deployment"])])
        }
        Operation::Start => Plan::run(vec![update_service(&["--desired-count", "1"])]),
        Operation::Stop => Plan::run(vec![update_service(&["--desired-count", "0"])]),
        Operation::Status => Plan::run(vec![aws(vec![
            "ecs".to_string(),
            "describe-services".to_string(),
            "--cluster".to_string(),
            cluster.to_string(),
            "--services".to_string(),
            service.to_string(),
        ])]),
        Operation::Logs => match log_group {
            Some(log_group) => Plan::run(vec![aws(vec![
                "logs".to_string(),
                "tail".to_string(),
                log_group.to_string(),
                "--since".to_string(),
                "10m".to_string(),
            ])]),
            None => Plan::skip("no log group configured"),
        },
        Operation::Build => {
            return Err(DrydockError::UnsupportedOperation {
                operation: operation.to_string(),
                platform: "aws".to_string(),
            })
        }
    };
    Ok(plan)
}

// ---------------------------------------------------------------------------
// External
// ---------------------------------------------------------------------------

fn plan_external(
    operation: Operation,
    target: &PlatformTarget,
    url: Option<&str>,
    note: Option<&str>,
) -> Result<Plan> {
    if operation != Operation::Status {
        return Err(unsupported(operation, target));
    }
    let reason = match (url, note) {
        (Some(url), Some(note)) => format!("{note} ({url})"),
        (Some(url), None) => format!("managed externally ({url})"),
        (None, Some(note)) => note.to_string(),
        (None, None) => "managed externally".to_string(),
    };
    Ok(Plan::skip(reason))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> PlanContext {
        PlanContext {
            service: "api".to_string(),
            environment: "dev".to_string(),
            env: vec![("LOG_LEVEL".to_string(), "debug".to_string())],
            aws_profile: None,
            aws_region: None,
        }
    }

    fn displays(plan: &Plan) -> Vec<String> {
        match plan {
            Plan::Run(invs) => invs.iter().map(|i| i.display()).collect(),
            Plan::Skip { .. } => panic!("expected a run plan"),
        }
    }

    fn process_target(stop: Option<&str>, build: Option<&str>) -> PlatformTarget {
        PlatformTarget::Process {
            start: "npm run start".to_string(),
            stop: stop.map(|s| s.to_string()),
            build: build.map(|s| s.to_string()),
            logs: None,
            working_dir: None,
        }
    }

    fn container_target() -> PlatformTarget {
        PlatformTarget::Container {
            image: "registry/api:latest".to_string(),
            container_name: None,
            build_context: Some("./api".to_string()),
            ports: vec!["8080:80".to_string()],
            env_file: Some(".env.dev".to_string()),
            volumes: vec!["./data:/var/data".to_string()],
        }
    }

    fn aws_target() -> PlatformTarget {
        PlatformTarget::Aws {
            cluster: "main".to_string(),
            service: "api-svc".to_string(),
            log_group: Some("/ecs/api".to_string()),
        }
    }

    #[test]
    fn process_deploy_builds_then_starts() {
        let target = process_target(None, Some("npm run build"));
        let plan = plan(&target, Operation::Deploy, &ctx()).unwrap();
        let cmds = displays(&plan);
        assert_eq!(cmds.len(), 2);
        assert!(cmds[0].contains("npm run build"));
        assert!(cmds[1].contains("npm run start"));
    }

    #[test]
    fn process_stop_without_command_skips() {
        let target = process_target(None, None);
        let plan = plan(&target, Operation::Stop, &ctx()).unwrap();
        assert!(matches!(
            plan,
            Plan::Skip { ref reason } if reason.contains("no stop command")
        ));
    }

    #[test]
    fn process_restart_stops_first_when_possible() {
        let target = process_target(Some("pkill -f api"), None);
        let plan = plan(&target, Operation::Restart, &ctx()).unwrap();
        let cmds = displays(&plan);
        assert_eq!(cmds.len(), 2);
        assert!(cmds[0].contains("pkill -f api"));
    }

    #[test]
    fn process_status_is_a_documented_skip() {
        let target = process_target(None, None);
        let plan = plan(&target, Operation::Status, &ctx()).unwrap();
        assert!(matches!(plan, Plan::Skip { .. }));
    }

    #[test]
    fn process_invocations_carry_context_env() {
        let target = process_target(None, None);
        let plan = plan(&target, Operation::Start, &ctx()).unwrap();
        let Plan::Run(invs) = plan else {
            panic!("expected run")
        };
        assert_eq!(
            invs[0].env,
            vec![("LOG_LEVEL".to_string(), "debug".to_string())]
        );
    }

    #[test]
    fn process_working_dir_is_applied() {
        let target = PlatformTarget::Process {
            start: "make run".to_string(),
            stop: None,
            build: None,
            logs: None,
            working_dir: Some("services/api".to_string()),
        };
        let plan = plan(&target, Operation::Start, &ctx()).unwrap();
        let Plan::Run(invs) = plan else {
            panic!("expected run")
        };
        assert_eq!(
            invs[0].cwd.as_deref(),
            Some(std::path::Path::new("services/api"))
        );
    }

    #[test]
    fn container_deploy_builds_clears_and_runs() {
        let plan = plan(&container_target(), Operation::Deploy, &ctx()).unwrap();
        let cmds = displays(&plan);
        assert_eq!(cmds.len(), 3);
        assert!(cmds[0].starts_with("docker build -t registry/api:latest"));
        assert!(cmds[1].contains("docker rm -f api"));
        assert!(cmds[2].starts_with("docker run -d --name api"));
        assert!(cmds[2].contains("-p 8080:80"));
        assert!(cmds[2].contains("-v ./data:/var/data"));
        assert!(cmds[2].contains("--env-file .env.dev"));
        assert!(cmds[2].ends_with("registry/api:latest"));
    }

    #[test]
    fn container_name_defaults_to_service() {
        let plan = plan(&container_target(), Operation::Stop, &ctx()).unwrap();
        assert_eq!(displays(&plan), vec!["docker stop api"]);
    }

    #[test]
    fn container_explicit_name_wins() {
        let target = PlatformTarget::Container {
            image: "x".to_string(),
            container_name: Some("api-blue".to_string()),
            build_context: None,
            ports: vec![],
            env_file: None,
            volumes: vec![],
        };
        let plan = plan(&target, Operation::Start, &ctx()).unwrap();
        assert_eq!(displays(&plan), vec!["docker start api-blue"]);
    }

    #[test]
    fn container_status_filters_by_name() {
        let plan = plan(&container_target(), Operation::Status, &ctx()).unwrap();
        let cmds = displays(&plan);
        assert!(cmds[0].contains("docker ps --all --filter name=api"));
    }

    #[test]
    fn container_build_without_context_skips() {
        let target = PlatformTarget::Container {
            image: "x".to_string(),
            container_name: None,
            build_context: None,
            ports: vec![],
            env_file: None,
            volumes: vec![],
        };
        let plan = plan(&target, Operation::Build, &ctx()).unwrap();
        assert!(matches!(
            plan,
            Plan::Skip { ref reason } if reason.contains("no build context")
        ));
    }

    #[test]
    fn aws_deploy_forces_new_deployment() {
        let plan = plan(&aws_target(), Operation::Deploy, &ctx()).unwrap();
        let cmds = displays(&plan);
        assert_eq!(
            cmds,
            vec![
                "aws ecs update-service --cluster main --service api-svc --force-new-deployment"
            ]
        );
    }

    #[test]
    fn aws_stop_scales_to_zero() {
        let plan = plan(&aws_target(), Operation::Stop, &ctx()).unwrap();
        let cmds = displays(&plan);
        assert!(cmds[0].ends_with("--desired-count 0"));
    }

    #[test]
    fn aws_profile_and_region_are_appended() {
        let mut c = ctx();
        c.aws_profile = Some("staging".to_string());
        c.aws_region = Some("eu-west-1".to_string());
        let plan = plan(&aws_target(), Operation::Status, &c).unwrap();
        let cmds = displays(&plan);
        assert!(cmds[0].contains("--profile staging"));
        assert!(cmds[0].contains("--region eu-west-1"));
    }

    #[test]
    fn aws_logs_without_group_skips() {
        let target = PlatformTarget::Aws {
            cluster: "main".to_string(),
            service: "api-svc".to_string(),
            log_group: None,
        };
        let plan = plan(&target, Operation::Logs, &ctx()).unwrap();
        assert!(matches!(
            plan,
            Plan::Skip { ref reason } if reason.contains("no log group")
        ));
    }

    #[test]
    fn aws_build_is_a_contract_error() {
        let err = plan(&aws_target(), Operation::Build, &ctx()).unwrap_err();
        assert!(matches!(err, DrydockError::UnsupportedOperation { .. }));
    }

    #[test]
    fn external_status_reports_note_and_url() {
        let target = PlatformTarget::External {
            url: Some("https://db.example.com".to_string()),
            note: Some("hosted postgres".to_string()),
        };
        let plan = plan(&target, Operation::Status, &ctx()).unwrap();
        assert!(matches!(
            plan,
            Plan::Skip { ref reason } if reason == "hosted postgres (https://db.example.com)"
        ));
    }

    #[test]
    fn external_deploy_is_a_contract_error() {
        let target = PlatformTarget::External {
            url: None,
            note: None,
        };
        let err = plan(&target, Operation::Deploy, &ctx()).unwrap_err();
        assert!(matches!(err, DrydockError::UnsupportedOperation { .. }));
    }
}
