mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use drydock_core::types::Operation;
use output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "drydock",
    about = "Service deployment orchestration — one command surface across process, container, and AWS targets",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .drydock/ or .git/)
    #[arg(long, global = true, env = "DRYDOCK_ROOT")]
    root: Option<PathBuf>,

    /// Target environment (default: the config's default environment)
    #[arg(long, short = 'e', global = true)]
    environment: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "summary")]
    output: OutputFormat,

    /// Plan what would run without executing anything
    #[arg(long, global = true)]
    dry_run: bool,

    /// Per-invocation timeout in seconds (default: 300)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize drydock in the current project
    Init {
        /// Project name (default: the root directory name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Build (where applicable) and (re)start services at the latest version
    Deploy { services: Vec<String> },

    /// Start services
    Start { services: Vec<String> },

    /// Stop services (dependents stop before their dependencies)
    Stop { services: Vec<String> },

    /// Restart services
    Restart { services: Vec<String> },

    /// Report the current state of services
    Status { services: Vec<String> },

    /// Show recent service logs
    Logs { services: Vec<String> },

    /// Build service artifacts without deploying
    Build { services: Vec<String> },

    /// List configured services and their effective platforms
    Services,

    /// Show the builtin command table and platform support matrix
    Commands,

    /// Check declared and platform-implied requirements
    Check { services: Vec<String> },

    /// Validate or show the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Show recent run history
    History {
        /// Number of entries to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let root_path = cli.root.as_deref();
    let root = root::resolve_root(root_path);

    let run_op = |op: Operation, services: Vec<String>| {
        cmd::run::run(
            &root,
            op,
            services,
            cli.environment.clone(),
            cli.output,
            cli.dry_run,
            cli.timeout,
        )
    };

    let result = match cli.command {
        Commands::Init { ref name } => cmd::init::run(&root, name.as_deref()),
        Commands::Deploy { ref services } => run_op(Operation::Deploy, services.clone()),
        Commands::Start { ref services } => run_op(Operation::Start, services.clone()),
        Commands::Stop { ref services } => run_op(Operation::Stop, services.clone()),
        Commands::Restart { ref services } => run_op(Operation::Restart, services.clone()),
        Commands::Status { ref services } => run_op(Operation::Status, services.clone()),
        Commands::Logs { ref services } => run_op(Operation::Logs, services.clone()),
        Commands::Build { ref services } => run_op(Operation::Build, services.clone()),
        Commands::Services => {
            cmd::services::run(&root, cli.environment.as_deref(), cli.output)
        }
        Commands::Commands => cmd::commands::run(cli.output),
        Commands::Check { ref services } => {
            cmd::check::run(&root, services, cli.environment.as_deref(), cli.output)
        }
        Commands::Config { ref subcommand } => {
            cmd::config::run(&root, subcommand, cli.output)
        }
        Commands::History { limit } => cmd::history::run(&root, limit, cli.output),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // Print the full error chain (anyhow's alternate Display)
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}
