use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "cedar",
    about = "cedar — deploy a master/target app pair and stress it",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Values that override cedar.toml.
#[derive(Args, Debug, Default)]
pub struct Overrides {
    /// Path to cedar.toml. Defaults are used when omitted.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Platform routing domain
    #[arg(long, global = true)]
    pub domain: Option<String>,
    /// Number of target apps
    #[arg(long, global = true)]
    pub workers: Option<u32>,
    /// Workload requests per target
    #[arg(long, global = true)]
    pub requests: Option<u32>,
    /// Failure budget per app
    #[arg(long, global = true)]
    pub max_failed_curls: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy every app, then run the workload against the targets
    Run {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        /// Also write the JSON report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Push, copy bits, start, and verify without running the workload
    Deploy,
    /// Curl an already-running app through the retry policy
    Curl {
        /// App name
        app: String,
        /// Path appended to the app route
        #[arg(short, long, default_value = "")]
        path: String,
    },
    /// Print the resolved configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,cedar=debug".parse().unwrap());
    if cli.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = commands::load_config(&cli.overrides)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        match cli.command {
            Commands::Run { json, report } => {
                commands::run::run(&config, json, report.as_deref()).await
            }
            Commands::Deploy => commands::run::deploy(&config).await,
            Commands::Curl { app, path } => commands::curl::curl(&config, &app, &path).await,
            Commands::Config => commands::show_config(&config),
        }
    })
}
