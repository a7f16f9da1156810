//! `cedar run` and `cedar deploy`.

use std::path::Path;

use anyhow::Context;
use cedar_core::CedarConfig;
use cedar_deploy::report::format_report;
use cedar_deploy::{DeployPlan, Orchestrator};
use tracing::{error, info};

pub async fn run(config: &CedarConfig, json: bool, report_path: Option<&Path>) -> anyhow::Result<()> {
    let plan = DeployPlan::from_config(config)?;
    let orchestrator = Orchestrator::new(super::runner(config)?, super::prober(config)?, plan);

    let report = match orchestrator.run().await {
        Ok(report) => report,
        Err(e) => {
            error!(app = %e.app(), error = %e, "deployment failed");
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_report(&report));
    }

    if let Some(path) = report_path {
        std::fs::write(path, serde_json::to_vec_pretty(&report)?)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        info!(path = %path.display(), "report written");
    }

    if !report.is_clean() {
        anyhow::bail!("{} workload requests failed", report.total_failed());
    }
    Ok(())
}

pub async fn deploy(config: &CedarConfig) -> anyhow::Result<()> {
    let plan = DeployPlan::from_config(config)?;
    let orchestrator = Orchestrator::new(super::runner(config)?, super::prober(config)?, plan);

    match orchestrator.deploy().await {
        Ok(deployment) => {
            println!("✓ {} is up", deployment.master.route());
            for target in &deployment.targets {
                println!("✓ {} is up", target.route());
            }
            Ok(())
        }
        Err(e) => {
            error!(app = %e.app(), error = %e, "deployment failed");
            Err(e.into())
        }
    }
}
