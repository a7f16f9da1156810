//! Deployment sequence and workload driver.
//!
//! `deploy` runs the fatal phase: push the master, push every target,
//! copy the master's bits onto each target, then start and verify them
//! all. `run_workload` hands each target to its own task, which owns the
//! app outright and curls it `requests` times.

use std::time::Instant;

use cedar_core::{CedarConfig, ConfigResult};
use cedar_probe::{Prober, RetryPolicy};
use tokio::task::JoinSet;
use tracing::{Instrument, error, info, info_span, warn};

use crate::app::{AppPackage, CfApp};
use crate::error::DeployResult;
use crate::report::{AppReport, RunReport};
use crate::runner::CommandRunner;

/// Per-target request loop settings.
#[derive(Debug, Clone)]
pub struct Workload {
    pub endpoint: String,
    pub requests: u32,
    pub abort_on_failure: bool,
}

/// Everything needed to build and deploy the apps for one run.
#[derive(Debug, Clone)]
pub struct DeployPlan {
    pub domain: String,
    pub master_name: String,
    pub master_package: AppPackage,
    pub target_names: Vec<String>,
    pub target_package: AppPackage,
    pub max_failed_curls: u32,
    pub policy: RetryPolicy,
    pub workload: Workload,
}

impl DeployPlan {
    pub fn from_config(config: &CedarConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            domain: config.domain.clone(),
            master_name: config.master.name.clone(),
            master_package: AppPackage::new(&config.master.path, &config.master.manifest),
            target_names: config.target_names(),
            target_package: AppPackage::new(&config.target.path, &config.target.manifest),
            max_failed_curls: config.probe.max_failed_curls,
            policy: RetryPolicy {
                backoff: config.backoff()?,
                max_attempts: config.probe.max_attempts,
            },
            workload: Workload {
                endpoint: config.workload.endpoint.clone(),
                requests: config.workload.requests,
                abort_on_failure: config.workload.abort_on_failure,
            },
        })
    }

    fn app(&self, name: &str) -> CfApp {
        CfApp::new(name, &self.domain, self.max_failed_curls, self.policy)
    }
}

/// Apps that made it through the deployment phase.
#[derive(Debug)]
pub struct Deployment {
    pub master: CfApp,
    pub targets: Vec<CfApp>,
}

pub struct Orchestrator<R, P> {
    runner: R,
    prober: P,
    plan: DeployPlan,
}

impl<R, P> Orchestrator<R, P>
where
    R: CommandRunner,
    P: Prober + Clone + 'static,
{
    pub fn new(runner: R, prober: P, plan: DeployPlan) -> Self {
        Self {
            runner,
            prober,
            plan,
        }
    }

    pub fn plan(&self) -> &DeployPlan {
        &self.plan
    }

    /// Push, configure, copy bits, start, and verify every app.
    ///
    /// Stops at the first failing step.
    pub async fn deploy(&self) -> DeployResult<Deployment> {
        let mut master = self.plan.app(&self.plan.master_name);
        let mut targets: Vec<CfApp> = self
            .plan
            .target_names
            .iter()
            .map(|name| self.plan.app(name))
            .collect();

        info!(
            master = %master.name(),
            targets = targets.len(),
            domain = %self.plan.domain,
            "deploying"
        );

        master
            .push_master(&self.runner, &self.plan.master_package)
            .await?;
        for target in &mut targets {
            target.push(&self.runner, &self.plan.target_package).await?;
        }
        for target in &mut targets {
            master.copy_bits_to(&self.runner, target).await?;
        }

        master.start(&self.runner, &self.prober).await?;
        for target in &mut targets {
            target.start(&self.runner, &self.prober).await?;
        }

        info!("all apps started");
        Ok(Deployment { master, targets })
    }

    /// Drive every target concurrently. Curl failures are reported, not fatal.
    pub async fn run_workload(&self, targets: Vec<CfApp>) -> Vec<AppReport> {
        let mut tasks = JoinSet::new();
        for app in targets {
            let prober = self.prober.clone();
            let workload = self.plan.workload.clone();
            let span = info_span!("workload", app = %app.name());
            tasks.spawn(run_worker(app, prober, workload).instrument(span));
        }

        let mut reports = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(e) => error!(error = %e, "workload task failed"),
            }
        }
        reports.sort_by(|a, b| a.app.cmp(&b.app));
        reports
    }

    /// Deploy, then run the workload.
    pub async fn run(&self) -> DeployResult<RunReport> {
        let started = Instant::now();
        let deployment = self.deploy().await?;
        let apps = self.run_workload(deployment.targets).await;

        let report = RunReport {
            domain: self.plan.domain.clone(),
            master: deployment.master.name().to_string(),
            apps,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            succeeded = report.total_succeeded(),
            failed = report.total_failed(),
            elapsed_ms = report.elapsed_ms,
            "run complete"
        );
        Ok(report)
    }
}

async fn run_worker<P: Prober>(mut app: CfApp, prober: P, workload: Workload) -> AppReport {
    let mut report = AppReport::new(&app);
    info!(requests = workload.requests, endpoint = %workload.endpoint, "started");

    for _ in 0..workload.requests {
        match app.curl(&prober, &workload.endpoint).await {
            Ok(_) => report.record_success(),
            Err(e) => {
                report.record_failure(e.to_string());
                if workload.abort_on_failure {
                    warn!(error = %e, "aborting workload");
                    report.aborted = true;
                    break;
                }
            }
        }
    }

    report.sync_counters(&app);
    info!(
        succeeded = report.succeeded,
        failed = report.failed,
        "completed"
    );
    report
}
