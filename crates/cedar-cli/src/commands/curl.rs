//! `cedar curl` — probe a running app through the retry policy.

use cedar_core::CedarConfig;
use cedar_deploy::DeployPlan;
use cedar_deploy::CfApp;

pub async fn curl(config: &CedarConfig, app: &str, path: &str) -> anyhow::Result<()> {
    let plan = DeployPlan::from_config(config)?;
    let prober = super::prober(config)?;
    let mut app = CfApp::new(app, &plan.domain, plan.max_failed_curls, plan.policy);

    let result = app.curl(&prober, path).await;
    eprintln!(
        "{} attempted, {} failed",
        app.attempted_curls(),
        app.failed_curls()
    );
    let body = result?;
    println!("{body}");
    Ok(())
}
