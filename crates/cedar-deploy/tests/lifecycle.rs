//! End-to-end lifecycle scenarios against in-memory collaborators.

use std::time::Duration;

use cedar_core::CedarConfig;
use cedar_deploy::{
    AppPackage, AppState, CfApp, DeployError, DeployPlan, ENDPOINT_TO_HIT, Orchestrator,
    RecordingRunner,
};
use cedar_probe::RetryPolicy;
use cedar_probe::mock::ScriptedProber;

fn no_backoff() -> RetryPolicy {
    RetryPolicy {
        backoff: Duration::ZERO,
        max_attempts: None,
    }
}

#[tokio::test]
async fn master_and_worker_full_lifecycle() {
    let runner = RecordingRunner::new();
    let prober = ScriptedProber::new();
    // Worker takes two polls to come up.
    prober.push_response(200, "master up").await;
    prober.push_response(503, "starting").await;
    prober.push_response(200, "worker up").await;

    let mut master = CfApp::new("cedar-master", "bosh-lite.com", 3, no_backoff());
    let mut worker = CfApp::new("cedar-target-1", "bosh-lite.com", 3, no_backoff());
    let master_pkg = AppPackage::new("assets/stress-app", "assets/stress-app/manifest.yml");
    let worker_pkg = AppPackage::new("assets/temp-app", "assets/temp-app/manifest.yml");

    master.push_master(&runner, &master_pkg).await.unwrap();
    worker.push(&runner, &worker_pkg).await.unwrap();
    master.copy_bits_to(&runner, &mut worker).await.unwrap();
    assert_eq!(worker.state(), AppState::BitsCopied);

    assert_eq!(master.start(&runner, &prober).await.unwrap(), "master up");
    assert_eq!(worker.start(&runner, &prober).await.unwrap(), "worker up");
    assert_eq!(worker.state(), AppState::Verified);
    assert_eq!(worker.attempted_curls(), 2);
    assert_eq!(worker.failed_curls(), 1);

    let calls = runner.calls().await;
    let set_env = calls
        .iter()
        .find(|call| call[0] == "set-env")
        .expect("set-env call recorded");
    assert_eq!(
        set_env,
        &vec![
            "set-env".to_string(),
            "cedar-target-1".to_string(),
            ENDPOINT_TO_HIT.to_string(),
            "http://cedar-target-1.bosh-lite.com".to_string(),
        ]
    );
}

#[tokio::test]
async fn budget_of_two_allows_two_retries() {
    let prober = ScriptedProber::with_statuses(&[503, 503, 503]);
    let mut app = CfApp::new("app", "domain", 2, no_backoff());

    let err = app.curl(&prober, "").await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(app.attempted_curls(), 3);
    assert_eq!(app.failed_curls(), 3);
    assert_eq!(prober.requests().await, vec!["http://app.domain"; 3]);
}

#[tokio::test]
async fn liveness_failure_aborts_run() {
    let mut config = CedarConfig::default();
    config.probe.max_failed_curls = 1;
    config.probe.backoff = "0s".to_string();
    let plan = DeployPlan::from_config(&config).unwrap();

    let prober = ScriptedProber::new();
    prober.set_fallback(503, "down").await;
    let orchestrator = Orchestrator::new(RecordingRunner::new(), prober, plan);

    let err = orchestrator.run().await.unwrap_err();
    assert!(matches!(err, DeployError::Liveness { .. }));
    assert_eq!(err.app(), "cedar-master");
}

#[tokio::test]
async fn run_report_serializes() {
    let mut config = CedarConfig::default();
    config.target.workers = 2;
    config.workload.requests = 3;
    config.probe.backoff = "0s".to_string();
    let plan = DeployPlan::from_config(&config).unwrap();

    let prober = ScriptedProber::new();
    prober.set_fallback(200, "ok").await;
    let orchestrator = Orchestrator::new(RecordingRunner::new(), prober, plan);

    let report = orchestrator.run().await.unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["master"], "cedar-master");
    assert_eq!(json["apps"].as_array().unwrap().len(), 2);
    assert_eq!(json["apps"][0]["app"], "cedar-target-1");
    assert_eq!(json["apps"][0]["succeeded"], 3);
    assert_eq!(json["apps"][1]["route"], "http://cedar-target-2.bosh-lite.com");
}
