//! A deployed app and its lifecycle.
//!
//! `CfApp` moves through `Unpushed → Pushed → BitsCopied → Started →
//! Verified`. Lifecycle calls go through a `CommandRunner`; `curl` and the
//! liveness probe after `start` go through the app's own `CurlTracker`.

use cedar_core::AppRoute;
use cedar_probe::{CurlError, CurlTracker, Prober, RetryPolicy};
use tracing::{Instrument, debug, info, info_span};

use crate::error::{DeployError, DeployResult};
use crate::runner::CommandRunner;

/// Env var the worker package reads to find its own route.
pub const ENDPOINT_TO_HIT: &str = "ENDPOINT_TO_HIT";

/// Source directory and manifest for `cf push`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPackage {
    pub path: String,
    pub manifest: String,
}

impl AppPackage {
    pub fn new(path: impl Into<String>, manifest: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            manifest: manifest.into(),
        }
    }
}

/// Lifecycle position of an app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Unpushed,
    Pushed,
    BitsCopied,
    Started,
    Verified,
}

#[derive(Debug, Clone)]
pub struct CfApp {
    name: String,
    domain: String,
    route: AppRoute,
    curls: CurlTracker,
    state: AppState,
}

impl CfApp {
    pub fn new(name: &str, domain: &str, max_failed_curls: u32, policy: RetryPolicy) -> Self {
        let route = AppRoute::new(name, domain);
        debug!(app = %name, %route, max_failed_curls, "created app");
        Self {
            name: name.to_string(),
            domain: domain.to_string(),
            route,
            curls: CurlTracker::new(max_failed_curls, policy),
            state: AppState::Unpushed,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn route(&self) -> &AppRoute {
        &self.route
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn attempted_curls(&self) -> u32 {
        self.curls.attempted()
    }

    pub fn failed_curls(&self) -> u32 {
        self.curls.failed()
    }

    pub fn max_failed_curls(&self) -> u32 {
        self.curls.max_failed()
    }

    /// Push the driver package without starting it.
    pub async fn push_master<R: CommandRunner>(
        &mut self,
        runner: &R,
        package: &AppPackage,
    ) -> DeployResult<()> {
        let span = info_span!("push", app = %self.name);
        async {
            info!("started");
            self.push_package(runner, package).await?;
            self.state = AppState::Pushed;
            info!("completed");
            Ok::<_, DeployError>(())
        }
        .instrument(span)
        .await
    }

    /// Push the worker package without starting it, then point its
    /// `ENDPOINT_TO_HIT` at its own route.
    pub async fn push<R: CommandRunner>(
        &mut self,
        runner: &R,
        package: &AppPackage,
    ) -> DeployResult<()> {
        let span = info_span!("push", app = %self.name);
        async {
            info!("started");
            self.push_package(runner, package).await?;

            let endpoint = self.route.to_string();
            runner
                .set_env(&self.name, ENDPOINT_TO_HIT, &endpoint)
                .await
                .map_err(|source| DeployError::SetEnv {
                    app: self.name.clone(),
                    source,
                })?;
            debug!(ENDPOINT_TO_HIT = %endpoint, "successful set-env");

            self.state = AppState::Pushed;
            info!("completed");
            Ok::<_, DeployError>(())
        }
        .instrument(span)
        .await
    }

    async fn push_package<R: CommandRunner>(
        &self,
        runner: &R,
        package: &AppPackage,
    ) -> DeployResult<()> {
        runner
            .run(&[
                "push",
                &self.name,
                "-p",
                &package.path,
                "-f",
                &package.manifest,
                "--no-start",
            ])
            .await
            .map_err(|source| DeployError::Push {
                app: self.name.clone(),
                source,
            })
    }

    /// Copy this app's uploaded bits onto `target` without restarting it.
    pub async fn copy_bits_to<R: CommandRunner>(
        &self,
        runner: &R,
        target: &mut CfApp,
    ) -> DeployResult<()> {
        let span = info_span!("copy-source", from = %self.name, to = %target.name);
        async {
            info!("started");
            runner
                .run(&["copy-source", &self.name, &target.name, "--no-restart"])
                .await
                .map_err(|source| DeployError::CopySource {
                    from: self.name.clone(),
                    to: target.name.clone(),
                    source,
                })?;
            target.state = AppState::BitsCopied;
            info!("completed");
            Ok::<_, DeployError>(())
        }
        .instrument(span)
        .await
    }

    /// Start the app and confirm it answers on its bare route.
    ///
    /// Returns the body of the liveness response.
    pub async fn start<R: CommandRunner, P: Prober>(
        &mut self,
        runner: &R,
        prober: &P,
    ) -> DeployResult<String> {
        let span = info_span!("start", app = %self.name);
        async {
            info!("started");
            runner
                .run(&["start", &self.name])
                .await
                .map_err(|source| DeployError::Start {
                    app: self.name.clone(),
                    source,
                })?;
            self.state = AppState::Started;

            let response = self
                .curl(prober, "")
                .await
                .map_err(|source| DeployError::Liveness {
                    app: self.name.clone(),
                    source,
                })?;
            debug!(%response, "successful response");

            self.state = AppState::Verified;
            info!("completed");
            Ok::<_, DeployError>(response)
        }
        .instrument(span)
        .await
    }

    /// GET `path` on this app's route, retrying per the failure budget.
    pub async fn curl<P: Prober>(&mut self, prober: &P, path: &str) -> Result<String, CurlError> {
        let url = self.route.with_path(path);
        self.curls.curl(prober, &url).await
    }
}
