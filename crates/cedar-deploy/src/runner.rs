//! Platform CLI invocation.
//!
//! The lifecycle code only needs "run the CLI with these args, tell me
//! whether it worked". `CfCli` does that with a real child process;
//! `RecordingRunner` keeps the argument lists for tests.

use std::future::Future;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{Instrument, debug, error, info_span};

use crate::error::CommandError;

/// Runs the platform CLI with an ordered argument list.
pub trait CommandRunner: Send + Sync {
    fn run(&self, args: &[&str]) -> impl Future<Output = Result<(), CommandError>> + Send;

    /// Set an environment variable on a deployed app.
    fn set_env(
        &self,
        app: &str,
        name: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), CommandError>> + Send {
        async move { self.run(&["set-env", app, name, value]).await }
    }
}

/// Shells out to the `cf` binary.
#[derive(Debug, Clone)]
pub struct CfCli {
    program: String,
    timeout: Option<Duration>,
}

impl CfCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    /// Kill the child and fail once `timeout` elapses.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run_inner(&self, args: &[&str]) -> Result<(), CommandError> {
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, output).await {
                Ok(result) => result,
                Err(_) => {
                    error!(timeout = ?timeout, "cf command timed out");
                    return Err(CommandError::Timeout {
                        program: self.program.clone(),
                        timeout,
                    });
                }
            },
            None => output.await,
        }
        .map_err(|source| {
            error!(error = %source, "failed starting cf command");
            CommandError::Spawn {
                program: self.program.clone(),
                source,
            }
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stdout.trim().is_empty() {
            debug!(stdout = %stdout.trim_end(), "cf output");
        }

        if output.status.success() {
            Ok(())
        } else {
            error!(code = ?output.status.code(), stderr = %stderr.trim_end(), "failed running cf command");
            Err(CommandError::Failed {
                program: self.program.clone(),
                code: output.status.code(),
                stderr: stderr.trim_end().to_string(),
            })
        }
    }
}

impl Default for CfCli {
    fn default() -> Self {
        Self::new("cf")
    }
}

impl CommandRunner for CfCli {
    async fn run(&self, args: &[&str]) -> Result<(), CommandError> {
        let span = info_span!("cf", args = ?args);
        self.run_inner(args).instrument(span).await
    }
}

/// Records every invocation instead of running anything. Intended for
/// tests, not for driving a real platform.
///
/// Clones share the same log. A subcommand registered with `fail_on`
/// returns `CommandError::Failed`.
#[derive(Debug, Clone, Default)]
pub struct RecordingRunner {
    inner: Arc<Mutex<Recorded>>,
}

#[derive(Debug, Default)]
struct Recorded {
    calls: Vec<Vec<String>>,
    failing: Vec<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call whose first argument is `subcommand` fail.
    pub async fn fail_on(&self, subcommand: &str) {
        self.inner.lock().await.failing.push(subcommand.to_string());
    }

    /// Argument lists of every call so far, in order.
    pub async fn calls(&self) -> Vec<Vec<String>> {
        self.inner.lock().await.calls.clone()
    }
}

impl CommandRunner for RecordingRunner {
    async fn run(&self, args: &[&str]) -> Result<(), CommandError> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(args.iter().map(|a| a.to_string()).collect());
        let fails = args
            .first()
            .is_some_and(|sub| inner.failing.iter().any(|f| f == sub));
        if fails {
            return Err(CommandError::Failed {
                program: "cf".to_string(),
                code: Some(1),
                stderr: format!("{} failed", args.join(" ")),
            });
        }
        Ok(())
    }
}
