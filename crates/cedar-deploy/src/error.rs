//! Deployment error types.

use std::time::Duration;

use cedar_probe::CurlError;
use thiserror::Error;

pub type DeployResult<T> = Result<T, DeployError>;

/// Errors from invoking the platform CLI.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {}: {stderr}", exit_desc(.code))]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{program} timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },
}

fn exit_desc(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("code {c}"),
        None => "signal".to_string(),
    }
}

/// A deployment step failed. Every variant is fatal to the run.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("failed to push {app}: {source}")]
    Push {
        app: String,
        #[source]
        source: CommandError,
    },

    #[error("failed to set env on {app}: {source}")]
    SetEnv {
        app: String,
        #[source]
        source: CommandError,
    },

    #[error("failed to copy source from {from} to {to}: {source}")]
    CopySource {
        from: String,
        to: String,
        #[source]
        source: CommandError,
    },

    #[error("failed to start {app}: {source}")]
    Start {
        app: String,
        #[source]
        source: CommandError,
    },

    #[error("{app} did not answer after start: {source}")]
    Liveness {
        app: String,
        #[source]
        source: CurlError,
    },
}

impl DeployError {
    /// Name of the app whose step failed.
    pub fn app(&self) -> &str {
        match self {
            DeployError::Push { app, .. }
            | DeployError::SetEnv { app, .. }
            | DeployError::Start { app, .. }
            | DeployError::Liveness { app, .. } => app,
            DeployError::CopySource { from, .. } => from,
        }
    }
}
