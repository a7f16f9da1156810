//! cedar-deploy — drives apps through their deployment lifecycle.
//!
//! ```text
//! Orchestrator
//!   ├── CfApp (master)   push_master → copy_bits_to(targets) → start
//!   ├── CfApp (targets)  push (+ ENDPOINT_TO_HIT) → start
//!   │     └── curl() → CurlTracker → Prober
//!   └── CommandRunner (cf CLI)
//! ```
//!
//! Deployment steps never exit the process. Every failure comes back as a
//! `DeployError` and the binary decides what to do with it.

pub mod app;
pub mod error;
pub mod orchestrator;
pub mod report;
pub mod runner;

pub use app::{AppPackage, AppState, CfApp, ENDPOINT_TO_HIT};
pub use error::{CommandError, DeployError, DeployResult};
pub use orchestrator::{DeployPlan, Deployment, Orchestrator, Workload};
pub use report::{AppReport, RunReport};
pub use runner::{CfCli, CommandRunner};
// Test double, re-exported for integration tests.
pub use runner::RecordingRunner;
