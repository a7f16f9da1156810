//! cedar-core — shared types for the cedar stress-test orchestrator.
//!
//! Holds the `cedar.toml` configuration model, route derivation for
//! deployed apps, and duration-string parsing used across the workspace.

pub mod config;
pub mod error;
pub mod route;

pub use config::{CedarConfig, parse_duration};
pub use error::{ConfigError, ConfigResult};
pub use route::AppRoute;
