//! cedar.toml configuration parser.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CedarConfig {
    /// Platform routing domain shared by every pushed app.
    pub domain: String,
    /// Name or path of the platform CLI.
    pub cf_binary: String,
    pub command_timeout: Option<String>,
    pub master: MasterConfig,
    pub target: TargetConfig,
    pub probe: ProbeConfig,
    pub workload: WorkloadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterConfig {
    pub name: String,
    pub path: String,
    pub manifest: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub prefix: String,
    pub path: String,
    pub manifest: String,
    pub workers: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub max_failed_curls: u32,
    pub backoff: String,
    /// Optional cap on attempts per curl. Unset keeps the retry loop
    /// bounded only by the failure budget.
    pub max_attempts: Option<u32>,
    pub timeout: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    pub endpoint: String,
    pub requests: u32,
    pub abort_on_failure: bool,
}

impl Default for CedarConfig {
    fn default() -> Self {
        Self {
            domain: "bosh-lite.com".to_string(),
            cf_binary: "cf".to_string(),
            command_timeout: None,
            master: MasterConfig::default(),
            target: TargetConfig::default(),
            probe: ProbeConfig::default(),
            workload: WorkloadConfig::default(),
        }
    }
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            name: "cedar-master".to_string(),
            path: "assets/stress-app".to_string(),
            manifest: "assets/stress-app/manifest.yml".to_string(),
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            prefix: "cedar-target".to_string(),
            path: "assets/temp-app".to_string(),
            manifest: "assets/temp-app/manifest.yml".to_string(),
            workers: 1,
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            max_failed_curls: 5,
            backoff: "2s".to_string(),
            max_attempts: None,
            timeout: None,
        }
    }
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            endpoint: "/".to_string(),
            requests: 100,
            abort_on_failure: false,
        }
    }
}

impl CedarConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        let config: CedarConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce a valid deployment.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.domain.trim().is_empty() {
            return Err(ConfigError::Invalid("domain must not be empty".into()));
        }
        if self.master.name.trim().is_empty() {
            return Err(ConfigError::Invalid("master.name must not be empty".into()));
        }
        if self.target.prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("target.prefix must not be empty".into()));
        }
        if self.target.workers == 0 {
            return Err(ConfigError::Invalid("target.workers must be at least 1".into()));
        }
        if self.probe.max_attempts == Some(0) {
            return Err(ConfigError::Invalid("probe.max_attempts must be at least 1".into()));
        }
        self.backoff()?;
        self.probe_timeout()?;
        self.command_timeout()?;
        Ok(())
    }

    /// Names of the target apps, `{prefix}-1` through `{prefix}-{workers}`.
    pub fn target_names(&self) -> Vec<String> {
        (1..=self.target.workers)
            .map(|i| format!("{}-{i}", self.target.prefix))
            .collect()
    }

    pub fn backoff(&self) -> ConfigResult<Duration> {
        required_duration("probe.backoff", &self.probe.backoff)
    }

    pub fn probe_timeout(&self) -> ConfigResult<Option<Duration>> {
        optional_duration("probe.timeout", self.probe.timeout.as_deref())
    }

    pub fn command_timeout(&self) -> ConfigResult<Option<Duration>> {
        optional_duration("command_timeout", self.command_timeout.as_deref())
    }
}

fn required_duration(field: &'static str, value: &str) -> ConfigResult<Duration> {
    parse_duration(value).ok_or_else(|| ConfigError::Duration {
        field,
        value: value.to_string(),
    })
}

fn optional_duration(field: &'static str, value: Option<&str>) -> ConfigResult<Option<Duration>> {
    value.map(|v| required_duration(field, v)).transpose()
}

/// Parse a duration like "2s", "500ms" or "10m". A bare number is seconds.
///
/// Unknown units and values too large to represent return `None`.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, unit) = s.split_at(split);
    let n: u64 = digits.parse().ok()?;
    match unit {
        "" | "s" => Some(Duration::from_secs(n)),
        "ms" => Some(Duration::from_millis(n)),
        "m" => n.checked_mul(60).map(Duration::from_secs),
        _ => None,
    }
}
