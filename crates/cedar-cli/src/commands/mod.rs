pub mod curl;
pub mod run;

use cedar_core::CedarConfig;
use cedar_deploy::CfCli;
use cedar_probe::HttpProber;

use crate::Overrides;

/// Load cedar.toml (or defaults) and apply command-line overrides.
pub fn load_config(overrides: &Overrides) -> anyhow::Result<CedarConfig> {
    let mut config = match &overrides.config {
        Some(path) => CedarConfig::from_file(path)?,
        None => CedarConfig::default(),
    };

    if let Some(domain) = &overrides.domain {
        config.domain = domain.clone();
    }
    if let Some(workers) = overrides.workers {
        config.target.workers = workers;
    }
    if let Some(requests) = overrides.requests {
        config.workload.requests = requests;
    }
    if let Some(max) = overrides.max_failed_curls {
        config.probe.max_failed_curls = max;
    }

    config.validate()?;
    Ok(config)
}

pub fn show_config(config: &CedarConfig) -> anyhow::Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn runner(config: &CedarConfig) -> anyhow::Result<CfCli> {
    Ok(CfCli::new(&config.cf_binary).with_timeout(config.command_timeout()?))
}

fn prober(config: &CedarConfig) -> anyhow::Result<HttpProber> {
    Ok(HttpProber::new().with_timeout(config.probe_timeout()?))
}
