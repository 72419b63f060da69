use std::env;
use std::time::Duration;

use super::probe_config::ProbeConfig;
use crate::http_probe::prelude::*;

pub const CONFIG_FILE_VAR: &str = "CONFIG_FILE";
pub const TIMEOUT_VAR: &str = "PROBE_TIMEOUT_SECONDS";

/// Upper bound for `timeout_seconds` and `deadline_seconds`: one year.
pub const MAX_SECONDS: u64 = 365 * 24 * 60 * 60;
/// Upper bound for `body_preview_chars`.
pub const MAX_BODY_PREVIEW_CHARS: usize = 1 << 20;

pub struct AppConfig {
    pub probe: ProbeConfig,
    pub config_file: Option<String>,
}

impl AppConfig {
    pub fn runner_options(&self) -> RunnerOptions {
        RunnerOptions {
            timeout: Duration::from_secs(self.probe.timeout_seconds),
            follow_redirects: self.probe.follow_redirects,
            body_preview_chars: self.probe.body_preview_chars,
            strategy: if self.probe.concurrent {
                Strategy::Concurrent
            } else {
                Strategy::Sequential
            },
            deadline: self.probe.deadline_seconds.map(Duration::from_secs),
        }
    }
}

/// Load the application configuration from `.env`, the optional YAML file
/// named by `CONFIG_FILE`, and the `PROBE_TIMEOUT_SECONDS` override.
pub fn load_config() -> Result<AppConfig, ConfigurationError> {
    if let Ok(path) = dotenvy::dotenv() {
        log::debug!("Loaded environment from {}", path.display());
    }
    load_config_with(|name| env::var(name).ok())
}

/// Same as [`load_config`], reading variables through `lookup`.
pub fn load_config_with(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<AppConfig, ConfigurationError> {
    let config_file = lookup(CONFIG_FILE_VAR);

    let mut probe = match &config_file {
        Some(path) => {
            let config_str =
                std::fs::read_to_string(path).map_err(|source| ConfigurationError::ConfigFile {
                    path: path.clone(),
                    source,
                })?;
            parse_probe_config(path, &config_str)?
        }
        None => ProbeConfig::default(),
    };

    if let Some(raw) = lookup(TIMEOUT_VAR) {
        probe.timeout_seconds = parse_timeout(&raw)?;
    }

    if probe.timeout_seconds == 0 {
        return Err(ConfigurationError::InvalidSetting {
            name: "timeout_seconds",
            value: "0".to_string(),
            reason: "must be at least one second".to_string(),
        });
    }
    check_at_most("timeout_seconds", probe.timeout_seconds, MAX_SECONDS)?;
    if let Some(deadline) = probe.deadline_seconds {
        check_at_most("deadline_seconds", deadline, MAX_SECONDS)?;
    }
    check_at_most(
        "body_preview_chars",
        probe.body_preview_chars as u64,
        MAX_BODY_PREVIEW_CHARS as u64,
    )?;

    log::info!(
        "Using timeout {}s, safe characters {:?}, {} requests",
        probe.timeout_seconds,
        probe.safe_characters,
        if probe.concurrent { "concurrent" } else { "sequential" }
    );

    Ok(AppConfig { probe, config_file })
}

fn parse_probe_config(path: &str, config_str: &str) -> Result<ProbeConfig, ConfigurationError> {
    if config_str.trim().is_empty() {
        return Ok(ProbeConfig::default());
    }
    serde_yaml::from_str(config_str).map_err(|source| ConfigurationError::ConfigYaml {
        path: path.to_string(),
        source,
    })
}

fn check_at_most(name: &'static str, value: u64, max: u64) -> Result<(), ConfigurationError> {
    if value > max {
        return Err(ConfigurationError::InvalidSetting {
            name,
            value: value.to_string(),
            reason: format!("must be at most {max}"),
        });
    }
    Ok(())
}

fn parse_timeout(raw: &str) -> Result<u64, ConfigurationError> {
    let invalid = |reason: &str| ConfigurationError::InvalidSetting {
        name: TIMEOUT_VAR,
        value: raw.to_string(),
        reason: reason.to_string(),
    };
    let seconds: u64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid("not a whole number of seconds"))?;
    if seconds == 0 {
        return Err(invalid("must be at least one second"));
    }
    Ok(seconds)
}
