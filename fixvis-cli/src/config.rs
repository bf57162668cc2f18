//! Configuration file loading for fixvis.
//!
//! Discovers and loads `fixvis.toml` from the workspace root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fixvis_core::{FailurePolicy, PluginSettings};
use fs_err as fs;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "fixvis.toml";

/// Top-level configuration from fixvis.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FixvisConfig {
    pub sequencer: SequencerConfig,
    pub remediation: RemediationConfig,
}

/// Event intake settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SequencerConfig {
    /// Intake slots before producers are throttled.
    pub capacity: usize,

    /// Seconds the post hook waits for in-flight events.
    pub idle_timeout_secs: u64,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        let defaults = PluginSettings::default();
        Self {
            capacity: defaults.intake_capacity,
            idle_timeout_secs: defaults.idle_timeout.as_secs(),
        }
    }
}

/// Remediation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemediationConfig {
    /// Path or name of the buildozer binary.
    pub buildozer: String,

    pub on_error: FailurePolicy,
}

impl Default for RemediationConfig {
    fn default() -> Self {
        Self {
            buildozer: "buildozer".to_string(),
            on_error: FailurePolicy::default(),
        }
    }
}

/// Discover the fixvis.toml config file in the workspace root.
pub fn discover_config(workspace: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = workspace.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

pub fn load_config(path: &Utf8Path) -> anyhow::Result<FixvisConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<FixvisConfig> {
    let config: FixvisConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from the workspace root, or return default if not found.
pub fn load_or_default(workspace: &Utf8Path) -> anyhow::Result<FixvisConfig> {
    match discover_config(workspace) {
        Some(path) => load_config(&path),
        None => Ok(FixvisConfig::default()),
    }
}

/// CLI values that can override the config file. `None` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub capacity: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub buildozer: Option<String>,
    pub on_error: Option<FailurePolicy>,
}

/// Settings after merging the config file with CLI arguments.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub settings: PluginSettings,
    pub buildozer: String,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: FixvisConfig,
}

impl ConfigMerger {
    pub fn new(config: FixvisConfig) -> Self {
        Self { config }
    }

    pub fn merge(self, cli: CliOverrides) -> MergedConfig {
        let sequencer = self.config.sequencer;
        let remediation = self.config.remediation;

        let settings = PluginSettings {
            intake_capacity: cli.capacity.unwrap_or(sequencer.capacity),
            idle_timeout: Duration::from_secs(
                cli.timeout_secs.unwrap_or(sequencer.idle_timeout_secs),
            ),
            on_error: cli.on_error.unwrap_or(remediation.on_error),
        };

        MergedConfig {
            settings,
            buildozer: cli.buildozer.unwrap_or(remediation.buildozer),
        }
    }
}
