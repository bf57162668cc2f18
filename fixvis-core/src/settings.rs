//! Clap-free settings for the plugin instance.

use fixvis_sequencer::{DEFAULT_IDLE_TIMEOUT, DEFAULT_INTAKE_CAPACITY};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What the remediation pass does when a record fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failure and surface it. Unprocessed records stay queued.
    #[default]
    Abort,
    /// Record the failure and move on to the next record.
    Continue,
}

/// Settings for a [`FixVisibilityPlugin`](crate::FixVisibilityPlugin).
#[derive(Debug, Clone)]
pub struct PluginSettings {
    /// Intake slots before event callbacks start waiting.
    pub intake_capacity: usize,
    /// Upper bound on waiting for the event worker in the post hook.
    pub idle_timeout: Duration,
    pub on_error: FailurePolicy,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            intake_capacity: DEFAULT_INTAKE_CAPACITY,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            on_error: FailurePolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn failure_policy_uses_snake_case_names() {
        assert_eq!(
            serde_json::to_value(FailurePolicy::Continue).unwrap(),
            serde_json::json!("continue")
        );
        let parsed: FailurePolicy = serde_json::from_str("\"abort\"").unwrap();
        assert_eq!(parsed, FailurePolicy::Abort);
        assert!(serde_json::from_str::<FailurePolicy>("\"retry\"").is_err());
    }

    #[test]
    fn defaults_match_sequencer_defaults() {
        let settings = PluginSettings::default();
        assert_eq!(settings.intake_capacity, DEFAULT_INTAKE_CAPACITY);
        assert_eq!(settings.idle_timeout, DEFAULT_IDLE_TIMEOUT);
        assert_eq!(settings.on_error, FailurePolicy::Abort);
    }
}
