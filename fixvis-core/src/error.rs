//! Error types for the fixvis plugin.
//!
//! This module distinguishes between:
//! - Remediation failures: a fix record could not be processed (bad label, editor failure)
//! - Plugin failures: the event intake was unusable

use fixvis_domain::LabelError;
use fixvis_sequencer::SequencerError;
use thiserror::Error;

/// A single fix record could not be remediated.
#[derive(Debug, Error)]
pub enum RemediationError {
    /// The dependent target's label could not be parsed.
    #[error("failed to fix visibility: {0}")]
    Label(#[from] LabelError),

    /// The `print visibility` query failed.
    #[error("failed to fix visibility: failed to check if target has private visibility: {0:#}")]
    Query(#[source] anyhow::Error),

    /// An `add`/`remove visibility` edit failed. Earlier edits stay applied.
    #[error("failed to fix visibility: {0:#}")]
    Edit(#[source] anyhow::Error),

    /// Suggested commands could not be written to the output.
    #[error("failed to write visibility fix commands: {0}")]
    Output(#[from] std::io::Error),
}

/// The top-level error type for plugin operations.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error(transparent)]
    Remediation(#[from] RemediationError),

    #[error("build event intake unavailable: {0}")]
    Intake(#[from] SequencerError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_error_is_prefixed() {
        let err = RemediationError::from(LabelError::Empty);
        assert_eq!(err.to_string(), "failed to fix visibility: empty label");
    }

    #[test]
    fn query_error_includes_chain() {
        let inner = anyhow::anyhow!("exit code 2: no such package").context("failed to run buildozer");
        let err = RemediationError::Query(inner);
        let msg = err.to_string();
        assert!(msg.starts_with("failed to fix visibility: failed to check if target has private visibility"));
        assert!(msg.contains("failed to run buildozer"));
        assert!(msg.contains("no such package"));
    }

    #[test]
    fn plugin_error_display() {
        let err = PluginError::from(RemediationError::Edit(anyhow::anyhow!("boom")));
        assert_eq!(err.to_string(), "failed to fix visibility: boom");

        let err = PluginError::from(SequencerError::Closed);
        assert!(err.to_string().starts_with("build event intake unavailable"));
    }
}
