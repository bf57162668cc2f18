use crate::fix::FixRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of one post-build remediation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationReport {
    pub started_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,

    /// False when the event worker had to be abandoned after the idle timeout.
    #[serde(default = "default_true")]
    pub events_complete: bool,

    #[serde(default)]
    pub records: Vec<RecordOutcome>,
}

fn default_true() -> bool {
    true
}

impl RemediationReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            ended_at: None,
            events_complete: true,
            records: Vec::new(),
        }
    }

    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }

    pub fn has_failures(&self) -> bool {
        self.records
            .iter()
            .any(|r| r.status == OutcomeStatus::Failed)
    }

    /// True when at least one fix was printed or declined rather than applied.
    pub fn has_pending_fixes(&self) -> bool {
        self.records
            .iter()
            .any(|r| matches!(r.status, OutcomeStatus::Reported | OutcomeStatus::Declined))
    }
}

/// What happened to a single fix record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordOutcome {
    pub record: FixRecord,
    pub status: OutcomeStatus,

    /// Buildozer commands issued (applied) or suggested (reported/declined), in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Edits were issued to the label editor.
    Applied,
    /// Commands were printed for the user; nothing was edited.
    Reported,
    /// The user rejected the interactive prompt; commands were printed.
    Declined,
    /// The label could not be parsed or the editor failed.
    Failed,
}
