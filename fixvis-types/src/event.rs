use serde::{Deserialize, Serialize};

/// Sequence number reserved for events that carry no ordering metadata.
pub const UNORDERED_SEQUENCE: i64 = 0;

/// A single Bazel build event, as emitted on the BEP JSON stream.
///
/// Only the `aborted` payload is interpreted. The event id and child ids are
/// kept as raw JSON so callers can log them; every other payload is ignored on
/// deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aborted: Option<Aborted>,
}

impl BuildEvent {
    /// An event whose only payload is an `aborted` block.
    pub fn aborted(reason: AbortReason, description: impl Into<String>) -> Self {
        Self {
            aborted: Some(Aborted {
                reason,
                description: description.into(),
            }),
            ..Self::default()
        }
    }

    pub fn get_aborted(&self) -> Option<&Aborted> {
        self.aborted.as_ref()
    }
}

/// Payload of an event that terminated before completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aborted {
    #[serde(default)]
    pub reason: AbortReason,

    #[serde(default)]
    pub description: String,
}

/// Why an event was aborted. Mirrors `build_event_stream.Aborted.AbortReason`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AbortReason {
    UserInterrupted,
    NoAnalyze,
    NoBuild,
    TimeOut,
    RemoteEnvironmentFailure,
    Internal,
    LoadingFailure,
    AnalysisFailure,
    Skipped,
    Incomplete,
    OutOfMemory,
    /// Any reason this build of fixvis does not know about.
    #[default]
    #[serde(other)]
    Unknown,
}

/// An event tagged with its position in the stream.
///
/// `sequence == UNORDERED_SEQUENCE` means "process immediately, out of band";
/// otherwise the value is the 1-based position in a single logical stream.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencedEvent<T = BuildEvent> {
    pub event: T,
    pub sequence: i64,
}

impl<T> SequencedEvent<T> {
    pub fn new(event: T, sequence: i64) -> Self {
        Self { event, sequence }
    }
}
