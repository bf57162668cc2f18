//! Replays a Bazel `--build_event_json_file` through the plugin.
//!
//! The file holds one JSON build event per line. Line order is the stream
//! order: the n-th event is submitted with sequence number n.

use anyhow::Context;
use camino::Utf8Path;
use fixvis_core::ports::LabelEditor;
use fixvis_core::{BuildEvent, FixVisibilityPlugin};
use fs_err as fs;
use tracing::{debug, warn};

pub fn read_events(path: &Utf8Path) -> anyhow::Result<Vec<BuildEvent>> {
    let contents = fs::read_to_string(path).with_context(|| format!("read events {}", path))?;
    Ok(parse_events(&contents))
}

/// Parse NDJSON build events. Blank lines are skipped. Lines that are not a
/// build event are logged and skipped.
pub fn parse_events(contents: &str) -> Vec<BuildEvent> {
    let mut events = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<BuildEvent>(line) {
            Ok(event) => events.push(event),
            Err(err) => warn!(line = index + 1, error = %err, "skipping malformed build event"),
        }
    }
    events
}

/// Submit every event in file order. Returns the number submitted.
///
/// With `unordered`, every event is submitted with sequence number 0.
pub async fn replay<E: LabelEditor>(
    plugin: &FixVisibilityPlugin<E>,
    events: Vec<BuildEvent>,
    unordered: bool,
) -> anyhow::Result<usize> {
    let mut submitted = 0;
    for (index, event) in events.into_iter().enumerate() {
        let sequence = if unordered { 0 } else { index as i64 + 1 };
        plugin
            .bep_event_callback(event, sequence)
            .await
            .context("submit build event")?;
        submitted += 1;
    }
    debug!(submitted, unordered, "replayed build events");
    Ok(submitted)
}
