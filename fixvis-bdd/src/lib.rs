//! BDD harness (cucumber-rs).
//!
//! Helpers shared by the scenario steps. Production crates never depend on this.

use fixvis_core::adapters::ScriptedEditor;
use fixvis_core::ports::LabelEditor;
use fixvis_core::{AbortReason, BuildEvent};
use std::sync::Arc;

/// A scripted editor the scenario world and the plugin can both hold.
#[derive(Debug, Clone, Default)]
pub struct SharedEditor(pub Arc<ScriptedEditor>);

impl LabelEditor for SharedEditor {
    fn run(&self, args: &[&str]) -> anyhow::Result<Vec<u8>> {
        self.0.run(args)
    }
}

/// The analysis failure Bazel reports when `to_fix` depends on a target it can't see.
pub fn visibility_event(to_fix: &str, from: &str) -> BuildEvent {
    BuildEvent::aborted(
        AbortReason::AnalysisFailure,
        format!(
            "ERROR: /ws/BUILD:3:8: in cc_binary rule {to_fix}: target '{from}' \
             is not visible from target '{to_fix}'. Check the visibility declaration of the former target"
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_editor_records_through_clones() {
        let editor = SharedEditor::default();
        let clone = editor.clone();
        clone.run(&["print visibility", "//a:a"]).unwrap();
        assert_eq!(editor.0.calls().len(), 1);
    }

    #[test]
    fn visibility_event_is_an_analysis_failure() {
        let event = visibility_event("//x:x", "//y:y");
        let aborted = event.get_aborted().expect("aborted");
        assert_eq!(aborted.reason, AbortReason::AnalysisFailure);
        assert!(aborted.description.contains("target '//y:y' is not visible from target '//x:x'"));
    }
}
