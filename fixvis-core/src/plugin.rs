//! The plugin instance: event intake during the build, remediation after it.
//!
//! Lifecycle per invocation: `bep_event_callback` for every event, then one of
//! the post hooks. The hook drains the current sequencer and starts a fresh
//! one, so the same instance serves the next build, test or run.

use crate::collector::{SharedWorklist, VisibilityCollector, lock_worklist};
use crate::error::PluginError;
use crate::ports::{Confirm, LabelEditor};
use crate::remediation::{RemediationOptions, remediate};
use crate::settings::PluginSettings;
use chrono::Utc;
use fixvis_sequencer::{Idle, Sequencer, SubmitHandle};
use fixvis_types::report::RemediationReport;
use fixvis_types::{BuildEvent, FixRecord};
use std::io::Write;
use tracing::{debug, error, info, warn};

pub struct FixVisibilityPlugin<E> {
    settings: PluginSettings,
    editor: E,
    worklist: SharedWorklist,
    sequencer: Sequencer<BuildEvent>,
}

impl<E: LabelEditor> FixVisibilityPlugin<E> {
    /// Create the instance and start its event worker.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(settings: PluginSettings, editor: E) -> Self {
        let worklist = SharedWorklist::default();
        let sequencer = spawn_sequencer(&settings, &worklist);
        Self {
            settings,
            editor,
            worklist,
            sequencer,
        }
    }

    /// Queue one build event. Waits only while the intake is full.
    pub async fn bep_event_callback(
        &self,
        event: BuildEvent,
        sequence_number: i64,
    ) -> Result<(), PluginError> {
        self.sequencer.submit(event, sequence_number).await?;
        Ok(())
    }

    /// Producer handle for hosts that deliver events from several tasks.
    ///
    /// Every handle must be dropped before the post hook, or the hook waits
    /// for the full idle timeout.
    pub fn event_handle(&self) -> Result<SubmitHandle<BuildEvent>, PluginError> {
        Ok(self.sequencer.handle()?)
    }

    /// Snapshot of the fixes collected so far, in first-seen order.
    pub fn pending_fixes(&self) -> Vec<FixRecord> {
        lock_worklist(&self.worklist).iter().cloned().collect()
    }

    /// Wait for the current event stream to finish and take the collected fixes.
    ///
    /// Returns the fixes and whether the worker drained before the timeout.
    pub async fn finish_events(&mut self) -> (Vec<FixRecord>, bool) {
        let worklist = SharedWorklist::default();
        let fresh = spawn_sequencer(&self.settings, &worklist);
        let sequencer = std::mem::replace(&mut self.sequencer, fresh);
        let collected = std::mem::replace(&mut self.worklist, worklist);

        let complete = match sequencer.await_idle(self.settings.idle_timeout).await {
            Ok(Idle::Drained(stats)) => {
                debug!(
                    delivered = stats.delivered,
                    unordered = stats.unordered,
                    duplicates = stats.duplicates,
                    stranded = stats.stranded,
                    "build events drained"
                );
                true
            }
            Ok(Idle::TimedOut) => {
                warn!(
                    timeout_secs = self.settings.idle_timeout.as_secs(),
                    "timed out waiting for build events"
                );
                false
            }
            Err(err) => {
                error!(error = %err, "build event worker failed");
                false
            }
        };

        let records = lock_worklist(&collected).take();
        (records, complete)
    }

    /// Remediate everything collected since the last hook.
    ///
    /// In interactive mode each fix is offered through `confirm`; otherwise
    /// (or when declined) the buildozer commands are written to `out`.
    pub async fn post_build_hook(
        &mut self,
        is_interactive_mode: bool,
        confirm: &dyn Confirm,
        out: &mut dyn Write,
    ) -> Result<RemediationReport, PluginError> {
        let started_at = Utc::now();
        let (records, complete) = self.finish_events().await;

        let mut report = if records.is_empty() {
            RemediationReport::new(started_at)
        } else {
            info!(fixes = records.len(), "remediating visibility issues");
            let options = RemediationOptions {
                interactive: is_interactive_mode,
                on_error: self.settings.on_error,
            };
            let run = remediate(&records, options, &self.editor, confirm, out);
            if let Some(halt) = run.halted {
                let remaining = records.len() - halt.index;
                warn!(remaining, "remediation stopped; unfinished fixes stay queued");
                lock_worklist(&self.worklist).requeue(records.into_iter().skip(halt.index));
                return Err(halt.error.into());
            }
            run.report
        };

        report.started_at = started_at;
        report.events_complete = complete;
        if report.ended_at.is_none() {
            report.ended_at = Some(Utc::now());
        }
        Ok(report)
    }

    pub async fn post_test_hook(
        &mut self,
        is_interactive_mode: bool,
        confirm: &dyn Confirm,
        out: &mut dyn Write,
    ) -> Result<RemediationReport, PluginError> {
        self.post_build_hook(is_interactive_mode, confirm, out).await
    }

    pub async fn post_run_hook(
        &mut self,
        is_interactive_mode: bool,
        confirm: &dyn Confirm,
        out: &mut dyn Write,
    ) -> Result<RemediationReport, PluginError> {
        self.post_build_hook(is_interactive_mode, confirm, out).await
    }
}

fn spawn_sequencer(settings: &PluginSettings, worklist: &SharedWorklist) -> Sequencer<BuildEvent> {
    Sequencer::spawn(
        settings.intake_capacity,
        VisibilityCollector::new(SharedWorklist::clone(worklist)),
    )
}
