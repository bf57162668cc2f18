//! Event handler that feeds visibility issues into a shared worklist.

use fixvis_domain::{FixWorklist, match_visibility_issue};
use fixvis_sequencer::EventHandler;
use fixvis_types::BuildEvent;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Worklist shared between the event worker and the post hook.
pub type SharedWorklist = Arc<Mutex<FixWorklist>>;

/// Lock a shared worklist, recovering from a poisoned lock.
pub fn lock_worklist(worklist: &Mutex<FixWorklist>) -> MutexGuard<'_, FixWorklist> {
    worklist.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Collects the fix implied by every visibility-violation event it sees.
#[derive(Debug, Clone)]
pub struct VisibilityCollector {
    worklist: SharedWorklist,
}

impl VisibilityCollector {
    pub fn new(worklist: SharedWorklist) -> Self {
        Self { worklist }
    }
}

impl EventHandler<BuildEvent> for VisibilityCollector {
    fn handle(&mut self, event: BuildEvent) -> anyhow::Result<()> {
        if let Some(record) = match_visibility_issue(&event) {
            debug!(
                to_fix = record.to_fix.as_str(),
                from = record.from.as_str(),
                "visibility issue detected"
            );
            lock_worklist(&self.worklist).insert_record(record);
        }
        Ok(())
    }
}
