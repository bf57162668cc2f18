//! Remediation pass over a drained worklist.
//!
//! For every record, in first-seen order: compute the package label to grant,
//! check whether the target is currently `//visibility:private`, then either
//! issue the edits (interactive and confirmed) or print the buildozer commands.

use crate::error::RemediationError;
use crate::ports::{Confirm, LabelEditor};
use crate::settings::FailurePolicy;
use chrono::Utc;
use fixvis_domain::Label;
use fixvis_types::FixRecord;
use fixvis_types::report::{OutcomeStatus, RecordOutcome, RemediationReport};
use std::io::Write;
use tracing::{debug, error, info};

pub const PRINT_VISIBILITY_COMMAND: &str = "print visibility";
pub const PRIVATE_VISIBILITY: &str = "//visibility:private";
pub const REMOVE_PRIVATE_VISIBILITY_COMMAND: &str = "remove visibility //visibility:private";

/// `add visibility <label>` for the dependent's package.
pub fn add_visibility_command(from_package: &Label) -> String {
    format!("add visibility {from_package}")
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RemediationOptions {
    /// Offer to apply fixes. Without it, commands are only printed.
    pub interactive: bool,
    pub on_error: FailurePolicy,
}

/// The first failure under [`FailurePolicy::Abort`].
#[derive(Debug)]
pub struct Halt {
    /// Index of the failing record; it and every later record were not completed.
    pub index: usize,
    pub error: RemediationError,
}

/// Outcome of [`remediate`].
#[derive(Debug)]
pub struct RemediationRun {
    pub report: RemediationReport,
    pub halted: Option<Halt>,
}

pub fn remediate(
    records: &[FixRecord],
    options: RemediationOptions,
    editor: &dyn LabelEditor,
    confirm: &dyn Confirm,
    out: &mut dyn Write,
) -> RemediationRun {
    let mut report = RemediationReport::new(Utc::now());
    let mut remediator = Remediator {
        options,
        editor,
        confirm,
        out,
    };

    for (index, record) in records.iter().enumerate() {
        let mut issued = Vec::new();
        match remediator.fix_one(record, &mut issued) {
            Ok(outcome) => report.records.push(outcome),
            Err(err) => {
                error!(
                    to_fix = record.to_fix.as_str(),
                    from = record.from.as_str(),
                    error = %err,
                    "visibility fix failed"
                );
                report.records.push(RecordOutcome {
                    record: record.clone(),
                    status: OutcomeStatus::Failed,
                    commands: issued,
                    error: Some(err.to_string()),
                });
                if options.on_error == FailurePolicy::Abort {
                    report.ended_at = Some(Utc::now());
                    return RemediationRun {
                        report,
                        halted: Some(Halt { index, error: err }),
                    };
                }
            }
        }
    }

    report.ended_at = Some(Utc::now());
    RemediationRun {
        report,
        halted: None,
    }
}

struct Remediator<'a> {
    options: RemediationOptions,
    editor: &'a dyn LabelEditor,
    confirm: &'a dyn Confirm,
    out: &'a mut dyn Write,
}

impl Remediator<'_> {
    /// `issued` collects the edits actually sent, so a failure can report them.
    fn fix_one(
        &mut self,
        record: &FixRecord,
        issued: &mut Vec<String>,
    ) -> Result<RecordOutcome, RemediationError> {
        let from_package = Label::parse(&record.from)?.package_wildcard();

        // Bazel rejects a visibility list mixing //visibility:private with
        // package grants, so the private marker has to go once we add one.
        let has_private = self.has_private_visibility(&record.to_fix)?;

        let add = add_visibility_command(&from_package);
        let mut commands = vec![add.clone()];
        if has_private {
            commands.push(REMOVE_PRIVATE_VISIBILITY_COMMAND.to_string());
        }

        let apply = self.options.interactive && self.confirm.confirm(record);
        if !apply {
            writeln!(self.out, "To fix the visibility errors, run:")?;
            for command in &commands {
                writeln!(self.out, "buildozer '{}' {}", command, record.to_fix)?;
            }
            let status = if self.options.interactive {
                OutcomeStatus::Declined
            } else {
                OutcomeStatus::Reported
            };
            return Ok(RecordOutcome {
                record: record.clone(),
                status,
                commands,
                error: None,
            });
        }

        for command in &commands {
            issued.push(command.clone());
            self.editor
                .run(&[command.as_str(), record.to_fix.as_str()])
                .map_err(RemediationError::Edit)?;
            info!(
                to_fix = record.to_fix.as_str(),
                command = command.as_str(),
                "applied visibility edit"
            );
        }

        Ok(RecordOutcome {
            record: record.clone(),
            status: OutcomeStatus::Applied,
            commands,
            error: None,
        })
    }

    fn has_private_visibility(&self, to_fix: &str) -> Result<bool, RemediationError> {
        let visibility = self
            .editor
            .run(&[PRINT_VISIBILITY_COMMAND, to_fix])
            .map_err(RemediationError::Query)?;
        let private = String::from_utf8_lossy(&visibility).contains(PRIVATE_VISIBILITY);
        debug!(to_fix, private, "queried visibility");
        Ok(private)
    }
}
