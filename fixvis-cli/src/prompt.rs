//! Terminal confirmation for interactive fixes.

use dialoguer::Confirm as Prompt;
use dialoguer::theme::ColorfulTheme;
use fixvis_core::FixRecord;
use fixvis_core::ports::Confirm;
use tracing::warn;

pub const APPLY_FIX_PROMPT: &str = "Would you like to auto-fix to the visibility attribute";

/// Asks on the terminal once per fix. A failed prompt counts as "no".
#[derive(Default)]
pub struct TerminalConfirm {
    theme: ColorfulTheme,
}

impl TerminalConfirm {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Confirm for TerminalConfirm {
    fn confirm(&self, record: &FixRecord) -> bool {
        eprintln!("{record}");
        match Prompt::with_theme(&self.theme)
            .with_prompt(APPLY_FIX_PROMPT)
            .default(false)
            .interact()
        {
            Ok(answer) => answer,
            Err(err) => {
                warn!(error = %err, to_fix = record.to_fix.as_str(), "no answer to fix prompt");
                false
            }
        }
    }
}
