//! Domain logic: recognise visibility violations and collect the fixes they imply.
//!
//! This crate owns *what* needs fixing. It does not own event ordering (that's
//! `fixvis-sequencer`) or *how* edits are applied (that's `fixvis-core`).

mod label;
mod matcher;
mod worklist;

pub use label::{Label, LabelError, PACKAGE_WILDCARD};
pub use matcher::{VISIBILITY_ISSUE_SUBSTRING, match_visibility_issue, parse_visibility_issue};
pub use worklist::FixWorklist;
