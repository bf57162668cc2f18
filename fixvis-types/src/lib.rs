//! Shared DTOs for the fixvis workspace.
//!
//! # Design constraints
//! - Build events are a tolerant subset of Bazel's BEP JSON; unknown fields are ignored.
//! - Fix records are plain value types so they can be hashed, ordered and serialized.
//! - Prefer adding optional fields over changing semantics.

pub mod event;
pub mod fix;
pub mod report;

pub use event::{AbortReason, Aborted, BuildEvent, SequencedEvent, UNORDERED_SEQUENCE};
pub use fix::FixRecord;
