//! Embeddable core of the fix-visibility plugin.
//!
//! Provides a clap-free, I/O-abstracted plugin instance suitable for linking
//! into a host that streams Bazel build events.
//!
//! # Port traits
//!
//! All external collaborators are abstracted behind port traits in [`ports`]:
//! - [`LabelEditor`](ports::LabelEditor): query and edit BUILD attributes (buildozer)
//! - [`Confirm`](ports::Confirm): ask whether a fix should be applied
//!
//! The [`adapters`] module provides a process-backed buildozer and an
//! in-memory scripted editor.
//!
//! # Entry points
//!
//! - [`FixVisibilityPlugin::bep_event_callback`](plugin::FixVisibilityPlugin::bep_event_callback): feed one event
//! - [`FixVisibilityPlugin::post_build_hook`](plugin::FixVisibilityPlugin::post_build_hook): drain and remediate

pub mod adapters;
pub mod collector;
pub mod error;
pub mod plugin;
pub mod ports;
pub mod remediation;
pub mod settings;

pub use error::{PluginError, RemediationError};
pub use plugin::FixVisibilityPlugin;
pub use settings::{FailurePolicy, PluginSettings};

// Re-export the shared types so embedders don't need fixvis-types directly.
pub use fixvis_types::report::{OutcomeStatus, RecordOutcome, RemediationReport};
pub use fixvis_types::{AbortReason, Aborted, BuildEvent, FixRecord};
