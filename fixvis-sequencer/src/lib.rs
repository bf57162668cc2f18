//! Ordered delivery of sequenced build events.
//!
//! Producers push `(event, sequence)` pairs into a bounded intake; exactly one
//! worker task drains it through a [`ReorderBuffer`] and hands events to an
//! [`EventHandler`] strictly in sequence order. Sequence `0` bypasses ordering.
//!
//! # Entry points
//!
//! - [`Sequencer::spawn`]: start the worker for a handler
//! - [`Sequencer::submit`] / [`SubmitHandle::submit`]: enqueue with backpressure
//! - [`Sequencer::await_idle`]: close the intake and wait, bounded by a timeout

mod buffer;
mod sequencer;

pub use buffer::{Push, ReorderBuffer, SequencerStats};
pub use sequencer::{
    DEFAULT_IDLE_TIMEOUT, DEFAULT_INTAKE_CAPACITY, EventHandler, Idle, Sequencer, SequencerError,
    SubmitHandle,
};
