use fixvis_types::UNORDERED_SEQUENCE;
use std::collections::BTreeMap;

/// Outcome of pushing one event into a [`ReorderBuffer`].
#[derive(Debug, PartialEq)]
pub enum Push<T> {
    /// Events now deliverable, in order. Unordered events come back alone.
    Ready(Vec<T>),
    /// Stored until the gap before it closes.
    Held,
    /// Already pending or already delivered; dropped.
    Duplicate(i64),
    /// Negative sequence number; dropped.
    Invalid(i64),
}

/// Counters reported when a worker finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequencerStats {
    /// Sequenced events released in order.
    pub delivered: u64,
    /// Events submitted with sequence 0.
    pub unordered: u64,
    pub duplicates: u64,
    pub invalid: u64,
    /// Events still waiting behind a gap when the intake closed.
    pub stranded: u64,
    pub next_expected: i64,
}

/// Reorders events by sequence number, starting at 1.
///
/// Pure state machine: the async [`Sequencer`](crate::Sequencer) owns one and
/// is its only caller.
#[derive(Debug)]
pub struct ReorderBuffer<T> {
    next_expected: i64,
    pending: BTreeMap<i64, T>,
    stats: SequencerStats,
}

impl<T> Default for ReorderBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ReorderBuffer<T> {
    pub fn new() -> Self {
        Self {
            next_expected: 1,
            pending: BTreeMap::new(),
            stats: SequencerStats {
                next_expected: 1,
                ..SequencerStats::default()
            },
        }
    }

    pub fn next_expected(&self) -> i64 {
        self.next_expected
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Lowest sequence number held behind a gap.
    pub fn first_pending(&self) -> Option<i64> {
        self.pending.keys().next().copied()
    }

    pub fn push(&mut self, sequence: i64, event: T) -> Push<T> {
        if sequence == UNORDERED_SEQUENCE {
            self.stats.unordered += 1;
            return Push::Ready(vec![event]);
        }
        if sequence < 0 {
            self.stats.invalid += 1;
            return Push::Invalid(sequence);
        }
        if sequence < self.next_expected || self.pending.contains_key(&sequence) {
            self.stats.duplicates += 1;
            return Push::Duplicate(sequence);
        }

        self.pending.insert(sequence, event);

        let mut ready = Vec::new();
        while let Some(event) = self.pending.remove(&self.next_expected) {
            ready.push(event);
            self.next_expected += 1;
        }
        if ready.is_empty() {
            return Push::Held;
        }
        self.stats.delivered += ready.len() as u64;
        self.stats.next_expected = self.next_expected;
        Push::Ready(ready)
    }

    /// Drop whatever is still held and return the final counters.
    pub fn finish(self) -> SequencerStats {
        SequencerStats {
            stranded: self.pending.len() as u64,
            next_expected: self.next_expected,
            ..self.stats
        }
    }
}
