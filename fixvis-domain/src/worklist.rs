use fixvis_types::FixRecord;
use indexmap::IndexSet;
use tracing::debug;

/// Insertion-ordered set of distinct fix records.
///
/// Not synchronised: a worklist has a single writer (the event worker) and is
/// read only after that writer is done.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixWorklist {
    records: IndexSet<FixRecord>,
}

impl FixWorklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fix. Returns `false` if the same pair was already present,
    /// in which case its original position is kept.
    pub fn insert(&mut self, to_fix: impl Into<String>, from: impl Into<String>) -> bool {
        self.insert_record(FixRecord::new(to_fix, from))
    }

    pub fn insert_record(&mut self, record: FixRecord) -> bool {
        let inserted = self.records.insert(record);
        if !inserted {
            debug!("duplicate visibility fix ignored");
        }
        inserted
    }

    pub fn contains(&self, record: &FixRecord) -> bool {
        self.records.contains(record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in first-seen order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &FixRecord> {
        self.records.iter()
    }

    /// Move every record out, leaving the worklist empty and ready to refill.
    pub fn take(&mut self) -> Vec<FixRecord> {
        self.records.drain(..).collect()
    }

    /// Put unprocessed records back ahead of anything collected since.
    ///
    /// Records that were re-collected in the meantime move to the front too,
    /// so nothing is processed twice.
    pub fn requeue(&mut self, records: impl IntoIterator<Item = FixRecord>) {
        let mut merged: IndexSet<FixRecord> = records.into_iter().collect();
        merged.extend(self.records.drain(..));
        self.records = merged;
    }
}

impl<'a> IntoIterator for &'a FixWorklist {
    type Item = &'a FixRecord;
    type IntoIter = indexmap::set::Iter<'a, FixRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
