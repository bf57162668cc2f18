use serde::{Deserialize, Serialize};
use std::fmt;

/// A visibility fix: `to_fix` must become visible to `from`.
///
/// Equality is structural; two records with the same pair are the same fix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FixRecord {
    /// Target whose `visibility` attribute must be widened.
    pub to_fix: String,
    /// Target that depends on `to_fix` and needs access to it.
    pub from: String,
}

impl FixRecord {
    pub fn new(to_fix: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            to_fix: to_fix.into(),
            from: from.into(),
        }
    }
}

impl fmt::Display for FixRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (needed by {})", self.to_fix, self.from)
    }
}
