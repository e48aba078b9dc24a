use serde::{Deserialize, Serialize};
use std::fmt;

/// Counters for one or more indexing runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Documents whose schema matched.
    pub documents: usize,
    /// Documents ignored because of their schema.
    pub documents_skipped: usize,
    /// Log entries walked.
    pub entries: usize,
    /// Entries that produced emissions.
    pub entries_indexed: usize,
    /// Entries without a `type` or `@date`.
    pub entries_skipped: usize,
    pub emissions: usize,
}

impl IndexStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: &IndexStats) {
        self.documents += other.documents;
        self.documents_skipped += other.documents_skipped;
        self.entries += other.entries;
        self.entries_indexed += other.entries_indexed;
        self.entries_skipped += other.entries_skipped;
        self.emissions += other.emissions;
    }
}

impl fmt::Display for IndexStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} documents ({} skipped), {} entries ({} indexed, {} skipped), {} emissions",
            self.documents,
            self.documents_skipped,
            self.entries,
            self.entries_indexed,
            self.entries_skipped,
            self.emissions
        )
    }
}
