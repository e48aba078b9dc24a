use crate::config::IndexerConfig;
use crate::document::{DeviceReportForm, InputDocument, RawLogEntry};
use crate::entry::{EnrichedLogEntry, SessionTracker};
use crate::key::{IndexKey, KeyDimension};
use crate::stats::IndexStats;
use serde::Serialize;
use serde_json::Value;

/// One `(key, value)` pair handed to the host view engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Emission {
    pub key: IndexKey,
    pub value: EnrichedLogEntry,
}

/// Device log view indexer.
///
/// Holds only configuration; every call to [`LogEntryIndexer::index`] starts a
/// fresh session, so one indexer can serve any number of documents.
#[derive(Debug, Clone, Default)]
pub struct LogEntryIndexer {
    config: IndexerConfig,
}

impl LogEntryIndexer {
    #[must_use]
    pub fn new(config: IndexerConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    #[must_use]
    pub fn matches(&self, doc: &InputDocument) -> bool {
        doc.has_schema(&self.config.schema_xmlns)
    }

    /// Lazily fan `doc` out into emissions, eight per indexable entry.
    ///
    /// Documents with another schema yield nothing.
    pub fn index<'a>(&self, doc: &'a InputDocument) -> Emissions<'a> {
        let mut stats = IndexStats::new();
        if self.matches(doc) {
            stats.documents = 1;
        } else {
            log::debug!(
                "Skipping document with xmlns {:?} (domain {:?})",
                doc.xmlns,
                doc.domain
            );
            stats.documents_skipped = 1;
        }

        Emissions {
            domain: doc.domain.as_ref(),
            entries: self.enriched_entries(doc),
            current: None,
            cursor: 0,
            stats,
        }
    }

    /// Every enriched entry of `doc` in order, including the ones that would
    /// not be emitted. Empty for documents with another schema.
    pub fn enriched_entries<'a>(&self, doc: &'a InputDocument) -> EnrichedEntries<'a> {
        let entries: &'a [RawLogEntry] = if self.matches(doc) {
            doc.entries()
        } else {
            &[]
        };

        EnrichedEntries {
            form: &doc.form,
            entries: entries.iter(),
            session: SessionTracker::new(self.config.initial_user.as_str()),
        }
    }
}

/// Iterator over a document's entries with session users attached.
#[derive(Debug, Clone)]
pub struct EnrichedEntries<'a> {
    form: &'a DeviceReportForm,
    entries: std::slice::Iter<'a, RawLogEntry>,
    session: SessionTracker,
}

impl Iterator for EnrichedEntries<'_> {
    type Item = EnrichedLogEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let raw = self.entries.next()?;
        let user = self.session.observe(raw);
        Some(EnrichedLogEntry::new(raw, self.form, user))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

/// Lazy emission sequence for one document.
#[derive(Debug, Clone)]
pub struct Emissions<'a> {
    domain: Option<&'a Value>,
    entries: EnrichedEntries<'a>,
    current: Option<EnrichedLogEntry>,
    cursor: usize,
    stats: IndexStats,
}

impl Emissions<'_> {
    /// Counters for what has been produced so far.
    #[must_use]
    pub fn stats(&self) -> IndexStats {
        self.stats
    }
}

impl Iterator for Emissions<'_> {
    type Item = Emission;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.current.as_ref() {
                if let Some(&dimension) = KeyDimension::ALL.get(self.cursor) {
                    self.cursor += 1;
                    if let Some(key) = dimension.key_for(self.domain, entry) {
                        self.stats.emissions += 1;
                        return Some(Emission {
                            key,
                            value: entry.clone(),
                        });
                    }
                    continue;
                }
            }

            self.current = None;
            let entry = self.entries.next()?;
            self.stats.entries += 1;
            if entry.is_indexable() {
                self.stats.entries_indexed += 1;
                self.current = Some(entry);
                self.cursor = 0;
            } else {
                log::trace!(
                    "Skipping log entry without type or @date (position {})",
                    self.stats.entries
                );
                self.stats.entries_skipped += 1;
            }
        }
    }
}
