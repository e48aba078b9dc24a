//! # Device Log Indexer
//!
//! View indexer for mobile device log reports.
//!
//! ## Pipeline
//!
//! ```text
//! InputDocument (xmlns == device report)
//!     │
//!     ├──> log_subreport.log (document order)
//!     │      └─> RawLogEntry
//!     │
//!     ├──> Session tracking + enrichment
//!     │      └─> EnrichedLogEntry (version, device_id, user)
//!     │
//!     └──> Key fan-out (8 dimensions)
//!            └─> Emission { key: [domain, dimension, ..., @date], value }
//! ```
//!
//! ## Example
//!
//! ```
//! use devicelog_indexer::{InputDocument, LogEntryIndexer};
//!
//! let doc = InputDocument::from_json_str(r#"{
//!     "xmlns": "http://code.javarosa.org/devicereport",
//!     "domain": "demo",
//!     "form": {
//!         "app_version": "1.2",
//!         "device_id": "dev1",
//!         "log_subreport": {
//!             "log": [{ "type": "login", "msg": "x-bob", "@date": "2020-01-01" }]
//!         }
//!     }
//! }"#)?;
//!
//! let emissions: Vec<_> = LogEntryIndexer::default().index(&doc).collect();
//! assert_eq!(emissions.len(), 8);
//! assert_eq!(emissions[0].value.user, "bob");
//! # Ok::<(), devicelog_indexer::IndexerError>(())
//! ```

mod config;
mod document;
mod entry;
mod error;
mod indexer;
mod key;
mod stats;

pub use config::{IndexerConfig, DEFAULT_INITIAL_USER};
pub use document::{DeviceReportForm, InputDocument, RawLogEntry, DEVICE_REPORT_XMLNS, LOGIN_TYPE};
pub use entry::{parse_login_user, EnrichedLogEntry, SessionTracker};
pub use error::{IndexerError, Result};
pub use indexer::{EnrichedEntries, Emission, Emissions, LogEntryIndexer};
pub use key::{IndexKey, KeyDimension};
pub use stats::IndexStats;
