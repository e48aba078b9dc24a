use crate::document::DEVICE_REPORT_XMLNS;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Username assigned to entries that precede any login entry.
pub const DEFAULT_INITIAL_USER: &str = "unknown";

/// Indexer settings, usually loaded from a TOML file.
///
/// ```toml
/// schema_xmlns = "http://code.javarosa.org/devicereport"
/// initial_user = "unknown"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexerConfig {
    /// Only documents whose `xmlns` equals this value are indexed.
    pub schema_xmlns: String,
    /// Session user before the first login entry of a document.
    pub initial_user: String,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            schema_xmlns: DEVICE_REPORT_XMLNS.to_string(),
            initial_user: DEFAULT_INITIAL_USER.to_string(),
        }
    }
}

impl IndexerConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&raw)?;
        log::debug!("Loaded indexer config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IndexerError;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = IndexerConfig::from_toml_str("").expect("parse");
        assert_eq!(config, IndexerConfig::default());
        assert_eq!(config.schema_xmlns, "http://code.javarosa.org/devicereport");
        assert_eq!(config.initial_user, "unknown");
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config = IndexerConfig::from_toml_str("initial_user = \"nobody\"").expect("parse");
        assert_eq!(config.initial_user, "nobody");
        assert_eq!(config.schema_xmlns, DEVICE_REPORT_XMLNS);
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = IndexerConfig::from_toml_str("initial_usr = \"x\"").expect_err("typo");
        assert!(matches!(err, IndexerError::ConfigError(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "schema_xmlns = \"urn:test\"").expect("write");
        let config = IndexerConfig::load(file.path()).expect("load");
        assert_eq!(config.schema_xmlns, "urn:test");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = IndexerConfig::load(&dir.path().join("absent.toml")).expect_err("missing");
        assert!(matches!(err, IndexerError::IoError(_)));
    }
}
