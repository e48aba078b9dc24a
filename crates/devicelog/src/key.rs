use crate::entry::EnrichedLogEntry;
use crate::error::IndexerError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The groupings every indexable entry is emitted under.
///
/// Each dimension selects some of `type`, `user` and `device_id`; the key is
/// `[domain, name, <selected parts in that order>, @date]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyDimension {
    Basic,
    Username,
    Tag,
    Device,
    TagUsername,
    TagDevice,
    UsernameDevice,
    TagUsernameDevice,
}

impl KeyDimension {
    /// All dimensions, in emission order.
    pub const ALL: [KeyDimension; 8] = [
        KeyDimension::Basic,
        KeyDimension::Username,
        KeyDimension::Tag,
        KeyDimension::Device,
        KeyDimension::TagUsername,
        KeyDimension::TagDevice,
        KeyDimension::UsernameDevice,
        KeyDimension::TagUsernameDevice,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            KeyDimension::Basic => "basic",
            KeyDimension::Username => "username",
            KeyDimension::Tag => "tag",
            KeyDimension::Device => "device",
            KeyDimension::TagUsername => "tag_username",
            KeyDimension::TagDevice => "tag_device",
            KeyDimension::UsernameDevice => "username_device",
            KeyDimension::TagUsernameDevice => "tag_username_device",
        }
    }

    #[must_use]
    pub fn uses_tag(self) -> bool {
        matches!(
            self,
            KeyDimension::Tag
                | KeyDimension::TagUsername
                | KeyDimension::TagDevice
                | KeyDimension::TagUsernameDevice
        )
    }

    #[must_use]
    pub fn uses_user(self) -> bool {
        matches!(
            self,
            KeyDimension::Username
                | KeyDimension::TagUsername
                | KeyDimension::UsernameDevice
                | KeyDimension::TagUsernameDevice
        )
    }

    #[must_use]
    pub fn uses_device(self) -> bool {
        matches!(
            self,
            KeyDimension::Device
                | KeyDimension::TagDevice
                | KeyDimension::UsernameDevice
                | KeyDimension::TagUsernameDevice
        )
    }

    /// Build this dimension's key for `entry`, or `None` when the entry lacks
    /// a `type` or `@date`.
    #[must_use]
    pub fn key_for(self, domain: Option<&Value>, entry: &EnrichedLogEntry) -> Option<IndexKey> {
        let kind = entry.kind()?;
        let date = entry.date()?;

        let mut parts = Vec::with_capacity(6);
        parts.push(or_null(domain));
        parts.push(Value::from(self.as_str()));
        if self.uses_tag() {
            parts.push(kind.clone());
        }
        if self.uses_user() {
            parts.push(Value::from(entry.user.as_str()));
        }
        if self.uses_device() {
            parts.push(or_null(entry.device_id.as_ref()));
        }
        parts.push(date.clone());

        Some(IndexKey(parts))
    }
}

impl fmt::Display for KeyDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyDimension {
    type Err = IndexerError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let name = raw.trim();
        KeyDimension::ALL
            .into_iter()
            .find(|dimension| dimension.as_str() == name)
            .ok_or_else(|| IndexerError::UnknownDimension(raw.to_string()))
    }
}

// Absent document fields show up as null array elements.
fn or_null(value: Option<&Value>) -> Value {
    value.cloned().unwrap_or(Value::Null)
}

/// Ordered key tuple, serialized as a JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexKey(Vec<Value>);

impl IndexKey {
    /// Recover the dimension from the second key component.
    #[must_use]
    pub fn dimension(&self) -> Option<KeyDimension> {
        self.0.get(1).and_then(Value::as_str)?.parse().ok()
    }
}
