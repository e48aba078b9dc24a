use crate::document::{DeviceReportForm, RawLogEntry};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field names the enrichment step owns. Same-named fields on the raw entry
/// are replaced.
const ENRICHED_FIELDS: [&str; 3] = ["version", "device_id", "user"];

/// A log entry copied out of its document and stamped with report metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedLogEntry {
    #[serde(flatten)]
    pub entry: RawLogEntry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<Value>,
    pub user: String,
}

impl EnrichedLogEntry {
    /// Copy `raw` and attach the form-level metadata and the session user.
    #[must_use]
    pub fn new(raw: &RawLogEntry, form: &DeviceReportForm, user: &str) -> Self {
        let mut entry = raw.clone();
        for field in ENRICHED_FIELDS {
            entry.extra.remove(field);
        }

        Self {
            entry,
            version: form.app_version.clone(),
            device_id: form.device_id.clone(),
            user: user.to_string(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> Option<&Value> {
        self.entry.kind.as_ref()
    }

    #[must_use]
    pub fn date(&self) -> Option<&Value> {
        self.entry.date.as_ref()
    }

    /// Entries need both a `type` and an `@date` to be emitted.
    #[must_use]
    pub fn is_indexable(&self) -> bool {
        self.kind().is_some() && self.date().is_some()
    }
}

/// Username carried by a login message: everything after the first `-`, or
/// the whole message when there is no `-`.
#[must_use]
pub fn parse_login_user(msg: &str) -> &str {
    msg.split_once('-').map_or(msg, |(_, user)| user)
}

/// Tracks who is logged in while walking one document's log in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTracker {
    user: String,
}

impl SessionTracker {
    pub fn new(initial_user: impl Into<String>) -> Self {
        Self {
            user: initial_user.into(),
        }
    }

    /// Feed the next entry and return the user it belongs to.
    ///
    /// A login entry switches the session before it is attributed, so it
    /// reports the user it logged in. A login without `msg` keeps the
    /// current user.
    pub fn observe(&mut self, entry: &RawLogEntry) -> &str {
        if entry.is_login() {
            if let Some(msg) = entry.msg.as_deref() {
                self.user = parse_login_user(msg).to_string();
            } else {
                log::debug!("Login entry without msg; keeping user {:?}", self.user);
            }
        }
        &self.user
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawLogEntry {
        serde_json::from_value(value).expect("entry")
    }

    fn form() -> DeviceReportForm {
        DeviceReportForm {
            app_version: Some(json!("1.2")),
            device_id: Some(json!("dev1")),
            log: Vec::new(),
        }
    }

    #[test]
    fn login_user_after_first_dash() {
        assert_eq!(parse_login_user("sys-alice"), "alice");
        assert_eq!(parse_login_user("x-bob-smith"), "bob-smith");
        assert_eq!(parse_login_user("-"), "");
    }

    #[test]
    fn login_user_without_dash_is_whole_message() {
        assert_eq!(parse_login_user("carol"), "carol");
        assert_eq!(parse_login_user(""), "");
    }

    #[test]
    fn tracker_switches_on_login_only() {
        let mut session = SessionTracker::new("unknown");
        assert_eq!(session.observe(&raw(json!({ "type": "action", "msg": "a-b" }))), "unknown");
        assert_eq!(session.observe(&raw(json!({ "type": "login", "msg": "sys-dana" }))), "dana");
        assert_eq!(session.observe(&raw(json!({ "type": "action" }))), "dana");
        assert_eq!(session.observe(&raw(json!({ "type": ["login"], "msg": "a-b" }))), "dana");
    }

    #[test]
    fn login_without_msg_keeps_user() {
        let mut session = SessionTracker::new("unknown");
        session.observe(&raw(json!({ "type": "login", "msg": "sys-eve" })));
        assert_eq!(session.observe(&raw(json!({ "type": "login" }))), "eve");
    }

    #[test]
    fn enrichment_copies_and_stamps() {
        let source = raw(json!({ "type": "t", "@date": "d", "user": "stale", "extra": { "n": [1] } }));
        let enriched = EnrichedLogEntry::new(&source, &form(), "fred");

        assert_eq!(
            serde_json::to_value(&enriched).expect("serialize"),
            json!({
                "type": "t",
                "@date": "d",
                "extra": { "n": [1] },
                "version": "1.2",
                "device_id": "dev1",
                "user": "fred"
            })
        );
        assert_eq!(source.extra.get("user"), Some(&json!("stale")));
    }

    #[test]
    fn missing_metadata_is_omitted() {
        let enriched = EnrichedLogEntry::new(&raw(json!({})), &DeviceReportForm::default(), "u");
        assert_eq!(
            serde_json::to_value(&enriched).expect("serialize"),
            json!({ "user": "u" })
        );
    }

    #[test]
    fn metadata_values_are_copied_as_submitted() {
        let form = DeviceReportForm {
            app_version: Some(json!(2)),
            device_id: Some(json!(null)),
            log: Vec::new(),
        };
        let enriched = EnrichedLogEntry::new(&raw(json!({ "type": "t" })), &form, "u");
        assert_eq!(
            serde_json::to_value(&enriched).expect("serialize"),
            json!({ "type": "t", "version": 2, "device_id": null, "user": "u" })
        );
    }

    #[test]
    fn numeric_date_is_indexable() {
        let enriched = EnrichedLogEntry::new(&raw(json!({ "type": "t", "@date": 1577836800 })), &form(), "u");
        assert!(enriched.is_indexable());
        assert_eq!(enriched.date(), Some(&json!(1577836800)));
    }

    #[test]
    fn empty_type_or_date_is_not_indexable() {
        let f = form();
        assert!(EnrichedLogEntry::new(&raw(json!({ "type": "t", "@date": "d" })), &f, "u").is_indexable());
        assert!(!EnrichedLogEntry::new(&raw(json!({ "type": "", "@date": "d" })), &f, "u").is_indexable());
        assert!(!EnrichedLogEntry::new(&raw(json!({ "type": "t" })), &f, "u").is_indexable());
        assert!(!EnrichedLogEntry::new(&raw(json!({ "@date": "d" })), &f, "u").is_indexable());
    }
}
