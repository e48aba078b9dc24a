use crate::error::{IndexerError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `xmlns` of device report submissions.
pub const DEVICE_REPORT_XMLNS: &str = "http://code.javarosa.org/devicereport";

/// Entry `type` that opens a new session.
pub const LOGIN_TYPE: &str = "login";

/// A submitted form document, reduced to the parts the device log view reads.
///
/// Decoding is lenient: absent or oddly shaped containers decode to empty
/// defaults instead of failing. The only hard error is a top-level value that
/// is not a JSON object. `domain` and the form metadata keep their submitted
/// JSON values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct InputDocument {
    pub xmlns: Option<String>,
    pub domain: Option<Value>,
    pub form: DeviceReportForm,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceReportForm {
    pub app_version: Option<Value>,
    pub device_id: Option<Value>,
    /// `form.log_subreport.log`, in document order.
    pub log: Vec<RawLogEntry>,
}

/// One element of `log_subreport.log`.
///
/// `type` and `@date` are lifted out when they are truthy (anything but
/// `null`, `false`, `0` and `""`); `msg` only when it is a string. Values that
/// do not qualify stay in `extra` untouched, so serializing the entry
/// reproduces the submitted fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct RawLogEntry {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<Value>,
    #[serde(rename = "@date", skip_serializing_if = "Option::is_none")]
    pub date: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InputDocument {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let mut doc = match value {
            Value::Object(map) => map,
            other => return Err(IndexerError::NotAnObject(json_kind(&other))),
        };

        let form = doc
            .remove("form")
            .map(DeviceReportForm::from_value)
            .unwrap_or_default();

        Ok(Self {
            xmlns: doc.get("xmlns").and_then(Value::as_str).map(str::to_string),
            domain: doc.remove("domain"),
            form,
        })
    }

    #[must_use]
    pub fn has_schema(&self, xmlns: &str) -> bool {
        self.xmlns.as_deref() == Some(xmlns)
    }

    #[must_use]
    pub fn entries(&self) -> &[RawLogEntry] {
        &self.form.log
    }
}

impl TryFrom<Value> for InputDocument {
    type Error = IndexerError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

impl DeviceReportForm {
    fn from_value(value: Value) -> Self {
        let Value::Object(mut form) = value else {
            log::trace!("Ignoring non-object form");
            return Self::default();
        };

        let log = match form.remove("log_subreport") {
            Some(Value::Object(mut subreport)) => {
                subreport.remove("log").map(log_entries).unwrap_or_default()
            }
            _ => Vec::new(),
        };

        Self {
            app_version: form.remove("app_version"),
            device_id: form.remove("device_id"),
            log,
        }
    }
}

impl RawLogEntry {
    #[must_use]
    pub fn is_login(&self) -> bool {
        self.kind.as_ref().and_then(Value::as_str) == Some(LOGIN_TYPE)
    }
}

impl From<Map<String, Value>> for RawLogEntry {
    fn from(mut fields: Map<String, Value>) -> Self {
        Self {
            kind: take_truthy(&mut fields, "type"),
            date: take_truthy(&mut fields, "@date"),
            msg: take_string(&mut fields, "msg"),
            extra: fields,
        }
    }
}

/// Candidates are the array elements, or the member values (in submitted
/// order) when `log` is an object. Only objects become entries.
fn log_entries(log: Value) -> Vec<RawLogEntry> {
    let candidates: Vec<Value> = match log {
        Value::Array(items) => items,
        Value::Object(members) => members.into_iter().map(|(_, value)| value).collect(),
        other => {
            log::trace!("Ignoring log of kind {}", json_kind(&other));
            return Vec::new();
        }
    };

    candidates
        .into_iter()
        .filter_map(|candidate| match candidate {
            Value::Object(fields) => Some(RawLogEntry::from(fields)),
            other => {
                log::trace!("Skipping non-object log element ({})", json_kind(&other));
                None
            }
        })
        .collect()
}

fn take_truthy(fields: &mut Map<String, Value>, name: &str) -> Option<Value> {
    if !fields.get(name).is_some_and(is_truthy) {
        return None;
    }
    fields.remove(name)
}

fn take_string(fields: &mut Map<String, Value>, name: &str) -> Option<String> {
    if !matches!(fields.get(name), Some(Value::String(_))) {
        return None;
    }
    match fields.remove(name) {
        Some(Value::String(text)) => Some(text),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(true, |n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
