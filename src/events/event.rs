//! Structured events describing decoy interactions and lifecycle changes.
//!
//! Events are immutable once emitted and are broadcast to every configured
//! sink; sinks format and persist them independently.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Well-known extra-field keys used by the CEF rendering.
pub const FIELD_ACT: &str = "act";
pub const FIELD_REQUEST: &str = "request";
pub const FIELD_SRC: &str = "src";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    /// Service name or lifecycle tag.
    pub event_type: String,
    pub severity: Severity,
    pub message: String,
    /// Open extra fields (e.g. `request`, `src`, `act`), flattened into the
    /// JSON object.
    #[serde(flatten, default)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl Event {
    pub fn new(event_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type: event_type.into(),
            severity: Severity::Info,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// An alert raised for a decoy interaction; `category` is one of the
    /// service's declared alert names.
    pub fn alert(category: impl Into<String>, message: impl Into<String>) -> Self {
        let category = category.into();
        Self::new(category.clone(), message)
            .with_severity(Severity::Critical)
            .with_field(FIELD_ACT, category)
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_str())
    }
}
