//! Shared value objects for the flowcap recording/replay core.
//!
//! Everything here is an immutable record produced by one component and
//! consumed by another: the driver emits [`UserAction`]s, traffic capture
//! yields [`ApiRequestRecord`]s, and the correlator projects both into an
//! [`ActionApiTimeline`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Closed set of user-interface action kinds the recorder understands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Navigate,
    Click,
    Type,
    Press,
    Scroll,
    Select,
    Wait,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Navigate => "navigate",
            ActionKind::Click => "click",
            ActionKind::Type => "type",
            ActionKind::Press => "press",
            ActionKind::Scroll => "scroll",
            ActionKind::Select => "select",
            ActionKind::Wait => "wait",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded user-interface action, as emitted by the driver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserAction {
    pub kind: ActionKind,
    /// RFC 3339 timestamp as recorded; parse failures are handled downstream.
    pub timestamp: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One captured backend request, parsed out of a traffic log by the driver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiRequestRecord {
    pub method: String,
    pub url: String,
    pub path: String,
    pub domain: String,
    pub status: u16,
    #[serde(default)]
    pub request_headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_body: Option<String>,
    #[serde(default)]
    pub timestamp: String,
}

/// Read-only projection of an [`ApiRequestRecord`] attached to the action
/// that triggered it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriggeredApi {
    pub method: String,
    pub url: String,
    pub path: String,
    pub status: u16,
    pub delay_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_content_type: Option<String>,
}

/// A user action plus every API call claimed for it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorrelatedAction {
    pub index: usize,
    pub action: UserAction,
    pub triggered_apis: Vec<TriggeredApi>,
}

/// Total, disjoint partition of a run's request set: each request is either
/// attached to exactly one action or listed as background traffic.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionApiTimeline {
    pub correlated_actions: Vec<CorrelatedAction>,
    pub uncorrelated_apis: Vec<ApiRequestRecord>,
}

/// A sanitized, truncated, credential-free representation of one API call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestTemplate {
    /// Stable digest of `(method, host, pathname)`.
    pub id: String,
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type_hint: Option<String>,
}

/// Parse a recorded RFC 3339 timestamp into epoch milliseconds.
///
/// Returns `None` for anything unparseable; callers exclude such entries
/// silently rather than surfacing an error.
pub fn parse_timestamp_ms(raw: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.timestamp_millis())
}
