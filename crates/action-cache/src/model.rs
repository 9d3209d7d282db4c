use chrono::{DateTime, Utc};
use flowcap_core_types::ActionKind;
use serde::{Deserialize, Serialize};

/// One replayable step of a cached workflow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CachedAction {
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// Persisted record of one fingerprinted workflow.
///
/// `hit_count` and `last_hit_at` mutate on every lookup hit; everything
/// else is frozen at creation — a changed workflow produces a new key, not
/// a mutated entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub cache_key: String,
    pub canonical_url: String,
    pub task: String,
    pub actions: Vec<CachedAction>,
    pub created_at: DateTime<Utc>,
    pub hit_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_hit_at: Option<DateTime<Utc>>,
}
