use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::warn;

use crate::errors::CacheResult;
use crate::model::{CacheEntry, CachedAction};

/// File-backed action cache: one JSON document per fingerprint key.
pub struct ActionCache {
    root: PathBuf,
}

impl ActionCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Default per-user location for cached workflows.
    pub fn default_root() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".flowcap")
            .join("action-cache")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, cache_key: &str) -> PathBuf {
        self.root.join(format!("{cache_key}.json"))
    }

    /// Read-through lookup.
    ///
    /// A hit bumps `hit_count`, stamps `last_hit_at`, and persists the
    /// mutation before returning. Missing, unreadable, or malformed entries
    /// are misses, never errors; only the hit-accounting write-back can
    /// fail.
    pub fn lookup(&self, cache_key: &str) -> CacheResult<Option<CacheEntry>> {
        let path = self.entry_path(cache_key);
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                warn!(%cache_key, %err, "cache entry unreadable, treating as miss");
                return Ok(None);
            }
        };

        let mut entry: CacheEntry = match serde_json::from_slice(&raw) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(%cache_key, %err, "cache entry malformed, treating as miss");
                return Ok(None);
            }
        };

        entry.hit_count += 1;
        entry.last_hit_at = Some(Utc::now());
        self.persist(&path, &entry)?;
        Ok(Some(entry))
    }

    /// Record a freshly derived workflow under `cache_key`, unconditionally
    /// replacing any prior entry. Last write wins; no merge, no versioning.
    pub fn store(
        &self,
        cache_key: &str,
        canonical_url: &str,
        task: &str,
        actions: Vec<CachedAction>,
    ) -> CacheResult<()> {
        let entry = CacheEntry {
            cache_key: cache_key.to_string(),
            canonical_url: canonical_url.to_string(),
            task: task.to_string(),
            actions,
            created_at: Utc::now(),
            hit_count: 0,
            last_hit_at: None,
        };
        self.persist(&self.entry_path(cache_key), &entry)
    }

    /// Atomic replace: a concurrent reader only ever observes a fully
    /// written entry, never a torn one. The rename is the commit point.
    fn persist(&self, path: &Path, entry: &CacheEntry) -> CacheResult<()> {
        let data = serde_json::to_vec_pretty(entry)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("tmp");
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp)?;
        file.write_all(&data)?;
        file.sync_all()?;
        fs::rename(tmp, path)?;
        Ok(())
    }
}
