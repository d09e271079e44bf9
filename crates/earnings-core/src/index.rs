//! Idempotency index for downloads.
//!
//! Maps `(ticker, url)` to the file a previous ingest produced so that repeat
//! requests inside the TTL are answered from disk.

use crate::error::Result;
use crate::paths;
use crate::ticker::Ticker;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Serializes read-modify-write cycles on the index file within this process.
static INDEX_LOCK: Mutex<()> = Mutex::new(());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub saved_path: PathBuf,
    pub content_type: String,
    pub bytes: u64,
    pub fetched_at: DateTime<Utc>,
}

impl IndexEntry {
    /// Fresh when younger than `ttl_secs` and the file is still on disk.
    /// A TTL of zero never matches.
    pub fn is_fresh(&self, ttl_secs: u64, now: DateTime<Utc>) -> bool {
        if ttl_secs == 0 {
            return false;
        }
        let age = now.signed_duration_since(self.fetched_at);
        if age < chrono::Duration::zero() {
            return false;
        }
        // A TTL too large for a TimeDelta never expires.
        let within_ttl = i64::try_from(ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .map_or(true, |ttl| age < ttl);
        within_ttl && self.saved_path.is_file()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestIndex {
    #[serde(default)]
    pub entries: BTreeMap<String, IndexEntry>,
}

pub fn index_key(ticker: &Ticker, url: &str) -> String {
    format!("{ticker}|{url}")
}

impl IngestIndex {
    /// Read the index. Missing or unreadable JSON is treated as empty.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = paths::index_path(data_dir);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read(&path)?;
        match serde_json::from_slice(&data) {
            Ok(index) => Ok(index),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ingest index is corrupt; starting fresh");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, data_dir: &Path) -> Result<()> {
        crate::io::write_json(&paths::index_path(data_dir), self)
    }

    pub fn get(&self, ticker: &Ticker, url: &str) -> Option<&IndexEntry> {
        self.entries.get(&index_key(ticker, url))
    }

    /// Drop entries that are past the TTL or whose file disappeared.
    pub fn prune(&mut self, ttl_secs: u64, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.is_fresh(ttl_secs, now));
        before - self.entries.len()
    }
}

/// Return the fresh entry for `(ticker, url)`, if any.
pub fn lookup(
    data_dir: &Path,
    ticker: &Ticker,
    url: &str,
    ttl_secs: u64,
    now: DateTime<Utc>,
) -> Result<Option<IndexEntry>> {
    let _guard = INDEX_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let index = IngestIndex::load(data_dir)?;
    Ok(index
        .get(ticker, url)
        .filter(|e| e.is_fresh(ttl_secs, now))
        .cloned())
}

/// Insert or replace the entry for `(ticker, url)`, pruning stale entries.
pub fn record(
    data_dir: &Path,
    ticker: &Ticker,
    url: &str,
    entry: IndexEntry,
    ttl_secs: u64,
) -> Result<()> {
    let _guard = INDEX_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let mut index = IngestIndex::load(data_dir)?;
    let now = entry.fetched_at;
    index.prune(ttl_secs, now);
    index.entries.insert(index_key(ticker, url), entry);
    index.save(data_dir)
}
