//! Backing stores for the response cache.
//!
//! The cache owns an injected [`CacheStore`] rather than a process-wide
//! singleton, so eviction/TTL logic is testable without touching real
//! durable storage.  Reads never fail: a missing or corrupt backing file is
//! treated as an empty store, because losing cached answers must never take
//! the assistant down.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AppPaths;

// ---------------------------------------------------------------------------
// CacheEntry
// ---------------------------------------------------------------------------

/// One cached answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The answer text.
    pub answer: String,
    /// Insertion/refresh time, milliseconds since the Unix epoch.  Drives
    /// both TTL expiry and oldest-first eviction.
    pub timestamp_ms: u64,
}

/// The whole serialized store: cache key → entry.
pub type CacheMap = HashMap<String, CacheEntry>;

// ---------------------------------------------------------------------------
// CacheError
// ---------------------------------------------------------------------------

/// Errors from the cache backing store.  Only writes can fail; the cache
/// logs and swallows them — answers are best-effort state.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to persist response cache: {0}")]
    Persist(String),
}

// ---------------------------------------------------------------------------
// CacheStore trait
// ---------------------------------------------------------------------------

/// Durable key-value backing for the response cache.
///
/// `read_all` degrades to an empty map on any failure; `write_all` replaces
/// the whole serialized store (single-threaded access, so a whole-store
/// read-modify-write per put is race-free).
pub trait CacheStore: Send + Sync {
    fn read_all(&self) -> CacheMap;
    fn write_all(&self, entries: &CacheMap) -> Result<(), CacheError>;
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// JSON-file-backed store at the platform data path.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store backed by an explicit file path (useful for tests).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform-appropriate `responses.json`.
    pub fn at_default_path() -> Self {
        Self::new(AppPaths::new().cache_file)
    }
}

impl CacheStore for FileStore {
    fn read_all(&self) -> CacheMap {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => {
                // First run or unreadable file — start empty either way.
                log::debug!("cache: no readable store at {}", self.path.display());
                return CacheMap::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("cache: corrupt store, starting empty: {e}");
                CacheMap::new()
            }
        }
    }

    fn write_all(&self, entries: &CacheMap) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::Persist(e.to_string()))?;
        }
        let content =
            serde_json::to_string_pretty(entries).map_err(|e| CacheError::Persist(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| CacheError::Persist(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory store — no persistence across sessions.  Used in tests and by
/// embedders that want a cache without touching disk.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<CacheMap>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryStore {
    fn read_all(&self) -> CacheMap {
        self.entries.lock().unwrap().clone()
    }

    fn write_all(&self, entries: &CacheMap) -> Result<(), CacheError> {
        *self.entries.lock().unwrap() = entries.clone();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
