//! Bounded, time-expiring answer cache.
//!
//! Keys are `(language, normalized question)`; normalization is trim +
//! lowercase, so `"  When To Sow Wheat?  "` and `"when to sow wheat?"` hit
//! the same entry.  Only insertion/refresh time is tracked — repeated reads
//! do not protect an entry from eviction.  That is deliberately *not* LRU:
//! the workload is a handful of recurring questions, and refresh-time
//! recency is cheap to maintain with a single timestamp.
//!
//! Expiry is lazy: an expired entry is a miss on lookup but is only dropped
//! at the next insert-time trim.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::config::CacheConfig;
use crate::language::Language;

use super::store::{CacheEntry, CacheMap, CacheStore};

/// Canonical form of a question for cache keying: trimmed and lowercased.
pub fn normalize(question: &str) -> String {
    question.trim().to_lowercase()
}

fn cache_key(language: Language, question: &str) -> String {
    format!("{}:{}", language.code(), normalize(question))
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// ResponseCache
// ---------------------------------------------------------------------------

/// Bounded key→answer store between the capture pipeline and the remote
/// answering service.
///
/// Loaded once from the injected [`CacheStore`]; every `put` rewrites the
/// whole serialized store.  Store write failures are logged and swallowed —
/// the cache is an optimisation, never a point of failure.
pub struct ResponseCache {
    entries: CacheMap,
    store: Box<dyn CacheStore>,
    ttl: Duration,
    max_entries: usize,
}

impl ResponseCache {
    /// Load the cache from `store` with limits from `config`.
    pub fn new(store: Box<dyn CacheStore>, config: &CacheConfig) -> Self {
        let entries = store.read_all();
        log::debug!("cache: loaded {} entries", entries.len());
        Self {
            entries,
            store,
            ttl: Duration::from_secs(config.ttl_secs),
            max_entries: config.max_entries,
        }
    }

    /// Number of entries currently held (expired entries included until the
    /// next insert-time trim).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a cached answer.  Hits require the entry to be younger than
    /// the TTL; an expired entry is a miss but is not deleted here.
    pub fn get(&self, language: Language, question: &str) -> Option<String> {
        self.get_at(language, question, now_ms())
    }

    /// Insert or refresh an answer, then trim the store back to its cap.
    pub fn put(&mut self, language: Language, question: &str, answer: &str) {
        self.put_at(language, question, answer, now_ms());
    }

    // -----------------------------------------------------------------------
    // Clock-explicit internals (also the test surface for TTL/eviction)
    // -----------------------------------------------------------------------

    fn get_at(&self, language: Language, question: &str, now_ms: u64) -> Option<String> {
        let entry = self.entries.get(&cache_key(language, question))?;
        let age = Duration::from_millis(now_ms.saturating_sub(entry.timestamp_ms));
        if age < self.ttl {
            Some(entry.answer.clone())
        } else {
            None
        }
    }

    fn put_at(&mut self, language: Language, question: &str, answer: &str, now_ms: u64) {
        self.entries.insert(
            cache_key(language, question),
            CacheEntry {
                answer: answer.to_string(),
                timestamp_ms: now_ms,
            },
        );

        self.trim(now_ms);

        if let Err(e) = self.store.write_all(&self.entries) {
            log::warn!("cache: {e}");
        }
    }

    /// Insert-time trim: drop expired entries, then evict oldest-by-timestamp
    /// until the store is back at the cap.
    fn trim(&mut self, now_ms: u64) {
        let ttl_ms = self.ttl.as_millis() as u64;
        self.entries
            .retain(|_, entry| now_ms.saturating_sub(entry.timestamp_ms) < ttl_ms);

        while self.entries.len() > self.max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.timestamp_ms)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    log::debug!("cache: evicting {key}");
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::{CacheError, MemoryStore};

    const HOUR_MS: u64 = 60 * 60 * 1_000;
    const DAY_MS: u64 = 24 * HOUR_MS;

    fn cache() -> ResponseCache {
        ResponseCache::new(Box::new(MemoryStore::new()), &CacheConfig::default())
    }

    // ---- normalization / round trip ----

    #[test]
    fn round_trip_is_case_and_whitespace_insensitive() {
        let mut c = cache();
        c.put_at(Language::English, "When to sow wheat?", "Oct 15–Nov 15", 0);

        assert_eq!(
            c.get_at(Language::English, "  When To Sow Wheat?  ", HOUR_MS),
            Some("Oct 15–Nov 15".to_string())
        );
    }

    #[test]
    fn languages_do_not_collide() {
        let mut c = cache();
        c.put_at(Language::English, "when to sow wheat?", "Oct 15", 0);
        c.put_at(Language::Hindi, "when to sow wheat?", "१५ अक्टूबर", 0);

        assert_eq!(
            c.get_at(Language::English, "when to sow wheat?", 1).as_deref(),
            Some("Oct 15")
        );
        assert_eq!(
            c.get_at(Language::Hindi, "when to sow wheat?", 1).as_deref(),
            Some("१५ अक्टूबर")
        );
        assert_eq!(c.get_at(Language::Marathi, "when to sow wheat?", 1), None);
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize("  When To Sow Wheat?  "), "when to sow wheat?");
    }

    // ---- TTL ----

    #[test]
    fn entry_expires_after_ttl() {
        let mut c = cache();
        c.put_at(Language::English, "q", "a", 0);

        assert!(c.get_at(Language::English, "q", DAY_MS - 1).is_some());
        assert_eq!(c.get_at(Language::English, "q", DAY_MS), None);
        assert_eq!(c.get_at(Language::English, "q", DAY_MS + HOUR_MS), None);
    }

    #[test]
    fn expired_entry_lingers_until_next_insert() {
        let mut c = cache();
        c.put_at(Language::English, "old", "a", 0);

        // Expired: a miss, but still physically present.
        assert_eq!(c.get_at(Language::English, "old", DAY_MS + 1), None);
        assert_eq!(c.len(), 1);

        // The next put trims it out.
        c.put_at(Language::English, "new", "b", DAY_MS + 1);
        assert_eq!(c.len(), 1);
        assert!(c.get_at(Language::English, "new", DAY_MS + 2).is_some());
    }

    #[test]
    fn refresh_resets_the_clock() {
        let mut c = cache();
        c.put_at(Language::English, "q", "stale", 0);
        c.put_at(Language::English, "q", "fresh", DAY_MS);

        assert_eq!(
            c.get_at(Language::English, "q", DAY_MS + HOUR_MS).as_deref(),
            Some("fresh")
        );
    }

    // ---- bounded growth / eviction ----

    #[test]
    fn sixty_inserts_leave_exactly_fifty_newest() {
        let mut c = cache();
        for i in 0..60u64 {
            c.put_at(Language::English, &format!("question {i}"), "answer", i);
        }

        assert_eq!(c.len(), 50);
        // The 10 oldest-by-insertion-time are the ones gone.
        for i in 0..10u64 {
            assert_eq!(
                c.get_at(Language::English, &format!("question {i}"), 61),
                None,
                "question {i} should have been evicted"
            );
        }
        for i in 10..60u64 {
            assert!(
                c.get_at(Language::English, &format!("question {i}"), 61)
                    .is_some(),
                "question {i} should have survived"
            );
        }
    }

    #[test]
    fn refreshing_an_entry_protects_it_from_eviction() {
        let mut c = ResponseCache::new(
            Box::new(MemoryStore::new()),
            &CacheConfig {
                ttl_secs: 86_400,
                max_entries: 2,
            },
        );
        c.put_at(Language::English, "a", "1", 0);
        c.put_at(Language::English, "b", "2", 1);
        // Refresh "a" — it is now newer than "b".
        c.put_at(Language::English, "a", "1'", 2);
        c.put_at(Language::English, "c", "3", 3);

        assert_eq!(c.len(), 2);
        assert!(c.get_at(Language::English, "a", 4).is_some());
        assert_eq!(c.get_at(Language::English, "b", 4), None);
        assert!(c.get_at(Language::English, "c", 4).is_some());
    }

    // ---- persistence ----

    #[test]
    fn puts_survive_a_reload_from_the_same_store() {
        let store = std::sync::Arc::new(MemoryStore::new());

        struct SharedStore(std::sync::Arc<MemoryStore>);
        impl CacheStore for SharedStore {
            fn read_all(&self) -> CacheMap {
                self.0.read_all()
            }
            fn write_all(&self, entries: &CacheMap) -> Result<(), CacheError> {
                self.0.write_all(entries)
            }
        }

        let mut c = ResponseCache::new(
            Box::new(SharedStore(std::sync::Arc::clone(&store))),
            &CacheConfig::default(),
        );
        c.put_at(Language::Kannada, "ಪ್ರಶ್ನೆ", "ಉತ್ತರ", 5);

        let reloaded = ResponseCache::new(
            Box::new(SharedStore(store)),
            &CacheConfig::default(),
        );
        assert_eq!(
            reloaded.get_at(Language::Kannada, "ಪ್ರಶ್ನೆ", 6).as_deref(),
            Some("ಉತ್ತರ")
        );
    }

    #[test]
    fn store_write_failure_does_not_fail_the_caller() {
        struct BrokenStore;
        impl CacheStore for BrokenStore {
            fn read_all(&self) -> CacheMap {
                CacheMap::new()
            }
            fn write_all(&self, _: &CacheMap) -> Result<(), CacheError> {
                Err(CacheError::Persist("disk full".into()))
            }
        }

        let mut c = ResponseCache::new(Box::new(BrokenStore), &CacheConfig::default());
        c.put_at(Language::English, "q", "a", 0);
        // In-memory view still works this session.
        assert!(c.get_at(Language::English, "q", 1).is_some());
    }
}
