//! Response cache module — a bounded, time-expiring answer store.
//!
//! Sits between the capture pipeline and the remote answering service so
//! recurring questions (the same handful of farming queries come up every
//! season) are answered without a network round-trip.
//!
//! The store is injected ([`CacheStore`]) rather than global: production
//! uses the JSON-file-backed [`FileStore`], tests use [`MemoryStore`].

pub mod response;
pub mod store;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use response::{normalize, ResponseCache};
pub use store::{CacheEntry, CacheError, CacheMap, CacheStore, FileStore, MemoryStore};
