//! Keyed cache of fetched collections.
//!
//! The only shared state in the console. Entries are keyed by resource name and
//! hold a type-erased payload (normally `Vec<R>`). Invalidation is wholesale per
//! key: the entry is marked stale, its data stays visible, and the next
//! `needs_fetch` check asks for a fresh copy. An invalidation that lands while
//! a request is running keeps the entry stale once that response arrives, so
//! another fetch follows. `clear` starts a new generation; responses tagged
//! with an older one are dropped.
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::error::ApiError;

pub type Payload = Arc<dyn Any + Send + Sync>;

#[derive(Clone, Debug, PartialEq)]
pub enum FetchStatus {
    Fresh,
    Stale,
    Failed(ApiError),
}

#[derive(Clone)]
struct Entry {
    data: Option<Payload>,
    status: FetchStatus,
    fetching: bool,
    /// Invalidated after the running request was sent.
    invalidated_in_flight: bool,
    updated_at: Option<Instant>,
}

impl Entry {
    fn empty() -> Self {
        Self {
            data: None,
            status: FetchStatus::Stale,
            fetching: false,
            invalidated_in_flight: false,
            updated_at: None,
        }
    }
}

#[derive(Default)]
pub struct QueryCache {
    entries: HashMap<String, Entry>,
    revision: u64,
    generation: u64,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bumped on every change; lets views rebuild derived data lazily.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Tag for requests started now; compare with [`QueryCache::settle_for`].
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// True when the key has never been fetched or was invalidated and no
    /// request is currently running. Failed entries wait for an explicit refresh.
    pub fn needs_fetch(&self, key: &str) -> bool {
        match self.entries.get(key) {
            None => true,
            Some(e) => !e.fetching && e.status == FetchStatus::Stale,
        }
    }

    /// Mark a request as running. Returns false if one already is.
    pub fn begin_fetch(&mut self, key: &str) -> bool {
        let entry = self.entries.entry(key.to_string()).or_insert_with(Entry::empty);
        if entry.fetching {
            return false;
        }
        entry.fetching = true;
        entry.invalidated_in_flight = false;
        self.touch();
        tracing::debug!(key, "fetch started");
        true
    }

    /// Apply a response for a request started in `generation`. Responses from
    /// before the last `clear` are dropped.
    pub fn settle_for(&mut self, generation: u64, key: &str, result: Result<Payload, ApiError>) {
        if generation != self.generation {
            tracing::debug!(key, generation, current = self.generation, "dropping response from cleared cache");
            return;
        }
        self.settle(key, result);
    }

    pub fn settle(&mut self, key: &str, result: Result<Payload, ApiError>) {
        let entry = self.entries.entry(key.to_string()).or_insert_with(Entry::empty);
        entry.fetching = false;
        let outdated = std::mem::take(&mut entry.invalidated_in_flight);
        match result {
            Ok(data) => {
                entry.data = Some(data);
                entry.updated_at = Some(Instant::now());
                entry.status = if outdated {
                    FetchStatus::Stale
                } else {
                    FetchStatus::Fresh
                };
                tracing::debug!(key, outdated, "fetch settled");
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "fetch failed");
                entry.status = if outdated {
                    FetchStatus::Stale
                } else {
                    FetchStatus::Failed(e)
                };
            }
        }
        self.touch();
    }

    /// Store a value directly (used for client-side data and tests).
    pub fn put<T: Any + Send + Sync>(&mut self, key: &str, value: T) {
        self.settle(key, Ok(Arc::new(value)));
    }

    pub fn invalidate(&mut self, key: &str) {
        if let Some(e) = self.entries.get_mut(key) {
            e.status = FetchStatus::Stale;
            e.invalidated_in_flight = e.fetching;
            tracing::debug!(key, in_flight = e.fetching, "invalidated");
            self.touch();
        }
    }

    pub fn invalidate_all(&mut self) {
        for e in self.entries.values_mut() {
            e.status = FetchStatus::Stale;
            e.invalidated_in_flight = e.fetching;
        }
        self.touch();
    }

    /// Drop everything (logout, login). Requests still running belong to the
    /// previous generation and their responses are ignored.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.generation = self.generation.wrapping_add(1);
        self.touch();
    }

    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.entries.get(key)?.data.as_deref()?.downcast_ref::<T>()
    }

    pub fn is_fetching(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|e| e.fetching)
    }

    /// Loading placeholder: a request is running and nothing is cached yet.
    pub fn is_loading(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .is_some_and(|e| e.fetching && e.data.is_none())
    }

    pub fn status(&self, key: &str) -> Option<&FetchStatus> {
        self.entries.get(key).map(|e| &e.status)
    }

    pub fn error(&self, key: &str) -> Option<&ApiError> {
        match self.status(key)? {
            FetchStatus::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn updated_at(&self, key: &str) -> Option<Instant> {
        self.entries.get(key)?.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_fetch_settle_invalidate() {
        let mut c = QueryCache::new();
        assert!(c.needs_fetch("members"));
        assert!(c.begin_fetch("members"));
        assert!(!c.begin_fetch("members"), "no duplicate in-flight fetch");
        assert!(c.is_loading("members"));
        assert!(!c.needs_fetch("members"));

        c.settle("members", Ok(Arc::new(vec![1u32, 2, 3])));
        assert_eq!(c.get::<Vec<u32>>("members"), Some(&vec![1, 2, 3]));
        assert_eq!(c.status("members"), Some(&FetchStatus::Fresh));
        assert!(!c.needs_fetch("members"));

        c.invalidate("members");
        assert!(c.needs_fetch("members"));
        // stale data remains visible until the refetch lands
        assert_eq!(c.get::<Vec<u32>>("members").map(Vec::len), Some(3));
        assert!(c.begin_fetch("members"));
        assert!(!c.is_loading("members"));
    }

    #[test]
    fn invalidation_during_fetch_forces_another_fetch() {
        let mut c = QueryCache::new();
        assert!(c.begin_fetch("members"));
        c.invalidate("members");
        c.settle("members", Ok(Arc::new(vec![1u32])));
        assert_eq!(c.status("members"), Some(&FetchStatus::Stale));
        assert!(c.needs_fetch("members"));
        assert_eq!(c.get::<Vec<u32>>("members"), Some(&vec![1]));

        assert!(c.begin_fetch("members"));
        c.settle("members", Ok(Arc::new(vec![1u32, 2])));
        assert_eq!(c.status("members"), Some(&FetchStatus::Fresh));
        assert!(!c.needs_fetch("members"));
    }

    #[test]
    fn failed_fetch_after_invalidation_is_retried() {
        let mut c = QueryCache::new();
        c.begin_fetch("loans");
        c.invalidate_all();
        c.settle("loans", Err(ApiError::Transport("down".into())));
        assert!(c.needs_fetch("loans"));
    }

    #[test]
    fn responses_from_before_clear_are_dropped() {
        let mut c = QueryCache::new();
        let before = c.generation();
        assert!(c.begin_fetch("members"));
        c.clear();
        assert_ne!(c.generation(), before);
        c.settle_for(before, "members", Ok(Arc::new(vec![9u32])));
        assert!(c.get::<Vec<u32>>("members").is_none());
        assert!(c.needs_fetch("members"));

        let now = c.generation();
        assert!(c.begin_fetch("members"));
        c.settle_for(now, "members", Ok(Arc::new(vec![1u32])));
        assert_eq!(c.get::<Vec<u32>>("members"), Some(&vec![1]));
    }

    #[test]
    fn failures_wait_for_explicit_refresh() {
        let mut c = QueryCache::new();
        c.begin_fetch("loans");
        c.settle("loans", Err(ApiError::Transport("down".into())));
        assert!(c.error("loans").is_some());
        assert!(!c.needs_fetch("loans"));
        c.invalidate("loans");
        assert!(c.needs_fetch("loans"));
    }

    #[test]
    fn wrong_type_downcast_is_none() {
        let mut c = QueryCache::new();
        c.put("groups", vec!["a".to_string()]);
        assert!(c.get::<Vec<u32>>("groups").is_none());
        assert!(c.get::<Vec<String>>("groups").is_some());
    }

    #[test]
    fn revision_moves_on_change() {
        let mut c = QueryCache::new();
        let r0 = c.revision();
        c.put("x", 1u8);
        assert!(c.revision() > r0);
        c.clear();
        assert!(c.get::<u8>("x").is_none());
    }
}
