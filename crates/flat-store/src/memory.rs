// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-process record store.

use flat_graph::FlatRecord;
use tracing::debug;

use crate::{newest_first, record_id, FlatRepository, StoreError, DEFAULT_PAGE_LIMIT};

/// Records kept in a `Vec` in insertion order. Nothing survives the process.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    records: Vec<FlatRecord>,
    limit: usize,
}

impl MemoryStore {
    /// Creates an empty store returning at most [`DEFAULT_PAGE_LIMIT`] records.
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_PAGE_LIMIT)
    }

    /// Creates an empty store with a custom page limit.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            records: Vec::new(),
            limit,
        }
    }

    /// Number of records stored (not capped by the page limit).
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Page limit applied by `get_all`.
    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FlatRepository for MemoryStore {
    fn create(&mut self, record: FlatRecord) -> Result<String, StoreError> {
        let seq = self.records.len() as u64;
        let id = record_id(&record, seq)?;
        debug!(%id, seq, "stored flat record in memory");
        self.records.push(record.with_id(id.clone()));
        Ok(id)
    }

    fn get_all(&self) -> Result<Vec<FlatRecord>, StoreError> {
        let entries = (0u64..).zip(self.records.iter().cloned()).collect();
        Ok(newest_first(entries, self.limit))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::record_at;
    use time::Duration;

    #[test]
    fn create_assigns_distinct_ids() {
        let mut store = MemoryStore::new();
        let a = store.create(record_at(Duration::ZERO)).unwrap();
        let b = store.create(record_at(Duration::ZERO)).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
        let ids: Vec<_> = store
            .get_all()
            .unwrap()
            .into_iter()
            .map(|r| r.id.unwrap())
            .collect();
        // Same timestamp: the later insert comes first.
        assert_eq!(ids, [b, a]);
    }

    #[test]
    fn get_all_returns_newest_page() {
        let mut store = MemoryStore::new();
        for _ in 0..50 {
            store.create(record_at(Duration::ZERO)).unwrap();
        }
        for _ in 0..90 {
            store.create(record_at(Duration::days(1))).unwrap();
        }
        let page = store.get_all().unwrap();
        assert_eq!(page.len(), DEFAULT_PAGE_LIMIT);
        let newer = page
            .iter()
            .filter(|r| r.processed_at > record_at(Duration::ZERO).processed_at)
            .count();
        assert_eq!(newer, 90);
        assert!(page
            .windows(2)
            .all(|w| w[0].processed_at >= w[1].processed_at));
    }

    #[test]
    fn empty_store_lists_nothing() {
        let store = MemoryStore::with_limit(3);
        assert!(store.is_empty());
        assert_eq!(store.limit(), 3);
        assert!(store.get_all().unwrap().is_empty());
    }
}
