//! Time-bounded dedup cache for settlement attempts.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use liquidator_api::AccountId;

/// Upper bound on tracked entries; far above any realistic candidate count.
const DEFAULT_CAPACITY: usize = 10_000;

/// Set of accounts with a settlement attempt in flight (or recently
/// attempted), keyed by position identity.
///
/// Entries expire after the configured TTL regardless of access pattern;
/// this is a time-bounded set, not an LRU-by-use. Accounts are added
/// *before* their settlement call is dispatched, so a slow in-flight call
/// cannot be re-dispatched by the next poll cycle. A failed call becomes
/// retryable only once its entry expires.
pub struct LiquidationStore {
    entries: DashMap<AccountId, Instant>,
    ttl: Duration,
    capacity: usize,
}

impl LiquidationStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            capacity: DEFAULT_CAPACITY,
        }
    }

    pub fn with_capacity(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            capacity,
        }
    }

    /// Mark an account as attempted. Never rolled back on failure.
    pub fn add(&self, account: &AccountId) {
        self.prune();
        self.entries.insert(*account, Instant::now());
    }

    /// Whether an unexpired entry exists for the account.
    pub fn contains(&self, account: &AccountId) -> bool {
        self.entries
            .get(account)
            .is_some_and(|inserted| inserted.elapsed() < self.ttl)
    }

    /// Number of unexpired entries.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.value().elapsed() < self.ttl)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn prune(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, inserted| inserted.elapsed() < ttl);

        // At capacity even after dropping expired entries: evict oldest.
        while self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|e| *e.value())
                .map(|e| *e.key());
            match oldest {
                Some(key) => {
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, U256};

    fn account(byte: u8) -> AccountId {
        AccountId::new(Address::repeat_byte(byte), U256::ZERO)
    }

    #[test]
    fn contains_after_add_within_ttl() {
        let store = LiquidationStore::new(Duration::from_secs(60));
        let id = account(1);

        assert!(!store.contains(&id));
        store.add(&id);
        assert!(store.contains(&id));
        // Distinct sub-account numbers are distinct keys.
        let sibling = AccountId::new(id.owner, U256::from(1u64));
        assert!(!store.contains(&sibling));
    }

    #[test]
    fn zero_ttl_expires_immediately() {
        let store = LiquidationStore::new(Duration::ZERO);
        let id = account(1);
        store.add(&id);
        assert!(!store.contains(&id));
    }

    #[test]
    fn entries_become_retryable_after_ttl() {
        let store = LiquidationStore::new(Duration::from_millis(30));
        let id = account(1);
        store.add(&id);
        assert!(store.contains(&id));

        std::thread::sleep(Duration::from_millis(40));
        assert!(!store.contains(&id));

        // Re-adding starts a fresh window.
        store.add(&id);
        assert!(store.contains(&id));
    }

    #[test]
    fn capacity_evicts_the_oldest_entry() {
        let store = LiquidationStore::with_capacity(Duration::from_secs(60), 2);
        let first = account(1);

        store.add(&first);
        std::thread::sleep(Duration::from_millis(5));
        store.add(&account(2));
        std::thread::sleep(Duration::from_millis(5));
        store.add(&account(3));

        assert!(!store.contains(&first));
        assert!(store.contains(&account(2)));
        assert!(store.contains(&account(3)));
    }
}
