//! Suspicion Store
//!
//! Concurrency-safe counters keyed by client identity, alive for the
//! lifetime of the process. The map is split into shards selected by the
//! identity hash; each shard has its own lock, held only for the map access.
//!
//! Records are created lazily by `increment` and never removed or reset.

use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::BuildHasher;

use parking_lot::Mutex;
use serde::Serialize;

use crate::constants::DEFAULT_SUSPICION_SHARDS;
use crate::logic::features::ClientIdentity;

/// Snapshot of one identity's counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuspicionRecord {
    pub identity: ClientIdentity,
    pub count: u64,
}

/// Sharded identity → counter map.
pub struct SuspicionStore {
    shards: Box<[Mutex<HashMap<ClientIdentity, u64>>]>,
    hasher: RandomState,
}

impl SuspicionStore {
    /// Create a store with `shard_count` lock domains (at least one).
    pub fn new(shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| Mutex::new(HashMap::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            shards,
            hasher: RandomState::new(),
        }
    }

    fn shard(&self, identity: &ClientIdentity) -> &Mutex<HashMap<ClientIdentity, u64>> {
        let index = (self.hasher.hash_one(identity) % self.shards.len() as u64) as usize;
        &self.shards[index]
    }

    /// Increment the identity's counter and return the new value.
    ///
    /// Increments for one identity serialize on its shard lock, so the
    /// values handed out are exactly 1, 2, .., K with no gaps or repeats.
    pub fn increment(&self, identity: &ClientIdentity) -> u64 {
        let mut shard = self.shard(identity).lock();

        if let Some(count) = shard.get_mut(identity) {
            *count += 1;
            return *count;
        }

        shard.insert(identity.clone(), 1);
        1
    }

    /// Current count for the identity, 0 if never seen.
    pub fn peek(&self, identity: &ClientIdentity) -> u64 {
        self.shard(identity).lock().get(identity).copied().unwrap_or(0)
    }

    /// Full record for the identity, if one exists
    pub fn record(&self, identity: &ClientIdentity) -> Option<SuspicionRecord> {
        self.shard(identity)
            .lock()
            .get(identity)
            .map(|count| SuspicionRecord {
                identity: identity.clone(),
                count: *count,
            })
    }

    /// Number of identities with a record.
    pub fn tracked_identities(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }
}

impl Default for SuspicionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SUSPICION_SHARDS)
    }
}

impl std::fmt::Debug for SuspicionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuspicionStore")
            .field("shards", &self.shards.len())
            .field("tracked_identities", &self.tracked_identities())
            .finish()
    }
}
