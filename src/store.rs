use bytes::Bytes;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

/// The Store manages the key-value pairs and is the only state shared between
/// connections. It can be shared and cloned cheaply using reference counting.
///
/// Internally the map is split into shards, each guarded by its own mutex.
/// A key always hashes to the same shard, so two operations on the same key
/// serialize on that shard's lock (last SET wins, GET sees a complete value),
/// while operations on different keys mostly run in parallel.
///
/// An optional capacity bounds the number of resident keys; past it, the
/// least recently touched key in the incoming key's shard is evicted. Both
/// GET and SET count as a touch. Without a capacity, SET always succeeds and
/// nothing is ever evicted.
#[derive(Clone)]
pub struct Store {
    shards: Arc<[Mutex<Shard>]>,
}

const DEFAULT_SHARD_COUNT: usize = 16;

impl Store {
    /// An unbounded store with the default shard count.
    pub fn new() -> Store {
        Store::build(DEFAULT_SHARD_COUNT, None)
    }

    /// An unbounded store with `shard_count` shards.
    pub fn with_shards(shard_count: usize) -> Store {
        Store::build(shard_count, None)
    }

    /// A store holding at most `max_keys` entries, evicting the least
    /// recently used key once full. The capacity is split evenly between
    /// shards so eviction never has to take more than one lock. The shard
    /// count is capped at `max_keys` so a small capacity is never inflated
    /// by the number of shards; under a skewed key distribution a full
    /// shard can still evict before the store as a whole reaches the cap.
    pub fn bounded(shard_count: usize, max_keys: usize) -> Store {
        let shard_count = shard_count.clamp(1, max_keys.max(1));
        let per_shard = std::cmp::max(max_keys / shard_count, 1);
        Store::build(shard_count, Some(per_shard))
    }

    fn build(shard_count: usize, max_entries: Option<usize>) -> Store {
        assert!(shard_count > 0, "store needs at least one shard");

        let shards: Vec<Mutex<Shard>> = (0..shard_count)
            .map(|_| {
                Mutex::new(Shard {
                    entries: HashMap::new(),
                    max_entries,
                    clock: 0,
                })
            })
            .collect();

        Store {
            shards: shards.into(),
        }
    }

    pub fn set(&self, key: String, data: Bytes) {
        self.shard(&key).lock().unwrap().set(key, data);
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.shard(key).lock().unwrap().get(key)
    }

    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.lock().unwrap().entries.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn shard(&self, key: &str) -> &Mutex<Shard> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        &self.shards[hasher.finish() as usize % self.shards.len()]
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

struct Shard {
    entries: HashMap<String, Entry>,
    max_entries: Option<usize>,
    // Monotonic counter stamped onto entries on every touch; the smallest
    // stamp marks the eviction candidate.
    clock: u64,
}

struct Entry {
    data: Bytes,
    last_touched: u64,
}

impl Shard {
    fn set(&mut self, key: String, data: Bytes) {
        self.clock += 1;
        let last_touched = self.clock;

        if let Some(entry) = self.entries.get_mut(&key) {
            entry.data = data;
            entry.last_touched = last_touched;
            return;
        }

        if let Some(max) = self.max_entries {
            if self.entries.len() >= max {
                self.evict_lru();
            }
        }

        self.entries.insert(key, Entry { data, last_touched });
    }

    fn get(&mut self, key: &str) -> Option<Bytes> {
        self.clock += 1;
        let last_touched = self.clock;

        let entry = self.entries.get_mut(key)?;
        entry.last_touched = last_touched;
        Some(entry.data.clone())
    }

    fn evict_lru(&mut self) {
        let coldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_touched)
            .map(|(key, _)| key.clone());

        if let Some(key) = coldest {
            self.entries.remove(&key);
        }
    }
}
