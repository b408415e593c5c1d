use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use crate::prices::PriceQuote;

#[derive(Debug, Clone)]
struct CacheEntry {
    quote: PriceQuote,
    stored_at: Instant,
}

/// Price quotes keyed by lower-cased ingredient name. Entries go stale after
/// the TTL but are only ignored on read, never swept; the next put for the
/// same key overwrites them. Bounded by LRU eviction so the map cannot grow
/// for the lifetime of the process.
pub struct PriceCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

pub const PRICE_CACHE_CAPACITY: usize = 1024;

impl PriceCache {
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn get(&self, name: &str) -> Option<PriceQuote> {
        let key = name.to_lowercase();
        let mut entries = self.entries.lock();
        let entry = entries.get(&key)?;
        if entry.stored_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.quote.clone())
    }

    pub fn put(&self, name: &str, quote: PriceQuote) {
        let entry = CacheEntry {
            quote,
            stored_at: Instant::now(),
        };
        self.entries.lock().put(name.to_lowercase(), entry);
    }
}
