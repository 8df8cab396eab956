use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Source of the current time for expiring entries
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|p| p.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|p| p.into_inner())
    }
}

pub const DEFAULT_TTL_SECS: i64 = 5 * 60;

/// Upper bound on stored entries; the entry closest to expiry is evicted first
pub const DEFAULT_CAPACITY: usize = 1024;

struct Entries<V> {
    /// Bumped by every invalidation
    generation: u64,
    map: HashMap<String, (V, DateTime<Utc>)>,
}

/// Keyed cache whose entries expire a fixed time after insertion
///
/// Expiry is checked against the injected [`Clock`] on lookup and on insert;
/// there are no background timers. Writers of the underlying data call
/// [`TtlCache::invalidate_all`] explicitly.
///
/// A reader that computes a value while a writer invalidates must not put the
/// stale value back: take [`TtlCache::generation`] before reading the source
/// and store through [`TtlCache::insert_if_current`].
pub struct TtlCache<V> {
    clock: Arc<dyn Clock>,
    ttl: Duration,
    capacity: usize,
    entries: Mutex<Entries<V>>,
}

impl<V: Clone> TtlCache<V> {
    /// Create an empty cache holding up to [`DEFAULT_CAPACITY`] entries
    ///
    /// # Arguments
    /// * `clock` - Time source for expiry
    /// * `ttl` - Lifetime of each entry from its insertion
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self::with_capacity(clock, ttl, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(clock: Arc<dyn Clock>, ttl: Duration, capacity: usize) -> Self {
        Self {
            clock,
            ttl,
            capacity: capacity.max(1),
            entries: Mutex::new(Entries {
                generation: 0,
                map: HashMap::new(),
            }),
        }
    }

    fn entries(&self) -> MutexGuard<'_, Entries<V>> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Look up a live entry; an expired one is removed and reported missing
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.entries();
        match entries.map.get(key) {
            Some((value, expires_at)) if *expires_at > now => Some(value.clone()),
            Some(_) => {
                entries.map.remove(key);
                None
            }
            None => None,
        }
    }

    /// Current invalidation generation
    pub fn generation(&self) -> u64 {
        self.entries().generation
    }

    /// Store a value unconditionally
    pub fn insert(&self, key: impl Into<String>, value: V) {
        let mut entries = self.entries();
        self.store(&mut entries, key.into(), value);
    }

    /// Store a value only if no invalidation happened since `generation`
    ///
    /// # Returns
    /// * `true` if the value was stored
    pub fn insert_if_current(&self, generation: u64, key: impl Into<String>, value: V) -> bool {
        let mut entries = self.entries();
        if entries.generation != generation {
            return false;
        }
        self.store(&mut entries, key.into(), value);
        true
    }

    fn store(&self, entries: &mut Entries<V>, key: String, value: V) {
        let now = self.clock.now();
        entries.map.retain(|_, (_, expires_at)| *expires_at > now);

        if !entries.map.contains_key(&key) && entries.map.len() >= self.capacity {
            let oldest = entries
                .map
                .iter()
                .min_by_key(|(_, (_, expires_at))| *expires_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.map.remove(&oldest);
            }
        }
        entries.map.insert(key, (value, now + self.ttl));
    }

    /// Drop every entry and start a new generation
    pub fn invalidate_all(&self) {
        let mut entries = self.entries();
        entries.generation = entries.generation.wrapping_add(1);
        entries.map.clear();
    }

    /// Number of stored entries, expired or not
    pub fn len(&self) -> usize {
        self.entries().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cache() -> (ManualClock, TtlCache<u32>) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
        let cache = TtlCache::new(Arc::new(clock.clone()), Duration::minutes(5));
        (clock, cache)
    }

    #[test]
    fn entries_expire_after_ttl() {
        let (clock, cache) = cache();
        cache.insert("cars", 7);
        assert_eq!(cache.get("cars"), Some(7));

        clock.advance(Duration::minutes(4));
        assert_eq!(cache.get("cars"), Some(7));

        clock.advance(Duration::minutes(1));
        assert_eq!(cache.get("cars"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_clears_everything() {
        let (_clock, cache) = cache();
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.len(), 2);
        cache.invalidate_all();
        assert_eq!(cache.get("a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn stale_value_is_not_stored_after_invalidation() {
        let (clock, cache) = cache();
        let generation = cache.generation();
        let stale = 0;

        // a writer lands between the read and the store
        cache.invalidate_all();
        assert!(!cache.insert_if_current(generation, "cars", stale));

        clock.advance(Duration::minutes(4));
        assert_eq!(cache.get("cars"), None);

        let generation = cache.generation();
        assert!(cache.insert_if_current(generation, "cars", 1));
        assert_eq!(cache.get("cars"), Some(1));
    }

    #[test]
    fn expired_entries_are_dropped_on_insert() {
        let (clock, cache) = cache();
        for i in 0..500 {
            cache.insert(format!("cars?model={}", i), i);
        }
        assert_eq!(cache.len(), 500);

        clock.advance(Duration::hours(1));
        cache.insert("fresh", 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn capacity_evicts_closest_to_expiry() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
        let cache = TtlCache::with_capacity(Arc::new(clock.clone()), Duration::minutes(5), 2);

        cache.insert("a", 1);
        clock.advance(Duration::seconds(1));
        cache.insert("b", 2);
        clock.advance(Duration::seconds(1));
        cache.insert("c", 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.get("c"), Some(3));
    }
}
