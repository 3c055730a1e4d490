use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use dex_logging::{dex_debug, dex_trace, dex_warn};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::time::Instant;

use crate::{FetchError, Gateway, QueryKey};

pub type Payload = Arc<serde_json::Value>;

type SharedFetch = Shared<BoxFuture<'static, Result<Payload, FetchError>>>;

#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// How long a fulfilled value is served without refetching.
    pub stale_time: Duration,
    /// How long an untouched entry is retained.
    pub gc_time: Duration,
    /// How long a failure is replayed before the key may be fetched again.
    pub failure_ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(5 * 60),
            gc_time: Duration::from_secs(10 * 60),
            failure_ttl: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Pending,
    Fulfilled,
    Failed,
}

/// Point-in-time view of one cache entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub value: Option<Payload>,
    pub fetched_at: Option<Instant>,
    pub state: EntryState,
    pub error: Option<FetchError>,
    pub refreshing: bool,
}

struct Slot {
    value: Option<Payload>,
    fetched_at: Option<Instant>,
    failure: Option<(FetchError, Instant)>,
    inflight: Option<SharedFetch>,
    last_access: Instant,
}

impl Slot {
    fn new(now: Instant) -> Self {
        Self {
            value: None,
            fetched_at: None,
            failure: None,
            inflight: None,
            last_access: now,
        }
    }

    fn state(&self) -> EntryState {
        if self.value.is_some() {
            EntryState::Fulfilled
        } else if self.inflight.is_some() {
            EntryState::Pending
        } else {
            EntryState::Failed
        }
    }

    fn recent_failure(&self, now: Instant, ttl: Duration) -> Option<&FetchError> {
        self.failure
            .as_ref()
            .filter(|(_, failed_at)| now.duration_since(*failed_at) < ttl)
            .map(|(err, _)| err)
    }
}

struct Inner {
    gateway: Arc<dyn Gateway>,
    settings: CacheSettings,
    slots: Mutex<HashMap<String, Slot>>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn store(&self, cache_key: &str, result: &Result<Payload, FetchError>) {
        let now = Instant::now();
        let mut slots = self.lock();
        let slot = slots
            .entry(cache_key.to_string())
            .or_insert_with(|| Slot::new(now));
        slot.inflight = None;
        match result {
            Ok(value) => {
                slot.value = Some(Arc::clone(value));
                slot.fetched_at = Some(now);
                slot.failure = None;
            }
            Err(err) => {
                if slot.value.is_some() {
                    dex_warn!("Refetch of {} failed, keeping stale value: {}", cache_key, err);
                } else {
                    dex_debug!("Fetch of {} failed: {}", cache_key, err);
                }
                slot.failure = Some((err.clone(), now));
            }
        }
    }
}

/// Process-wide keyed cache of gateway reads.
///
/// At most one request per key is outstanding; concurrent callers await the
/// same shared future. Fulfilled values are served stale while a background
/// refetch runs. Must be used from within a tokio runtime.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl QueryCache {
    pub fn new(gateway: Arc<dyn Gateway>, settings: CacheSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                gateway,
                settings,
                slots: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.inner.settings
    }

    /// Returns the cached value for `key`, fetching it if needed.
    pub async fn get(&self, key: &QueryKey) -> Result<Payload, FetchError> {
        let cache_key = key.cache_key();
        let pending = {
            let now = Instant::now();
            let settings = &self.inner.settings;
            let mut slots = self.inner.lock();
            sweep(&mut slots, now, settings.gc_time);
            let slot = slots
                .entry(cache_key.clone())
                .or_insert_with(|| Slot::new(now));
            slot.last_access = now;

            if let Some(value) = slot.value.clone() {
                let fresh = slot
                    .fetched_at
                    .is_some_and(|at| now.duration_since(at) < settings.stale_time);
                let backing_off = slot.recent_failure(now, settings.failure_ttl).is_some();
                if !fresh && slot.inflight.is_none() && !backing_off {
                    dex_trace!("Serving stale {} while refetching", cache_key);
                    slot.inflight = Some(self.spawn_fetch(key, &cache_key));
                }
                return Ok(value);
            }

            if let Some(inflight) = &slot.inflight {
                inflight.clone()
            } else if let Some(err) = slot.recent_failure(now, settings.failure_ttl) {
                return Err(err.clone());
            } else {
                let fetch = self.spawn_fetch(key, &cache_key);
                slot.inflight = Some(fetch.clone());
                fetch
            }
        };
        pending.await
    }

    /// Returns the cached value without fetching, fresh or stale.
    pub fn peek(&self, key: &QueryKey) -> Option<Payload> {
        let mut slots = self.inner.lock();
        let slot = slots.get_mut(&key.cache_key())?;
        slot.last_access = Instant::now();
        slot.value.clone()
    }

    pub fn entry(&self, key: &QueryKey) -> Option<CacheEntry> {
        let cache_key = key.cache_key();
        let slots = self.inner.lock();
        slots.get(&cache_key).map(|slot| CacheEntry {
            key: cache_key.clone(),
            value: slot.value.clone(),
            fetched_at: slot.fetched_at,
            state: slot.state(),
            error: slot.failure.as_ref().map(|(err, _)| err.clone()),
            refreshing: slot.value.is_some() && slot.inflight.is_some(),
        })
    }

    pub fn is_pending(&self, key: &QueryKey) -> bool {
        self.entry(key)
            .is_some_and(|entry| entry.state == EntryState::Pending)
    }

    /// Marks a value stale so the next access refetches it, and forgets any failure.
    pub fn invalidate(&self, key: &QueryKey) {
        let mut slots = self.inner.lock();
        if let Some(slot) = slots.get_mut(&key.cache_key()) {
            slot.fetched_at = None;
            slot.failure = None;
        }
    }

    /// Evicts entries untouched for longer than `gc_time`. Returns how many were removed.
    pub fn collect_garbage(&self) -> usize {
        let mut slots = self.inner.lock();
        sweep(&mut slots, Instant::now(), self.inner.settings.gc_time)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Starts the gateway read on the runtime so it completes even if every caller goes away.
    fn spawn_fetch(&self, key: &QueryKey, cache_key: &str) -> SharedFetch {
        let inner = Arc::clone(&self.inner);
        let key = key.clone();
        let cache_key = cache_key.to_string();
        let fetch = async move {
            let result = inner.gateway.get(&key).await.map(Arc::new);
            inner.store(&cache_key, &result);
            result
        }
        .boxed()
        .shared();
        tokio::spawn(fetch.clone());
        fetch
    }
}

fn sweep(slots: &mut HashMap<String, Slot>, now: Instant, gc_time: Duration) -> usize {
    let before = slots.len();
    slots.retain(|_, slot| {
        slot.inflight.is_some() || now.duration_since(slot.last_access) < gc_time
    });
    before - slots.len()
}
