//! Audio cache with in-flight load coalescing.
//!
//! Entries are keyed by voice and normalized paragraph text (plus speed when
//! configured). A key is either loading, ready or invalid. Concurrent
//! requests for a loading key all await the same load, which runs as its own
//! task so no caller owns it.
//!
//! The slot map sits behind a `std::sync::Mutex` that is never held across
//! an `.await`; sound operations (validation, unload) happen after the lock
//! is released.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::future::join_all;
use novelvox_core::{PlaybackSpeed, Voice, normalize_text};
use tokio::sync::watch;

use crate::error::PlayerError;
use crate::sound::{SoundRef, release, sound_op};

/// Identity of one synthesized clip.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub voice: Voice,
    /// Normalized paragraph text.
    pub text: String,
    /// Only set when speed is part of the key.
    pub speed: Option<PlaybackSpeed>,
}

impl CacheKey {
    pub fn new(voice: Voice, text: &str, speed: Option<PlaybackSpeed>) -> Self {
        Self {
            voice,
            text: normalize_text(text),
            speed,
        }
    }
}

/// Lifecycle of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    /// Failed validation; removed on the next lookup.
    Invalid,
}

/// Snapshot of one cache entry.
#[derive(Clone)]
pub struct CacheEntry {
    pub key: CacheKey,
    /// `None` while loading or after invalidation.
    pub handle: Option<SoundRef>,
    pub state: LoadState,
    pub voice_at_load: Voice,
}

impl std::fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEntry")
            .field("key", &self.key)
            .field("has_handle", &self.handle.is_some())
            .field("state", &self.state)
            .field("voice_at_load", &self.voice_at_load)
            .finish()
    }
}

type LoadOutcome = Option<Result<SoundRef, PlayerError>>;

struct Slot {
    entry: CacheEntry,
    /// Present while a load is in flight. The id tells a landing load
    /// whether it still owns the slot.
    load: Option<(u64, watch::Receiver<LoadOutcome>)>,
}

struct CacheInner {
    slots: Mutex<HashMap<CacheKey, Slot>>,
    next_load_id: AtomicU64,
    op_timeout: Duration,
}

impl CacheInner {
    fn slots(&self) -> MutexGuard<'_, HashMap<CacheKey, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a finished load if it still owns its slot.
    ///
    /// Returns the handle to unload when the slot was evicted in the
    /// meantime; the load's waiters then see [`PlayerError::Cancelled`].
    fn land(
        &self,
        key: &CacheKey,
        load_id: u64,
        result: Result<SoundRef, PlayerError>,
    ) -> (Result<SoundRef, PlayerError>, Option<SoundRef>) {
        let mut slots = self.slots();
        let owned = slots
            .get(key)
            .is_some_and(|slot| slot.load.as_ref().is_some_and(|(id, _)| *id == load_id));

        if !owned {
            return (Err(PlayerError::Cancelled), result.ok());
        }

        match &result {
            Ok(handle) => {
                if let Some(slot) = slots.get_mut(key) {
                    slot.entry.handle = Some(Arc::clone(handle));
                    slot.entry.state = LoadState::Ready;
                    slot.load = None;
                }
            }
            Err(_) => {
                slots.remove(key);
            }
        }
        (result, None)
    }
}

/// Clears a load's in-flight marker if the load task ends without landing
/// (panic or runtime shutdown).
struct InFlightGuard {
    cache: Arc<CacheInner>,
    key: CacheKey,
    load_id: u64,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut slots = self.cache.slots();
        let ours = slots
            .get(&self.key)
            .is_some_and(|slot| slot.load.as_ref().is_some_and(|(id, _)| *id == self.load_id));
        if ours {
            slots.remove(&self.key);
        }
    }
}

enum Lookup {
    Ready(SoundRef),
    Wait(watch::Receiver<LoadOutcome>),
}

/// Shared audio cache. Cloning shares the same entries.
#[derive(Clone)]
pub struct AudioCache {
    inner: Arc<CacheInner>,
}

impl AudioCache {
    /// Create an empty cache. `op_timeout` bounds validation and unload
    /// calls on cached sounds.
    pub fn new(op_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                slots: Mutex::new(HashMap::new()),
                next_load_id: AtomicU64::new(1),
                op_timeout,
            }),
        }
    }

    /// Pure lookup.
    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.inner.slots().get(key).map(|slot| slot.entry.clone())
    }

    /// Whether `key` is ready or has a load in flight.
    pub fn contains_or_loading(&self, key: &CacheKey) -> bool {
        self.inner
            .slots()
            .get(key)
            .is_some_and(|slot| slot.entry.state != LoadState::Invalid)
    }

    pub fn len(&self) -> usize {
        self.inner.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.slots().is_empty()
    }

    /// Handles of every ready entry.
    pub fn ready_handles(&self) -> Vec<SoundRef> {
        self.inner
            .slots()
            .values()
            .filter(|slot| slot.entry.state == LoadState::Ready)
            .filter_map(|slot| slot.entry.handle.clone())
            .collect()
    }

    /// Return the ready sound for `key` reset to its start, or run `load` to
    /// produce one.
    ///
    /// A ready sound that fails validation is evicted and reloaded. If a
    /// load for `key` is already in flight, this awaits it instead of
    /// starting another.
    pub async fn get_or_load<F, Fut>(&self, key: &CacheKey, load: F) -> Result<SoundRef, PlayerError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<SoundRef, PlayerError>> + Send + 'static,
    {
        let mut load = Some(load);
        loop {
            let lookup = {
                let mut slots = self.inner.slots();
                match slots.get(key) {
                    Some(slot) if slot.entry.state == LoadState::Ready => {
                        match slot.entry.handle.clone() {
                            Some(handle) => Lookup::Ready(handle),
                            None => {
                                slots.remove(key);
                                continue;
                            }
                        }
                    }
                    Some(slot) if slot.entry.state == LoadState::Loading => match &slot.load {
                        Some((_, rx)) => Lookup::Wait(rx.clone()),
                        None => {
                            slots.remove(key);
                            continue;
                        }
                    },
                    _ => {
                        slots.remove(key);
                        let Some(load) = load.take() else {
                            return Err(PlayerError::Cancelled);
                        };
                        Lookup::Wait(self.start_load(&mut slots, key, load()))
                    }
                }
            };

            match lookup {
                Lookup::Wait(rx) => return Self::await_load(rx).await,
                Lookup::Ready(handle) => match self.validate(&handle).await {
                    Ok(()) => {
                        tracing::trace!(voice = %key.voice, "Cache hit");
                        return Ok(handle);
                    }
                    Err(e) => {
                        tracing::warn!(voice = %key.voice, error = %e, "Cached sound failed validation, reloading");
                        self.evict_handle(key, &handle).await;
                    }
                },
            }
        }
    }

    /// Insert a loading slot for `key` and spawn `fut` to fill it.
    fn start_load<Fut>(
        &self,
        slots: &mut HashMap<CacheKey, Slot>,
        key: &CacheKey,
        fut: Fut,
    ) -> watch::Receiver<LoadOutcome>
    where
        Fut: Future<Output = Result<SoundRef, PlayerError>> + Send + 'static,
    {
        let load_id = self.inner.next_load_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = watch::channel(None);

        slots.insert(
            key.clone(),
            Slot {
                entry: CacheEntry {
                    key: key.clone(),
                    handle: None,
                    state: LoadState::Loading,
                    voice_at_load: key.voice,
                },
                load: Some((load_id, rx.clone())),
            },
        );

        let guard = InFlightGuard {
            cache: Arc::clone(&self.inner),
            key: key.clone(),
            load_id,
        };
        let op_timeout = self.inner.op_timeout;
        tokio::spawn(async move {
            let result = fut.await;
            let (outcome, orphan) = guard.cache.land(&guard.key, load_id, result);
            if let Some(orphan) = orphan {
                tracing::debug!(voice = %guard.key.voice, "Load landed after eviction, releasing");
                release(&orphan, op_timeout).await;
            }
            tx.send_replace(Some(outcome));
            drop(guard);
        });

        rx
    }

    async fn await_load(mut rx: watch::Receiver<LoadOutcome>) -> Result<SoundRef, PlayerError> {
        match rx.wait_for(Option::is_some).await {
            Ok(outcome) => outcome.clone().unwrap_or(Err(PlayerError::Cancelled)),
            // Load task ended without reporting.
            Err(_) => Err(PlayerError::Cancelled),
        }
    }

    /// Cheap status check, then rewind.
    async fn validate(&self, handle: &SoundRef) -> Result<(), PlayerError> {
        let bound = self.inner.op_timeout;
        let status = sound_op("status", bound, handle.status()).await?;
        if !status.loaded {
            return Err(PlayerError::DecodeInvalid("cached sound is no longer loaded".into()));
        }
        sound_op("seek", bound, handle.seek_to_start()).await
    }

    /// Remove `key` only if it still holds `handle`, then unload it.
    async fn evict_handle(&self, key: &CacheKey, handle: &SoundRef) {
        {
            let mut slots = self.inner.slots();
            let same = slots
                .get(key)
                .and_then(|slot| slot.entry.handle.as_ref())
                .is_some_and(|h| Arc::ptr_eq(h, handle));
            if same {
                slots.remove(key);
            }
        }
        release(handle, self.inner.op_timeout).await;
    }

    /// Mark `key` invalid and unload its sound. The next lookup reloads it.
    pub async fn invalidate(&self, key: &CacheKey) {
        let handle = {
            let mut slots = self.inner.slots();
            slots.get_mut(key).and_then(|slot| {
                slot.load = None;
                slot.entry.state = LoadState::Invalid;
                slot.entry.handle.take()
            })
        };
        if let Some(handle) = handle {
            release(&handle, self.inner.op_timeout).await;
        }
    }

    /// Remove `key`. An in-flight load for it is detached and its result
    /// released when it lands.
    pub async fn evict(&self, key: &CacheKey) {
        let slot = self.inner.slots().remove(key);
        if let Some(handle) = slot.and_then(|s| s.entry.handle) {
            release(&handle, self.inner.op_timeout).await;
        }
    }

    /// Remove every entry synthesized with `voice`. Returns how many were removed.
    pub async fn evict_by_voice(&self, voice: Voice) -> usize {
        let removed: Vec<Slot> = {
            let mut slots = self.inner.slots();
            let keys: Vec<CacheKey> = slots
                .iter()
                .filter(|(_, slot)| slot.entry.voice_at_load == voice)
                .map(|(key, _)| key.clone())
                .collect();
            keys.iter().filter_map(|key| slots.remove(key)).collect()
        };
        let count = removed.len();
        self.release_slots(removed).await;
        tracing::debug!(voice = %voice, count, "Evicted cache entries for voice");
        count
    }

    /// Remove and release everything.
    pub async fn clear(&self) {
        let removed: Vec<Slot> = self.inner.slots().drain().map(|(_, slot)| slot).collect();
        self.release_slots(removed).await;
    }

    async fn release_slots(&self, slots: Vec<Slot>) {
        let bound = self.inner.op_timeout;
        let handles: Vec<SoundRef> = slots.into_iter().filter_map(|s| s.entry.handle).collect();
        join_all(handles.iter().map(|h| release(h, bound))).await;
    }
}
