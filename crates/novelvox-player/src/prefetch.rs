//! Speculative loading of upcoming paragraphs.
//!
//! Prefetching only fills the cache. Failures are logged and forgotten; the
//! paragraph is loaded again in the foreground when playback reaches it.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use novelvox_core::{Paragraphs, PlaybackSpeed, Voice};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::cache::{AudioCache, CacheKey};
use crate::error::PlayerError;
use crate::loader::SoundLoader;

/// Issues background loads for the paragraphs after the current one.
pub struct PrefetchScheduler {
    cache: AudioCache,
    loader: Arc<SoundLoader>,
    timeout: Duration,
    speed_in_key: bool,
    token: Mutex<CancellationToken>,
    tracker: TaskTracker,
}

impl PrefetchScheduler {
    pub fn new(
        cache: AudioCache,
        loader: Arc<SoundLoader>,
        timeout: Duration,
        speed_in_key: bool,
    ) -> Self {
        Self {
            cache,
            loader,
            timeout,
            speed_in_key,
            token: Mutex::new(CancellationToken::new()),
            tracker: TaskTracker::new(),
        }
    }

    fn token(&self) -> CancellationToken {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Start loads for paragraphs `from_index + 1 ..= from_index + window`
    /// that are inside the chapter and not already cached or loading.
    ///
    /// Returns the number of loads started.
    pub fn schedule_prefetch(
        &self,
        from_index: usize,
        paragraphs: &Paragraphs,
        voice: Voice,
        speed: PlaybackSpeed,
        window: usize,
    ) -> usize {
        let token = self.token();
        let mut started = 0;

        for index in (1..=window).filter_map(|i| from_index.checked_add(i)) {
            let Some(text) = paragraphs.get(index) else {
                break;
            };
            if text.trim().is_empty() {
                tracing::debug!(index, "Skipping prefetch of empty paragraph");
                continue;
            }

            let key = CacheKey::new(voice, text, self.speed_in_key.then_some(speed));
            if self.cache.contains_or_loading(&key) {
                continue;
            }

            let cache = self.cache.clone();
            let loader = Arc::clone(&self.loader);
            let text = text.to_string();
            let timeout = self.timeout;
            let token = token.clone();

            self.tracker.spawn(async move {
                let load_token = token.clone();
                let load = move || async move {
                    tokio::select! {
                        biased;
                        () = load_token.cancelled() => Err(PlayerError::Cancelled),
                        result = loader.load(&text, voice, timeout) => result,
                    }
                };

                let outcome = tokio::select! {
                    biased;
                    () = token.cancelled() => return,
                    outcome = cache.get_or_load(&key, load) => outcome,
                };

                match outcome {
                    Ok(_) => tracing::debug!(index, voice = %voice, "Prefetched paragraph"),
                    Err(PlayerError::Cancelled) => {}
                    Err(e) if e.is_transient() => {
                        tracing::debug!(index, error = %e, "Prefetch abandoned");
                    }
                    Err(e) => tracing::warn!(index, error = %e, "Prefetch failed"),
                }
            });
            started += 1;
        }

        if started > 0 {
            tracing::debug!(from_index, started, window, "Scheduled prefetch");
        }
        started
    }

    /// Cancel every outstanding prefetch. Later calls schedule afresh.
    pub fn cancel_all(&self) {
        let old = std::mem::replace(
            &mut *self.token.lock().unwrap_or_else(PoisonError::into_inner),
            CancellationToken::new(),
        );
        old.cancel();
    }

    /// Number of prefetch tasks still running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Cancel everything and wait for the tasks to wind down.
    pub async fn shutdown(&self) {
        self.cancel_all();
        self.tracker.close();
        self.tracker.wait().await;
    }
}
