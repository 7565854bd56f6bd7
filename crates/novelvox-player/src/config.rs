//! Player configuration.

use std::time::Duration;

use novelvox_core::{DEFAULT_PREFETCH_WINDOW, PlayerSettings};

use crate::retry::RetryPolicy;

/// Tuning knobs for the playback engine.
///
/// # Example
///
/// ```
/// use novelvox_player::PlayerConfig;
/// use std::time::Duration;
///
/// let config = PlayerConfig::new()
///     .with_prefetch_window(5)
///     .with_foreground_timeout(Duration::from_secs(15));
/// assert_eq!(config.prefetch_window(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub(crate) prefetch_window: usize,
    /// Bound on a foreground synthesis request.
    pub(crate) foreground_timeout: Duration,
    /// Bound on a prefetch synthesis request. Expiry abandons that prefetch only.
    pub(crate) prefetch_timeout: Duration,
    /// Completion signals for the same paragraph inside this window are dropped.
    pub(crate) debounce: Duration,
    /// A transition unresolved for this long is forced into an error.
    pub(crate) watchdog_bound: Duration,
    pub(crate) watchdog_tick: Duration,
    pub(crate) retry: RetryPolicy,
    /// Bound on a single sound operation (play, pause, seek, status).
    pub(crate) sound_op_timeout: Duration,
    /// Key cached audio by playback speed as well as voice and text.
    pub(crate) speed_in_cache_key: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            prefetch_window: DEFAULT_PREFETCH_WINDOW,
            foreground_timeout: Duration::from_secs(10),
            prefetch_timeout: Duration::from_secs(5),
            debounce: Duration::from_millis(300),
            watchdog_bound: Duration::from_secs(5),
            watchdog_tick: Duration::from_secs(1),
            retry: RetryPolicy::default(),
            sound_op_timeout: Duration::from_secs(3),
            speed_in_cache_key: false,
        }
    }
}

impl PlayerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from user settings, keeping defaults for everything else.
    #[must_use]
    pub fn from_settings(settings: &PlayerSettings) -> Self {
        Self::default().with_prefetch_window(settings.effective_prefetch_window())
    }

    /// Number of upcoming paragraphs to load ahead. 0 disables prefetching.
    #[must_use]
    pub const fn with_prefetch_window(mut self, window: usize) -> Self {
        self.prefetch_window = window;
        self
    }

    #[must_use]
    pub const fn with_foreground_timeout(mut self, timeout: Duration) -> Self {
        self.foreground_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_prefetch_timeout(mut self, timeout: Duration) -> Self {
        self.prefetch_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce = window;
        self
    }

    /// Set how long a transition may stay unresolved and how often that is checked.
    #[must_use]
    pub const fn with_watchdog(mut self, bound: Duration, tick: Duration) -> Self {
        self.watchdog_bound = bound;
        self.watchdog_tick = tick;
        self
    }

    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub const fn with_sound_op_timeout(mut self, timeout: Duration) -> Self {
        self.sound_op_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_speed_in_cache_key(mut self, enabled: bool) -> Self {
        self.speed_in_cache_key = enabled;
        self
    }

    #[must_use]
    pub const fn prefetch_window(&self) -> usize {
        self.prefetch_window
    }

    /// How long an advance may stay in `Transitioning`.
    ///
    /// A ready cache entry only needs the sound operations, so it gets the
    /// plain watchdog bound. An advance that has to synthesize also gets the
    /// worst case of the foreground load and its retries.
    pub(crate) fn transition_bound(&self, cached: bool) -> Duration {
        if cached {
            return self.watchdog_bound;
        }
        let attempts = self.retry.max_retries + 1;
        self.watchdog_bound
            + self.foreground_timeout * attempts
            + self.retry.backoff * self.retry.max_retries
    }
}
