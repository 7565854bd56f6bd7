//! Observable session types: the state machine's states, the snapshot the
//! UI polls, and the events it subscribes to.

use std::fmt;
use std::time::Duration;

use novelvox_core::{PlaybackSpeed, Voice};
use tokio::time::Instant;

use crate::error::PlayerError;

/// Where the controller is in a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlayerState {
    /// No paragraphs open.
    #[default]
    Idle,
    /// Foreground load for paragraph `i` in progress.
    Loading(usize),
    Playing(usize),
    Paused(usize),
    /// Moving to the next paragraph over a ready cache entry.
    Transitioning { from: usize, to: usize },
    /// The last paragraph finished.
    Finished,
    /// A foreground operation for `index` failed; `retry()` re-attempts it.
    Error { index: usize, message: String },
}

impl PlayerState {
    /// Paragraph the state refers to, if any.
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        match self {
            Self::Loading(i) | Self::Playing(i) | Self::Paused(i) => Some(*i),
            Self::Transitioning { to, .. } => Some(*to),
            Self::Error { index, .. } => Some(*index),
            Self::Idle | Self::Finished => None,
        }
    }

    #[must_use]
    pub const fn is_transitioning(&self) -> bool {
        matches!(self, Self::Transitioning { .. })
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }

    #[must_use]
    pub const fn is_playing(&self) -> bool {
        matches!(self, Self::Playing(_))
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading(i) => write!(f, "loading paragraph {}", i + 1),
            Self::Playing(i) => write!(f, "playing paragraph {}", i + 1),
            Self::Paused(i) => write!(f, "paused at paragraph {}", i + 1),
            Self::Transitioning { from, to } => {
                write!(f, "moving from paragraph {} to {}", from + 1, to + 1)
            }
            Self::Finished => write!(f, "finished"),
            Self::Error { index, message } => {
                write!(f, "failed at paragraph {}: {message}", index + 1)
            }
        }
    }
}

/// Point-in-time view of a playback session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: PlayerState,
    /// Current paragraph. Stays on the last paragraph once finished.
    pub index: usize,
    pub paragraph_count: usize,
    pub is_playing: bool,
    pub is_transitioning: bool,
    pub is_loading: bool,
    pub voice: Voice,
    pub speed: PlaybackSpeed,
    /// Last foreground failure, cleared once a load succeeds.
    pub error: Option<PlayerError>,
}

impl SessionSnapshot {
    pub(crate) fn idle(voice: Voice, speed: PlaybackSpeed) -> Self {
        Self {
            state: PlayerState::Idle,
            index: 0,
            paragraph_count: 0,
            is_playing: false,
            is_transitioning: false,
            is_loading: false,
            voice,
            speed,
            error: None,
        }
    }
}

/// Notifications pushed to the owner of a [`PlayerHandle`](crate::PlayerHandle).
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    StateChanged(PlayerState),
    /// Paragraph `index` started playing from its beginning.
    ParagraphStarted { index: usize },
    /// The last paragraph finished. The owner decides what comes next.
    ChapterComplete,
    /// A foreground operation failed.
    Error(PlayerError),
}

/// Drops repeated completion signals for the same paragraph that arrive
/// within `window` of the first one.
#[derive(Debug)]
pub(crate) struct CompletionDebounce {
    window: Duration,
    last: Option<(usize, Instant)>,
}

impl CompletionDebounce {
    pub(crate) const fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Returns true if the signal should be acted on.
    pub(crate) fn accept(&mut self, index: usize, now: Instant) -> bool {
        if let Some((last_index, at)) = self.last
            && last_index == index
            && now.saturating_duration_since(at) < self.window
        {
            tracing::debug!(index, "Ignoring duplicate completion signal");
            return false;
        }
        self.last = Some((index, now));
        true
    }

    /// Forget the last signal, e.g. after the paragraph was restarted.
    pub(crate) fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_within_window_is_dropped() {
        let mut debounce = CompletionDebounce::new(Duration::from_millis(300));
        let start = Instant::now();

        assert!(debounce.accept(2, start));
        assert!(!debounce.accept(2, start + Duration::from_millis(299)));
        assert!(debounce.accept(2, start + Duration::from_millis(600)));
    }

    #[test]
    fn different_paragraph_is_not_debounced() {
        let mut debounce = CompletionDebounce::new(Duration::from_millis(300));
        let start = Instant::now();

        assert!(debounce.accept(0, start));
        assert!(debounce.accept(1, start + Duration::from_millis(10)));
    }

    #[test]
    fn reset_allows_immediate_repeat() {
        let mut debounce = CompletionDebounce::new(Duration::from_millis(300));
        let start = Instant::now();

        assert!(debounce.accept(0, start));
        debounce.reset();
        assert!(debounce.accept(0, start + Duration::from_millis(1)));
    }

    #[test]
    fn state_index_follows_destination() {
        assert_eq!(PlayerState::Transitioning { from: 1, to: 2 }.index(), Some(2));
        assert_eq!(PlayerState::Finished.index(), None);
        assert_eq!(
            PlayerState::Error { index: 4, message: "x".into() }.to_string(),
            "failed at paragraph 5: x"
        );
    }
}
