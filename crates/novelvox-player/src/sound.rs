//! The playable-audio abstraction.
//!
//! A [`SoundHandle`] owns one decoded clip. The controller and the cache
//! only ever talk to sounds through this trait, so tests can drive the state
//! machine with scripted fakes and the CLI can plug in the rodio backend.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use novelvox_core::AudioClip;
use tokio::sync::broadcast;

use crate::error::PlayerError;

/// Point-in-time status of a sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SoundStatus {
    /// A clip is decoded and ready to play.
    pub loaded: bool,
    pub playing: bool,
    pub position: Duration,
    /// Total length, when the decoder can tell.
    pub duration: Option<Duration>,
}

/// Notifications a sound publishes to its subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEvent {
    /// Playback reached the end of the clip.
    Finished,
}

/// A loaded, controllable piece of audio.
#[async_trait]
pub trait SoundHandle: Send + Sync {
    /// Decode `clip` and hold it paused at the start.
    ///
    /// Undecodable audio fails with [`PlayerError::DecodeInvalid`].
    async fn load(&self, clip: &AudioClip) -> Result<(), PlayerError>;

    async fn play(&self) -> Result<(), PlayerError>;

    /// Pause without releasing the decoded audio.
    async fn pause(&self) -> Result<(), PlayerError>;

    /// Move to position zero. Also re-arms a sound that already finished.
    async fn seek_to_start(&self) -> Result<(), PlayerError>;

    /// Set the playback rate multiplier (1.0 = normal).
    async fn set_rate(&self, rate: f32) -> Result<(), PlayerError>;

    /// Stop and release the decoded audio.
    async fn unload(&self) -> Result<(), PlayerError>;

    async fn status(&self) -> Result<SoundStatus, PlayerError>;

    /// Subscribe to [`SoundEvent`]s. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<SoundEvent>;
}

/// Shared handle to a sound.
pub type SoundRef = Arc<dyn SoundHandle>;

/// Creates empty sounds for the loader to fill.
pub trait SoundFactory: Send + Sync {
    fn create(&self) -> SoundRef;
}

/// Run one sound operation under `bound`.
///
/// A hung audio backend must not wedge the controller, so every sound call
/// made by the engine goes through here.
pub(crate) async fn sound_op<T>(
    op: &'static str,
    bound: Duration,
    fut: impl Future<Output = Result<T, PlayerError>>,
) -> Result<T, PlayerError> {
    tokio::time::timeout(bound, fut)
        .await
        .map_err(|_| PlayerError::Output(format!("{op} did not complete within {}ms", bound.as_millis())))?
}

/// Unload a sound, logging instead of propagating failures.
pub(crate) async fn release(sound: &SoundRef, bound: Duration) {
    if let Err(e) = sound_op("unload", bound, sound.unload()).await {
        tracing::warn!(error = %e, "Failed to unload sound");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Verify the trait is object-safe
    fn _assert_object_safe(_: Arc<dyn SoundHandle>, _: Arc<dyn SoundFactory>) {}

    #[tokio::test(start_paused = true)]
    async fn sound_op_times_out_hung_operations() {
        let result: Result<(), _> = sound_op(
            "play",
            Duration::from_secs(3),
            std::future::pending::<Result<(), PlayerError>>(),
        )
        .await;

        assert!(matches!(result, Err(PlayerError::Output(ref m)) if m.contains("play")));
    }

    #[tokio::test]
    async fn sound_op_passes_results_through() {
        let result = sound_op("status", Duration::from_secs(3), async {
            Ok(SoundStatus {
                loaded: true,
                ..SoundStatus::default()
            })
        })
        .await;
        assert!(result.unwrap().loaded);
    }
}
