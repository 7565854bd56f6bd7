//! Synthesize a paragraph and turn the audio into a loaded sound.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use novelvox_core::{PlaybackSpeed, SpeechClientPort, SpeechRequest, Voice};

use crate::error::PlayerError;
use crate::sound::{SoundFactory, SoundRef, release, sound_op};

/// The session's current playback speed, readable from load tasks.
///
/// Loads that land after a speed change pick up the new rate.
#[derive(Debug, Clone)]
pub struct SharedSpeed(Arc<AtomicU8>);

impl SharedSpeed {
    pub fn new(speed: PlaybackSpeed) -> Self {
        Self(Arc::new(AtomicU8::new(speed as u8)))
    }

    pub fn get(&self) -> PlaybackSpeed {
        let index = usize::from(self.0.load(Ordering::SeqCst));
        PlaybackSpeed::ALL
            .get(index)
            .copied()
            .unwrap_or_default()
    }

    pub fn set(&self, speed: PlaybackSpeed) {
        self.0.store(speed as u8, Ordering::SeqCst);
    }
}

/// Wraps the speech port and the sound factory into one load step.
pub struct SoundLoader {
    speech: Arc<dyn SpeechClientPort>,
    sounds: Arc<dyn SoundFactory>,
    speed: SharedSpeed,
    op_timeout: Duration,
}

impl SoundLoader {
    pub fn new(
        speech: Arc<dyn SpeechClientPort>,
        sounds: Arc<dyn SoundFactory>,
        speed: SharedSpeed,
        op_timeout: Duration,
    ) -> Self {
        Self {
            speech,
            sounds,
            speed,
            op_timeout,
        }
    }

    pub fn speed(&self) -> &SharedSpeed {
        &self.speed
    }

    /// Synthesize `text` with `voice` and load the result into a new sound.
    ///
    /// Blank text fails with [`PlayerError::EmptyInput`] before any network
    /// call. `timeout` bounds the synthesis request.
    pub async fn load(
        &self,
        text: &str,
        voice: Voice,
        timeout: Duration,
    ) -> Result<SoundRef, PlayerError> {
        let request = SpeechRequest::new(text, voice)?.with_timeout(timeout);

        let clip = tokio::time::timeout(timeout, self.speech.synthesize(&request))
            .await
            .map_err(|_| PlayerError::Timeout(timeout))??;

        let sound = self.sounds.create();
        if let Err(e) = sound_op("load", self.op_timeout, sound.load(&clip)).await {
            release(&sound, self.op_timeout).await;
            return Err(e);
        }

        let rate = self.speed.get().as_f32();
        if let Err(e) = sound_op("set_rate", self.op_timeout, sound.set_rate(rate)).await {
            tracing::warn!(error = %e, "Failed to apply playback speed to new sound");
        }

        tracing::debug!(voice = %voice, bytes = clip.len(), "Paragraph audio loaded");
        Ok(sound)
    }
}
