//! In-memory speech backend and sounds for exercising the engine.
//!
//! Compiled for this crate's unit tests, and for integration tests and
//! downstream crates with the `test-utils` feature. No audio device or
//! network is touched.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use novelvox_core::{AudioClip, SpeechClientPort, SpeechError, SpeechRequest, SpeechResult, Voice};
use tokio::sync::broadcast;

use crate::error::PlayerError;
use crate::sound::{SoundEvent, SoundFactory, SoundHandle, SoundRef, SoundStatus};

/// Length every fake clip reports.
pub const CLIP_LENGTH: Duration = Duration::from_secs(3);

/// Clip payload for `text` spoken by `voice`, so sounds can be told apart.
#[must_use]
pub fn label(voice: Voice, text: &str) -> String {
    format!("{}|{text}", voice.id())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Speech ─────────────────────────────────────────────────────────

/// Speech port that answers every request with its [`label`], after an
/// optional delay, unless told to fail.
#[derive(Default)]
pub struct ScriptedSpeech {
    delay: Duration,
    failures_left: AtomicU32,
    failure: Option<SpeechError>,
    text_failures: Mutex<HashMap<String, (u32, SpeechError)>>,
    requests: Mutex<Vec<(String, Voice)>>,
}

impl ScriptedSpeech {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail the first `times` requests, whatever their text, with `err`.
    #[must_use]
    pub fn failing(mut self, times: u32, err: SpeechError) -> Self {
        self.failures_left = AtomicU32::new(times);
        self.failure = Some(err);
        self
    }

    /// Fail the next `times` requests for `text` with `err`.
    #[must_use]
    pub fn failing_for(mut self, text: &str, times: u32, err: SpeechError) -> Self {
        self.text_failures
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(text.to_string(), (times, err));
        self
    }

    /// Fail every request for `text` with `err`.
    #[must_use]
    pub fn failing_text(self, text: &str, err: SpeechError) -> Self {
        self.failing_for(text, u32::MAX, err)
    }

    pub fn requests(&self) -> Vec<(String, Voice)> {
        lock(&self.requests).clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.requests().into_iter().map(|(text, _)| text).collect()
    }

    pub fn calls(&self) -> usize {
        lock(&self.requests).len()
    }

    fn scripted_failure(&self, text: &str) -> Option<SpeechError> {
        if let Some((left, err)) = lock(&self.text_failures).get_mut(text)
            && *left > 0
        {
            *left -= 1;
            return Some(err.clone());
        }
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::SeqCst);
            return self.failure.clone();
        }
        None
    }
}

#[async_trait]
impl SpeechClientPort for ScriptedSpeech {
    async fn synthesize(&self, request: &SpeechRequest) -> SpeechResult<AudioClip> {
        lock(&self.requests).push((request.text().to_string(), request.voice()));

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(err) = self.scripted_failure(request.text()) {
            return Err(err);
        }
        Ok(AudioClip::mpeg(
            label(request.voice(), request.text()).into_bytes(),
        ))
    }
}

// ── Sound ──────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeSoundState {
    label: Option<String>,
    loaded: bool,
    playing: bool,
    position: Duration,
    rate: f32,
    seeks: u32,
    plays: u32,
    unloads: u32,
}

/// In-memory sound. Tests end playback with [`FakeSound::finish`].
pub struct FakeSound {
    state: Mutex<FakeSoundState>,
    fail_decode: bool,
    broken: AtomicBool,
    hang_seek: Arc<AtomicBool>,
    events: broadcast::Sender<SoundEvent>,
}

impl FakeSound {
    fn new(fail_decode: bool, hang_seek: Arc<AtomicBool>) -> Self {
        let (events, _) = broadcast::channel(8);
        Self {
            state: Mutex::new(FakeSoundState {
                rate: 1.0,
                ..FakeSoundState::default()
            }),
            fail_decode,
            broken: AtomicBool::new(false),
            hang_seek,
            events,
        }
    }

    /// Play to the end of the clip.
    pub fn finish(&self) {
        {
            let mut state = lock(&self.state);
            state.playing = false;
            state.position = CLIP_LENGTH;
        }
        let _ = self.events.send(SoundEvent::Finished);
    }

    /// Pretend some of the clip has played.
    pub fn advance(&self, by: Duration) {
        lock(&self.state).position += by;
    }

    /// Make status checks report the clip as no longer loaded.
    pub fn break_clip(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    /// The loaded clip's [`label`].
    pub fn label(&self) -> Option<String> {
        lock(&self.state).label.clone()
    }

    /// Text the clip was synthesized from.
    pub fn text(&self) -> Option<String> {
        let label = self.label()?;
        Some(label.split_once('|').map_or_else(|| label.clone(), |(_, text)| text.to_string()))
    }

    pub fn is_loaded(&self) -> bool {
        lock(&self.state).loaded
    }

    pub fn is_playing(&self) -> bool {
        lock(&self.state).playing
    }

    pub fn rate(&self) -> f32 {
        lock(&self.state).rate
    }

    pub fn position(&self) -> Duration {
        lock(&self.state).position
    }

    pub fn seek_count(&self) -> u32 {
        lock(&self.state).seeks
    }

    pub fn play_count(&self) -> u32 {
        lock(&self.state).plays
    }

    pub fn unload_count(&self) -> u32 {
        lock(&self.state).unloads
    }
}

#[async_trait]
impl SoundHandle for FakeSound {
    async fn load(&self, clip: &AudioClip) -> Result<(), PlayerError> {
        if self.fail_decode {
            return Err(PlayerError::DecodeInvalid("scripted decode failure".into()));
        }
        let mut state = lock(&self.state);
        state.label = Some(String::from_utf8_lossy(&clip.bytes).into_owned());
        state.loaded = true;
        Ok(())
    }

    async fn play(&self) -> Result<(), PlayerError> {
        let mut state = lock(&self.state);
        state.playing = true;
        state.plays += 1;
        Ok(())
    }

    async fn pause(&self) -> Result<(), PlayerError> {
        lock(&self.state).playing = false;
        Ok(())
    }

    async fn seek_to_start(&self) -> Result<(), PlayerError> {
        if self.hang_seek.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let mut state = lock(&self.state);
        state.position = Duration::ZERO;
        state.seeks += 1;
        Ok(())
    }

    async fn set_rate(&self, rate: f32) -> Result<(), PlayerError> {
        lock(&self.state).rate = rate;
        Ok(())
    }

    async fn unload(&self) -> Result<(), PlayerError> {
        let mut state = lock(&self.state);
        state.loaded = false;
        state.playing = false;
        state.unloads += 1;
        Ok(())
    }

    async fn status(&self) -> Result<SoundStatus, PlayerError> {
        let state = lock(&self.state);
        Ok(SoundStatus {
            loaded: state.loaded && !self.broken.load(Ordering::SeqCst),
            playing: state.playing,
            position: state.position,
            duration: Some(CLIP_LENGTH),
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<SoundEvent> {
        self.events.subscribe()
    }
}

/// Factory that remembers every sound it created.
#[derive(Default)]
pub struct FakeSoundFactory {
    fail_decode: bool,
    hang_seek: Arc<AtomicBool>,
    created: Mutex<Vec<Arc<FakeSound>>>,
}

impl FakeSoundFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every created sound fails to decode.
    #[must_use]
    pub fn failing_decode(mut self) -> Self {
        self.fail_decode = true;
        self
    }

    /// Make rewinds on every sound, existing or future, never complete.
    pub fn hang_seeks(&self, hang: bool) {
        self.hang_seek.store(hang, Ordering::SeqCst);
    }

    pub fn created(&self) -> Vec<Arc<FakeSound>> {
        lock(&self.created).clone()
    }

    /// Most recent sound holding `text` spoken by `voice`.
    ///
    /// # Panics
    ///
    /// Panics if no such sound was created.
    pub fn sound(&self, voice: Voice, text: &str) -> Arc<FakeSound> {
        let wanted = label(voice, text);
        self.created()
            .into_iter()
            .rev()
            .find(|s| s.label().as_deref() == Some(wanted.as_str()))
            .unwrap_or_else(|| panic!("no sound for {wanted}"))
    }
}

impl SoundFactory for FakeSoundFactory {
    fn create(&self) -> SoundRef {
        let sound = Arc::new(FakeSound::new(
            self.fail_decode,
            Arc::clone(&self.hang_seek),
        ));
        lock(&self.created).push(Arc::clone(&sound));
        sound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn per_text_failures_run_out() {
        let speech = ScriptedSpeech::new().failing_for("One.", 1, SpeechError::Server { status: 502 });
        let one = SpeechRequest::new("One.", Voice::Guy).unwrap();
        let two = SpeechRequest::new("Two.", Voice::Guy).unwrap();

        assert!(speech.synthesize(&one).await.is_err());
        assert!(speech.synthesize(&two).await.is_ok());
        let clip = speech.synthesize(&one).await.unwrap();
        assert_eq!(clip.bytes.as_ref(), label(Voice::Guy, "One.").as_bytes());
        assert_eq!(speech.texts(), vec!["One.", "Two.", "One."]);
    }

    #[tokio::test]
    async fn sound_reports_text_without_voice() {
        let factory = FakeSoundFactory::new();
        let sound = factory.create();
        sound
            .load(&AudioClip::mpeg(label(Voice::Aria, "Hello.").into_bytes()))
            .await
            .unwrap();

        let fake = factory.sound(Voice::Aria, "Hello.");
        assert_eq!(fake.text().as_deref(), Some("Hello."));
        assert!(fake.is_loaded());
    }
}
