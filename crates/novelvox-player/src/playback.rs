//! rodio-backed [`SoundHandle`].
//!
//! Each sound keeps its encoded bytes so it can rebuild its sink when the
//! decoder cannot seek or the clip already played to the end. A generation
//! counter tells the completion watcher whether its sink is still the live
//! one, so replaced or unloaded sinks never report `Finished`.

use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use novelvox_core::AudioClip;
use rodio::{Decoder, Sink, Source};
use tokio::sync::broadcast;

use crate::audio_thread::AudioOutput;
use crate::error::PlayerError;
use crate::sound::{SoundEvent, SoundFactory, SoundHandle, SoundRef, SoundStatus};

/// Decode MP3 bytes, reporting the clip length when the container knows it.
fn decode(bytes: Bytes) -> Result<(Decoder<Cursor<Bytes>>, Option<Duration>), PlayerError> {
    if bytes.is_empty() {
        return Err(PlayerError::DecodeInvalid("no audio data".into()));
    }
    let source =
        Decoder::new(Cursor::new(bytes)).map_err(|e| PlayerError::DecodeInvalid(e.to_string()))?;
    let duration = source.total_duration();
    Ok((source, duration))
}

struct LoadedClip {
    bytes: Bytes,
    sink: Arc<Sink>,
    duration: Option<Duration>,
}

/// A sound played through the shared [`AudioOutput`].
pub struct RodioSound {
    output: Arc<AudioOutput>,
    clip: Mutex<Option<LoadedClip>>,
    rate: Mutex<f32>,
    generation: Arc<AtomicU64>,
    events: broadcast::Sender<SoundEvent>,
}

impl RodioSound {
    pub fn new(output: Arc<AudioOutput>) -> Self {
        let (events, _) = broadcast::channel(8);
        Self {
            output,
            clip: Mutex::new(None),
            rate: Mutex::new(1.0),
            generation: Arc::new(AtomicU64::new(0)),
            events,
        }
    }

    fn clip(&self) -> MutexGuard<'_, Option<LoadedClip>> {
        self.clip.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn rate(&self) -> f32 {
        *self.rate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_sink(&self) -> Result<Arc<Sink>, PlayerError> {
        self.clip()
            .as_ref()
            .map(|c| Arc::clone(&c.sink))
            .ok_or_else(|| PlayerError::Output("no clip loaded".into()))
    }

    /// Build a paused sink holding `bytes` and make it the live one.
    async fn install(&self, bytes: Bytes) -> Result<Arc<Sink>, PlayerError> {
        let (source, duration) = decode(bytes.clone())?;
        let sink = self.output.create_sink().await?;
        sink.pause();
        sink.set_speed(self.rate());
        sink.append(source);
        let sink = Arc::new(sink);

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let previous = self.clip().replace(LoadedClip {
            bytes,
            sink: Arc::clone(&sink),
            duration,
        });
        if let Some(previous) = previous {
            previous.sink.stop();
        }

        self.spawn_completion_watcher(Arc::clone(&sink), generation);
        Ok(sink)
    }

    /// Block a helper thread on the sink draining; report `Finished` only
    /// if this sink is still the live one when it does.
    fn spawn_completion_watcher(&self, sink: Arc<Sink>, generation: u64) {
        let live = Arc::clone(&self.generation);
        let events = self.events.clone();

        let spawned = std::thread::Builder::new()
            .name("novelvox-sound-watch".into())
            .spawn(move || {
                sink.sleep_until_end();
                if live.load(Ordering::SeqCst) != generation {
                    return;
                }
                tracing::debug!("Sound finished naturally");
                let _ = events.send(SoundEvent::Finished);
            });

        if let Err(e) = spawned {
            tracing::warn!(error = %e, "Failed to spawn completion watcher");
        }
    }

    /// Rebuild the sink from the kept bytes, resuming if it was playing.
    async fn rebuild(&self, resume: bool) -> Result<(), PlayerError> {
        let bytes = self
            .clip()
            .as_ref()
            .map(|c| c.bytes.clone())
            .ok_or_else(|| PlayerError::Output("no clip loaded".into()))?;
        let sink = self.install(bytes).await?;
        if resume {
            sink.play();
        }
        Ok(())
    }
}

#[async_trait]
impl SoundHandle for RodioSound {
    async fn load(&self, clip: &AudioClip) -> Result<(), PlayerError> {
        self.install(clip.bytes.clone()).await?;
        tracing::debug!(bytes = clip.len(), content_type = %clip.content_type, "Sound loaded");
        Ok(())
    }

    async fn play(&self) -> Result<(), PlayerError> {
        let sink = self.current_sink()?;
        if sink.empty() {
            // Already played through; start over.
            return self.rebuild(true).await;
        }
        sink.play();
        Ok(())
    }

    async fn pause(&self) -> Result<(), PlayerError> {
        self.current_sink()?.pause();
        Ok(())
    }

    async fn seek_to_start(&self) -> Result<(), PlayerError> {
        let sink = self.current_sink()?;
        let resume = !sink.is_paused();

        if !sink.empty() {
            // try_seek waits for the output callback to acknowledge.
            let seek_sink = Arc::clone(&sink);
            let seeked = tokio::task::spawn_blocking(move || seek_sink.try_seek(Duration::ZERO))
                .await
                .map_err(|e| PlayerError::Output(e.to_string()))?;
            match seeked {
                Ok(()) => return Ok(()),
                Err(e) => tracing::debug!(error = %e, "Seek unsupported, rebuilding sink"),
            }
        }

        self.rebuild(resume).await
    }

    async fn set_rate(&self, rate: f32) -> Result<(), PlayerError> {
        let rate = rate.max(0.1);
        *self.rate.lock().unwrap_or_else(PoisonError::into_inner) = rate;
        if let Some(clip) = self.clip().as_ref() {
            clip.sink.set_speed(rate);
        }
        Ok(())
    }

    async fn unload(&self) -> Result<(), PlayerError> {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(clip) = self.clip().take() {
            clip.sink.stop();
        }
        Ok(())
    }

    async fn status(&self) -> Result<SoundStatus, PlayerError> {
        let guard = self.clip();
        let Some(clip) = guard.as_ref() else {
            return Ok(SoundStatus::default());
        };
        Ok(SoundStatus {
            loaded: true,
            playing: !clip.sink.is_paused() && !clip.sink.empty(),
            position: clip.sink.get_pos(),
            duration: clip.duration,
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<SoundEvent> {
        self.events.subscribe()
    }
}

impl Drop for RodioSound {
    fn drop(&mut self) {
        // Wake the watcher thread without emitting.
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(clip) = self.clip().take() {
            clip.sink.stop();
        }
    }
}

/// Creates [`RodioSound`]s that share one output device.
pub struct RodioSoundFactory {
    output: Arc<AudioOutput>,
}

impl RodioSoundFactory {
    /// Open the default output device.
    pub fn new() -> Result<Self, PlayerError> {
        Ok(Self {
            output: Arc::new(AudioOutput::spawn()?),
        })
    }
}

impl SoundFactory for RodioSoundFactory {
    fn create(&self) -> SoundRef {
        Arc::new(RodioSound::new(Arc::clone(&self.output)))
    }
}
