//! The playback controller.
//!
//! A single actor task owns the session. Commands from [`PlayerHandle`],
//! foreground load results, completion events from the current sound and
//! watchdog ticks are handled one per turn, so checking and setting the
//! transition state never races.
//!
//! Every foreground load carries the epoch it was started in. Anything that
//! supersedes it (skip, voice change, retry, close, watchdog) bumps the
//! epoch, and results from older epochs are dropped when they arrive.

use std::ops::ControlFlow;
use std::sync::Arc;

use novelvox_core::{Paragraphs, PlaybackSpeed, SpeechClientPort, Voice};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior};

use crate::cache::{AudioCache, CacheKey, LoadState};
use crate::config::PlayerConfig;
use crate::error::PlayerError;
use crate::loader::{SharedSpeed, SoundLoader};
use crate::prefetch::PrefetchScheduler;
use crate::retry::{RetryPolicy, with_retries};
use crate::session::{CompletionDebounce, PlayerEvent, PlayerState, SessionSnapshot};
use crate::sound::{SoundEvent, SoundFactory, SoundRef, sound_op};

const COMMAND_CAPACITY: usize = 32;

type Reply = oneshot::Sender<Result<(), PlayerError>>;

enum Command {
    Open {
        paragraphs: Paragraphs,
        start: usize,
        voice: Option<Voice>,
        speed: Option<PlaybackSpeed>,
        reply: Reply,
    },
    Play(Reply),
    Pause(Reply),
    Restart(Reply),
    Next(Reply),
    SetVoice(Voice, Reply),
    SetSpeed(PlaybackSpeed, Reply),
    Retry(Reply),
    Close(Reply),
}

/// Handle to a running playback controller.
///
/// Cheap to clone. Every method is answered by the controller task in
/// order. Once the controller is closed (explicitly, or because every handle
/// was dropped) methods return [`PlayerError::Closed`].
#[derive(Clone)]
pub struct PlayerHandle {
    commands: mpsc::Sender<Command>,
    snapshot: watch::Receiver<SessionSnapshot>,
}

impl PlayerHandle {
    /// Start a controller with a fresh cache.
    ///
    /// Must be called from within a tokio runtime. The returned receiver
    /// carries [`PlayerEvent`]s.
    pub fn spawn(
        config: PlayerConfig,
        speech: Arc<dyn SpeechClientPort>,
        sounds: Arc<dyn SoundFactory>,
    ) -> (Self, mpsc::UnboundedReceiver<PlayerEvent>) {
        let cache = AudioCache::new(config.sound_op_timeout);
        Self::with_cache(config, cache, speech, sounds)
    }

    /// Start a controller that uses `cache`.
    pub fn with_cache(
        config: PlayerConfig,
        cache: AudioCache,
        speech: Arc<dyn SpeechClientPort>,
        sounds: Arc<dyn SoundFactory>,
    ) -> (Self, mpsc::UnboundedReceiver<PlayerEvent>) {
        let speed = SharedSpeed::new(PlaybackSpeed::default());
        let loader = Arc::new(SoundLoader::new(
            speech,
            sounds,
            speed,
            config.sound_op_timeout,
        ));
        let prefetch = PrefetchScheduler::new(
            cache.clone(),
            Arc::clone(&loader),
            config.prefetch_timeout,
            config.speed_in_cache_key,
        );

        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (load_tx, load_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::idle(
            Voice::default(),
            PlaybackSpeed::default(),
        ));

        let controller = Controller {
            debounce: CompletionDebounce::new(config.debounce),
            config,
            cache,
            loader,
            prefetch,
            paragraphs: Paragraphs::from_raw(Vec::new()),
            index: 0,
            state: PlayerState::Idle,
            voice: Voice::default(),
            play_intent: false,
            epoch: 0,
            current: None,
            transition_started_at: None,
            transition_bound: Duration::ZERO,
            error: None,
            foreground: None,
            load_tx,
            events: event_tx,
            snapshot: snapshot_tx,
            published_state: PlayerState::Idle,
        };
        tokio::spawn(controller.run(command_rx, load_rx));

        (
            Self {
                commands: command_tx,
                snapshot: snapshot_rx,
            },
            event_rx,
        )
    }

    async fn request(&self, command: impl FnOnce(Reply) -> Command) -> Result<(), PlayerError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(command(tx))
            .await
            .map_err(|_| PlayerError::Closed)?;
        rx.await.map_err(|_| PlayerError::Closed)?
    }

    /// Open a chapter at `start` with the current voice and speed.
    ///
    /// Playback starts on its own when `start` is 0 or the listener was
    /// playing before; otherwise the paragraph is loaded paused.
    pub async fn open(&self, paragraphs: Paragraphs, start: usize) -> Result<(), PlayerError> {
        self.request(|reply| Command::Open {
            paragraphs,
            start,
            voice: None,
            speed: None,
            reply,
        })
        .await
    }

    /// Like [`open`](Self::open), choosing the voice and speed as well.
    pub async fn open_with(
        &self,
        paragraphs: Paragraphs,
        start: usize,
        voice: Voice,
        speed: PlaybackSpeed,
    ) -> Result<(), PlayerError> {
        self.request(|reply| Command::Open {
            paragraphs,
            start,
            voice: Some(voice),
            speed: Some(speed),
            reply,
        })
        .await
    }

    pub async fn play(&self) -> Result<(), PlayerError> {
        self.request(Command::Play).await
    }

    /// Pause the current paragraph. The audio stays loaded.
    pub async fn pause(&self) -> Result<(), PlayerError> {
        self.request(Command::Pause).await
    }

    /// Play the current paragraph again from its beginning.
    pub async fn restart(&self) -> Result<(), PlayerError> {
        self.request(Command::Restart).await
    }

    /// Skip to the next paragraph.
    pub async fn next(&self) -> Result<(), PlayerError> {
        self.request(Command::Next).await
    }

    /// Switch voice and reload the current paragraph with it.
    pub async fn set_voice(&self, voice: Voice) -> Result<(), PlayerError> {
        self.request(|reply| Command::SetVoice(voice, reply)).await
    }

    pub async fn set_speed(&self, speed: PlaybackSpeed) -> Result<(), PlayerError> {
        self.request(|reply| Command::SetSpeed(speed, reply)).await
    }

    /// Re-attempt the operation that put the session in an error state.
    pub async fn retry(&self) -> Result<(), PlayerError> {
        self.request(Command::Retry).await
    }

    /// Stop playback, release all audio and shut the controller down.
    pub async fn close(&self) -> Result<(), PlayerError> {
        self.request(Command::Close).await
    }

    /// Latest session state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Watch the session state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.clone()
    }
}

/// Result of a foreground load, tagged with the epoch that started it.
struct LoadDone {
    epoch: u64,
    index: usize,
    result: Result<SoundRef, PlayerError>,
}

/// The sound for the current paragraph.
struct Active {
    index: usize,
    sound: SoundRef,
    finished: broadcast::Receiver<SoundEvent>,
}

enum Turn {
    Command(Option<Command>),
    Loaded(LoadDone),
    Finished(usize),
    Watchdog,
}

/// Wait for the current sound to finish. Never resolves without one.
async fn next_completion(current: &mut Option<Active>) -> usize {
    let Some(active) = current else {
        return std::future::pending().await;
    };
    let index = active.index;
    match active.finished.recv().await {
        Ok(SoundEvent::Finished) | Err(RecvError::Lagged(_)) => index,
        Err(RecvError::Closed) => std::future::pending().await,
    }
}

/// One foreground load: cached or synthesized, retried on transient
/// failures, reloaded once from scratch if the audio will not decode.
struct ForegroundLoad {
    cache: AudioCache,
    loader: Arc<SoundLoader>,
    key: CacheKey,
    text: String,
    voice: Voice,
    timeout: Duration,
    retry: RetryPolicy,
}

impl ForegroundLoad {
    async fn run(self) -> Result<SoundRef, PlayerError> {
        if self.text.trim().is_empty() {
            return Err(PlayerError::EmptyInput);
        }
        let result = match self.attempt().await {
            // Joined a prefetch that was cancelled under us.
            Err(PlayerError::Cancelled) => {
                tracing::debug!(voice = %self.voice, "Coalesced load cancelled, loading again");
                self.attempt().await
            }
            other => other,
        };
        match result {
            Err(PlayerError::DecodeInvalid(reason)) => {
                tracing::warn!(voice = %self.voice, %reason, "Audio not playable, reloading fresh");
                self.cache.invalidate(&self.key).await;
                self.attempt().await
            }
            other => other,
        }
    }

    async fn attempt(&self) -> Result<SoundRef, PlayerError> {
        with_retries(self.retry, || {
            let loader = Arc::clone(&self.loader);
            let text = self.text.clone();
            let (voice, timeout) = (self.voice, self.timeout);
            self.cache.get_or_load(&self.key, move || async move {
                loader.load(&text, voice, timeout).await
            })
        })
        .await
    }
}

struct Controller {
    config: PlayerConfig,
    cache: AudioCache,
    loader: Arc<SoundLoader>,
    prefetch: PrefetchScheduler,

    paragraphs: Paragraphs,
    index: usize,
    state: PlayerState,
    voice: Voice,
    /// Whether the listener wants audio playing. Survives paragraph changes
    /// and voice reloads; cleared by pause.
    play_intent: bool,
    epoch: u64,
    current: Option<Active>,
    /// Set together with `Transitioning`, read by the watchdog.
    transition_started_at: Option<Instant>,
    transition_bound: Duration,
    debounce: CompletionDebounce,
    error: Option<PlayerError>,
    foreground: Option<JoinHandle<()>>,

    load_tx: mpsc::UnboundedSender<LoadDone>,
    events: mpsc::UnboundedSender<PlayerEvent>,
    snapshot: watch::Sender<SessionSnapshot>,
    published_state: PlayerState,
}

impl Controller {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut loads: mpsc::UnboundedReceiver<LoadDone>,
    ) {
        let mut watchdog = tokio::time::interval(self.config.watchdog_tick);
        watchdog.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let turn = tokio::select! {
                command = commands.recv() => Turn::Command(command),
                Some(done) = loads.recv() => Turn::Loaded(done),
                index = next_completion(&mut self.current) => Turn::Finished(index),
                _ = watchdog.tick() => Turn::Watchdog,
            };

            match turn {
                Turn::Command(Some(command)) => {
                    let (reply, result, flow) = self.dispatch(command).await;
                    self.publish();
                    let _ = reply.send(result);
                    if flow.is_break() {
                        break;
                    }
                }
                Turn::Command(None) => {
                    tracing::debug!("All player handles dropped, closing");
                    self.close().await;
                    self.publish();
                    break;
                }
                Turn::Loaded(done) => {
                    self.on_load_done(done).await;
                    self.publish();
                }
                Turn::Finished(index) => {
                    self.on_finished(index).await;
                    self.publish();
                }
                Turn::Watchdog => {
                    self.check_watchdog().await;
                    self.publish();
                }
            }
        }
        tracing::debug!("Playback controller stopped");
    }

    async fn dispatch(&mut self, command: Command) -> (Reply, Result<(), PlayerError>, ControlFlow<()>) {
        let (reply, result) = match command {
            Command::Open {
                paragraphs,
                start,
                voice,
                speed,
                reply,
            } => (reply, self.open(paragraphs, start, voice, speed).await),
            Command::Play(reply) => (reply, self.play().await),
            Command::Pause(reply) => (reply, self.pause().await),
            Command::Restart(reply) => (reply, self.restart().await),
            Command::Next(reply) => (reply, self.next().await),
            Command::SetVoice(voice, reply) => (reply, self.set_voice(voice).await),
            Command::SetSpeed(speed, reply) => (reply, self.set_speed(speed).await),
            Command::Retry(reply) => (reply, self.retry().await),
            Command::Close(reply) => {
                self.close().await;
                return (reply, Ok(()), ControlFlow::Break(()));
            }
        };
        (reply, result, ControlFlow::Continue(()))
    }

    // ── Commands ───────────────────────────────────────────────────

    async fn open(
        &mut self,
        paragraphs: Paragraphs,
        start: usize,
        voice: Option<Voice>,
        speed: Option<PlaybackSpeed>,
    ) -> Result<(), PlayerError> {
        if paragraphs.is_empty() {
            return Err(PlayerError::EmptyInput);
        }
        if start >= paragraphs.len() {
            return Err(PlayerError::IndexOutOfRange {
                index: start,
                len: paragraphs.len(),
            });
        }

        self.prefetch.cancel_all();
        self.stop_current().await;

        let voice = voice.unwrap_or(self.voice);
        if self.paragraphs.as_slice() != paragraphs.as_slice() {
            // Audio from another chapter will not be asked for again.
            self.cache.clear().await;
        } else if voice != self.voice {
            self.cache.evict_by_voice(self.voice).await;
        }
        self.voice = voice;
        if let Some(speed) = speed {
            self.loader.speed().set(speed);
        }

        self.play_intent = start == 0 || self.play_intent;
        self.paragraphs = paragraphs;
        self.error = None;
        self.debounce.reset();

        tracing::info!(
            paragraphs = self.paragraphs.len(),
            start,
            voice = %self.voice,
            autoplay = self.play_intent,
            "Opening chapter"
        );
        self.begin_load(start, None);
        Ok(())
    }

    async fn play(&mut self) -> Result<(), PlayerError> {
        let index = match self.state {
            PlayerState::Playing(i) | PlayerState::Paused(i) => i,
            _ => return Err(self.rejected("play")),
        };
        let sound = self.current_sound(index, "play")?;

        self.sound_command(index, "play", sound.play()).await?;
        self.play_intent = true;
        self.state = PlayerState::Playing(index);
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), PlayerError> {
        let index = match self.state {
            PlayerState::Playing(i) | PlayerState::Paused(i) => i,
            _ => return Err(self.rejected("pause")),
        };
        let sound = self.current_sound(index, "pause")?;

        self.sound_command(index, "pause", sound.pause()).await?;
        self.play_intent = false;
        self.state = PlayerState::Paused(index);
        Ok(())
    }

    async fn restart(&mut self) -> Result<(), PlayerError> {
        if matches!(
            self.state,
            PlayerState::Loading(_) | PlayerState::Transitioning { .. }
        ) {
            return Err(self.rejected("restart"));
        }
        let Some(active) = &self.current else {
            return Err(self.rejected("restart"));
        };
        let (index, sound) = (active.index, Arc::clone(&active.sound));

        self.sound_command(index, "seek", sound.seek_to_start()).await?;
        // A fresh subscription drops any completion queued for the old pass.
        if let Some(active) = &mut self.current {
            active.finished = sound.subscribe();
        }
        self.sound_command(index, "play", sound.play()).await?;

        self.debounce.reset();
        self.play_intent = true;
        self.state = PlayerState::Playing(index);
        self.emit(PlayerEvent::ParagraphStarted { index });
        Ok(())
    }

    async fn next(&mut self) -> Result<(), PlayerError> {
        if matches!(
            self.state,
            PlayerState::Idle | PlayerState::Finished | PlayerState::Transitioning { .. }
        ) {
            return Err(self.rejected("skip"));
        }
        let from = self.index;
        if from + 1 >= self.paragraphs.len() {
            return Err(PlayerError::Rejected {
                op: "skip",
                state: "at the last paragraph".to_string(),
            });
        }

        self.stop_current().await;
        self.debounce.reset();
        tracing::debug!(from, to = from + 1, "Skipping paragraph");
        self.begin_load(from + 1, Some(from));
        Ok(())
    }

    async fn set_voice(&mut self, voice: Voice) -> Result<(), PlayerError> {
        if voice == self.voice {
            return Ok(());
        }
        let old = std::mem::replace(&mut self.voice, voice);

        self.prefetch.cancel_all();
        self.stop_current().await;
        let evicted = self.cache.evict_by_voice(old).await;
        tracing::info!(from = %old, to = %voice, evicted, "Voice changed");

        match self.state {
            PlayerState::Idle => {}
            PlayerState::Finished => self.epoch += 1,
            _ => {
                self.debounce.reset();
                self.begin_load(self.index, None);
            }
        }
        Ok(())
    }

    async fn set_speed(&mut self, speed: PlaybackSpeed) -> Result<(), PlayerError> {
        let previous = self.loader.speed().get();
        self.loader.speed().set(speed);

        if let Some(active) = &self.current {
            let sound = Arc::clone(&active.sound);
            sound_op("set_rate", self.config.sound_op_timeout, sound.set_rate(speed.as_f32()))
                .await?;
        }

        if self.config.speed_in_cache_key && previous != speed && self.state.index().is_some() {
            self.prefetch.cancel_all();
            self.schedule_prefetch(self.index);
        }
        tracing::debug!(%speed, "Playback speed changed");
        Ok(())
    }

    async fn retry(&mut self) -> Result<(), PlayerError> {
        let PlayerState::Error { index, .. } = self.state else {
            return Err(self.rejected("retry"));
        };
        if let Some(text) = self.paragraphs.get(index) {
            let key = self.key_for(text);
            self.cache.invalidate(&key).await;
        }
        tracing::info!(index, "Retrying paragraph");
        self.error = None;
        self.begin_load(index, None);
        Ok(())
    }

    async fn close(&mut self) {
        self.epoch += 1;
        if let Some(task) = self.foreground.take() {
            task.abort();
        }
        self.prefetch.shutdown().await;
        self.stop_current().await;
        self.cache.clear().await;

        self.paragraphs = Paragraphs::from_raw(Vec::new());
        self.index = 0;
        self.state = PlayerState::Idle;
        self.transition_started_at = None;
        self.error = None;
        tracing::info!("Player closed");
    }

    // ── Loading ────────────────────────────────────────────────────

    fn key_for(&self, text: &str) -> CacheKey {
        let speed = self
            .config
            .speed_in_cache_key
            .then(|| self.loader.speed().get());
        CacheKey::new(self.voice, text, speed)
    }

    /// Start the foreground load of paragraph `index`.
    ///
    /// With `from` set this is an advance. It stays in `Transitioning` until
    /// the load resolves, so a second advance is refused meanwhile. A ready
    /// cache entry makes that the fast path with no network request.
    fn begin_load(&mut self, index: usize, from: Option<usize>) {
        self.epoch += 1;
        self.index = index;
        if let Some(task) = self.foreground.take() {
            task.abort();
        }

        let text = self.paragraphs.get(index).unwrap_or_default().to_string();
        let key = self.key_for(&text);
        let cached = self
            .cache
            .get(&key)
            .is_some_and(|entry| entry.state == LoadState::Ready);

        if let Some(from) = from {
            self.state = PlayerState::Transitioning { from, to: index };
            self.transition_started_at = Some(Instant::now());
            self.transition_bound = self.config.transition_bound(cached);
        } else {
            self.state = PlayerState::Loading(index);
            self.transition_started_at = None;
        }

        let job = ForegroundLoad {
            cache: self.cache.clone(),
            loader: Arc::clone(&self.loader),
            key,
            text,
            voice: self.voice,
            timeout: self.config.foreground_timeout,
            retry: self.config.retry,
        };
        let epoch = self.epoch;
        let tx = self.load_tx.clone();
        self.foreground = Some(tokio::spawn(async move {
            let result = job.run().await;
            let _ = tx.send(LoadDone {
                epoch,
                index,
                result,
            });
        }));

        tracing::debug!(index, epoch, cached, "Foreground load started");
        self.schedule_prefetch(index);
    }

    fn schedule_prefetch(&self, index: usize) {
        self.prefetch.schedule_prefetch(
            index,
            &self.paragraphs,
            self.voice,
            self.loader.speed().get(),
            self.config.prefetch_window,
        );
    }

    async fn on_load_done(&mut self, done: LoadDone) {
        if done.epoch != self.epoch {
            tracing::debug!(
                index = done.index,
                epoch = done.epoch,
                current = self.epoch,
                "Discarding stale load result"
            );
            return;
        }
        self.foreground = None;

        match done.result {
            Ok(sound) => {
                if let Err(e) = self.activate(done.index, sound).await {
                    self.fail(done.index, e).await;
                }
            }
            Err(e) => self.fail(done.index, e).await,
        }
    }

    /// Make `sound` the current paragraph's sound and play it if wanted.
    async fn activate(&mut self, index: usize, sound: SoundRef) -> Result<(), PlayerError> {
        let bound = self.config.sound_op_timeout;
        let rate = self.loader.speed().get().as_f32();
        sound_op("set_rate", bound, sound.set_rate(rate)).await?;

        self.current = Some(Active {
            index,
            sound: Arc::clone(&sound),
            finished: sound.subscribe(),
        });
        self.transition_started_at = None;
        self.error = None;

        if self.play_intent {
            sound_op("play", bound, sound.play()).await?;
            self.state = PlayerState::Playing(index);
            self.emit(PlayerEvent::ParagraphStarted { index });
            tracing::debug!(index, "Paragraph playing");
        } else {
            self.state = PlayerState::Paused(index);
            tracing::debug!(index, "Paragraph ready");
        }
        Ok(())
    }

    // ── Completion & watchdog ──────────────────────────────────────

    async fn on_finished(&mut self, index: usize) {
        if !self.debounce.accept(index, Instant::now()) {
            return;
        }
        if self.state != PlayerState::Playing(index) {
            tracing::debug!(index, state = %self.state, "Ignoring completion outside playback");
            return;
        }

        if index + 1 >= self.paragraphs.len() {
            self.state = PlayerState::Finished;
            tracing::info!(paragraphs = self.paragraphs.len(), "Chapter complete");
            self.emit(PlayerEvent::ChapterComplete);
            return;
        }

        // The finished sound stays cached; only our reference goes.
        self.current = None;
        self.begin_load(index + 1, Some(index));
    }

    async fn check_watchdog(&mut self) {
        let PlayerState::Transitioning { from, to } = self.state else {
            return;
        };
        let Some(started) = self.transition_started_at else {
            return;
        };
        let elapsed = started.elapsed();
        if elapsed < self.transition_bound {
            return;
        }

        tracing::warn!(
            from,
            to,
            elapsed_ms = elapsed.as_millis(),
            "Transition did not resolve, stopping playback"
        );
        self.epoch += 1;
        if let Some(task) = self.foreground.take() {
            task.abort();
        }
        self.fail(to, PlayerError::StuckTransition).await;
    }

    // ── Helpers ────────────────────────────────────────────────────

    /// Silence the current sound and put paragraph `index` in the error state.
    async fn fail(&mut self, index: usize, error: PlayerError) {
        tracing::warn!(index, error = %error, "Paragraph failed");
        self.stop_current().await;
        self.index = index;
        self.transition_started_at = None;
        self.state = PlayerState::Error {
            index,
            message: error.to_string(),
        };
        self.error = Some(error.clone());
        self.emit(PlayerEvent::Error(error));
    }

    fn rejected(&self, op: &'static str) -> PlayerError {
        PlayerError::Rejected {
            op,
            state: self.state.to_string(),
        }
    }

    fn current_sound(&self, index: usize, op: &'static str) -> Result<SoundRef, PlayerError> {
        self.current
            .as_ref()
            .filter(|active| active.index == index)
            .map(|active| Arc::clone(&active.sound))
            .ok_or_else(|| self.rejected(op))
    }

    /// Run a user-triggered sound operation; failure puts the paragraph in
    /// the error state.
    async fn sound_command(
        &mut self,
        index: usize,
        op: &'static str,
        fut: impl std::future::Future<Output = Result<(), PlayerError>>,
    ) -> Result<(), PlayerError> {
        let result = sound_op(op, self.config.sound_op_timeout, fut).await;
        if let Err(e) = &result {
            self.fail(index, e.clone()).await;
        }
        result
    }

    /// Pause and forget the current sound. Its cache entry is untouched.
    async fn stop_current(&mut self) {
        if let Some(active) = self.current.take()
            && let Err(e) = sound_op("pause", self.config.sound_op_timeout, active.sound.pause()).await
        {
            tracing::debug!(index = active.index, error = %e, "Failed to pause outgoing sound");
        }
    }

    fn emit(&self, event: PlayerEvent) {
        let _ = self.events.send(event);
    }

    fn publish(&mut self) {
        let snapshot = SessionSnapshot {
            state: self.state.clone(),
            index: self.index,
            paragraph_count: self.paragraphs.len(),
            is_playing: self.state.is_playing(),
            is_transitioning: self.state.is_transitioning(),
            is_loading: self.state.is_loading(),
            voice: self.voice,
            speed: self.loader.speed().get(),
            error: self.error.clone(),
        };
        self.snapshot.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });

        if self.state != self.published_state {
            self.published_state = self.state.clone();
            self.emit(PlayerEvent::StateChanged(self.state.clone()));
        }
    }
}
