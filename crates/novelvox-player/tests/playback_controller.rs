//! Integration tests for the `PlayerHandle` state machine.
//!
//! The controller runs against an in-memory speech backend and in-memory
//! sounds; no audio device or network is touched. Time is paused, so
//! timeouts, debouncing and the watchdog run instantly and deterministically.

use std::sync::Arc;
use std::time::Duration;

use novelvox_core::{Paragraphs, PlaybackSpeed, SpeechClientPort, SpeechError, Voice};
use novelvox_player::testing::{FakeSoundFactory, ScriptedSpeech, label};
use novelvox_player::{
    AudioCache, CacheKey, LoadState, PlayerConfig, PlayerError, PlayerEvent, PlayerHandle,
    PlayerState, SessionSnapshot, SoundFactory,
};
use tokio::sync::mpsc;
use tokio_test::{assert_err, assert_ok};

// ── Helpers ────────────────────────────────────────────────────────

struct Rig {
    player: PlayerHandle,
    events: mpsc::UnboundedReceiver<PlayerEvent>,
    speech: Arc<ScriptedSpeech>,
    sounds: Arc<FakeSoundFactory>,
    cache: AudioCache,
}

fn rig_with(config: PlayerConfig, speech: ScriptedSpeech) -> Rig {
    let speech = Arc::new(speech);
    let sounds = Arc::new(FakeSoundFactory::default());
    // Long enough that only the watchdog can end a hung rewind.
    let cache = AudioCache::new(Duration::from_secs(30));

    let (player, events) = PlayerHandle::with_cache(
        config,
        cache.clone(),
        Arc::clone(&speech) as Arc<dyn SpeechClientPort>,
        Arc::clone(&sounds) as Arc<dyn SoundFactory>,
    );

    Rig {
        player,
        events,
        speech,
        sounds,
        cache,
    }
}

fn rig(speech: ScriptedSpeech) -> Rig {
    rig_with(PlayerConfig::new(), speech)
}

fn chapter(texts: &[&str]) -> Paragraphs {
    Paragraphs::from_chapter(texts.iter().copied())
}

/// Wait until the session satisfies `pred`.
async fn wait_until(
    player: &PlayerHandle,
    pred: impl FnMut(&SessionSnapshot) -> bool,
) -> SessionSnapshot {
    let mut rx = player.subscribe();
    tokio::time::timeout(Duration::from_secs(120), rx.wait_for(pred))
        .await
        .expect("session never reached the expected state")
        .expect("controller stopped")
        .clone()
}

async fn wait_for_state(player: &PlayerHandle, state: PlayerState) -> SessionSnapshot {
    wait_until(player, |s| s.state == state).await
}

/// Let spawned loads run to completion.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

async fn wait_until_cached(cache: &AudioCache, key: &CacheKey) {
    for _ in 0..200 {
        if cache.get(key).is_some_and(|e| e.state == LoadState::Ready) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("{key:?} was never cached");
}

fn sorted(mut texts: Vec<String>) -> Vec<String> {
    texts.sort();
    texts
}

fn drain_events(rx: &mut mpsc::UnboundedReceiver<PlayerEvent>) -> Vec<PlayerEvent> {
    let mut events = Vec::new();
    while let Ok(e) = rx.try_recv() {
        events.push(e);
    }
    events
}

fn started_indices(events: &[PlayerEvent]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|e| match e {
            PlayerEvent::ParagraphStarted { index } => Some(*index),
            _ => None,
        })
        .collect()
}

// ── Tests ──────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn initial_state_is_idle() {
    let rig = rig(ScriptedSpeech::new());
    let snapshot = rig.player.snapshot();

    assert_eq!(snapshot.state, PlayerState::Idle);
    assert_eq!(snapshot.paragraph_count, 0);
    assert!(!snapshot.is_playing);
    assert_eq!(snapshot.voice, Voice::default());
}

#[tokio::test(start_paused = true)]
async fn opening_at_zero_autoplays_and_prefetches() {
    let rig = rig(ScriptedSpeech::new());

    assert_ok!(
        rig.player
            .open_with(chapter(&["One.", "Two.", "Three.", "Four.", "Five."]), 0, Voice::Guy, PlaybackSpeed::Normal)
            .await
    );
    let snapshot = wait_for_state(&rig.player, PlayerState::Playing(0)).await;
    settle().await;

    assert!(snapshot.is_playing);
    assert_eq!(snapshot.paragraph_count, 5);
    assert!(rig.sounds.sound(Voice::Guy, "One.").is_playing());
    // Current paragraph plus a window of three.
    assert_eq!(sorted(rig.speech.texts()), vec!["Four.", "One.", "Three.", "Two."]);
}

#[tokio::test(start_paused = true)]
async fn opening_mid_chapter_without_play_intent_stays_paused() {
    let rig = rig(ScriptedSpeech::new());

    assert_ok!(rig.player.open(chapter(&["One.", "Two.", "Three."]), 1).await);
    wait_for_state(&rig.player, PlayerState::Paused(1)).await;
    assert!(!rig.sounds.sound(Voice::default(), "Two.").is_playing());

    assert_ok!(rig.player.play().await);
    assert_eq!(rig.player.snapshot().state, PlayerState::Playing(1));
    assert!(rig.sounds.sound(Voice::default(), "Two.").is_playing());
}

#[tokio::test(start_paused = true)]
async fn open_rejects_empty_chapter_and_bad_start() {
    let rig = rig(ScriptedSpeech::new());

    assert_eq!(
        rig.player.open(Paragraphs::from_raw(Vec::new()), 0).await,
        Err(PlayerError::EmptyInput)
    );
    assert_eq!(
        rig.player.open(chapter(&["One."]), 3).await,
        Err(PlayerError::IndexOutOfRange { index: 3, len: 1 })
    );
    assert!(rig.speech.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn plays_through_the_chapter_in_order() {
    let mut rig = rig(ScriptedSpeech::new());
    let texts = ["One.", "Two.", "Three."];

    assert_ok!(rig.player.open(chapter(&texts), 0).await);
    for (index, text) in texts.iter().enumerate() {
        wait_for_state(&rig.player, PlayerState::Playing(index)).await;
        rig.sounds.sound(Voice::default(), text).finish();
    }
    let snapshot = wait_for_state(&rig.player, PlayerState::Finished).await;

    assert!(!snapshot.is_playing);
    assert_eq!(snapshot.index, 2);
    let events = drain_events(&mut rig.events);
    assert_eq!(started_indices(&events), vec![0, 1, 2]);
    assert_eq!(
        events
            .iter()
            .filter(|e| **e == PlayerEvent::ChapterComplete)
            .count(),
        1
    );
    // Every paragraph was synthesized exactly once.
    assert_eq!(sorted(rig.speech.texts()), vec!["One.", "Three.", "Two."]);
}

#[tokio::test(start_paused = true)]
async fn prefetched_paragraph_advances_through_transitioning() {
    let mut rig = rig(ScriptedSpeech::new());

    assert_ok!(rig.player.open(chapter(&["One.", "Two."]), 0).await);
    wait_for_state(&rig.player, PlayerState::Playing(0)).await;
    wait_until_cached(&rig.cache, &CacheKey::new(Voice::default(), "Two.", None)).await;
    drain_events(&mut rig.events);

    rig.sounds.sound(Voice::default(), "One.").finish();
    wait_for_state(&rig.player, PlayerState::Playing(1)).await;

    let events = drain_events(&mut rig.events);
    assert!(events.contains(&PlayerEvent::StateChanged(PlayerState::Transitioning {
        from: 0,
        to: 1
    })));
    assert!(!events
        .iter()
        .any(|e| *e == PlayerEvent::StateChanged(PlayerState::Loading(1))));
    assert_eq!(rig.speech.requests().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn duplicate_completion_advances_once() {
    let rig = rig(ScriptedSpeech::new());

    assert_ok!(rig.player.open(chapter(&["One.", "Two.", "Three."]), 0).await);
    wait_for_state(&rig.player, PlayerState::Playing(0)).await;

    let first = rig.sounds.sound(Voice::default(), "One.");
    first.finish();
    first.finish();
    wait_for_state(&rig.player, PlayerState::Playing(1)).await;
    settle().await;

    assert_eq!(rig.player.snapshot().state, PlayerState::Playing(1));
}

#[tokio::test(start_paused = true)]
async fn completion_racing_next_advances_once() {
    for _ in 0..20 {
        let rig = rig_with(
            PlayerConfig::new().with_prefetch_window(0),
            ScriptedSpeech::new().with_delay(Duration::from_millis(500)),
        );
        assert_ok!(rig.player.open(chapter(&["One.", "Two.", "Three."]), 0).await);
        wait_for_state(&rig.player, PlayerState::Playing(0)).await;

        // Whichever trigger lands first starts the advance; the other is refused.
        rig.sounds.sound(Voice::default(), "One.").finish();
        match rig.player.next().await {
            Ok(()) | Err(PlayerError::Rejected { op: "skip", .. }) => {}
            other => panic!("unexpected skip result: {other:?}"),
        }
        assert_eq!(
            rig.player.snapshot().state,
            PlayerState::Transitioning { from: 0, to: 1 }
        );

        wait_for_state(&rig.player, PlayerState::Playing(1)).await;
        settle().await;
        assert_eq!(rig.player.snapshot().state, PlayerState::Playing(1));
        assert_eq!(sorted(rig.speech.texts()), vec!["One.", "Two."]);

        assert_ok!(rig.player.close().await);
    }
}

#[tokio::test(start_paused = true)]
async fn uncached_advance_holds_transitioning_until_loaded() {
    let mut rig = rig_with(
        PlayerConfig::new().with_prefetch_window(0),
        ScriptedSpeech::new().with_delay(Duration::from_secs(6)),
    );

    assert_ok!(rig.player.open(chapter(&["One.", "Two."]), 0).await);
    wait_for_state(&rig.player, PlayerState::Playing(0)).await;
    drain_events(&mut rig.events);

    rig.sounds.sound(Voice::default(), "One.").finish();
    wait_for_state(&rig.player, PlayerState::Transitioning { from: 0, to: 1 }).await;
    let started = tokio::time::Instant::now();
    assert!(matches!(
        rig.player.play().await,
        Err(PlayerError::Rejected { op: "play", .. })
    ));

    // Synthesis outlasts the fast-path watchdog bound but not the load timeout.
    let snapshot = wait_for_state(&rig.player, PlayerState::Playing(1)).await;
    assert!(started.elapsed() >= Duration::from_secs(6));
    assert_eq!(snapshot.error, None);
    let events = drain_events(&mut rig.events);
    assert!(!events
        .iter()
        .any(|e| matches!(e, PlayerEvent::Error(_) | PlayerEvent::StateChanged(PlayerState::Loading(1)))));
}

#[tokio::test(start_paused = true)]
async fn repeated_completion_of_last_paragraph_completes_chapter_once() {
    let mut rig = rig(ScriptedSpeech::new());
    let completions = |events: &[PlayerEvent]| {
        events
            .iter()
            .filter(|e| **e == PlayerEvent::ChapterComplete)
            .count()
    };

    assert_ok!(rig.player.open(chapter(&["Only."]), 0).await);
    wait_for_state(&rig.player, PlayerState::Playing(0)).await;
    let sound = rig.sounds.sound(Voice::default(), "Only.");

    sound.finish();
    sound.finish();
    wait_for_state(&rig.player, PlayerState::Finished).await;
    settle().await;
    assert_eq!(completions(&drain_events(&mut rig.events)), 1);

    // A late signal after the window is no completion either.
    tokio::time::sleep(Duration::from_secs(1)).await;
    sound.finish();
    settle().await;
    assert_eq!(completions(&drain_events(&mut rig.events)), 0);
    assert_eq!(rig.player.snapshot().state, PlayerState::Finished);

    // Replaying the paragraph completes the chapter again, once.
    assert_ok!(rig.player.restart().await);
    assert_eq!(rig.player.snapshot().state, PlayerState::Playing(0));
    sound.finish();
    sound.finish();
    wait_for_state(&rig.player, PlayerState::Finished).await;
    settle().await;
    assert_eq!(completions(&drain_events(&mut rig.events)), 1);
}

#[tokio::test(start_paused = true)]
async fn restart_is_idempotent() {
    let rig = rig(ScriptedSpeech::new());

    assert_ok!(rig.player.open(chapter(&["One.", "Two."]), 0).await);
    wait_for_state(&rig.player, PlayerState::Playing(0)).await;
    let sound = rig.sounds.sound(Voice::default(), "One.");

    for _ in 0..3 {
        sound.advance(Duration::from_millis(700));
        assert_ok!(rig.player.restart().await);
        assert_eq!(sound.position(), Duration::ZERO);
        assert_eq!(rig.player.snapshot().state, PlayerState::Playing(0));
    }

    assert_ok!(rig.player.pause().await);
    sound.advance(Duration::from_millis(400));
    assert_ok!(rig.player.restart().await);
    assert_eq!(sound.position(), Duration::ZERO);
    assert!(sound.is_playing());
    assert_eq!(rig.player.snapshot().state, PlayerState::Playing(0));
}

#[tokio::test(start_paused = true)]
async fn pause_keeps_audio_loaded() {
    let rig = rig(ScriptedSpeech::new());

    assert_ok!(rig.player.open(chapter(&["One.", "Two."]), 0).await);
    wait_for_state(&rig.player, PlayerState::Playing(0)).await;
    let sound = rig.sounds.sound(Voice::default(), "One.");

    assert_ok!(rig.player.pause().await);
    assert_eq!(rig.player.snapshot().state, PlayerState::Paused(0));
    assert!(!sound.is_playing());
    assert!(sound.is_loaded());

    assert_ok!(rig.player.play().await);
    assert!(sound.is_playing());
}

#[tokio::test(start_paused = true)]
async fn play_and_pause_are_rejected_while_loading() {
    let rig = rig(ScriptedSpeech::new().with_delay(Duration::from_secs(1)));

    assert_ok!(rig.player.open(chapter(&["One.", "Two."]), 0).await);
    assert_eq!(rig.player.snapshot().state, PlayerState::Loading(0));

    assert!(matches!(
        rig.player.pause().await,
        Err(PlayerError::Rejected { op: "pause", .. })
    ));
    assert!(matches!(
        rig.player.play().await,
        Err(PlayerError::Rejected { op: "play", .. })
    ));
    wait_for_state(&rig.player, PlayerState::Playing(0)).await;
}

#[tokio::test(start_paused = true)]
async fn next_is_rejected_on_last_paragraph() {
    let rig = rig(ScriptedSpeech::new());

    assert_ok!(rig.player.open(chapter(&["One.", "Two."]), 0).await);
    wait_for_state(&rig.player, PlayerState::Playing(0)).await;
    assert_ok!(rig.player.next().await);
    wait_for_state(&rig.player, PlayerState::Playing(1)).await;

    assert_err!(rig.player.next().await);
    assert_eq!(rig.player.snapshot().state, PlayerState::Playing(1));
    assert!(!rig.sounds.sound(Voice::default(), "One.").is_playing());
}

#[tokio::test(start_paused = true)]
async fn voice_change_reloads_current_paragraph_and_drops_old_voice() {
    let rig = rig(ScriptedSpeech::new());

    assert_ok!(
        rig.player
            .open_with(chapter(&["One.", "Two."]), 0, Voice::Guy, PlaybackSpeed::Normal)
            .await
    );
    wait_for_state(&rig.player, PlayerState::Playing(0)).await;
    wait_until_cached(&rig.cache, &CacheKey::new(Voice::Guy, "Two.", None)).await;
    let old = rig.sounds.sound(Voice::Guy, "One.");

    assert_ok!(rig.player.set_voice(Voice::Aria).await);
    let snapshot =
        wait_until(&rig.player, |s| s.voice == Voice::Aria && s.state == PlayerState::Playing(0))
            .await;
    settle().await;

    assert!(snapshot.is_playing);
    assert!(rig.sounds.sound(Voice::Aria, "One.").is_playing());
    assert!(!old.is_playing());
    assert!(!old.is_loaded());
    assert!(rig.cache.get(&CacheKey::new(Voice::Guy, "One.", None)).is_none());
    assert!(rig.cache.get(&CacheKey::new(Voice::Guy, "Two.", None)).is_none());
    assert!(
        rig.speech
            .requests()
            .contains(&("Two.".to_string(), Voice::Aria))
    );
}

#[tokio::test(start_paused = true)]
async fn old_voice_result_landing_late_is_discarded() {
    let rig = rig(ScriptedSpeech::new().with_delay(Duration::from_millis(500)));

    assert_ok!(
        rig.player
            .open_with(chapter(&["One.", "Two."]), 0, Voice::Guy, PlaybackSpeed::Normal)
            .await
    );
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_ok!(rig.player.set_voice(Voice::Aria).await);

    wait_until(&rig.player, |s| s.voice == Voice::Aria && s.state == PlayerState::Playing(0)).await;
    tokio::time::sleep(Duration::from_secs(2)).await;

    let playing: Vec<String> = rig
        .sounds
        .created()
        .iter()
        .filter(|s| s.is_playing())
        .filter_map(|s| s.label())
        .collect();
    assert_eq!(playing, vec![label(Voice::Aria, "One.")]);
    for sound in rig.sounds.created() {
        if sound.label().is_some_and(|l| l.starts_with(Voice::Guy.id())) {
            assert!(!sound.is_loaded());
            assert_eq!(sound.unload_count(), 1);
        }
    }
    assert_eq!(rig.player.snapshot().state, PlayerState::Playing(0));
}

#[tokio::test(start_paused = true)]
async fn empty_middle_paragraph_is_rejected_without_a_request() {
    let raw = vec![
        "Hello world.".to_string(),
        String::new(),
        "Second line.".to_string(),
    ];
    let mut rig = rig(ScriptedSpeech::new());

    assert_ok!(rig.player.open(Paragraphs::from_raw(raw.clone()), 0).await);
    wait_for_state(&rig.player, PlayerState::Playing(0)).await;
    rig.sounds.sound(Voice::default(), "Hello world.").finish();

    let snapshot = wait_until(&rig.player, |s| {
        matches!(s.state, PlayerState::Error { index: 1, .. })
    })
    .await;
    assert_eq!(snapshot.error, Some(PlayerError::EmptyInput));
    assert!(drain_events(&mut rig.events).contains(&PlayerEvent::Error(PlayerError::EmptyInput)));

    assert_ok!(rig.player.next().await);
    wait_for_state(&rig.player, PlayerState::Playing(2)).await;

    assert!(rig.speech.texts().iter().all(|t| !t.trim().is_empty()));
    assert_eq!(
        sorted(rig.speech.texts()),
        vec!["Hello world.", "Second line."]
    );

    // Filtered at ingestion the same chapter has two paragraphs.
    assert_eq!(Paragraphs::from_chapter(&raw).len(), 2);
}

#[tokio::test(start_paused = true)]
async fn prefetch_window_is_bounded_by_chapter_length() {
    let rig = rig_with(
        PlayerConfig::new().with_prefetch_window(4),
        ScriptedSpeech::new(),
    );

    assert_ok!(rig.player.open(chapter(&["Hello world.", "Second line."]), 0).await);
    wait_for_state(&rig.player, PlayerState::Playing(0)).await;
    settle().await;

    assert_eq!(rig.speech.requests().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn failed_load_surfaces_error_and_retry_recovers() {
    let mut rig = rig(ScriptedSpeech::new().failing_for(
        "One.",
        3,
        SpeechError::Server { status: 500 },
    ));

    assert_ok!(rig.player.open(chapter(&["One.", "Two."]), 0).await);
    let snapshot = wait_until(&rig.player, |s| {
        matches!(s.state, PlayerState::Error { index: 0, .. })
    })
    .await;

    assert_eq!(snapshot.error, Some(PlayerError::Server(500)));
    // First attempt plus two retries.
    assert_eq!(
        rig.speech.texts().iter().filter(|t| *t == "One.").count(),
        3
    );
    assert!(drain_events(&mut rig.events).contains(&PlayerEvent::Error(PlayerError::Server(500))));

    assert_ok!(rig.player.retry().await);
    let snapshot = wait_for_state(&rig.player, PlayerState::Playing(0)).await;
    assert_eq!(snapshot.error, None);
}

#[tokio::test(start_paused = true)]
async fn retry_is_rejected_without_an_error() {
    let rig = rig(ScriptedSpeech::new());

    assert_ok!(rig.player.open(chapter(&["One."]), 0).await);
    wait_for_state(&rig.player, PlayerState::Playing(0)).await;

    assert!(matches!(
        rig.player.retry().await,
        Err(PlayerError::Rejected { op: "retry", .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn stuck_transition_is_forced_into_error() {
    let rig = rig_with(
        PlayerConfig::new().with_sound_op_timeout(Duration::from_secs(30)),
        ScriptedSpeech::new(),
    );

    assert_ok!(rig.player.open(chapter(&["One.", "Two."]), 0).await);
    wait_for_state(&rig.player, PlayerState::Playing(0)).await;
    wait_until_cached(&rig.cache, &CacheKey::new(Voice::default(), "Two.", None)).await;

    // Rewinding the cached clip never completes.
    rig.sounds.hang_seeks(true);
    rig.sounds.sound(Voice::default(), "One.").finish();
    wait_for_state(
        &rig.player,
        PlayerState::Transitioning { from: 0, to: 1 },
    )
    .await;
    let started = tokio::time::Instant::now();

    let snapshot = wait_until(&rig.player, |s| {
        matches!(s.state, PlayerState::Error { index: 1, .. })
    })
    .await;
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_secs(5), "fired after {elapsed:?}");
    assert!(elapsed <= Duration::from_secs(7), "fired after {elapsed:?}");
    assert_eq!(snapshot.error, Some(PlayerError::StuckTransition));
    assert_eq!(
        snapshot.state,
        PlayerState::Error {
            index: 1,
            message: "playback stopped".to_string()
        }
    );

    // The hung load resolving later does not revive the transition.
    tokio::time::sleep(Duration::from_secs(40)).await;
    assert!(matches!(
        rig.player.snapshot().state,
        PlayerState::Error { index: 1, .. }
    ));

    rig.sounds.hang_seeks(false);
    assert_ok!(rig.player.retry().await);
    wait_for_state(&rig.player, PlayerState::Playing(1)).await;
}

#[tokio::test(start_paused = true)]
async fn failed_restart_silences_the_paragraph() {
    let rig = rig_with(
        PlayerConfig::new().with_sound_op_timeout(Duration::from_secs(1)),
        ScriptedSpeech::new(),
    );

    assert_ok!(rig.player.open(chapter(&["One.", "Two."]), 0).await);
    wait_for_state(&rig.player, PlayerState::Playing(0)).await;
    let sound = rig.sounds.sound(Voice::default(), "One.");

    rig.sounds.hang_seeks(true);
    assert_err!(rig.player.restart().await);

    let snapshot = rig.player.snapshot();
    assert!(matches!(snapshot.state, PlayerState::Error { index: 0, .. }));
    assert!(!snapshot.is_playing);
    assert!(!sound.is_playing());

    rig.sounds.hang_seeks(false);
    assert_ok!(rig.player.retry().await);
    wait_for_state(&rig.player, PlayerState::Playing(0)).await;
    assert!(rig.sounds.sound(Voice::default(), "One.").is_playing());
}

#[tokio::test(start_paused = true)]
async fn speed_change_applies_to_current_and_future_sounds() {
    let rig = rig(ScriptedSpeech::new());

    assert_ok!(rig.player.open(chapter(&["One.", "Two."]), 0).await);
    wait_for_state(&rig.player, PlayerState::Playing(0)).await;

    assert_ok!(rig.player.set_speed(PlaybackSpeed::OneAndHalf).await);
    let current = rig.sounds.sound(Voice::default(), "One.");
    assert!((current.rate() - 1.5).abs() < f32::EPSILON);
    assert_eq!(rig.player.snapshot().speed, PlaybackSpeed::OneAndHalf);

    current.finish();
    wait_for_state(&rig.player, PlayerState::Playing(1)).await;
    let next = rig.sounds.sound(Voice::default(), "Two.");
    assert!((next.rate() - 1.5).abs() < f32::EPSILON);
}

#[tokio::test(start_paused = true)]
async fn close_releases_every_sound_and_ignores_late_results() {
    let rig = rig(ScriptedSpeech::new());

    assert_ok!(rig.player.open(chapter(&["One.", "Two.", "Three."]), 0).await);
    wait_for_state(&rig.player, PlayerState::Playing(0)).await;
    settle().await;

    assert_ok!(rig.player.close().await);
    settle().await;

    assert!(rig.cache.is_empty());
    for sound in rig.sounds.created() {
        assert!(!sound.is_loaded());
        assert!(!sound.is_playing());
    }
    assert_eq!(rig.player.snapshot().state, PlayerState::Idle);
    assert_eq!(rig.player.play().await, Err(PlayerError::Closed));
}

#[tokio::test(start_paused = true)]
async fn close_during_load_releases_the_late_sound() {
    let rig = rig(ScriptedSpeech::new().with_delay(Duration::from_secs(1)));

    assert_ok!(rig.player.open(chapter(&["One.", "Two."]), 0).await);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_ok!(rig.player.close().await);
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert!(rig.cache.is_empty());
    for sound in rig.sounds.created() {
        assert!(!sound.is_playing());
        assert!(!sound.is_loaded());
    }
}
