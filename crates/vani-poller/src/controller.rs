use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use vani_core::{DashboardState, History, PollError, StatusSnapshot};

use crate::traits::{AudioOut, SpeechSource, StatusSource};

/// The poll/playback/history loop.
///
/// Owns all mutable session state: the current snapshot, the rolling
/// history and the last sentence whose playback actually started. Ticks
/// run sequentially on one task, so a request slower than the cadence
/// delays the next tick instead of racing it.
pub struct PollController {
    status: Arc<dyn StatusSource>,
    speech: Arc<dyn SpeechSource>,
    out: Arc<dyn AudioOut>,
    state_tx: watch::Sender<DashboardState>,
    interval: Duration,
    history: History,
    last_spoken: String,
    state: DashboardState,
}

impl PollController {
    pub fn new(
        status: Arc<dyn StatusSource>,
        speech: Arc<dyn SpeechSource>,
        out: Arc<dyn AudioOut>,
        state_tx: watch::Sender<DashboardState>,
        interval: Duration,
        history_capacity: usize,
    ) -> Self {
        Self {
            status,
            speech,
            out,
            state_tx,
            interval,
            history: History::new(history_capacity),
            last_spoken: String::new(),
            state: DashboardState::default(),
        }
    }

    /// Run until the shutdown signal fires. An in-flight poll that loses
    /// the shutdown race is discarded, never applied.
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let status = Arc::clone(&self.status);
                    tokio::select! {
                        result = status.latest() => {
                            self.apply_poll(result, &local_time()).await;
                        }
                        _ = shutdown_rx.changed() => break,
                    }
                }
                _ = shutdown_rx.changed() => break,
            }
        }

        tracing::debug!("poll loop stopped after {} ticks", self.state.polls);
    }

    /// Process one poll tick. Every failure is absorbed here; the loop
    /// never sees an error.
    pub async fn poll_once(&mut self) {
        let result = self.status.latest().await;
        self.apply_poll(result, &local_time()).await;
    }

    async fn apply_poll(&mut self, result: Result<StatusSnapshot, PollError>, timestamp: &str) {
        self.state.polls += 1;

        match result {
            Ok(snapshot) => {
                self.history.observe(&snapshot.sentence, timestamp);

                let wants_playback = !snapshot.sentence.is_empty()
                    && snapshot.sentence != self.last_spoken;
                if wants_playback {
                    // A disabled output skips the fetch and leaves
                    // last_spoken alone, so the sentence can still play
                    // once playback is re-enabled.
                    if self.out.is_enabled() {
                        self.trigger_playback(snapshot.sentence.clone()).await;
                    } else {
                        tracing::debug!("playback disabled, not fetching audio");
                    }
                }

                // Snapshot replaced wholesale; failures above never get here.
                self.state.snapshot = snapshot;
                self.state.link_up = true;
                self.state.last_error = None;
            }
            Err(e) => {
                tracing::warn!("poll failed: {}", e);
                self.state.link_up = false;
                self.state.last_error = Some(e.to_string());
            }
        }

        self.broadcast();
    }

    /// Fetch and start the synthesized clip for a newly decoded sentence.
    /// `last_spoken` advances only once playback has started, so a failed
    /// fetch retries on the next tick while the sentence persists.
    async fn trigger_playback(&mut self, sentence: String) {
        match self.speech.fetch_speech().await {
            Ok(clip) => match self.out.play(clip) {
                Ok(()) => {
                    tracing::info!("playing response for: {}", sentence);
                    self.last_spoken = sentence;
                }
                Err(e) => {
                    tracing::warn!("audio playback error: {}", e);
                }
            },
            Err(e) => {
                tracing::warn!("audio fetch error: {}", e);
            }
        }
    }

    fn broadcast(&mut self) {
        self.state.history = self.history.to_vec();
        self.state.playback_enabled = self.out.is_enabled();
        // Send failure means the TUI is gone; the shutdown signal will
        // stop the loop shortly.
        let _ = self.state_tx.send(self.state.clone());
    }
}

fn local_time() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use vani_audio::AudioClip;
    use vani_core::PlaybackError;

    struct ScriptedStatus {
        responses: Mutex<VecDeque<Result<StatusSnapshot, PollError>>>,
    }

    impl ScriptedStatus {
        fn new(responses: Vec<Result<StatusSnapshot, PollError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
            })
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedStatus {
        async fn latest(&self) -> Result<StatusSnapshot, PollError> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(PollError::Http("script exhausted".to_string())))
        }
    }

    struct FakeSpeech {
        fetches: AtomicUsize,
        fail_first: AtomicBool,
    }

    impl FakeSpeech {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                fetches: AtomicUsize::new(0),
                fail_first: AtomicBool::new(false),
            })
        }

        fn failing_once() -> Arc<Self> {
            Arc::new(Self {
                fetches: AtomicUsize::new(0),
                fail_first: AtomicBool::new(true),
            })
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SpeechSource for FakeSpeech {
        async fn fetch_speech(&self) -> Result<AudioClip, PlaybackError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_first.swap(false, Ordering::SeqCst) {
                return Err(PlaybackError::Http("tts unavailable".to_string()));
            }
            Ok(AudioClip {
                samples: vec![0.0; 16],
                sample_rate: 16000,
                channels: 1,
            })
        }
    }

    struct RecordingOut {
        plays: AtomicUsize,
        enabled: AtomicBool,
    }

    impl RecordingOut {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                plays: AtomicUsize::new(0),
                enabled: AtomicBool::new(true),
            })
        }

        fn play_count(&self) -> usize {
            self.plays.load(Ordering::SeqCst)
        }

        fn set_enabled(&self, v: bool) {
            self.enabled.store(v, Ordering::SeqCst);
        }
    }

    impl AudioOut for RecordingOut {
        fn play(&self, _clip: AudioClip) -> Result<(), PlaybackError> {
            self.plays.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn is_enabled(&self) -> bool {
            self.enabled.load(Ordering::SeqCst)
        }
    }

    /// Signals when `latest()` has been entered, then blocks until
    /// released.
    struct GatedStatus {
        started_tx: tokio::sync::mpsc::UnboundedSender<()>,
        release: tokio::sync::Notify,
    }

    impl GatedStatus {
        fn new() -> (Arc<Self>, tokio::sync::mpsc::UnboundedReceiver<()>) {
            let (started_tx, started_rx) = tokio::sync::mpsc::unbounded_channel();
            (
                Arc::new(Self {
                    started_tx,
                    release: tokio::sync::Notify::new(),
                }),
                started_rx,
            )
        }
    }

    #[async_trait]
    impl StatusSource for GatedStatus {
        async fn latest(&self) -> Result<StatusSnapshot, PollError> {
            let _ = self.started_tx.send(());
            self.release.notified().await;
            Ok(snap("late"))
        }
    }

    fn snap(sentence: &str) -> StatusSnapshot {
        StatusSnapshot {
            sentence: sentence.to_string(),
            prediction: "0".to_string(),
            confidence: 0.5,
            wave: vec![0.1, 0.2],
        }
    }

    fn make_controller(
        responses: Vec<Result<StatusSnapshot, PollError>>,
        speech: Arc<FakeSpeech>,
        out: Arc<RecordingOut>,
    ) -> (PollController, watch::Receiver<DashboardState>) {
        let (state_tx, state_rx) = watch::channel(DashboardState::default());
        let controller = PollController::new(
            ScriptedStatus::new(responses),
            speech,
            out,
            state_tx,
            Duration::from_millis(10),
            20,
        );
        (controller, state_rx)
    }

    #[tokio::test]
    async fn test_empty_sentence_leaves_history_and_skips_playback() {
        let speech = FakeSpeech::new();
        let out = RecordingOut::new();
        let (mut c, state_rx) = make_controller(
            vec![Ok(snap("")), Ok(snap(""))],
            Arc::clone(&speech),
            Arc::clone(&out),
        );

        c.poll_once().await;
        c.poll_once().await;

        let state = state_rx.borrow().clone();
        assert!(state.history.is_empty());
        assert_eq!(speech.fetch_count(), 0);
        assert_eq!(out.play_count(), 0);
        assert!(state.link_up);
    }

    #[tokio::test]
    async fn test_repeat_sentence_triggers_playback_once() {
        let speech = FakeSpeech::new();
        let out = RecordingOut::new();
        let (mut c, _state_rx) = make_controller(
            vec![Ok(snap("hello")), Ok(snap("hello")), Ok(snap("world"))],
            Arc::clone(&speech),
            Arc::clone(&out),
        );

        c.poll_once().await;
        c.poll_once().await;
        c.poll_once().await;

        // "hello" once, "world" once — the duplicate is suppressed.
        assert_eq!(out.play_count(), 2);
        assert_eq!(speech.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_repeat_sentence_still_recorded_in_history() {
        let speech = FakeSpeech::new();
        let out = RecordingOut::new();
        let (mut c, state_rx) = make_controller(
            vec![Ok(snap("hello")), Ok(snap("hello"))],
            speech,
            out,
        );

        c.poll_once().await;
        c.poll_once().await;

        assert_eq!(state_rx.borrow().history.len(), 2);
    }

    #[tokio::test]
    async fn test_history_never_exceeds_capacity() {
        let responses: Vec<_> = (0..30).map(|i| Ok(snap(&format!("s{}", i)))).collect();
        let speech = FakeSpeech::new();
        let out = RecordingOut::new();
        let (mut c, state_rx) = make_controller(responses, speech, out);

        for _ in 0..30 {
            c.poll_once().await;
        }

        let history = state_rx.borrow().history.clone();
        assert_eq!(history.len(), 20);
        // Newest first, oldest evicted.
        assert_eq!(history[0].text, "s29");
        assert_eq!(history[19].text, "s10");
    }

    #[tokio::test]
    async fn test_poll_failure_retains_previous_snapshot() {
        let speech = FakeSpeech::new();
        let out = RecordingOut::new();
        let (mut c, state_rx) = make_controller(
            vec![
                Ok(snap("stable")),
                Err(PollError::Http("connection refused".to_string())),
            ],
            speech,
            out,
        );

        c.poll_once().await;
        let before = state_rx.borrow().snapshot.clone();

        c.poll_once().await;
        let state = state_rx.borrow().clone();
        assert_eq!(state.snapshot, before);
        assert!(!state.link_up);
        assert!(state.last_error.unwrap().contains("connection refused"));
        assert_eq!(state.polls, 2);
    }

    #[tokio::test]
    async fn test_first_poll_failure_keeps_default_snapshot() {
        let speech = FakeSpeech::new();
        let out = RecordingOut::new();
        let (mut c, state_rx) = make_controller(
            vec![Err(PollError::Status(503))],
            speech,
            out,
        );

        c.poll_once().await;
        let state = state_rx.borrow().clone();
        assert_eq!(state.snapshot, StatusSnapshot::default());
        assert!(!state.link_up);
    }

    #[tokio::test]
    async fn test_failed_audio_fetch_retries_while_sentence_persists() {
        let speech = FakeSpeech::failing_once();
        let out = RecordingOut::new();
        let (mut c, _state_rx) = make_controller(
            vec![Ok(snap("hello")), Ok(snap("hello"))],
            Arc::clone(&speech),
            Arc::clone(&out),
        );

        // First fetch fails — last_spoken must not advance.
        c.poll_once().await;
        assert_eq!(out.play_count(), 0);

        // Same sentence again: retried, now succeeds.
        c.poll_once().await;
        assert_eq!(speech.fetch_count(), 2);
        assert_eq!(out.play_count(), 1);
    }

    #[tokio::test]
    async fn test_poll_failure_does_not_touch_history() {
        let speech = FakeSpeech::new();
        let out = RecordingOut::new();
        let (mut c, state_rx) = make_controller(
            vec![
                Ok(snap("kept")),
                Err(PollError::Malformed("missing field".to_string())),
            ],
            speech,
            out,
        );

        c.poll_once().await;
        c.poll_once().await;

        assert_eq!(state_rx.borrow().history.len(), 1);
    }

    #[tokio::test]
    async fn test_disabled_output_defers_playback_until_reenabled() {
        let speech = FakeSpeech::new();
        let out = RecordingOut::new();
        out.set_enabled(false);
        let (mut c, _state_rx) = make_controller(
            vec![Ok(snap("hello")), Ok(snap("hello"))],
            Arc::clone(&speech),
            Arc::clone(&out),
        );

        // Muted: no fetch, last_spoken untouched.
        c.poll_once().await;
        assert_eq!(speech.fetch_count(), 0);
        assert_eq!(out.play_count(), 0);

        // Re-enabled: the still-current sentence plays.
        out.set_enabled(true);
        c.poll_once().await;
        assert_eq!(speech.fetch_count(), 1);
        assert_eq!(out.play_count(), 1);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let speech = FakeSpeech::new();
        let out = RecordingOut::new();
        let (c, _state_rx) = make_controller(vec![Ok(snap("x"))], speech, out);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(c.run(shutdown_rx));

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("run did not stop on shutdown")
            .unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_discards_in_flight_poll() {
        let (status, mut started_rx) = GatedStatus::new();
        let speech = FakeSpeech::new();
        let out = RecordingOut::new();
        let (state_tx, state_rx) = watch::channel(DashboardState::default());
        let c = PollController::new(
            status.clone(),
            speech,
            out,
            state_tx,
            Duration::from_millis(10),
            20,
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(c.run(shutdown_rx));

        // Wait until a poll is in flight, then shut down before it
        // completes.
        tokio::time::timeout(Duration::from_secs(2), started_rx.recv())
            .await
            .expect("poll never started");
        shutdown_tx.send(true).unwrap();
        status.release.notify_one();

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("run did not stop on shutdown")
            .unwrap();

        // The late response was dropped, never applied or broadcast.
        let state = state_rx.borrow().clone();
        assert_eq!(state.polls, 0);
        assert!(state.history.is_empty());
        assert_eq!(state.snapshot, StatusSnapshot::default());
    }

    #[tokio::test]
    async fn test_run_broadcasts_states() {
        let responses: Vec<_> = (0..3).map(|i| Ok(snap(&format!("s{}", i)))).collect();
        let speech = FakeSpeech::new();
        let out = RecordingOut::new();
        let (c, mut state_rx) = make_controller(responses, speech, out);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(c.run(shutdown_rx));

        // Wait until at least two polls have been published.
        for _ in 0..2 {
            tokio::time::timeout(Duration::from_secs(2), state_rx.changed())
                .await
                .expect("no state update")
                .unwrap();
        }
        assert!(state_rx.borrow().polls >= 2);

        shutdown_tx.send(true).unwrap();
        let _ = tokio::time::timeout(Duration::from_secs(2), handle).await;
    }
}
