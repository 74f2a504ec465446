//! Engine controller
//!
//! Owns the Idle/Recording/Playing state machine. Every transition
//! funnels through one method here, so the invariants (single source
//! of truth, at most one playback task) are enforced in one place.
//! State is published through a watch channel; UI collaborators react
//! to changes instead of polling.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::data::{GestureEvent, GesturePoint, TaskMode, TouchSample};
use crate::dispatch::GestureDispatch;
use crate::input::TouchSource;

use super::{EngineCommand, EngineState, GesturePlayer, GestureRecorder};

/// A running playback task
struct Playback {
    token: CancellationToken,
    _handle: JoinHandle<()>,
}

/// Resets the published state to Idle when the playback task exits,
/// whether it completed, was cancelled, or panicked.
struct IdleGuard(Arc<watch::Sender<EngineState>>);

impl Drop for IdleGuard {
    fn drop(&mut self) {
        self.0.send_replace(EngineState::Idle);
    }
}

/// The gesture capture-and-replay controller
pub struct GestureEngine {
    state_tx: Arc<watch::Sender<EngineState>>,
    touched_tx: broadcast::Sender<GesturePoint>,
    recorder: GestureRecorder,
    player: GesturePlayer,
    /// Last completed recording; overwritten by each new session
    recorded: Vec<GestureEvent>,
    playback: Option<Playback>,
    touch_source: Box<dyn TouchSource>,
    cmd_rx: mpsc::Receiver<EngineCommand>,
}

impl GestureEngine {
    pub fn new(
        dispatch: Arc<dyn GestureDispatch>,
        touch_source: Box<dyn TouchSource>,
        cmd_rx: mpsc::Receiver<EngineCommand>,
    ) -> Self {
        let (state_tx, _) = watch::channel(EngineState::Idle);
        let (touched_tx, _) = broadcast::channel(64);
        let player = GesturePlayer::new(dispatch, touched_tx.clone());

        Self {
            state_tx: Arc::new(state_tx),
            touched_tx,
            recorder: GestureRecorder::new(),
            player,
            recorded: Vec::new(),
            playback: None,
            touch_source,
            cmd_rx,
        }
    }

    /// Subscribe to engine state changes
    pub fn state(&self) -> watch::Receiver<EngineState> {
        self.state_tx.subscribe()
    }

    /// Subscribe to per-dispatch touch feedback
    pub fn subscribe_touches(&self) -> broadcast::Receiver<GesturePoint> {
        self.touched_tx.subscribe()
    }

    /// The last completed recording
    pub fn last_recording(&self) -> &[GestureEvent] {
        &self.recorded
    }

    fn current_state(&self) -> EngineState {
        *self.state_tx.borrow()
    }

    /// Idle -> Recording; no-op in any other state
    pub fn start_recording(&mut self) {
        if self.current_state() != EngineState::Idle {
            debug!("start_recording ignored outside Idle");
            return;
        }
        self.recorder.start();
        self.state_tx.send_replace(EngineState::Recording);
        info!("Recording started");
    }

    /// Recording -> Idle, keeping the captured sequence; no-op otherwise
    pub fn stop_recording(&mut self) {
        if self.current_state() != EngineState::Recording {
            debug!("stop_recording ignored outside Recording");
            return;
        }
        self.recorded = self.recorder.stop();
        self.state_tx.send_replace(EngineState::Idle);
        info!("Recording stopped with {} events", self.recorded.len());
    }

    /// Idle -> Playing, spawning the playback task; no-op in any other
    /// state. An empty mode never enters Playing.
    pub fn start_playing(&mut self, mode: TaskMode) {
        if self.current_state() != EngineState::Idle {
            debug!("start_playing ignored outside Idle");
            return;
        }
        if mode.is_empty() {
            debug!("start_playing ignored for empty mode");
            return;
        }

        self.state_tx.send_replace(EngineState::Playing);
        info!("Playback started");

        let token = CancellationToken::new();
        let player = self.player.clone();
        let state_tx = self.state_tx.clone();
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            let _reset = IdleGuard(state_tx);
            player.play(mode, &task_token).await;
        });

        self.playback = Some(Playback {
            token,
            _handle: handle,
        });
    }

    /// Request cancellation of the playback task. Always legal; a
    /// no-op when nothing is running. The task observes the request at
    /// its next checkpoint and resets the state itself.
    pub fn stop_playing(&mut self) {
        if let Some(playback) = self.playback.take() {
            playback.token.cancel();
            info!("Playback cancellation requested");
        }
    }

    /// Forward a raw touch sample to the recorder while Recording
    fn observe_sample(&mut self, sample: TouchSample) {
        if self.current_state() == EngineState::Recording {
            self.recorder.observe(sample);
        }
    }

    fn handle_command(&mut self, cmd: EngineCommand) -> bool {
        match cmd {
            EngineCommand::StartRecording => self.start_recording(),
            EngineCommand::StopRecording => self.stop_recording(),
            EngineCommand::PlayQuickTap(config) => {
                self.start_playing(TaskMode::QuickTap(config));
            }
            EngineCommand::PlayRecording { looped } => {
                let events = self.recorded.clone();
                self.start_playing(TaskMode::Recording { events, looped });
            }
            EngineCommand::StopPlaying => self.stop_playing(),
            EngineCommand::Shutdown => return false,
        }
        true
    }

    /// Run the engine loop: commands from the UI, raw samples from the
    /// touch source. Returns after a Shutdown command.
    pub async fn run(mut self) -> Result<()> {
        info!("Gesture engine starting");

        let (sample_tx, mut sample_rx) = mpsc::unbounded_channel();
        self.touch_source.start(sample_tx)?;

        loop {
            tokio::select! {
                Some(cmd) = self.cmd_rx.recv() => {
                    if !self.handle_command(cmd) {
                        break;
                    }
                }
                Some(sample) = sample_rx.recv() => {
                    self.observe_sample(sample);
                }
                else => break,
            }
        }

        self.stop_playing();
        self.touch_source.stop();
        info!("Gesture engine shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{TapConfig, TouchPhase};
    use crate::dispatch::GestureDescriptor;
    use crate::input::InputError;
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    struct NullSource;

    impl TouchSource for NullSource {
        fn start(
            &mut self,
            _tx: mpsc::UnboundedSender<TouchSample>,
        ) -> std::result::Result<(), InputError> {
            Ok(())
        }

        fn stop(&mut self) {}

        fn is_capturing(&self) -> bool {
            false
        }
    }

    struct CountingDispatch {
        calls: AtomicUsize,
    }

    impl CountingDispatch {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }

        fn count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl GestureDispatch for CountingDispatch {
        fn dispatch(&self, _gesture: &GestureDescriptor) -> BoxFuture<'static, bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(true).boxed()
        }
    }

    fn engine(dispatch: Arc<CountingDispatch>) -> GestureEngine {
        let (_cmd_tx, cmd_rx) = super::super::create_command_channel();
        GestureEngine::new(dispatch, Box::new(NullSource), cmd_rx)
    }

    fn sample(phase: TouchPhase, x: f32, y: f32, at: Instant) -> TouchSample {
        TouchSample {
            phase,
            x,
            y,
            time: at,
        }
    }

    fn one_point_mode(interval_ms: u64) -> TaskMode {
        TaskMode::QuickTap(TapConfig {
            points: vec![GesturePoint::new(10.0, 10.0)],
            interval_ms,
        })
    }

    #[tokio::test]
    async fn recording_lifecycle_keeps_one_session() {
        let mut engine = engine(CountingDispatch::new());
        assert_eq!(*engine.state().borrow(), EngineState::Idle);

        engine.start_recording();
        assert_eq!(*engine.state().borrow(), EngineState::Recording);

        let t = Instant::now();
        engine.observe_sample(sample(TouchPhase::Down, 1.0, 1.0, t));
        engine.observe_sample(sample(TouchPhase::Up, 1.0, 1.0, t + Duration::from_millis(50)));

        // Second start while Recording is a no-op, not a restart.
        engine.start_recording();

        engine.stop_recording();
        assert_eq!(*engine.state().borrow(), EngineState::Idle);
        assert_eq!(engine.last_recording().len(), 1);
    }

    #[tokio::test]
    async fn stop_recording_outside_recording_is_noop() {
        let mut engine = engine(CountingDispatch::new());
        engine.stop_recording();
        assert_eq!(*engine.state().borrow(), EngineState::Idle);
        assert!(engine.last_recording().is_empty());
    }

    #[tokio::test]
    async fn samples_outside_recording_are_dropped() {
        let mut engine = engine(CountingDispatch::new());
        let t = Instant::now();
        engine.observe_sample(sample(TouchPhase::Down, 1.0, 1.0, t));
        engine.observe_sample(sample(TouchPhase::Up, 1.0, 1.0, t + Duration::from_millis(50)));

        engine.start_recording();
        engine.stop_recording();
        assert!(engine.last_recording().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_playing_is_rejected() {
        let dispatch = CountingDispatch::new();
        let mut engine = engine(dispatch.clone());

        engine.start_playing(one_point_mode(100));
        assert_eq!(*engine.state().borrow(), EngineState::Playing);

        // Were this accepted, a second cadence would interleave and
        // double the call count.
        engine.start_playing(one_point_mode(10));

        tokio::time::sleep(Duration::from_millis(250)).await;
        engine.stop_playing();

        let mut state = engine.state();
        state
            .wait_for(|s| *s == EngineState::Idle)
            .await
            .unwrap();

        assert_eq!(dispatch.count(), 3, "one cadence: t=0, 100, 200");
    }

    #[tokio::test(start_paused = true)]
    async fn non_looping_playback_returns_to_idle_on_its_own() {
        let dispatch = CountingDispatch::new();
        let mut engine = engine(dispatch.clone());

        engine.start_playing(TaskMode::Recording {
            events: vec![
                GestureEvent::Tap {
                    timestamp: 0,
                    x: 1.0,
                    y: 1.0,
                },
                GestureEvent::Swipe {
                    timestamp: 500,
                    x: 0.0,
                    y: 0.0,
                    end_x: 50.0,
                    end_y: 0.0,
                    duration: 1200,
                },
            ],
            looped: false,
        });

        let mut state = engine.state();
        state
            .wait_for(|s| *s == EngineState::Idle)
            .await
            .unwrap();
        assert_eq!(dispatch.count(), 2);

        // Nothing dispatches after completion.
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(dispatch.count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn looping_playback_stays_playing_between_passes() {
        let dispatch = CountingDispatch::new();
        let mut engine = engine(dispatch.clone());

        engine.start_playing(TaskMode::Recording {
            events: vec![GestureEvent::Tap {
                timestamp: 0,
                x: 1.0,
                y: 1.0,
            }],
            looped: true,
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(*engine.state().borrow(), EngineState::Playing);
        assert!(dispatch.count() >= 1);

        engine.stop_playing();
        let mut state = engine.state();
        state
            .wait_for(|s| *s == EngineState::Idle)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn stop_playing_when_idle_is_noop() {
        let mut engine = engine(CountingDispatch::new());
        engine.stop_playing();
        engine.stop_playing();
        assert_eq!(*engine.state().borrow(), EngineState::Idle);
    }

    #[tokio::test]
    async fn empty_mode_never_enters_playing() {
        let dispatch = CountingDispatch::new();
        let mut engine = engine(dispatch.clone());

        engine.start_playing(TaskMode::QuickTap(TapConfig {
            points: Vec::new(),
            interval_ms: 100,
        }));
        assert_eq!(*engine.state().borrow(), EngineState::Idle);

        engine.start_playing(TaskMode::Recording {
            events: Vec::new(),
            looped: true,
        });
        assert_eq!(*engine.state().borrow(), EngineState::Idle);
        assert_eq!(dispatch.count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn recording_is_rejected_while_playing() {
        let mut engine = engine(CountingDispatch::new());

        engine.start_playing(one_point_mode(100));
        engine.start_recording();
        assert_eq!(*engine.state().borrow(), EngineState::Playing);

        engine.stop_playing();
        let mut state = engine.state();
        state
            .wait_for(|s| *s == EngineState::Idle)
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn playback_restarts_after_natural_completion() {
        let dispatch = CountingDispatch::new();
        let mut engine = engine(dispatch.clone());

        let mode = TaskMode::Recording {
            events: vec![GestureEvent::Tap {
                timestamp: 0,
                x: 1.0,
                y: 1.0,
            }],
            looped: false,
        };

        engine.start_playing(mode.clone());
        let mut state = engine.state();
        state
            .wait_for(|s| *s == EngineState::Idle)
            .await
            .unwrap();

        engine.start_playing(mode);
        state
            .wait_for(|s| *s == EngineState::Idle)
            .await
            .unwrap();

        assert_eq!(dispatch.count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_drives_commands_and_samples() {
        let dispatch = CountingDispatch::new();
        let (cmd_tx, cmd_rx) = super::super::create_command_channel();
        let engine = GestureEngine::new(dispatch.clone(), Box::new(NullSource), cmd_rx);
        let state = engine.state();

        let engine_task = tokio::spawn(engine.run());

        cmd_tx
            .send(EngineCommand::PlayQuickTap(TapConfig {
                points: vec![GesturePoint::new(1.0, 1.0)],
                interval_ms: 100,
            }))
            .await
            .unwrap();

        let mut state_rx = state.clone();
        state_rx
            .wait_for(|s| *s == EngineState::Playing)
            .await
            .unwrap();

        cmd_tx.send(EngineCommand::StopPlaying).await.unwrap();
        let mut state_rx = state.clone();
        state_rx
            .wait_for(|s| *s == EngineState::Idle)
            .await
            .unwrap();

        cmd_tx.send(EngineCommand::Shutdown).await.unwrap();
        engine_task.await.unwrap().unwrap();
        assert!(dispatch.count() >= 1);
    }
}
