//! Gesture playback
//!
//! Replays either a fixed tap pattern at a uniform interval or a
//! recorded sequence with its original inter-gesture timing. Playback
//! is cooperative: cancellation is checked before every dispatch and
//! every inter-gesture pause races against the cancellation token, so
//! a cancel requested mid-wait is honored without dispatching again.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::data::{GestureEvent, GesturePoint, TapConfig, TaskMode};
use crate::dispatch::{GestureDescriptor, GestureDispatch};

/// Replays gestures through an injection capability
#[derive(Clone)]
pub struct GesturePlayer {
    dispatch: Arc<dyn GestureDispatch>,
    touched_tx: broadcast::Sender<GesturePoint>,
}

impl GesturePlayer {
    pub fn new(
        dispatch: Arc<dyn GestureDispatch>,
        touched_tx: broadcast::Sender<GesturePoint>,
    ) -> Self {
        Self {
            dispatch,
            touched_tx,
        }
    }

    /// Run one playback. Returns when the mode is exhausted (non-looping
    /// recording), the mode is empty, or cancellation is observed.
    pub async fn play(&self, mode: TaskMode, cancel: &CancellationToken) {
        match mode {
            TaskMode::QuickTap(config) => self.play_quick_tap(&config, cancel).await,
            TaskMode::Recording { events, looped } => {
                self.play_recording(&events, looped, cancel).await
            }
        }
    }

    /// Cycle the point list forever; cancellation is the only exit.
    async fn play_quick_tap(&self, config: &TapConfig, cancel: &CancellationToken) {
        if config.points.is_empty() {
            return;
        }

        let interval = Duration::from_millis(config.interval_ms);
        loop {
            for point in &config.points {
                if cancel.is_cancelled() {
                    return;
                }
                self.dispatch_one(&GestureDescriptor::tap(point.x, point.y), *point)
                    .await;
                if self.pause(interval, cancel).await {
                    return;
                }
            }
        }
    }

    /// Replay a recorded sequence, reconstructing the original gaps
    /// from event timestamps; repeat indefinitely when looped.
    async fn play_recording(
        &self,
        events: &[GestureEvent],
        looped: bool,
        cancel: &CancellationToken,
    ) {
        if events.is_empty() {
            return;
        }

        loop {
            let mut previous_timestamp = 0u64;
            for event in events {
                if cancel.is_cancelled() {
                    return;
                }

                let wait = event.timestamp().saturating_sub(previous_timestamp);
                if wait > 0 && self.pause(Duration::from_millis(wait), cancel).await {
                    return;
                }

                let gesture = match *event {
                    GestureEvent::Tap { x, y, .. } => GestureDescriptor::tap(x, y),
                    GestureEvent::LongPress { x, y, duration, .. } => {
                        GestureDescriptor::long_press(x, y, duration)
                    }
                    GestureEvent::Swipe {
                        x,
                        y,
                        end_x,
                        end_y,
                        duration,
                        ..
                    } => GestureDescriptor::swipe(x, y, end_x, end_y, duration),
                };

                self.dispatch_one(&gesture, event.start_point()).await;
                previous_timestamp = event.timestamp();
            }

            if !looped {
                return;
            }
        }
    }

    /// Dispatch one gesture and notify touch observers. A rejected
    /// dispatch is a per-gesture failure: logged, never fatal.
    async fn dispatch_one(&self, gesture: &GestureDescriptor, point: GesturePoint) {
        if !self.dispatch.dispatch(gesture).await {
            debug!(
                "gesture dispatch rejected at ({}, {})",
                gesture.start.x, gesture.start.y
            );
        }
        let _ = self.touched_tx.send(point);
    }

    /// Sleep for `wait`, returning true if cancellation won the race
    async fn pause(&self, wait: Duration, cancel: &CancellationToken) -> bool {
        tokio::select! {
            _ = cancel.cancelled() => true,
            _ = tokio::time::sleep(wait) => false,
        }
    }
}
