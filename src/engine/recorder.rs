//! Gesture recorder
//!
//! Pairs raw pointer down/up samples into classified gesture events.
//! The recorder is not path-aware: everything between down and up is
//! ignored, and classification uses only the endpoints and elapsed
//! time.

use std::time::Instant;

use crate::data::{GestureEvent, TouchPhase, TouchSample};

/// Touches held at least this long (ms) without moving classify as long-press
const TAP_TIMEOUT_MS: u64 = 300;

/// Touches travelling at least this far classify as swipe
const TOUCH_SLOP: f32 = 10.0;

#[derive(Debug, Clone, Copy)]
struct DownState {
    at: Instant,
    x: f32,
    y: f32,
}

/// Converts raw pointer samples into a timestamped gesture sequence
#[derive(Debug, Default)]
pub struct GestureRecorder {
    events: Vec<GestureEvent>,
    origin: Option<Instant>,
    down: Option<DownState>,
}

impl GestureRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new recording session: clears the buffer and captures
    /// the session origin. The engine guarantees this is only called
    /// from the Idle state.
    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    fn start_at(&mut self, origin: Instant) {
        self.events.clear();
        self.origin = Some(origin);
        self.down = None;
    }

    /// Consume one raw pointer sample
    ///
    /// Samples before `start()`, and up samples with no pending down,
    /// are silently ignored.
    pub fn observe(&mut self, sample: TouchSample) {
        let Some(origin) = self.origin else {
            return;
        };

        match sample.phase {
            TouchPhase::Down => {
                self.down = Some(DownState {
                    at: sample.time,
                    x: sample.x,
                    y: sample.y,
                });
            }
            TouchPhase::Up => {
                let Some(down) = self.down.take() else {
                    return;
                };

                let elapsed = sample.time.duration_since(down.at).as_millis() as u64;
                let distance = (sample.x - down.x).hypot(sample.y - down.y);
                let timestamp = down.at.duration_since(origin).as_millis() as u64;

                let event = if distance >= TOUCH_SLOP {
                    GestureEvent::Swipe {
                        timestamp,
                        x: down.x,
                        y: down.y,
                        end_x: sample.x,
                        end_y: sample.y,
                        duration: elapsed,
                    }
                } else if elapsed >= TAP_TIMEOUT_MS {
                    GestureEvent::LongPress {
                        timestamp,
                        x: down.x,
                        y: down.y,
                        duration: elapsed,
                    }
                } else {
                    GestureEvent::Tap {
                        timestamp,
                        x: down.x,
                        y: down.y,
                    }
                };

                self.events.push(event);
            }
        }
    }

    /// Snapshot the recorded sequence. The buffer is kept until the
    /// next `start()` overwrites it.
    pub fn stop(&self) -> Vec<GestureEvent> {
        self.events.clone()
    }
}
