//! rdev-based gesture injection backend
//! Works on Windows, macOS, and Linux (X11)

use futures::future::BoxFuture;
use futures::FutureExt;
use std::time::Duration;
use tracing::debug;

use super::{GestureDescriptor, GestureDispatch};

/// Interval between interpolated move steps while swiping
const SWIPE_STEP_MS: u64 = 10;

/// Injects gestures by simulating mouse input through rdev
pub struct RdevDispatch;

impl RdevDispatch {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RdevDispatch {
    fn default() -> Self {
        Self::new()
    }
}

fn simulate(event: &rdev::EventType) -> bool {
    match rdev::simulate(event) {
        Ok(()) => true,
        Err(e) => {
            debug!("rdev simulate failed: {:?}", e);
            false
        }
    }
}

/// Runs one full press-move-release stroke. Blocking; called from a
/// blocking task.
fn run_stroke(gesture: &GestureDescriptor) -> bool {
    let mut ok = simulate(&rdev::EventType::MouseMove {
        x: gesture.start.x as f64,
        y: gesture.start.y as f64,
    });
    ok &= simulate(&rdev::EventType::ButtonPress(rdev::Button::Left));

    match gesture.end {
        Some(end) => {
            let steps = (gesture.duration_ms / SWIPE_STEP_MS).max(1);
            for step in 1..=steps {
                std::thread::sleep(Duration::from_millis(SWIPE_STEP_MS));
                let t = step as f32 / steps as f32;
                let x = gesture.start.x + (end.x - gesture.start.x) * t;
                let y = gesture.start.y + (end.y - gesture.start.y) * t;
                ok &= simulate(&rdev::EventType::MouseMove {
                    x: x as f64,
                    y: y as f64,
                });
            }
        }
        None => {
            std::thread::sleep(Duration::from_millis(gesture.duration_ms));
        }
    }

    ok &= simulate(&rdev::EventType::ButtonRelease(rdev::Button::Left));
    ok
}

impl GestureDispatch for RdevDispatch {
    fn dispatch(&self, gesture: &GestureDescriptor) -> BoxFuture<'static, bool> {
        let gesture = gesture.clone();
        async move {
            match tokio::task::spawn_blocking(move || run_stroke(&gesture)).await {
                Ok(accepted) => accepted,
                Err(e) => {
                    debug!("dispatch task failed: {}", e);
                    false
                }
            }
        }
        .boxed()
    }
}
