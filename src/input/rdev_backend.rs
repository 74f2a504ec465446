//! rdev-based touch sample source
//! Works on Windows, macOS, and Linux (X11)

use crate::data::{TouchPhase, TouchSample};
use crate::input::{InputError, TouchSource};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Maps left-button press/release to touch down/up samples
///
/// rdev button events carry no position, so the listener tracks the
/// last observed pointer position from move events and stamps samples
/// with it.
pub struct RdevTouchSource {
    capturing: Arc<AtomicBool>,
}

impl RdevTouchSource {
    pub fn new() -> Self {
        Self {
            capturing: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Default for RdevTouchSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TouchSource for RdevTouchSource {
    fn start(&mut self, tx: mpsc::UnboundedSender<TouchSample>) -> Result<(), InputError> {
        if self.capturing.swap(true, Ordering::SeqCst) {
            return Ok(()); // Already capturing
        }

        let capturing = self.capturing.clone();

        let spawned = thread::Builder::new()
            .name("touch-listener".to_string())
            .spawn(move || {
                info!("rdev touch capture started");

                let mut cursor: (f32, f32) = (0.0, 0.0);

                let callback = move |event: rdev::Event| {
                    if !capturing.load(Ordering::SeqCst) {
                        return;
                    }

                    let sample = match event.event_type {
                        rdev::EventType::MouseMove { x, y } => {
                            cursor = (x as f32, y as f32);
                            None
                        }
                        rdev::EventType::ButtonPress(rdev::Button::Left) => Some(TouchSample {
                            phase: TouchPhase::Down,
                            x: cursor.0,
                            y: cursor.1,
                            time: Instant::now(),
                        }),
                        rdev::EventType::ButtonRelease(rdev::Button::Left) => Some(TouchSample {
                            phase: TouchPhase::Up,
                            x: cursor.0,
                            y: cursor.1,
                            time: Instant::now(),
                        }),
                        _ => None,
                    };

                    if let Some(sample) = sample {
                        if let Err(e) = tx.send(sample) {
                            debug!("Failed to forward touch sample: {}", e);
                        }
                    }
                };

                // rdev::listen blocks for the life of the process;
                // stop() only gates delivery.
                if let Err(e) = rdev::listen(callback) {
                    error!("rdev listen error: {:?}", e);
                }

                info!("rdev touch capture stopped");
            });

        if let Err(e) = spawned {
            self.capturing.store(false, Ordering::SeqCst);
            return Err(InputError::Listen(e.to_string()));
        }

        Ok(())
    }

    fn stop(&mut self) {
        self.capturing.store(false, Ordering::SeqCst);
        info!("rdev touch source stop requested");
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }
}
