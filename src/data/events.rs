//! Gesture event data structures

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// A single screen coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GesturePoint {
    /// X coordinate
    pub x: f32,

    /// Y coordinate
    pub y: f32,
}

impl GesturePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A recorded gesture, timestamped relative to the recording session origin
///
/// Timestamps and durations are milliseconds. Within one recorded
/// sequence events are appended as they occur, so timestamps are
/// non-decreasing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// A short touch below the long-press threshold
    Tap {
        /// Milliseconds since session origin
        timestamp: u64,
        x: f32,
        y: f32,
    },

    /// A stationary touch held at least the tap timeout
    LongPress {
        timestamp: u64,
        x: f32,
        y: f32,
        /// How long the touch was held, in milliseconds
        duration: u64,
    },

    /// A touch that travelled at least the touch slop
    Swipe {
        timestamp: u64,
        x: f32,
        y: f32,
        end_x: f32,
        end_y: f32,
        duration: u64,
    },
}

impl GestureEvent {
    /// Milliseconds since session origin
    pub fn timestamp(&self) -> u64 {
        match *self {
            GestureEvent::Tap { timestamp, .. }
            | GestureEvent::LongPress { timestamp, .. }
            | GestureEvent::Swipe { timestamp, .. } => timestamp,
        }
    }

    /// Starting coordinates of the gesture
    pub fn start_point(&self) -> GesturePoint {
        match *self {
            GestureEvent::Tap { x, y, .. }
            | GestureEvent::LongPress { x, y, .. }
            | GestureEvent::Swipe { x, y, .. } => GesturePoint::new(x, y),
        }
    }
}

/// Fixed tap-pattern configuration
///
/// Point order defines replay order. `interval_ms` is the pause after
/// each dispatched tap; bounds checking (1..=600000) happens at the
/// config/UI layer, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TapConfig {
    /// Points to tap, in replay order
    pub points: Vec<GesturePoint>,

    /// Pause between taps in milliseconds
    pub interval_ms: u64,
}

/// Selects which playback algorithm runs
#[derive(Debug, Clone, PartialEq)]
pub enum TaskMode {
    /// Cycle through a fixed point list at a uniform interval
    QuickTap(TapConfig),

    /// Replay a recorded gesture sequence with original timing
    Recording {
        events: Vec<GestureEvent>,
        /// Repeat the sequence until cancelled
        looped: bool,
    },
}

impl TaskMode {
    /// A mode with nothing to dispatch; playback of an empty mode is a
    /// vacuous no-op and never enters the Playing state.
    pub fn is_empty(&self) -> bool {
        match self {
            TaskMode::QuickTap(config) => config.points.is_empty(),
            TaskMode::Recording { events, .. } => events.is_empty(),
        }
    }
}

/// Phase of a raw pointer sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Down,
    Up,
}

/// A raw pointer sample delivered to the recorder
///
/// Only down and up samples are delivered; intermediate moves are
/// filtered out by the source.
#[derive(Debug, Clone, Copy)]
pub struct TouchSample {
    pub phase: TouchPhase,
    pub x: f32,
    pub y: f32,
    /// Monotonic sample time, on the same clock as the session origin
    pub time: Instant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_modes_are_vacuous() {
        let quick = TaskMode::QuickTap(TapConfig {
            points: Vec::new(),
            interval_ms: 100,
        });
        assert!(quick.is_empty());

        let recording = TaskMode::Recording {
            events: Vec::new(),
            looped: true,
        };
        assert!(recording.is_empty());

        let nonempty = TaskMode::QuickTap(TapConfig {
            points: vec![GesturePoint::new(1.0, 2.0)],
            interval_ms: 100,
        });
        assert!(!nonempty.is_empty());
    }

    #[test]
    fn gesture_event_accessors() {
        let swipe = GestureEvent::Swipe {
            timestamp: 500,
            x: 10.0,
            y: 20.0,
            end_x: 110.0,
            end_y: 20.0,
            duration: 1200,
        };
        assert_eq!(swipe.timestamp(), 500);
        assert_eq!(swipe.start_point(), GesturePoint::new(10.0, 20.0));
    }
}
