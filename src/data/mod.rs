//! Gesture and touch-sample data structures

mod events;

pub use events::{
    GestureEvent, GesturePoint, TapConfig, TaskMode, TouchPhase, TouchSample,
};
