//! Gesture injection capability
//!
//! The player builds opaque gesture descriptors and hands them to a
//! `GestureDispatch` implementation. The dispatch call reports whether
//! the host accepted the gesture; a false return is a per-gesture
//! failure, never fatal.

pub(crate) mod rdev_backend;

use futures::future::BoxFuture;

use crate::data::GesturePoint;

pub use rdev_backend::RdevDispatch;

/// Stroke duration used for plain taps, in milliseconds
pub const TAP_STROKE_MS: u64 = 50;

/// A platform-ready description of a single pointer motion
#[derive(Debug, Clone, PartialEq)]
pub struct GestureDescriptor {
    /// Where the pointer goes down
    pub start: GesturePoint,

    /// Where the pointer lifts; None means it lifts in place
    pub end: Option<GesturePoint>,

    /// How long the pointer stays down, in milliseconds
    pub duration_ms: u64,
}

impl GestureDescriptor {
    /// A short press-and-release at one point
    pub fn tap(x: f32, y: f32) -> Self {
        Self {
            start: GesturePoint::new(x, y),
            end: None,
            duration_ms: TAP_STROKE_MS,
        }
    }

    /// A press held in place for `duration_ms`
    pub fn long_press(x: f32, y: f32, duration_ms: u64) -> Self {
        Self {
            start: GesturePoint::new(x, y),
            end: None,
            duration_ms,
        }
    }

    /// A press that travels to an end point over `duration_ms`
    pub fn swipe(x: f32, y: f32, end_x: f32, end_y: f32, duration_ms: u64) -> Self {
        Self {
            start: GesturePoint::new(x, y),
            end: Some(GesturePoint::new(end_x, end_y)),
            duration_ms,
        }
    }
}

/// Capability for injecting synthetic gestures into the host
///
/// Returns true when the host accepted and completed the gesture.
/// Implementations that are unavailable should return false uniformly.
pub trait GestureDispatch: Send + Sync {
    fn dispatch(&self, gesture: &GestureDescriptor) -> BoxFuture<'static, bool>;
}
