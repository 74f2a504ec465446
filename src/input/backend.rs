//! Touch sample source trait

use crate::data::TouchSample;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from starting or driving a touch source
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to start input listener: {0}")]
    Listen(String),
}

/// Trait for raw touch sample sources
///
/// Sources deliver pointer down/up samples only; move samples are
/// filtered out before they reach the recorder.
pub trait TouchSource: Send {
    /// Start delivering samples to the provided channel
    fn start(&mut self, tx: mpsc::UnboundedSender<TouchSample>) -> Result<(), InputError>;

    /// Stop delivering samples
    fn stop(&mut self);

    /// Whether the source is currently delivering samples
    fn is_capturing(&self) -> bool;
}

/// Create the touch source for the current platform
pub fn create_touch_source() -> Box<dyn TouchSource> {
    tracing::info!("Using rdev backend for touch capture");
    Box::new(super::rdev_backend::RdevTouchSource::new())
}
