//! Gesture capture-and-replay engine

mod controller;
mod player;
mod recorder;

pub use controller::GestureEngine;
pub use player::GesturePlayer;
pub use recorder::GestureRecorder;

use tokio::sync::mpsc;

use crate::data::TapConfig;

/// Lifecycle state of the engine; the sole source of truth for what
/// operation is legal next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Neither recording nor playing
    Idle,
    /// Capturing touch samples into the recording buffer
    Recording,
    /// A playback task is running
    Playing,
}

/// Commands that can be sent to the engine
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// Begin a new recording session
    StartRecording,
    /// Finish the recording session and keep the result
    StopRecording,
    /// Replay a fixed tap pattern until cancelled
    PlayQuickTap(TapConfig),
    /// Replay the last recording
    PlayRecording { looped: bool },
    /// Cancel any running playback
    StopPlaying,
    /// Shut the engine down
    Shutdown,
}

/// Create the command channel for the engine
pub fn create_command_channel() -> (mpsc::Sender<EngineCommand>, mpsc::Receiver<EngineCommand>) {
    mpsc::channel(32)
}
