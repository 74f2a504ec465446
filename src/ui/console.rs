//! Interactive console driving the engine
//!
//! Runs on the main thread and translates line commands into engine
//! commands, the way a floating control panel would.

use std::io::{BufRead, Write};

use tokio::sync::mpsc;
use tracing::debug;

use crate::config::Config;
use crate::engine::EngineCommand;

pub struct ConsoleUi {
    cmd_tx: mpsc::Sender<EngineCommand>,
    config: Config,
}

impl ConsoleUi {
    pub fn new(cmd_tx: mpsc::Sender<EngineCommand>, config: Config) -> Self {
        Self { cmd_tx, config }
    }

    /// Read commands until `quit` or end of input. Blocking; intended
    /// for the main thread.
    pub fn run(self) {
        print_help();

        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };

            let Some(cmd) = self.parse(line.trim()) else {
                continue;
            };

            let shutdown = matches!(cmd, EngineCommand::Shutdown);
            if self.cmd_tx.blocking_send(cmd).is_err() {
                debug!("Engine command channel closed");
                break;
            }
            if shutdown {
                break;
            }
        }
    }

    fn parse(&self, line: &str) -> Option<EngineCommand> {
        match line {
            "" => None,
            "record" => Some(EngineCommand::StartRecording),
            "stop" => Some(EngineCommand::StopRecording),
            "play" => Some(EngineCommand::PlayRecording {
                looped: self.config.playback.loop_recording,
            }),
            "loop" => Some(EngineCommand::PlayRecording { looped: true }),
            "taps" => Some(EngineCommand::PlayQuickTap(self.config.tap_config())),
            "cancel" => Some(EngineCommand::StopPlaying),
            "quit" | "exit" => Some(EngineCommand::Shutdown),
            "help" => {
                print_help();
                None
            }
            other => {
                println!("Unknown command: {other:?} (try 'help')");
                None
            }
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  record   start recording pointer gestures");
    println!("  stop     stop recording and keep the sequence");
    println!("  play     replay the last recording");
    println!("  loop     replay the last recording until cancelled");
    println!("  taps     run the configured quick-tap pattern");
    println!("  cancel   stop any running playback");
    println!("  help     show this help");
    println!("  quit     shut down");
    let _ = std::io::stdout().flush();
}
