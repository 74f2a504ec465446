//! autotap
//!
//! Records timestamped pointer gestures and replays them with their
//! original timing, or taps a fixed point pattern at a configurable
//! interval.

mod config;
mod data;
mod dispatch;
mod engine;
mod input;
mod logging;
mod ui;

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};

use config::Config;
use dispatch::RdevDispatch;
use engine::{create_command_channel, EngineCommand, GestureEngine};
use input::create_touch_source;
use ui::ConsoleUi;

/// Main entry point; the console UI runs on the main thread
fn main() -> Result<()> {
    let _log_guard = logging::init_logging()?;

    info!("autotap starting...");

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let config = Config::load()?;
    info!("Configuration loaded from {:?}", config.config_path()?);

    let runtime = Arc::new(tokio::runtime::Runtime::new()?);

    let (cmd_tx, cmd_rx) = create_command_channel();

    let dispatch = Arc::new(RdevDispatch::new());
    let touch_source = create_touch_source();
    let engine = GestureEngine::new(dispatch, touch_source, cmd_rx);

    // Log state transitions and touch feedback as playback runs.
    let mut state_rx = engine.state();
    runtime.spawn(async move {
        while state_rx.changed().await.is_ok() {
            info!("Engine state: {:?}", *state_rx.borrow());
        }
    });

    let mut touched_rx = engine.subscribe_touches();
    runtime.spawn(async move {
        while let Ok(point) = touched_rx.recv().await {
            info!("Dispatched gesture at ({:.1}, {:.1})", point.x, point.y);
        }
    });

    // Run the engine loop on the runtime, off the main thread.
    let engine_runtime = runtime.clone();
    let engine_handle = std::thread::spawn(move || {
        engine_runtime.block_on(async move {
            if let Err(e) = engine.run().await {
                error!("Engine error: {}", e);
            }
        });
    });

    // Ctrl+C shuts the engine down cleanly.
    let ctrl_c_tx = cmd_tx.clone();
    let ctrl_c_runtime = runtime.clone();
    ctrlc::set_handler(move || {
        info!("Ctrl+C received, shutting down...");
        let tx = ctrl_c_tx.clone();
        ctrl_c_runtime.spawn(async move {
            let _ = tx.send(EngineCommand::Shutdown).await;
        });
    })?;

    ConsoleUi::new(cmd_tx.clone(), config).run();

    // Stdin may close without an explicit `quit`; make sure the engine
    // still stops.
    runtime.block_on(async {
        let _ = cmd_tx.send(EngineCommand::Shutdown).await;
    });

    let _ = engine_handle.join();

    info!("Shutdown complete");
    Ok(())
}

fn print_help() {
    println!("autotap - pointer gesture recorder and replayer");
    println!();
    println!("USAGE:");
    println!("    autotap [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help    Print this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    RUST_LOG             Set log level (e.g., debug, info, warn)");
    println!("    AUTOTAP_LOG_PATH     Override the log directory");
}
