//! Console UI

mod console;

pub use console::ConsoleUi;
